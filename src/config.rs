use std::{borrow::Cow, path::PathBuf};

use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
    value::magic::RelativePathBuf,
};
use hiqlite::{Node, NodeConfig, s3::EncKeys};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadleNode {
    pub id: u64,
    pub addr_raft: String,
    pub addr_api: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RaftConfig {
    pub address: String,
    pub secret: Option<String>,
}

impl Default for RaftConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            secret: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ApiConfig {
    pub address: String,
    pub secret: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            secret: None,
        }
    }
}

/// Listen address for the recipe HTTP API itself, as opposed to the
/// database node's internal api/raft listeners.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BackupEncryptionKey {
    pub id: String,
    pub key: Vec<u8>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BackupEncryptionConfig {
    pub keys: Vec<BackupEncryptionKey>,
    pub active: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BackupConfig {
    encryption: BackupEncryptionConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Configuration {
    pub node_id: u64,
    pub nodes: Vec<LadleNode>,
    pub raft: RaftConfig,
    pub api: ApiConfig,
    pub http: HttpConfig,
    #[serde(serialize_with = "RelativePathBuf::serialize_original")]
    pub storage: RelativePathBuf,
    pub session_ttl_minutes: u64,
    pub backups: BackupConfig,
}

impl Configuration {
    pub fn figment(configs: Vec<PathBuf>) -> Figment {
        let fig = Figment::from(Serialized::defaults(Configuration::default()));

        let fig = configs
            .into_iter()
            .fold(fig, |fig, config_path| fig.admerge(Yaml::file(config_path)));

        fig.admerge(Env::prefixed("LADLE_"))
    }

    pub fn config(figment: Figment) -> Result<Configuration> {
        let mut config: Configuration =
            figment.extract().context("Failed to load configuration")?;

        // A bare invocation should come up as a single local node.
        if config.nodes.is_empty() {
            config.nodes = vec![LadleNode {
                id: 1,
                addr_api: "127.0.0.1:8101".to_string(),
                addr_raft: "127.0.0.1:8102".to_string(),
            }];
        }

        if config.node_id == 0 {
            config.node_id = 1;
        }

        if config.node_id > (config.nodes.len() as u64) {
            bail!("node_id greater than number of configured nodes");
        }

        if config.session_ttl_minutes == 0 {
            bail!("session_ttl_minutes must be at least 1");
        }

        Ok(config)
    }
}

impl TryFrom<Configuration> for NodeConfig {
    type Error = anyhow::Error;

    fn try_from(value: Configuration) -> std::result::Result<Self, Self::Error> {
        let nodes = value
            .nodes
            .iter()
            .map(|n| Node {
                id: n.id,
                addr_api: n.addr_api.clone(),
                addr_raft: n.addr_raft.clone(),
            })
            .collect();

        Ok(Self {
            node_id: value.node_id,
            nodes,
            listen_addr_api: Cow::Owned(value.api.address),
            listen_addr_raft: Cow::Owned(value.raft.address),
            data_dir: Cow::Owned(
                value
                    .storage
                    .relative()
                    .join("hiqlite")
                    .to_string_lossy()
                    .into_owned(),
            ),
            secret_raft: value
                .raft
                .secret
                .context("You must provide a raft secret")?,
            secret_api: value.api.secret.context("You must provide an API secret")?,
            enc_keys: EncKeys {
                enc_key_active: value.backups.encryption.active.clone(),
                enc_keys: value
                    .backups
                    .encryption
                    .keys
                    .iter()
                    .map(|key| (key.id.clone(), key.key.clone()))
                    .collect(),
            },
            log_statements: false,
            ..Default::default()
        })
    }
}

impl Default for Configuration {
    fn default() -> Self {
        let random_keys = EncKeys::generate().unwrap();
        let first_key = random_keys.enc_keys.into_iter().next().unwrap();

        Self {
            node_id: 0,
            nodes: vec![],
            raft: RaftConfig::default(),
            api: ApiConfig::default(),
            http: HttpConfig::default(),
            storage: "var".to_string().into(),
            session_ttl_minutes: 60,
            backups: BackupConfig {
                encryption: BackupEncryptionConfig {
                    active: random_keys.enc_key_active,
                    keys: vec![BackupEncryptionKey {
                        id: first_key.0,
                        key: first_key.1,
                    }],
                },
            },
        }
    }
}
