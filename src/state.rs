use anyhow::Result;
use chrono::{Duration, Utc};
use hiqlite::Client;
use hiqlite_macros::params;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{blobs::BlobStore, config::Configuration};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename(serialize = "_id"))]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Deserialize)]
struct RecipeRow {
    id: String,
    user_id: String,
    author: String,
    title: String,
    body: Option<String>,
    is_public: i64,
    image_name: Option<String>,
    image_caption: Option<String>,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub author: String,
    pub title: String,
    #[serde(rename = "text")]
    pub body: Option<String>,
    pub is_public: bool,
    #[serde(skip)]
    pub image_name: Option<String>,
    #[serde(rename = "imageDesc")]
    pub image_caption: Option<String>,
    pub has_image: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            user_id: row.user_id,
            author: row.author,
            title: row.title,
            body: row.body,
            is_public: row.is_public != 0,
            has_image: row.image_name.is_some(),
            image_name: row.image_name,
            image_caption: row.image_caption,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Comment {
    #[serde(rename(serialize = "_id"))]
    pub id: String,
    pub user_id: String,
    pub recipe_id: String,
    pub text: String,
    /// Username of the commenting user, resolved at read time.
    pub author: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ServiceState {
    pub config: Configuration,
    pub client: Client,
    pub(crate) blobs: BlobStore,
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn new_id() -> String {
    Uuid::new_v4().as_hyphenated().to_string()
}

impl ServiceState {
    pub fn new(config: Configuration, client: Client) -> Self {
        let blobs = BlobStore::new(config.storage.relative().join("blobs"));
        Self {
            config,
            client,
            blobs,
        }
    }

    // --- users -----------------------------------------------------------

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User> {
        let user = User {
            id: new_id(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };

        self.client
            .execute(
                "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4);",
                params!(
                    user.id.clone(),
                    user.username.clone(),
                    user.email.clone(),
                    user.password_hash.clone()
                ),
            )
            .await?;

        Ok(user)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .client
            .query_as_optional(
                "SELECT * FROM users WHERE username = $1;",
                params!(username),
            )
            .await?)
    }

    pub async fn email_taken(&self, email: &str) -> Result<bool> {
        let res: Option<User> = self
            .client
            .query_as_optional("SELECT * FROM users WHERE email = $1;", params!(email))
            .await?;

        Ok(res.is_some())
    }

    // --- sessions --------------------------------------------------------

    pub async fn create_session(&self, user_id: &str) -> Result<String> {
        let id = new_id();
        let ttl = Duration::minutes(self.config.session_ttl_minutes as i64);
        let expires_at = (Utc::now() + ttl).to_rfc3339();

        self.client
            .execute(
                "INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3);",
                params!(id.clone(), user_id, expires_at),
            )
            .await?;

        Ok(id)
    }

    /// Resolve a session id to its user, ignoring expired sessions.
    pub async fn get_session_user(&self, session_id: &str) -> Result<Option<User>> {
        Ok(self
            .client
            .query_as_optional(
                "SELECT users.*
                    FROM sessions
                    JOIN users ON sessions.user_id = users.id
                    WHERE sessions.id = $1 AND sessions.expires_at > $2;",
                params!(session_id, now()),
            )
            .await?)
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.client
            .execute("DELETE FROM sessions WHERE id = $1;", params!(session_id))
            .await?;

        Ok(())
    }

    // --- recipes ---------------------------------------------------------

    pub async fn list_recipes_for_user(&self, user_id: &str) -> Result<Vec<Recipe>> {
        let rows: Vec<RecipeRow> = self
            .client
            .query_as(
                "SELECT * FROM recipes WHERE user_id = $1 ORDER BY created_at DESC;",
                params!(user_id),
            )
            .await?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    pub async fn list_public_recipes(&self) -> Result<Vec<Recipe>> {
        let rows: Vec<RecipeRow> = self
            .client
            .query_as(
                "SELECT * FROM recipes WHERE is_public = 1 ORDER BY created_at DESC;",
                params!(),
            )
            .await?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    pub async fn get_recipe(&self, recipe_id: &str) -> Result<Option<Recipe>> {
        let row: Option<RecipeRow> = self
            .client
            .query_as_optional("SELECT * FROM recipes WHERE id = $1;", params!(recipe_id))
            .await?;

        Ok(row.map(Recipe::from))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_recipe(
        &self,
        user: &User,
        title: &str,
        body: Option<String>,
        is_public: bool,
        image_name: Option<String>,
        image_caption: Option<String>,
    ) -> Result<Recipe> {
        let created_at = now();
        let recipe = Recipe {
            id: new_id(),
            user_id: user.id.clone(),
            author: user.username.clone(),
            title: title.to_string(),
            body,
            is_public,
            has_image: image_name.is_some(),
            image_name,
            image_caption,
            created_at: created_at.clone(),
            updated_at: created_at,
        };

        self.client
            .execute(
                "INSERT INTO recipes
                    (id, user_id, author, title, body, is_public, image_name, image_caption, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10);",
                params!(
                    recipe.id.clone(),
                    recipe.user_id.clone(),
                    recipe.author.clone(),
                    recipe.title.clone(),
                    recipe.body.clone(),
                    recipe.is_public as i64,
                    recipe.image_name.clone(),
                    recipe.image_caption.clone(),
                    recipe.created_at.clone(),
                    recipe.updated_at.clone()
                ),
            )
            .await?;

        Ok(recipe)
    }

    /// Persist the mutable fields of a recipe, bumping `updated_at`.
    pub async fn update_recipe(&self, recipe: &Recipe) -> Result<Recipe> {
        let updated_at = now();

        self.client
            .execute(
                "UPDATE recipes
                    SET title = $1, body = $2, is_public = $3, image_name = $4,
                        image_caption = $5, updated_at = $6
                    WHERE id = $7;",
                params!(
                    recipe.title.clone(),
                    recipe.body.clone(),
                    recipe.is_public as i64,
                    recipe.image_name.clone(),
                    recipe.image_caption.clone(),
                    updated_at.clone(),
                    recipe.id.clone()
                ),
            )
            .await?;

        Ok(Recipe {
            updated_at,
            ..recipe.clone()
        })
    }

    /// Remove a recipe together with its comments and its comment reference
    /// set, in one transaction. Blob cleanup is the caller's concern.
    pub async fn delete_recipe(&self, recipe_id: &str) -> Result<()> {
        let results = self
            .client
            .txn([
                (
                    "DELETE FROM recipe_comments WHERE recipe_id = $1;",
                    params!(recipe_id),
                ),
                (
                    "DELETE FROM comments WHERE recipe_id = $1;",
                    params!(recipe_id),
                ),
                ("DELETE FROM recipes WHERE id = $1;", params!(recipe_id)),
            ])
            .await?;

        for result in results {
            result?;
        }

        Ok(())
    }

    // --- comments --------------------------------------------------------

    /// Create a comment and append it to the recipe's reference set in a
    /// single transaction. The recipe's `updated_at` moves with it, the way
    /// saving the parent document did in the original data model.
    pub async fn insert_comment(&self, user: &User, recipe_id: &str, text: &str) -> Result<Comment> {
        let created_at = now();
        let comment = Comment {
            id: new_id(),
            user_id: user.id.clone(),
            recipe_id: recipe_id.to_string(),
            text: text.to_string(),
            author: user.username.clone(),
            created_at: created_at.clone(),
            updated_at: created_at.clone(),
        };

        let results = self
            .client
            .txn([
                (
                    "INSERT INTO comments (id, user_id, recipe_id, text, created_at, updated_at)
                        VALUES ($1, $2, $3, $4, $5, $6);",
                    params!(
                        comment.id.clone(),
                        comment.user_id.clone(),
                        comment.recipe_id.clone(),
                        comment.text.clone(),
                        comment.created_at.clone(),
                        comment.updated_at.clone()
                    ),
                ),
                (
                    "INSERT INTO recipe_comments (recipe_id, comment_id) VALUES ($1, $2);",
                    params!(comment.recipe_id.clone(), comment.id.clone()),
                ),
                (
                    "UPDATE recipes SET updated_at = $1 WHERE id = $2;",
                    params!(created_at, comment.recipe_id.clone()),
                ),
            ])
            .await?;

        for result in results {
            result?;
        }

        Ok(comment)
    }

    pub async fn list_comments(&self, recipe_id: &str) -> Result<Vec<Comment>> {
        Ok(self
            .client
            .query_as(
                "SELECT comments.*, users.username AS author
                    FROM comments
                    JOIN users ON comments.user_id = users.id
                    WHERE comments.recipe_id = $1
                    ORDER BY comments.created_at;",
                params!(recipe_id),
            )
            .await?)
    }

    pub async fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>> {
        Ok(self
            .client
            .query_as_optional(
                "SELECT comments.*, users.username AS author
                    FROM comments
                    JOIN users ON comments.user_id = users.id
                    WHERE comments.id = $1;",
                params!(comment_id),
            )
            .await?)
    }

    /// Remove a comment and its reference-set row in one transaction.
    pub async fn delete_comment(&self, comment: &Comment) -> Result<()> {
        let results = self
            .client
            .txn([
                (
                    "DELETE FROM recipe_comments WHERE recipe_id = $1 AND comment_id = $2;",
                    params!(comment.recipe_id.clone(), comment.id.clone()),
                ),
                (
                    "DELETE FROM comments WHERE id = $1;",
                    params!(comment.id.clone()),
                ),
            ])
            .await?;

        for result in results {
            result?;
        }

        Ok(())
    }

    /// The recipe's comment reference set, as stored.
    pub async fn recipe_comment_ids(&self, recipe_id: &str) -> Result<Vec<String>> {
        Ok(self
            .client
            .query_as(
                "SELECT comment_id FROM recipe_comments WHERE recipe_id = $1;",
                params!(recipe_id),
            )
            .await?)
    }
}
