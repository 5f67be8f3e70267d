use hiqlite_macros::embed::*;

pub mod config;
pub mod state;

mod api;
mod blobs;
mod context;
mod error;
mod search;


pub use api::router;

#[derive(Embed)]
#[folder = "migrations"]
pub struct Migrations;
