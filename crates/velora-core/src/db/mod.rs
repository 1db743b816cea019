//! Database layer for Velora

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use repository::{
    ArticleRepository, PendingDeletion, PendingDeletionRepository, SqliteArticleRepository,
};
