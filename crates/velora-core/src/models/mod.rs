//! Data models for Velora

mod article;
mod asset;

pub use article::{article_href, today_date_string, Article, ArticleDraft, ArticleId, ContentBlock};
pub use asset::{AssetFolder, AssetPage, AssetRecord, DeleteOutcome};
