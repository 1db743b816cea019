//! Article document model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// A unique identifier for an article, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleId(Uuid);

impl ArticleId {
    /// Create a new unique article ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ArticleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArticleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One ordered `{image, text}` unit within an article body.
///
/// Order is meaningful (rendered top-to-bottom) and preserved across edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContentBlock {
    /// Delivery URL of the block image, possibly empty.
    #[serde(default)]
    pub image: String,
    /// Text content of the block.
    #[serde(default)]
    pub text: String,
}

/// An article document as persisted and served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: ArticleId,
    pub title: String,
    pub description: String,
    pub author: String,
    /// Calendar date string (`YYYY-MM-DD`)
    pub date: String,
    /// Delivery URL of the cover image, possibly empty
    pub image: String,
    /// Ordered content blocks
    pub contents: Vec<ContentBlock>,
    /// Derived slug, recomputed from `title` on every write
    pub href: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

/// Incoming article fields for a create or full-document update.
///
/// Image slots here are final delivery URLs; raw file uploads are resolved
/// to URLs by the lifecycle orchestrator before a draft is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArticleDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub contents: Vec<ContentBlock>,
}

impl ArticleDraft {
    /// Validate required fields without consuming the draft.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Article title is required".to_string(),
            ));
        }
        if self.description.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Article description is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Normalize string fields: trim text, keep block order, default the
    /// date to today when absent.
    #[must_use]
    fn normalized(self) -> Self {
        let date = if self.date.trim().is_empty() {
            today_date_string()
        } else {
            self.date.trim().to_string()
        };
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            author: self.author.trim().to_string(),
            date,
            image: self.image.trim().to_string(),
            contents: self
                .contents
                .into_iter()
                .map(|block| ContentBlock {
                    image: block.image.trim().to_string(),
                    text: block.text,
                })
                .collect(),
        }
    }
}

impl Article {
    /// Build a new article from a validated draft.
    pub fn create(draft: ArticleDraft) -> Result<Self> {
        draft.validate()?;
        let draft = draft.normalized();
        let now = chrono::Utc::now().timestamp_millis();
        Ok(Self {
            id: ArticleId::new(),
            href: article_href(&draft.title),
            title: draft.title,
            description: draft.description,
            author: draft.author,
            date: draft.date,
            image: draft.image,
            contents: draft.contents,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace an existing article's content with a draft (full-document
    /// PUT semantics). Identity and creation time are preserved; `href` is
    /// recomputed from the incoming title.
    pub fn replace(existing: &Self, draft: ArticleDraft) -> Result<Self> {
        draft.validate()?;
        let draft = draft.normalized();
        Ok(Self {
            id: existing.id,
            href: article_href(&draft.title),
            title: draft.title,
            description: draft.description,
            author: draft.author,
            date: draft.date,
            image: draft.image,
            contents: draft.contents,
            created_at: existing.created_at,
            updated_at: chrono::Utc::now().timestamp_millis(),
        })
    }
}

/// Derive the public slug for an article title.
///
/// Whitespace runs collapse to a single hyphen, the result is lowercased and
/// percent-encoded, and prefixed with `/article/`. The slug is not unique:
/// two articles with the same title share an href.
#[must_use]
pub fn article_href(title: &str) -> String {
    let slug = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    format!("/article/{}", urlencoding::encode(&slug))
}

/// Today's date as `YYYY-MM-DD` (UTC).
#[must_use]
pub fn today_date_string() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn draft(title: &str, description: &str) -> ArticleDraft {
        ArticleDraft {
            title: title.to_string(),
            description: description.to_string(),
            ..ArticleDraft::default()
        }
    }

    #[test]
    fn article_id_unique_and_parseable() {
        let id1 = ArticleId::new();
        let id2 = ArticleId::new();
        assert_ne!(id1, id2);

        let parsed: ArticleId = id1.as_str().parse().unwrap();
        assert_eq!(id1, parsed);
    }

    #[test]
    fn create_requires_title_and_description() {
        assert!(Article::create(draft("", "body")).is_err());
        assert!(Article::create(draft("   ", "body")).is_err());
        assert!(Article::create(draft("title", "")).is_err());
    }

    #[test]
    fn create_derives_href_and_defaults_date() {
        let article = Article::create(draft("Hello World", "x")).unwrap();
        assert_eq!(article.href, "/article/hello-world");
        assert_eq!(article.contents, vec![]);
        assert!(!article.date.is_empty());
    }

    #[test]
    fn replace_keeps_identity_and_recomputes_href() {
        let original = Article::create(draft("First Title", "x")).unwrap();
        let updated = Article::replace(&original, draft("Second Title", "y")).unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.href, "/article/second-title");
        assert_eq!(updated.description, "y");
    }

    #[test]
    fn href_collapses_whitespace_and_encodes() {
        assert_eq!(article_href("Hello   World"), "/article/hello-world");
        assert_eq!(article_href("Spa & Wellness"), "/article/spa-%26-wellness");
        // Same title, same slug: collisions are accepted behavior.
        assert_eq!(article_href("Hello World"), article_href("hello world"));
    }

    #[test]
    fn normalized_trims_fields_and_block_images() {
        let mut d = draft("  Padded  ", " body ");
        d.author = "  Ann  ".to_string();
        d.contents = vec![ContentBlock {
            image: "  https://cdn.test/upload/articles/a.jpg  ".to_string(),
            text: "keep  inner  spacing".to_string(),
        }];

        let article = Article::create(d).unwrap();
        assert_eq!(article.title, "Padded");
        assert_eq!(article.author, "Ann");
        assert_eq!(
            article.contents[0].image,
            "https://cdn.test/upload/articles/a.jpg"
        );
        assert_eq!(article.contents[0].text, "keep  inner  spacing");
    }
}
