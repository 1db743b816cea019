//! Asset host record shapes and folder namespaces

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Image record returned by asset-host upload and list operations.
///
/// This shape is used verbatim by callers; field names match the host's
/// wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Host-internal asset identifier.
    #[serde(default)]
    pub asset_id: String,
    /// Folder-scoped public identifier (`folder/name`, no extension).
    pub public_id: String,
    /// Stored file format (`jpg`, `webp`, ...).
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Stored size in bytes.
    #[serde(default)]
    pub bytes: u64,
    /// Public delivery URL.
    pub secure_url: String,
    /// Host-reported creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: String,
}

/// One page of a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPage {
    pub resources: Vec<AssetRecord>,
    /// Opaque token for the next page; `None` signals end of list.
    pub next_cursor: Option<String>,
}

/// Outcome of an asset delete.
///
/// The host does not let callers distinguish "deleted now" from "was already
/// gone" - both report [`DeleteOutcome::Deleted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
}

/// The fixed set of asset-host folder namespaces.
///
/// Folders partition uploads by use case; free-form folder strings are
/// rejected at the boundary so a typo cannot silently create a new
/// namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetFolder {
    About,
    Promotion,
    Review,
    Articles,
    AdminUser,
}

impl AssetFolder {
    /// Folder name as used in asset-host keys and public identifiers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::About => "about",
            Self::Promotion => "promotion",
            Self::Review => "review",
            Self::Articles => "articles",
            Self::AdminUser => "admin-user",
        }
    }

    /// All known folders.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::About,
            Self::Promotion,
            Self::Review,
            Self::Articles,
            Self::AdminUser,
        ]
    }
}

impl fmt::Display for AssetFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetFolder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "about" => Ok(Self::About),
            "promotion" => Ok(Self::Promotion),
            "review" => Ok(Self::Review),
            "articles" => Ok(Self::Articles),
            "admin-user" => Ok(Self::AdminUser),
            other => Err(Error::InvalidInput(format!(
                "Unknown asset folder: {other}"
            ))),
        }
    }
}
