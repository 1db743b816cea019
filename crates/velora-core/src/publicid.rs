//! Public-identifier recovery from asset delivery URLs.
//!
//! Persisted documents store only the delivery URL of an asset; the host's
//! public identifier has to be recovered from the URL path when the asset
//! must be deleted.

use regex::Regex;

/// Extract the folder-scoped public identifier from a delivery URL.
///
/// Matches the path segment between `/upload/` (optionally followed by a
/// version segment `vNNN/`) and the file extension, ignoring any query
/// string. Everything else in the URL is opaque.
///
/// Returns `None` for anything that does not match this shape (empty
/// string, URL without `/upload/`, malformed path). Callers must treat
/// `None` as "nothing to delete", never as an error.
///
/// # Examples
///
/// ```
/// use velora_core::publicid::extract_public_id;
///
/// let url = "https://cdn.example.com/image/upload/v1712/articles/cover.jpg";
/// assert_eq!(extract_public_id(url).as_deref(), Some("articles/cover"));
/// assert_eq!(extract_public_id("https://elsewhere.test/cover.jpg"), None);
/// ```
#[must_use]
pub fn extract_public_id(url: &str) -> Option<String> {
    let re = Regex::new(r"/upload/(?:v\d+/)?(.+?)(\.[a-zA-Z0-9]+)?(\?.*)?$")
        .expect("Invalid regex");
    re.captures(url)
        .map(|captures| captures[1].to_string())
        .filter(|id| !id.is_empty())
}
