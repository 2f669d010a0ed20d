//! File request construction
//!
//! Requests are built against a task's working directory before the engine
//! ever sees them: destination names are de-duplicated with an auto-rename,
//! the cookie map is folded into a single `Cookie` header, and the stable
//! request id is derived from the resolved destination and source URL.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::types::RequestId;
use crate::utils::unique_path;

/// Header name the cookie map folds into
const COOKIE_HEADER: &str = "Cookie";

/// One file transfer handed to the download engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRequest {
    /// Stable identifier, a hash of destination path and source URL
    pub id: RequestId,

    /// Resolved destination path inside the task's working directory
    pub file_path: PathBuf,

    /// Source URL
    pub url: String,

    /// HTTP headers, including the folded `Cookie` header when cookies were given
    pub headers: BTreeMap<String, String>,

    /// Automatic retry attempt limit for the engine
    pub retry_max_attempts: u32,
}

impl FileRequest {
    /// Build a request against `dir`, de-duplicating `file_name` against both
    /// the directory contents and the destinations in `taken`
    pub(crate) fn build(
        dir: &Path,
        file_name: &str,
        url: &str,
        headers: &BTreeMap<String, String>,
        cookies: &BTreeMap<String, String>,
        taken: &[PathBuf],
        config: &Config,
    ) -> Result<Self> {
        let file_path = unique_path(&dir.join(file_name), taken)?;

        let mut headers = headers.clone();
        if let Some(folded) = fold_cookies(cookies) {
            headers.insert(COOKIE_HEADER.to_string(), folded);
        }

        let id = RequestId::new(request_hash(&file_path, url));

        Ok(Self {
            id,
            file_path,
            url: url.to_string(),
            headers,
            retry_max_attempts: config.retry_max_attempts,
        })
    }
}

/// Fold a cookie map into one header value: `key: value` entries joined by
/// `"; "`, no trailing separator; `None` for an empty map
fn fold_cookies(cookies: &BTreeMap<String, String>) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    Some(
        cookies
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

fn request_hash(path: &Path, url: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    url.hash(&mut hasher);
    hasher.finish()
}
