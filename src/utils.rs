//! Path helpers for task working directories and destination files

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Maximum number of rename attempts when resolving destination collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Length of the random suffix in working-directory names
const DIR_NAME_LEN: usize = 12;

/// Resolve a destination path that collides neither with an existing file nor
/// with any path in `taken`
///
/// Returns the original path when it is free; otherwise appends " (1)",
/// " (2)", ... before the extension until a free name is found. `taken`
/// covers destinations already claimed by sibling requests of the same task
/// whose files do not exist on disk yet.
pub fn unique_path(path: &Path, taken: &[PathBuf]) -> Result<PathBuf> {
    let occupied = |p: &Path| p.exists() || taken.iter().any(|t| t == p);

    if !occupied(path) {
        return Ok(path.to_path_buf());
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("cannot extract file stem from {}", path.display()),
        ))
    })?;

    let extension = path.extension().and_then(|e| e.to_str());

    let parent = path.parent().ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("cannot extract parent directory from {}", path.display()),
        ))
    })?;

    for i in 1..=MAX_RENAME_ATTEMPTS {
        let candidate = match extension {
            Some(ext) => format!("{} ({}).{}", stem, i, ext),
            None => format!("{} ({})", stem, i),
        };
        let candidate = parent.join(candidate);
        if !occupied(&candidate) {
            return Ok(candidate);
        }
    }

    Err(Error::Io(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!(
            "could not find unique name for {} after {} attempts",
            path.display(),
            MAX_RENAME_ATTEMPTS
        ),
    )))
}

/// Generate a random name for a task's exclusive working directory
pub fn random_dir_name() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DIR_NAME_LEN)
        .map(char::from)
        .collect();
    format!("task-{suffix}")
}
