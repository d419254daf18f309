//! Output filenames and JSON result files.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::constants::ALL_FORUMS_MARKER;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_]").unwrap());

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which harvest a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Posts,
    FollowedForums,
}

impl OutputKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::FollowedForums => "followed_forums",
        }
    }
}

fn sanitize(part: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(part, "_").into_owned()
}

/// Derive the output filename for a harvest.
///
/// Forum names are joined with `_` before sanitizing, so lists that join to
/// the same string (`["a_b"]` and `["a", "b"]`) share a filename.
#[must_use]
pub fn output_filename(user_id: &str, forum_names: &[String], kind: OutputKind) -> String {
    let forum_part = if forum_names.is_empty() {
        ALL_FORUMS_MARKER.to_string()
    } else {
        forum_names.join("_")
    };
    format!(
        "{}_{}_{}.json",
        sanitize(user_id),
        sanitize(&forum_part),
        kind.as_str()
    )
}

/// Serialize records as a pretty-printed JSON array with 4-space indentation.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json<T: Serialize>(records: &[T]) -> Result<Vec<u8>, OutputError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write records to `dir/filename`.
///
/// Nothing is written for an empty slice; the return value is then `None`.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub async fn write_records<T: Serialize>(
    dir: &Path,
    filename: &str,
    records: &[T],
) -> Result<Option<PathBuf>, OutputError> {
    if records.is_empty() {
        warn!(file = %filename, "No data harvested, nothing written");
        return Ok(None);
    }

    let body = render_json(records)?;
    let path = dir.join(filename);

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| OutputError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|source| OutputError::Write {
            path: path.clone(),
            source,
        })?;

    info!(path = %path.display(), records = records.len(), "Results written");
    Ok(Some(path))
}
