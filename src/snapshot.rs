//! The persisted snapshot document and its record types.
//!
//! The snapshot is read once at the start of a run and replaced wholesale at
//! the end. Reading is tolerant: a missing, unreadable or malformed file is
//! treated as an empty snapshot, and individual malformed records are dropped.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Kind of media attached to a post. Only photos are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
}

impl Media {
    #[must_use]
    pub fn photo(url: &str) -> Self {
        Self {
            kind: MediaKind::Photo,
            url: url.to_string(),
        }
    }
}

/// A normalized post.
///
/// The aliases accept records written in the older `tweets.json` layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostRecord {
    pub id: String,
    pub handle: String,
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(alias = "avatar")]
    pub avatar_url: String,
    pub text: String,
    #[serde(alias = "url")]
    pub permalink: String,
    /// `YYYY-MM-DDTHH:MM:SSZ`, or empty when the upstream date was unparseable.
    pub timestamp: String,
    #[serde(alias = "likes")]
    pub like_count: u64,
    #[serde(alias = "retweets")]
    pub repost_count: u64,
    #[serde(alias = "replies")]
    pub reply_count: u64,
    pub media: Vec<Media>,
}

/// The persisted output document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub posts: Vec<PostRecord>,
    pub updated_at: String,
    pub tracked_account_count: usize,
    pub successful_fetch_count: usize,
}

impl Snapshot {
    /// Parse a snapshot document leniently.
    ///
    /// Returns `None` if the text is not a JSON object. Posts that fail to
    /// deserialize or carry no id are skipped. Documents that keep posts
    /// under `tweets` and the write time under `updated` are also read.
    #[must_use]
    pub fn parse_lenient(text: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(text).ok()?;
        let object = value.as_object()?;

        let posts = object
            .get("posts")
            .or_else(|| object.get("tweets"))
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        serde_json::from_value::<PostRecord>(item.clone())
                            .map_err(|e| debug!(error = %e, "Dropping malformed snapshot post"))
                            .ok()
                    })
                    .filter(|post| !post.id.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let count = |key: &str| {
            object
                .get(key)
                .and_then(serde_json::Value::as_u64)
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(0)
        };

        Some(Self {
            posts,
            updated_at: object
                .get("updatedAt")
                .or_else(|| object.get("updated"))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            tracked_account_count: count("trackedAccountCount"),
            successful_fetch_count: count("successfulFetchCount"),
        })
    }

    /// Load the snapshot at `path`, defaulting to an empty snapshot when the
    /// file is missing, unreadable or malformed.
    pub async fn load(path: &Path) -> Self {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No existing snapshot");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read existing snapshot, starting empty");
                return Self::default();
            }
        };

        Self::parse_lenient(&text).unwrap_or_else(|| {
            warn!(path = %path.display(), "Existing snapshot is malformed, starting empty");
            Self::default()
        })
    }

    /// Render as pretty-printed JSON with a trailing newline. Non-ASCII text is
    /// kept literal.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Atomically replace the file at `path` with this snapshot.
    ///
    /// The document is written to a temporary file in the same directory and
    /// renamed over the target, so readers never observe a partial file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written.
    pub async fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = self.to_json()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| SnapshotError::CreateDir {
                path: dir.clone(),
                source: e,
            })?;

        let write_err = |source: std::io::Error| SnapshotError::Write {
            path: path.to_path_buf(),
            source,
        };

        // Removed on drop unless persisted.
        let tmp_path = tempfile::Builder::new()
            .prefix(".snapshot-")
            .suffix(".json")
            .tempfile_in(&dir)
            .map_err(write_err)?
            .into_temp_path();

        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(write_err)?;
        file.write_all(json.as_bytes()).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        tmp_path.persist(path).map_err(|e| write_err(e.error))?;

        debug!(path = %path.display(), posts = self.posts.len(), "Snapshot written");
        Ok(())
    }
}
