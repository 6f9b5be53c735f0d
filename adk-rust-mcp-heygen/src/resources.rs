//! MCP Resources for the HeyGen server.
//!
//! This module provides resource implementations for:
//! - `heygen://downloads` - Videos already downloaded to the download directory

use std::path::Path;
use std::time::SystemTime;

use serde::Serialize;
use tracing::warn;

use crate::handler::{VIDEO_EXTENSION, file_uri};

/// URI of the downloads listing.
pub const DOWNLOADS_URI: &str = "heygen://downloads";

/// A downloaded video on local disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadedFile {
    /// File name
    pub name: String,
    /// Absolute path
    pub path: String,
    /// `file://` URI
    pub uri: String,
    /// Size in bytes
    pub size: u64,
    #[serde(skip)]
    modified: Option<SystemTime>,
}

/// List the videos in `dir`, newest first.
///
/// A missing directory is an empty listing: nothing has been downloaded yet.
pub fn list_downloads(dir: &Path) -> std::io::Result<Vec<DownloadedFile>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(VIDEO_EXTENSION) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable download");
                continue;
            }
        };

        let path = std::path::absolute(&path)?;
        files.push(DownloadedFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            uri: file_uri(&path),
            path: path.to_string_lossy().into_owned(),
            size: metadata.len(),
            modified: metadata.modified().ok(),
        });
    }

    // Generated names start with a timestamp, so the name breaks mtime ties.
    files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
    Ok(files)
}

/// Get the downloads resource as a JSON string.
pub fn downloads_resource_json(dir: &Path) -> std::io::Result<String> {
    let files = list_downloads(dir)?;
    Ok(serde_json::to_string_pretty(&files).unwrap_or_else(|_| "[]".to_string()))
}
