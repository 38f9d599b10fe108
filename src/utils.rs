//! Utility functions

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use directories::ProjectDirs;
use reqwest::Url;

use crate::api::Artist;

/// Join artist names for display ("A, B, C"), empty when there are none
pub fn artists_to_string(artists: &[Artist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Current Unix timestamp in seconds
pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Resolve a plain path or a `file://` url to a local path
///
/// Returns `None` for urls with any other scheme and for `file://` urls
/// naming a remote host.
pub fn local_file_path(target: &str) -> Option<PathBuf> {
    match Url::parse(target) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
        // Single letter "schemes" are Windows drive letters
        Ok(url) if url.scheme().len() > 1 => None,
        _ => Some(PathBuf::from(target)),
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "kde", "audiotube")
}

/// Directory for persistent application data
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".local/share/audiotube"))
}

/// Directory for the settings file
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".config/audiotube"))
}

/// Base cache directory
pub fn cache_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".cache/audiotube"))
}

/// Default location of the library database
pub fn default_database_path() -> PathBuf {
    data_dir().join("library.sqlite")
}

/// Get the thumbnails cache directory
pub fn thumbnails_cache_dir() -> PathBuf {
    cache_dir().join("thumbnails")
}
