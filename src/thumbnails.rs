//! Disk cache for video thumbnails
//!
//! Thumbnails live at `<cache dir>/thumbnails/<video_id>.webp`. Downloads are
//! written to a uniquely named `.tmp` file first and renamed into place, so a
//! file with the final name is always complete.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiWorker};
use crate::models::{Generation, Observable};
use crate::settings::{NetworkSettings, Settings};

const TIMEOUT: u64 = 30;
const THUMBNAIL_EXTENSION: &str = "webp";
const TEMP_SUFFIX: &str = ".webp.tmp";

/// Cache operation errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("thumbnail download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("thumbnail download returned {0}")]
    Status(reqwest::StatusCode),
    #[error("no thumbnail for {0}")]
    NoThumbnail(String),
    #[error("invalid video id {0:?}")]
    InvalidVideoId(String),
}

/// Downloads thumbnails on first use and serves them from disk afterwards
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    dir: PathBuf,
    client: reqwest::Client,
    worker: ApiWorker,
}

impl ThumbnailCache {
    pub fn new(
        dir: impl Into<PathBuf>,
        worker: ApiWorker,
        network: &NetworkSettings,
    ) -> Result<Self, CacheError> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(TIMEOUT));
        if let Some(proxy) = network.proxy_url() {
            debug!("Downloading thumbnails through {}", proxy);
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        } else {
            builder = builder.no_proxy();
        }

        Ok(Self {
            dir: dir.into(),
            client: builder.build()?,
            worker,
        })
    }

    pub fn from_settings(settings: &Settings, worker: ApiWorker) -> Result<Self, CacheError> {
        Self::new(settings.thumbnails_dir(), worker, &settings.network)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the thumbnail of a video is stored, whether or not it exists yet
    pub fn path_for(&self, video_id: &str) -> Result<PathBuf, CacheError> {
        thumbnail_path(&self.dir, video_id)
    }

    /// Local path of a video's thumbnail, downloading it when missing
    pub async fn cached_path(&self, video_id: &str) -> Result<PathBuf, CacheError> {
        let path = self.path_for(video_id)?;
        if tokio::fs::try_exists(&path).await? {
            return Ok(path);
        }

        let info = self.worker.extract_video_info(video_id).await?;
        if info.thumbnail.is_empty() {
            return Err(CacheError::NoThumbnail(video_id.to_string()));
        }

        let response = self.client.get(&info.thumbnail).send().await?;
        if !response.status().is_success() {
            return Err(CacheError::Status(response.status()));
        }
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let dir = self.dir.clone();
        let target = path.clone();
        let prefix = video_id.to_string();
        let size = bytes.len();
        tokio::task::spawn_blocking(move || store(&dir, &prefix, &target, &bytes))
            .await
            .map_err(std::io::Error::other)??;

        debug!("Cached thumbnail of {} ({} bytes)", video_id, size);
        Ok(path)
    }

    pub fn stats(&self) -> CacheStats {
        cache_stats(&self.dir)
    }

    pub fn clear(&self) -> Result<ClearResult, CacheError> {
        clear_cache(&self.dir)
    }

    pub fn enforce_limit(&self, max_cache_mb: u64) -> ClearResult {
        enforce_cache_limit(&self.dir, max_cache_mb)
    }

    pub fn cleanup_temp_files(&self) -> ClearResult {
        cleanup_temp_files(&self.dir)
    }
}

/// Video ids only use the url-safe base64 alphabet
fn is_valid_video_id(video_id: &str) -> bool {
    !video_id.is_empty()
        && video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn thumbnail_path(dir: &Path, video_id: &str) -> Result<PathBuf, CacheError> {
    if !is_valid_video_id(video_id) {
        return Err(CacheError::InvalidVideoId(video_id.to_string()));
    }
    Ok(dir.join(format!("{}.{}", video_id, THUMBNAIL_EXTENSION)))
}

/// Write `bytes` to a fresh temp file in `dir` and move it over `path`
///
/// Concurrent downloads of the same thumbnail each get their own temp file.
fn store(dir: &Path, prefix: &str, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[derive(Debug, Default)]
struct SourceState {
    video_id: String,
    path: Option<PathBuf>,
}

/// Thumbnail of the currently shown video
#[derive(Debug, Clone)]
pub struct ThumbnailSource {
    cache: ThumbnailCache,
    state: Observable<SourceState>,
    generation: Generation,
}

impl ThumbnailSource {
    pub fn new(cache: ThumbnailCache) -> Self {
        Self {
            cache,
            state: Observable::default(),
            generation: Generation::default(),
        }
    }

    pub fn video_id(&self) -> String {
        self.state.read(|s| s.video_id.clone())
    }

    /// Local path of the thumbnail, once resolved
    pub fn cached_path(&self) -> Option<PathBuf> {
        self.state.read(|s| s.path.clone())
    }

    /// Resolve the thumbnail for a video. Setting the current id again does nothing.
    pub async fn set_video_id(&self, video_id: &str) {
        if self.state.read(|s| s.video_id == video_id) {
            return;
        }

        let generation = self.generation.next();
        self.state.update(|s| {
            s.video_id = video_id.to_string();
            s.path = None;
        });
        if video_id.is_empty() {
            return;
        }

        let result = self.cache.cached_path(video_id).await;
        if !self.generation.is_current(generation) {
            debug!("Dropping outdated thumbnail for {}", video_id);
            return;
        }

        match result {
            Ok(path) => self.state.update(|s| s.path = Some(path)),
            Err(e) => warn!("Failed to load thumbnail of {}: {}", video_id, e),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.subscribe()
    }
}

// ============ Maintenance ============

/// Information about a cached file
#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    size: u64,
    modified: SystemTime,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total size in bytes
    pub total_bytes: u64,
    /// Number of files
    pub file_count: usize,
}

impl CacheStats {
    /// Get total size in megabytes
    pub fn total_mb(&self) -> u64 {
        self.total_bytes / (1024 * 1024)
    }
}

/// Result of a cache clear operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearResult {
    pub files_deleted: usize,
    pub bytes_freed: u64,
    pub errors: usize,
}

impl ClearResult {
    /// Get bytes freed in megabytes
    pub fn mb_freed(&self) -> u64 {
        self.bytes_freed / (1024 * 1024)
    }

    fn remove(&mut self, entry: &CacheEntry) {
        match fs::remove_file(&entry.path) {
            Ok(_) => {
                self.files_deleted += 1;
                self.bytes_freed += entry.size;
            }
            Err(e) => {
                warn!("Failed to delete cache file {:?}: {}", entry.path, e);
                self.errors += 1;
            }
        }
    }
}

fn read_entries(dir: &Path) -> std::io::Result<Vec<CacheEntry>> {
    Ok(fs::read_dir(dir)?
        .flatten()
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            Some(CacheEntry {
                path: entry.path(),
                size: metadata.len(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            })
        })
        .collect())
}

/// Collect all cache entries from a directory
fn collect_entries(dir: &Path) -> Vec<CacheEntry> {
    if !dir.exists() {
        return Vec::new();
    }
    read_entries(dir).unwrap_or_else(|e| {
        warn!("Failed to read cache directory {:?}: {}", dir, e);
        Vec::new()
    })
}

fn is_temp_file(path: &Path) -> bool {
    path.extension().map(|e| e == "tmp").unwrap_or(false)
}

/// Calculate cache statistics
pub fn cache_stats(dir: &Path) -> CacheStats {
    collect_entries(dir)
        .iter()
        .fold(CacheStats::default(), |mut stats, entry| {
            stats.total_bytes += entry.size;
            stats.file_count += 1;
            stats
        })
}

/// Delete every cached thumbnail
pub fn clear_cache(dir: &Path) -> Result<ClearResult, CacheError> {
    let mut result = ClearResult::default();
    if !dir.exists() {
        return Ok(result);
    }

    for entry in read_entries(dir)? {
        result.remove(&entry);
    }

    info!(
        "Thumbnail cache cleared: {} files deleted, {} MB freed, {} errors",
        result.files_deleted,
        result.mb_freed(),
        result.errors
    );
    Ok(result)
}

/// Enforce cache size limit by deleting oldest files
pub fn enforce_cache_limit(dir: &Path, max_cache_mb: u64) -> ClearResult {
    enforce_byte_limit(dir, max_cache_mb.saturating_mul(1024 * 1024))
}

fn enforce_byte_limit(dir: &Path, max_bytes: u64) -> ClearResult {
    let mut result = ClearResult::default();
    let mut entries = collect_entries(dir);

    let current_size: u64 = entries.iter().map(|e| e.size).sum();
    if current_size <= max_bytes {
        debug!(
            "Thumbnail cache size {} bytes is within limit {} bytes",
            current_size, max_bytes
        );
        return result;
    }

    entries.sort_by(|a, b| a.modified.cmp(&b.modified));
    let target_free = current_size - max_bytes;

    for entry in &entries {
        if result.bytes_freed >= target_free {
            break;
        }
        result.remove(entry);
    }

    info!(
        "Thumbnail cache cleanup: {} files deleted, {} MB freed",
        result.files_deleted,
        result.mb_freed()
    );
    result
}

/// Remove orphan `.tmp` files left behind by interrupted downloads
pub fn cleanup_temp_files(dir: &Path) -> ClearResult {
    let mut result = ClearResult::default();

    for entry in collect_entries(dir)
        .iter()
        .filter(|entry| is_temp_file(&entry.path))
    {
        result.remove(entry);
    }

    if result.files_deleted > 0 {
        info!(
            "Temp file cleanup: {} files deleted, {} bytes freed",
            result.files_deleted, result.bytes_freed
        );
    }
    result
}
