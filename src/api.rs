//! YouTube Music client contract
//!
//! The actual web client lives outside this crate. Everything here talks to it
//! through [`YtMusicClient`], and all calls go through the single background
//! [`ApiWorker`].

pub mod model;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

pub use model::{
    Album, AlbumPage, Artist, ArtistPage, ArtistRelease, ArtistTrack, Format, PlaylistPage,
    SearchResultItem, SongDetails, Thumbnail, Track, VideoInfo, largest_thumbnail,
};
pub use worker::{ApiWorker, ErrorHandler};

/// Errors reported by the client or the worker in front of it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected response: {0}")]
    Parse(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("API worker is not running")]
    WorkerGone,
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Operations the external YouTube Music client provides
#[async_trait]
pub trait YtMusicClient: Send + Sync {
    async fn search(&self, query: &str) -> ApiResult<Vec<SearchResultItem>>;

    async fn fetch_artist(&self, channel_id: &str) -> ApiResult<ArtistPage>;

    async fn fetch_album(&self, browse_id: &str) -> ApiResult<AlbumPage>;

    async fn fetch_playlist(&self, playlist_id: &str) -> ApiResult<PlaylistPage>;

    /// `Ok(None)` when the id does not resolve to a song
    async fn fetch_song(&self, video_id: &str) -> ApiResult<Option<SongDetails>>;

    async fn extract_video_info(&self, video_id: &str) -> ApiResult<VideoInfo>;
}
