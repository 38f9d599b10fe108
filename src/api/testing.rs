//! In-memory client for tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::*;

#[derive(Default)]
pub(crate) struct FakeClient {
    pub searches: HashMap<String, Vec<SearchResultItem>>,
    pub artists: HashMap<String, ArtistPage>,
    pub albums: HashMap<String, AlbumPage>,
    pub playlists: HashMap<String, PlaylistPage>,
    pub songs: HashMap<String, SongDetails>,
    pub videos: HashMap<String, VideoInfo>,
    /// Answers for these keys wait until the gate is opened
    pub gates: HashMap<String, Arc<Notify>>,
}

impl FakeClient {
    pub fn with_song(mut self, video_id: &str, title: &str, author: &str) -> Self {
        self.songs.insert(
            video_id.to_string(),
            SongDetails {
                video_id: video_id.to_string(),
                title: title.to_string(),
                author: author.to_string(),
            },
        );
        self
    }

    pub fn with_search(mut self, query: &str, results: Vec<SearchResultItem>) -> Self {
        self.searches.insert(query.to_string(), results);
        self
    }

    pub fn with_artist(mut self, page: ArtistPage) -> Self {
        self.artists.insert(page.channel_id.clone(), page);
        self
    }

    pub fn with_album(mut self, browse_id: &str, page: AlbumPage) -> Self {
        self.albums.insert(browse_id.to_string(), page);
        self
    }

    pub fn with_playlist(mut self, page: PlaylistPage) -> Self {
        self.playlists.insert(page.id.clone(), page);
        self
    }

    pub fn with_video(mut self, info: VideoInfo) -> Self {
        self.videos.insert(info.id.clone(), info);
        self
    }

    /// Hold back the answer for `key` until the returned gate is notified
    pub fn gate(&mut self, key: &str) -> Arc<Notify> {
        self.gates
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    async fn wait_for_gate(&self, key: &str) {
        if let Some(gate) = self.gates.get(key) {
            gate.notified().await;
        }
    }

    async fn lookup<T: Clone>(&self, map: &HashMap<String, T>, key: &str) -> ApiResult<T> {
        self.wait_for_gate(key).await;
        map.get(key)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(key.to_string()))
    }
}

#[async_trait]
impl YtMusicClient for FakeClient {
    async fn search(&self, query: &str) -> ApiResult<Vec<SearchResultItem>> {
        self.lookup(&self.searches, query).await
    }

    async fn fetch_artist(&self, channel_id: &str) -> ApiResult<ArtistPage> {
        self.lookup(&self.artists, channel_id).await
    }

    async fn fetch_album(&self, browse_id: &str) -> ApiResult<AlbumPage> {
        self.lookup(&self.albums, browse_id).await
    }

    async fn fetch_playlist(&self, playlist_id: &str) -> ApiResult<PlaylistPage> {
        self.lookup(&self.playlists, playlist_id).await
    }

    async fn fetch_song(&self, video_id: &str) -> ApiResult<Option<SongDetails>> {
        self.wait_for_gate(video_id).await;
        Ok(self.songs.get(video_id).cloned())
    }

    async fn extract_video_info(&self, video_id: &str) -> ApiResult<VideoInfo> {
        self.lookup(&self.videos, video_id).await
    }
}

pub(crate) fn track(video_id: &str, title: &str, artist: &str) -> Track {
    Track {
        video_id: Some(video_id.to_string()),
        title: title.to_string(),
        artists: vec![Artist::named(artist)],
        album: None,
        is_available: true,
    }
}

/// Poll `condition` until it holds, failing the test after a few seconds
pub(crate) async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}
