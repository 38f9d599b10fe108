//! Remote playlist model

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use super::{Generation, ListModel};
use crate::api::{ApiWorker, PlaylistPage, Track, largest_thumbnail};
use crate::utils::artists_to_string;

#[derive(Debug, Clone)]
pub struct PlaylistModel {
    worker: ApiWorker,
    playlist_id: Arc<RwLock<String>>,
    page: Arc<RwLock<Option<PlaylistPage>>>,
    generation: Generation,
    tracks: ListModel<Track>,
}

impl PlaylistModel {
    pub fn new(worker: ApiWorker) -> Self {
        Self {
            worker,
            playlist_id: Arc::default(),
            page: Arc::default(),
            generation: Generation::default(),
            tracks: ListModel::new(),
        }
    }

    /// Id as it was set, usually the browse id with its `VL` prefix
    pub fn playlist_id(&self) -> String {
        self.playlist_id.read().clone()
    }

    /// Id accepted by the watch playlist endpoint, which rejects the `VL` prefix
    pub fn watch_playlist_id(&self) -> String {
        let id = self.playlist_id.read();
        id.strip_prefix("VL").unwrap_or(id.as_str()).to_string()
    }

    pub async fn set_playlist_id(&self, playlist_id: &str) {
        *self.playlist_id.write() = playlist_id.to_string();
        let generation = self.generation.next();

        if playlist_id.is_empty() {
            *self.page.write() = None;
            self.tracks.fail_loading();
            return;
        }

        self.tracks.set_loading(true);
        let result = self.worker.fetch_playlist(playlist_id).await;

        if !self.generation.is_current(generation) {
            debug!("Dropping outdated playlist {}", playlist_id);
            return;
        }

        match result {
            Ok(page) => {
                let tracks = page.tracks.clone();
                *self.page.write() = Some(page);
                self.tracks.finish_loading(tracks);
            }
            Err(_) => {
                *self.page.write() = None;
                self.tracks.fail_loading();
            }
        }
    }

    pub fn loading(&self) -> bool {
        self.tracks.is_loading()
    }

    pub fn title(&self) -> String {
        self.page
            .read()
            .as_ref()
            .map(|p| p.title.clone())
            .unwrap_or_default()
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        self.page
            .read()
            .as_ref()
            .and_then(|p| largest_thumbnail(&p.thumbnails).map(str::to_string))
    }

    pub fn row_count(&self) -> usize {
        self.tracks.row_count()
    }

    pub fn track(&self, row: usize) -> Option<Track> {
        self.tracks.get(row)
    }

    pub fn artists_display(&self, row: usize) -> Option<String> {
        self.tracks
            .with_rows(|rows| rows.get(row).map(|t| artists_to_string(&t.artists)))
    }

    pub fn video_id(&self, row: usize) -> Option<String> {
        self.tracks
            .with_rows(|rows| rows.get(row).and_then(|t| t.video_id.clone()))
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tracks.subscribe()
    }
}
