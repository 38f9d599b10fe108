//! Album model

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use super::{Generation, ListModel, Navigation};
use crate::api::{AlbumPage, ApiWorker, Track, largest_thumbnail};
use crate::utils::artists_to_string;

#[derive(Debug, Clone)]
pub struct AlbumModel {
    worker: ApiWorker,
    browse_id: Arc<RwLock<String>>,
    page: Arc<RwLock<Option<AlbumPage>>>,
    generation: Generation,
    tracks: ListModel<Track>,
}

impl AlbumModel {
    pub fn new(worker: ApiWorker) -> Self {
        Self {
            worker,
            browse_id: Arc::default(),
            page: Arc::default(),
            generation: Generation::default(),
            tracks: ListModel::new(),
        }
    }

    pub fn browse_id(&self) -> String {
        self.browse_id.read().clone()
    }

    pub async fn set_browse_id(&self, browse_id: &str) {
        *self.browse_id.write() = browse_id.to_string();
        let generation = self.generation.next();

        if browse_id.is_empty() {
            *self.page.write() = None;
            self.tracks.fail_loading();
            return;
        }

        self.tracks.set_loading(true);
        let result = self.worker.fetch_album(browse_id).await;

        if !self.generation.is_current(generation) {
            debug!("Dropping outdated album {}", browse_id);
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

    pub fn artists_display(&self) -> String {
        self.page
            .read()
            .as_ref()
            .map(|p| artists_to_string(&p.artists))
            .unwrap_or_default()
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        self.page
            .read()
            .as_ref()
            .and_then(|p| largest_thumbnail(&p.thumbnails).map(str::to_string))
    }

    /// Playlist that plays the whole album
    pub fn audio_playlist_id(&self) -> Option<String> {
        self.page
            .read()
            .as_ref()
            .and_then(|p| p.audio_playlist_id.clone())
    }

    pub fn row_count(&self) -> usize {
        self.tracks.row_count()
    }

    pub fn track(&self, row: usize) -> Option<Track> {
        self.tracks.get(row)
    }

    pub fn trigger_item(&self, row: usize) -> Option<Navigation> {
        self.tracks.with_rows(|rows| {
            rows.get(row)
                .and_then(|t| t.video_id.clone())
                .map(Navigation::OpenSong)
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tracks.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Artist;
    use crate::api::testing::{FakeClient, track, wait_until};

    fn ram() -> AlbumPage {
        AlbumPage {
            title: "Random Access Memories".into(),
            artists: vec![Artist::named("Daft Punk")],
            year: Some("2013".into()),
            thumbnails: vec![],
            tracks: vec![
                track("giveLife001", "Give Life Back to Music", "Daft Punk"),
                track("getLucky001", "Get Lucky", "Daft Punk"),
            ],
            audio_playlist_id: Some("OLAK5uy_ram".into()),
        }
    }

    fn cross() -> AlbumPage {
        AlbumPage {
            title: "Cross".into(),
            artists: vec![Artist::named("Justice")],
            year: Some("2007".into()),
            thumbnails: vec![],
            tracks: vec![track("genesis0001", "Genesis", "Justice")],
            audio_playlist_id: None,
        }
    }

    #[tokio::test]
    async fn test_load_album() {
        let client = FakeClient::default().with_album("MPREram", ram());
        let model = AlbumModel::new(ApiWorker::spawn(Arc::new(client)));
        model.set_browse_id("MPREram").await;

        assert_eq!(model.title(), "Random Access Memories");
        assert_eq!(model.artists_display(), "Daft Punk");
        assert_eq!(model.row_count(), 2);
        assert_eq!(model.thumbnail_url(), None);
        assert_eq!(model.audio_playlist_id().as_deref(), Some("OLAK5uy_ram"));
        assert_eq!(
            model.trigger_item(1),
            Some(Navigation::OpenSong("getLucky001".into()))
        );
    }

    #[tokio::test]
    async fn test_newer_browse_id_drops_slow_album() {
        let mut client = FakeClient::default()
            .with_album("MPREram", ram())
            .with_album("MPREcross", cross());
        let ram_gate = client.gate("MPREram");
        let cross_gate = client.gate("MPREcross");
        let model = AlbumModel::new(ApiWorker::spawn(Arc::new(client)));

        let first = tokio::spawn({
            let model = model.clone();
            async move { model.set_browse_id("MPREram").await }
        });
        wait_until(|| model.loading()).await;
        let second = tokio::spawn({
            let model = model.clone();
            async move { model.set_browse_id("MPREcross").await }
        });
        wait_until(|| model.browse_id() == "MPREcross").await;

        ram_gate.notify_one();
        first.await.unwrap();
        assert!(model.loading());
        assert_eq!(model.title(), "");
        assert_eq!(model.row_count(), 0);

        cross_gate.notify_one();
        second.await.unwrap();
        assert!(!model.loading());
        assert_eq!(model.title(), "Cross");
        assert_eq!(model.row_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_browse_id_drops_pending_album() {
        let mut client = FakeClient::default().with_album("MPREram", ram());
        let gate = client.gate("MPREram");
        let model = AlbumModel::new(ApiWorker::spawn(Arc::new(client)));

        let pending = tokio::spawn({
            let model = model.clone();
            async move { model.set_browse_id("MPREram").await }
        });
        wait_until(|| model.loading()).await;

        model.set_browse_id("").await;
        assert!(!model.loading());

        gate.notify_one();
        pending.await.unwrap();
        assert!(!model.loading());
        assert_eq!(model.title(), "");
        assert_eq!(model.audio_playlist_id(), None);
        assert_eq!(model.row_count(), 0);
    }
}
