//! Artist page model
//!
//! Albums, singles, songs and videos of an artist flattened into one list.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use super::{Generation, ListModel, Navigation};
use crate::api::{ApiWorker, Artist, ArtistPage, ArtistRelease, ArtistTrack, largest_thumbnail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistItemKind {
    Album,
    Single,
    Song,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtistItem {
    Album(ArtistRelease),
    Single(ArtistRelease),
    Song(ArtistTrack),
    Video(ArtistTrack),
}

impl ArtistItem {
    pub fn kind(&self) -> ArtistItemKind {
        match self {
            ArtistItem::Album(_) => ArtistItemKind::Album,
            ArtistItem::Single(_) => ArtistItemKind::Single,
            ArtistItem::Song(_) => ArtistItemKind::Song,
            ArtistItem::Video(_) => ArtistItemKind::Video,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ArtistItem::Album(release) | ArtistItem::Single(release) => &release.title,
            ArtistItem::Song(track) | ArtistItem::Video(track) => &track.title,
        }
    }

    /// Only songs and videos are directly playable
    pub fn video_id(&self) -> Option<&str> {
        match self {
            ArtistItem::Album(_) | ArtistItem::Single(_) => None,
            ArtistItem::Song(track) | ArtistItem::Video(track) => Some(&track.video_id),
        }
    }

    fn navigation(&self) -> Navigation {
        match self {
            ArtistItem::Album(release) | ArtistItem::Single(release) => {
                Navigation::OpenAlbum(release.browse_id.clone())
            }
            ArtistItem::Song(track) => Navigation::OpenSong(track.video_id.clone()),
            ArtistItem::Video(track) => Navigation::OpenVideo(track.video_id.clone()),
        }
    }
}

fn flatten(page: &ArtistPage) -> Vec<ArtistItem> {
    page.albums
        .iter()
        .cloned()
        .map(ArtistItem::Album)
        .chain(page.singles.iter().cloned().map(ArtistItem::Single))
        .chain(page.songs.iter().cloned().map(ArtistItem::Song))
        .chain(page.videos.iter().cloned().map(ArtistItem::Video))
        .collect()
}

#[derive(Debug, Clone)]
pub struct ArtistModel {
    worker: ApiWorker,
    channel_id: Arc<RwLock<String>>,
    page: Arc<RwLock<Option<ArtistPage>>>,
    generation: Generation,
    items: ListModel<ArtistItem>,
}

impl ArtistModel {
    pub fn new(worker: ApiWorker) -> Self {
        Self {
            worker,
            channel_id: Arc::default(),
            page: Arc::default(),
            generation: Generation::default(),
            items: ListModel::new(),
        }
    }

    pub fn channel_id(&self) -> String {
        self.channel_id.read().clone()
    }

    /// Load an artist page. An empty id clears the page.
    pub async fn set_channel_id(&self, channel_id: &str) {
        *self.channel_id.write() = channel_id.to_string();
        let generation = self.generation.next();

        if channel_id.is_empty() {
            *self.page.write() = None;
            self.items.fail_loading();
            return;
        }

        self.items.set_loading(true);
        let result = self.worker.fetch_artist(channel_id).await;

        if !self.generation.is_current(generation) {
            debug!("Dropping outdated artist page {}", channel_id);
            return;
        }

        match result {
            Ok(page) => {
                let rows = flatten(&page);
                *self.page.write() = Some(page);
                self.items.finish_loading(rows);
            }
            Err(_) => {
                *self.page.write() = None;
                self.items.fail_loading();
            }
        }
    }

    pub fn loading(&self) -> bool {
        self.items.is_loading()
    }

    /// Artist name
    pub fn title(&self) -> String {
        self.page
            .read()
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        self.page
            .read()
            .as_ref()
            .and_then(|p| largest_thumbnail(&p.thumbnails).map(str::to_string))
    }

    /// Credit shown on every row: the artist of the page
    pub fn artists(&self) -> Vec<Artist> {
        self.page
            .read()
            .as_ref()
            .map(|p| {
                vec![Artist {
                    name: p.name.clone(),
                    id: Some(p.channel_id.clone()),
                }]
            })
            .unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.items.row_count()
    }

    pub fn item(&self, row: usize) -> Option<ArtistItem> {
        self.items.get(row)
    }

    pub fn trigger_item(&self, row: usize) -> Option<Navigation> {
        self.items
            .with_rows(|rows| rows.get(row).map(ArtistItem::navigation))
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.items.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Thumbnail;
    use crate::api::testing::{FakeClient, wait_until};

    fn page() -> ArtistPage {
        ArtistPage {
            name: "Justice".into(),
            channel_id: "UCjustice".into(),
            description: None,
            thumbnails: vec![
                Thumbnail {
                    url: "big".into(),
                    width: 900,
                    height: 900,
                },
                Thumbnail {
                    url: "small".into(),
                    width: 60,
                    height: 60,
                },
            ],
            albums: vec![ArtistRelease {
                title: "Cross".into(),
                browse_id: "MPREcross".into(),
                ..Default::default()
            }],
            singles: vec![ArtistRelease {
                title: "D.A.N.C.E.".into(),
                browse_id: "MPREdance".into(),
                ..Default::default()
            }],
            songs: vec![ArtistTrack {
                title: "Genesis".into(),
                video_id: "genesis0001".into(),
                thumbnails: vec![],
            }],
            videos: vec![ArtistTrack {
                title: "Stress".into(),
                video_id: "stress00001".into(),
                thumbnails: vec![],
            }],
        }
    }

    fn model() -> ArtistModel {
        let client = FakeClient::default().with_artist(page());
        ArtistModel::new(ApiWorker::spawn(Arc::new(client)))
    }

    #[tokio::test]
    async fn test_sections_are_flattened_in_order() {
        let model = model();
        model.set_channel_id("UCjustice").await;

        assert_eq!(model.row_count(), 4);
        let kinds: Vec<_> = (0..4).map(|i| model.item(i).unwrap().kind()).collect();
        assert_eq!(
            kinds,
            [
                ArtistItemKind::Album,
                ArtistItemKind::Single,
                ArtistItemKind::Song,
                ArtistItemKind::Video
            ]
        );
        assert_eq!(model.item(0).unwrap().video_id(), None);
        assert_eq!(model.item(2).unwrap().video_id(), Some("genesis0001"));
        assert_eq!(model.title(), "Justice");
        assert_eq!(model.thumbnail_url().as_deref(), Some("big"));
        assert_eq!(model.artists()[0].id.as_deref(), Some("UCjustice"));
    }

    #[tokio::test]
    async fn test_singles_open_as_albums() {
        let model = model();
        model.set_channel_id("UCjustice").await;

        assert_eq!(model.trigger_item(1), Some(Navigation::OpenAlbum("MPREdance".into())));
        assert_eq!(model.trigger_item(3), Some(Navigation::OpenVideo("stress00001".into())));
    }

    #[tokio::test]
    async fn test_empty_channel_id_clears_page() {
        let model = model();
        model.set_channel_id("UCjustice").await;
        model.set_channel_id("").await;
        assert!(!model.loading());
        assert_eq!(model.row_count(), 0);
        assert_eq!(model.title(), "");
    }

    #[tokio::test]
    async fn test_newer_channel_id_drops_slow_answer() {
        let mut daft = page();
        daft.name = "Daft Punk".into();
        daft.channel_id = "UCdaft".into();
        daft.albums.clear();

        let mut client = FakeClient::default().with_artist(page()).with_artist(daft);
        let justice_gate = client.gate("UCjustice");
        let daft_gate = client.gate("UCdaft");
        let model = ArtistModel::new(ApiWorker::spawn(Arc::new(client)));

        let first = tokio::spawn({
            let model = model.clone();
            async move { model.set_channel_id("UCjustice").await }
        });
        wait_until(|| model.loading()).await;
        let second = tokio::spawn({
            let model = model.clone();
            async move { model.set_channel_id("UCdaft").await }
        });
        wait_until(|| model.channel_id() == "UCdaft").await;

        justice_gate.notify_one();
        first.await.unwrap();
        assert!(model.loading());
        assert_eq!(model.row_count(), 0);
        assert_eq!(model.title(), "");

        daft_gate.notify_one();
        second.await.unwrap();
        assert!(!model.loading());
        assert_eq!(model.title(), "Daft Punk");
        assert_eq!(model.row_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_channel_id_drops_pending_answer() {
        let mut client = FakeClient::default().with_artist(page());
        let gate = client.gate("UCjustice");
        let model = ArtistModel::new(ApiWorker::spawn(Arc::new(client)));

        let pending = tokio::spawn({
            let model = model.clone();
            async move { model.set_channel_id("UCjustice").await }
        });
        wait_until(|| model.loading()).await;

        model.set_channel_id("").await;
        assert!(!model.loading());

        gate.notify_one();
        pending.await.unwrap();
        assert!(!model.loading());
        assert_eq!(model.row_count(), 0);
        assert_eq!(model.title(), "");
    }

    #[tokio::test]
    async fn test_error_stops_loading() {
        let model = model();
        model.set_channel_id("UCunknown").await;
        assert!(!model.loading());
        assert_eq!(model.row_count(), 0);
        assert_eq!(model.title(), "");
    }
}
