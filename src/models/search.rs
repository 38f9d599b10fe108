//! Search results model

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use super::{Generation, ListModel, Navigation};
use crate::api::{ApiWorker, SearchResultItem};

#[derive(Debug, Clone)]
pub struct SearchModel {
    worker: ApiWorker,
    query: Arc<RwLock<String>>,
    generation: Generation,
    results: ListModel<SearchResultItem>,
}

impl SearchModel {
    pub fn new(worker: ApiWorker) -> Self {
        Self {
            worker,
            query: Arc::default(),
            generation: Generation::default(),
            results: ListModel::new(),
        }
    }

    pub fn search_query(&self) -> String {
        self.query.read().clone()
    }

    /// Run a search. An empty query clears the results without searching.
    pub async fn set_search_query(&self, query: &str) {
        *self.query.write() = query.to_string();
        let generation = self.generation.next();

        if query.is_empty() {
            self.results.fail_loading();
            return;
        }

        self.results.set_loading(true);
        let result = self.worker.search(query).await;

        if !self.generation.is_current(generation) {
            debug!("Dropping results for outdated query {:?}", query);
            return;
        }

        match result {
            Ok(items) => {
                debug!("{} results for {:?}", items.len(), query);
                self.results.finish_loading(items);
            }
            Err(_) => self.results.fail_loading(),
        }
    }

    pub fn loading(&self) -> bool {
        self.results.is_loading()
    }

    pub fn row_count(&self) -> usize {
        self.results.row_count()
    }

    pub fn item(&self, row: usize) -> Option<SearchResultItem> {
        self.results.get(row)
    }

    /// Text shown for a row
    pub fn display_title(&self, row: usize) -> Option<String> {
        self.results
            .with_rows(|rows| rows.get(row).map(|item| item.display_title().to_string()))
    }

    /// What activating a row should open
    pub fn trigger_item(&self, row: usize) -> Option<Navigation> {
        self.results.with_rows(|rows| {
            rows.get(row).map(|item| match item {
                SearchResultItem::Album { browse_id, .. } => Navigation::OpenAlbum(browse_id.clone()),
                SearchResultItem::Artist { browse_id, .. } => {
                    Navigation::OpenArtist(browse_id.clone())
                }
                SearchResultItem::Playlist { browse_id, .. } => {
                    Navigation::OpenPlaylist(browse_id.clone())
                }
                SearchResultItem::Song { video_id, .. } => Navigation::OpenSong(video_id.clone()),
                SearchResultItem::Video { video_id, .. } => Navigation::OpenVideo(video_id.clone()),
            })
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.results.subscribe()
    }
}
