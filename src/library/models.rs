//! List models over the local library

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::warn;

use super::{FollowHandle, Library, LibraryEvent};
use crate::database::{DbPlayedSong, DbSong};
use crate::models::ListModel;

/// Replace the rows of `rows` with the outcome of `query`
///
/// A failed query leaves the model empty and not loading.
pub(super) async fn load_rows<T: Clone>(
    rows: &ListModel<T>,
    query: impl Future<Output = Result<Vec<T>>>,
) -> Result<()> {
    rows.set_loading(true);
    match query.await {
        Ok(loaded) => {
            rows.finish_loading(loaded);
            Ok(())
        }
        Err(e) => {
            rows.fail_loading();
            Err(e)
        }
    }
}

/// Favourite songs, most recently added first
#[derive(Debug, Clone)]
pub struct FavouritesModel {
    library: Library,
    rows: ListModel<DbSong>,
}

impl FavouritesModel {
    pub(super) fn new(library: Library) -> Self {
        Self {
            library,
            rows: ListModel::new(),
        }
    }

    pub async fn refresh(&self) -> Result<()> {
        load_rows(&self.rows, self.library.favourite_songs()).await
    }

    /// Reload whenever the favourites change
    pub fn follow(&self) -> FollowHandle {
        let model = self.clone();
        self.library.follow(
            |event| matches!(event, LibraryEvent::FavouritesChanged),
            move || {
                let model = model.clone();
                async move {
                    if let Err(e) = model.refresh().await {
                        warn!("Failed to reload favourites: {}", e);
                    }
                }
            },
        )
    }

    pub fn loading(&self) -> bool {
        self.rows.is_loading()
    }

    pub fn row_count(&self) -> usize {
        self.rows.row_count()
    }

    pub fn song(&self, row: usize) -> Option<DbSong> {
        self.rows.get(row)
    }

    pub fn songs(&self) -> Vec<DbSong> {
        self.rows.rows()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.rows.subscribe()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryOrder {
    Recent,
    MostPlayed,
}

/// Played songs, either by recency or by play count
#[derive(Debug, Clone)]
pub struct PlaybackHistoryModel {
    library: Library,
    order: HistoryOrder,
    rows: ListModel<DbPlayedSong>,
}

impl PlaybackHistoryModel {
    pub(super) fn history(library: Library) -> Self {
        Self {
            library,
            order: HistoryOrder::Recent,
            rows: ListModel::new(),
        }
    }

    /// Limited to the configured most-played length
    pub(super) fn most_played(library: Library) -> Self {
        Self {
            library,
            order: HistoryOrder::MostPlayed,
            rows: ListModel::new(),
        }
    }

    pub async fn refresh(&self) -> Result<()> {
        match self.order {
            HistoryOrder::Recent => load_rows(&self.rows, self.library.played_songs()).await,
            HistoryOrder::MostPlayed => {
                load_rows(&self.rows, self.library.most_played_songs()).await
            }
        }
    }

    pub fn follow(&self) -> FollowHandle {
        let model = self.clone();
        self.library.follow(
            |event| matches!(event, LibraryEvent::PlaybackHistoryChanged),
            move || {
                let model = model.clone();
                async move {
                    if let Err(e) = model.refresh().await {
                        warn!("Failed to reload playback history: {}", e);
                    }
                }
            },
        )
    }

    pub fn loading(&self) -> bool {
        self.rows.is_loading()
    }

    pub fn row_count(&self) -> usize {
        self.rows.row_count()
    }

    pub fn song(&self, row: usize) -> Option<DbPlayedSong> {
        self.rows.get(row)
    }

    pub fn songs(&self) -> Vec<DbPlayedSong> {
        self.rows.rows()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.rows.subscribe()
    }
}

/// One row of the search history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistoryEntry {
    pub query: String,
    /// Typed but not yet submitted, never written to the database
    pub temporary: bool,
}

/// Past searches, newest first, with temporary searches on top
#[derive(Debug, Clone)]
pub struct SearchHistoryModel {
    library: Library,
    stored: Arc<RwLock<Vec<String>>>,
    temporary: Arc<RwLock<Vec<String>>>,
    rows: ListModel<SearchHistoryEntry>,
}

impl SearchHistoryModel {
    pub(super) fn new(library: Library) -> Self {
        Self {
            library,
            stored: Arc::default(),
            temporary: Arc::default(),
            rows: ListModel::new(),
        }
    }

    pub async fn refresh(&self) -> Result<()> {
        self.rows.set_loading(true);
        match self.library.search_history().await {
            Ok(searches) => {
                *self.stored.write() = searches;
                self.rebuild();
                Ok(())
            }
            Err(e) => {
                self.stored.write().clear();
                self.rebuild();
                Err(e)
            }
        }
    }

    pub fn follow(&self) -> FollowHandle {
        let model = self.clone();
        self.library.follow(
            |event| matches!(event, LibraryEvent::SearchesChanged),
            move || {
                let model = model.clone();
                async move {
                    if let Err(e) = model.refresh().await {
                        warn!("Failed to reload search history: {}", e);
                    }
                }
            },
        )
    }

    fn rebuild(&self) {
        let temporary = self.temporary.read().clone();
        let stored = self.stored.read().clone();

        let rows = temporary
            .iter()
            .map(|query| SearchHistoryEntry {
                query: query.clone(),
                temporary: true,
            })
            .chain(
                stored
                    .into_iter()
                    .filter(|query| !temporary.contains(query))
                    .map(|query| SearchHistoryEntry {
                        query,
                        temporary: false,
                    }),
            )
            .collect();
        self.rows.finish_loading(rows);
    }

    /// Show a search on top without storing it
    pub fn add_temporary_search(&self, query: &str) {
        if query.is_empty() {
            return;
        }
        {
            let mut temporary = self.temporary.write();
            temporary.retain(|q| q != query);
            temporary.insert(0, query.to_string());
        }
        self.rebuild();
    }

    pub fn remove_temporary_search(&self, query: &str) {
        self.temporary.write().retain(|q| q != query);
        self.rebuild();
    }

    /// Store a search; a temporary entry for it is replaced by the stored one
    pub async fn add_search(&self, query: &str) -> Result<()> {
        self.temporary.write().retain(|q| q != query);
        self.library.add_search(query).await?;
        self.refresh().await
    }

    pub async fn remove_search(&self, query: &str) -> Result<()> {
        self.temporary.write().retain(|q| q != query);
        self.library.remove_search(query).await?;
        self.refresh().await
    }

    pub fn loading(&self) -> bool {
        self.rows.is_loading()
    }

    pub fn row_count(&self) -> usize {
        self.rows.row_count()
    }

    pub fn entry(&self, row: usize) -> Option<SearchHistoryEntry> {
        self.rows.get(row)
    }

    pub fn queries(&self) -> Vec<String> {
        self.rows
            .with_rows(|rows| rows.iter().map(|e| e.query.clone()).collect())
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.rows.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::library::test_library;

    #[tokio::test]
    async fn test_favourites_model_reloads_on_change() {
        let library = test_library().await;
        let favourites = library.favourites();
        let _follow = favourites.follow();
        let mut rx = favourites.subscribe();

        library
            .add_favourite("FGBhQbmPwH8", "One More Time", "Daft Punk", "Discovery")
            .await
            .unwrap();

        timeout(Duration::from_secs(5), async {
            while favourites.row_count() != 1 {
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("favourites were not reloaded");
        assert_eq!(favourites.song(0).unwrap().title, "One More Time");
        assert!(!favourites.loading());
    }

    #[tokio::test]
    async fn test_most_played_is_limited() {
        let db = crate::database::Database::in_memory().await.unwrap();
        let settings = crate::settings::LibrarySettings {
            most_played_limit: 2,
            ..Default::default()
        };
        let library = Library::new(db, settings);

        for (id, plays) in [("a", 1), ("b", 3), ("c", 2)] {
            for _ in 0..plays {
                library
                    .add_playback_history_item(id, id, "", "")
                    .await
                    .unwrap();
            }
        }

        let most_played = library.most_played();
        most_played.refresh().await.unwrap();
        let ids: Vec<_> = most_played.songs().into_iter().map(|s| s.video_id).collect();
        assert_eq!(ids, ["b", "c"]);

        let history = library.playback_history();
        history.refresh().await.unwrap();
        assert_eq!(history.row_count(), 3);
    }

    #[tokio::test]
    async fn test_temporary_searches_on_top() {
        let library = test_library().await;
        library.add_search("daft punk").await.unwrap();
        library.add_search("justice").await.unwrap();

        let searches = library.searches();
        searches.refresh().await.unwrap();
        assert_eq!(searches.queries(), ["justice", "daft punk"]);

        searches.add_temporary_search("daft punk");
        assert_eq!(searches.queries(), ["daft punk", "justice"]);
        assert!(searches.entry(0).unwrap().temporary);

        searches.remove_temporary_search("daft punk");
        assert_eq!(searches.queries(), ["justice", "daft punk"]);
    }

    #[tokio::test]
    async fn test_add_search_replaces_temporary() {
        let library = test_library().await;
        let searches = library.searches();

        searches.add_temporary_search("air");
        searches.add_search("air").await.unwrap();

        assert_eq!(searches.row_count(), 1);
        assert!(!searches.entry(0).unwrap().temporary);
        assert_eq!(library.search_history().await.unwrap(), ["air"]);

        searches.remove_search("air").await.unwrap();
        assert_eq!(searches.row_count(), 0);
    }
}
