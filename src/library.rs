//! Local library: favourites, search history, playback history and playlists
//!
//! [`Library`] writes through to the database and announces every change on a
//! broadcast channel. Models and watchers built from it listen to those
//! announcements and reload themselves.

mod models;
mod playlists;
mod watchers;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub use models::{FavouritesModel, PlaybackHistoryModel, SearchHistoryEntry, SearchHistoryModel};
pub use playlists::{LocalPlaylistModel, LocalPlaylistsModel};
pub use watchers::{FavouriteWatcher, WasPlayedWatcher};

use crate::database::{
    Database, DbPlayedSong, DbPlaylist, DbPlaylistEntry, DbSong, NewPlaylist, NewSong,
};
use crate::settings::{LibrarySettings, Settings};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Change announced after a successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryEvent {
    FavouritesChanged,
    SearchesChanged,
    PlaybackHistoryChanged,
    PlaylistsChanged,
    PlaylistEntriesChanged(i64),
}

#[derive(Debug, Clone)]
pub struct Library {
    db: Database,
    events: broadcast::Sender<LibraryEvent>,
    settings: Arc<LibrarySettings>,
}

impl Library {
    pub fn new(db: Database, settings: LibrarySettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            db,
            events,
            settings: Arc::new(settings),
        }
    }

    /// Open the library database configured in the settings
    pub async fn open(settings: &Settings) -> Result<Self> {
        let db = Database::open(&settings.database_path()).await?;
        Ok(Self::new(db, settings.library.clone()))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> &LibrarySettings {
        &self.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: LibraryEvent) {
        debug!("Library event: {:?}", event);
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    pub async fn add_song(&self, song: &NewSong) -> Result<()> {
        self.db.insert_song(song).await
    }

    // ============ Favourites ============

    pub async fn add_favourite(
        &self,
        video_id: &str,
        title: &str,
        artist: &str,
        album: &str,
    ) -> Result<()> {
        self.add_song(&NewSong::new(video_id, title, artist, album))
            .await?;
        self.db.add_favourite(video_id).await?;
        self.emit(LibraryEvent::FavouritesChanged);
        Ok(())
    }

    pub async fn remove_favourite(&self, video_id: &str) -> Result<()> {
        self.db.remove_favourite(video_id).await?;
        self.emit(LibraryEvent::FavouritesChanged);
        Ok(())
    }

    pub async fn is_favourite(&self, video_id: &str) -> Result<bool> {
        self.db.is_favourite(video_id).await
    }

    pub async fn favourite_songs(&self) -> Result<Vec<DbSong>> {
        self.db.get_favourites().await
    }

    pub fn favourites(&self) -> FavouritesModel {
        FavouritesModel::new(self.clone())
    }

    /// Live favourite state of one song, `None` for an empty id
    pub fn favourite_watcher(&self, video_id: &str) -> Option<FavouriteWatcher> {
        if video_id.is_empty() {
            return None;
        }
        Some(FavouriteWatcher::new(self.clone(), video_id))
    }

    // ============ Search history ============

    pub async fn add_search(&self, query: &str) -> Result<()> {
        self.db.add_search(query).await?;
        self.emit(LibraryEvent::SearchesChanged);
        Ok(())
    }

    pub async fn remove_search(&self, query: &str) -> Result<()> {
        self.db.remove_search(query).await?;
        self.emit(LibraryEvent::SearchesChanged);
        Ok(())
    }

    pub async fn clear_searches(&self) -> Result<()> {
        self.db.clear_searches().await?;
        self.emit(LibraryEvent::SearchesChanged);
        Ok(())
    }

    pub async fn search_history(&self) -> Result<Vec<String>> {
        self.db.get_searches().await
    }

    pub fn searches(&self) -> SearchHistoryModel {
        SearchHistoryModel::new(self.clone())
    }

    // ============ Playback history ============

    pub async fn add_playback_history_item(
        &self,
        video_id: &str,
        title: &str,
        artist: &str,
        album: &str,
    ) -> Result<()> {
        self.add_song(&NewSong::new(video_id, title, artist, album))
            .await?;
        self.db.record_play(video_id).await?;
        self.emit(LibraryEvent::PlaybackHistoryChanged);
        Ok(())
    }

    pub async fn remove_playback_history_item(&self, video_id: &str) -> Result<()> {
        self.db.remove_played_song(video_id).await?;
        self.emit(LibraryEvent::PlaybackHistoryChanged);
        Ok(())
    }

    pub async fn was_played(&self, video_id: &str) -> Result<bool> {
        self.db.was_played(video_id).await
    }

    pub async fn played_songs(&self) -> Result<Vec<DbPlayedSong>> {
        self.db.get_playback_history().await
    }

    pub async fn most_played_songs(&self) -> Result<Vec<DbPlayedSong>> {
        self.db
            .get_most_played(self.settings.most_played_limit)
            .await
    }

    pub fn playback_history(&self) -> PlaybackHistoryModel {
        PlaybackHistoryModel::history(self.clone())
    }

    pub fn most_played(&self) -> PlaybackHistoryModel {
        PlaybackHistoryModel::most_played(self.clone())
    }

    /// Live "was played" state of one song, `None` for an empty id
    pub fn was_played_watcher(&self, video_id: &str) -> Option<WasPlayedWatcher> {
        if video_id.is_empty() {
            return None;
        }
        Some(WasPlayedWatcher::new(self.clone(), video_id))
    }

    // ============ Playlists ============

    pub async fn create_playlist(&self, title: &str, description: &str) -> Result<i64> {
        let id = self
            .db
            .create_playlist(&NewPlaylist {
                title: title.to_string(),
                description: description.to_string(),
            })
            .await?;
        info!("Created playlist {} ({})", id, title);
        self.emit(LibraryEvent::PlaylistsChanged);
        Ok(id)
    }

    pub async fn rename_playlist(
        &self,
        playlist_id: i64,
        title: &str,
        description: &str,
    ) -> Result<()> {
        self.db
            .rename_playlist(playlist_id, title, description)
            .await?;
        self.emit(LibraryEvent::PlaylistsChanged);
        Ok(())
    }

    pub async fn delete_playlist(&self, playlist_id: i64) -> Result<()> {
        self.db.delete_playlist(playlist_id).await?;
        self.emit(LibraryEvent::PlaylistsChanged);
        Ok(())
    }

    pub async fn playlist(&self, playlist_id: i64) -> Result<Option<DbPlaylist>> {
        self.db.get_playlist(playlist_id).await
    }

    pub async fn all_playlists(&self) -> Result<Vec<DbPlaylist>> {
        self.db.get_playlists().await
    }

    pub async fn add_playlist_entry(&self, playlist_id: i64, song: &NewSong) -> Result<()> {
        self.db.add_playlist_entry(playlist_id, song).await?;
        self.emit(LibraryEvent::PlaylistEntriesChanged(playlist_id));
        Ok(())
    }

    pub async fn remove_playlist_entry(&self, playlist_id: i64, video_id: &str) -> Result<()> {
        self.db
            .remove_playlist_entry(playlist_id, video_id)
            .await?;
        self.emit(LibraryEvent::PlaylistEntriesChanged(playlist_id));
        Ok(())
    }

    pub async fn playlist_entries(&self, playlist_id: i64) -> Result<Vec<DbPlaylistEntry>> {
        self.db.get_playlist_entries(playlist_id).await
    }

    pub fn playlists(&self) -> LocalPlaylistsModel {
        LocalPlaylistsModel::new(self.clone())
    }

    pub fn local_playlist(&self) -> LocalPlaylistModel {
        LocalPlaylistModel::new(self.clone())
    }

    /// Run `refresh` once, then every time an event accepted by `filter` is
    /// announced
    ///
    /// The listener stops when the returned handle is dropped.
    pub(crate) fn follow<F, R, Fut>(&self, filter: F, refresh: R) -> FollowHandle
    where
        F: Fn(&LibraryEvent) -> bool + Send + Sync + 'static,
        R: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        // Subscribe before spawning so nothing announced in between is missed
        let mut rx = self.subscribe();
        FollowHandle(tokio::spawn(async move {
            refresh().await;
            loop {
                match rx.recv().await {
                    Ok(event) if filter(&event) => refresh().await,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("Missed {} library events, reloading", skipped);
                        refresh().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }))
    }
}

/// Keeps a library listener alive. Dropping it stops the listener.
#[derive(Debug)]
pub struct FollowHandle(JoinHandle<()>);

impl Drop for FollowHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[cfg(test)]
pub(crate) async fn test_library() -> Library {
    let db = Database::in_memory()
        .await
        .expect("in-memory database");
    Library::new(db, LibrarySettings::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_favourite_stores_song_and_emits() {
        let library = test_library().await;
        let mut events = library.subscribe();

        library
            .add_favourite("FGBhQbmPwH8", "One More Time", "Daft Punk", "Discovery")
            .await
            .unwrap();

        assert_eq!(events.recv().await.unwrap(), LibraryEvent::FavouritesChanged);
        assert!(library.is_favourite("FGBhQbmPwH8").await.unwrap());
        let song = library.database().get_song("FGBhQbmPwH8").await.unwrap().unwrap();
        assert_eq!(song.album, "Discovery");
    }

    #[tokio::test]
    async fn test_playback_history_counts_plays() {
        let library = test_library().await;
        for _ in 0..3 {
            library
                .add_playback_history_item("FGBhQbmPwH8", "One More Time", "Daft Punk", "")
                .await
                .unwrap();
        }
        library
            .add_playback_history_item("K0HSD_i2DvA", "Around the World", "Daft Punk", "")
            .await
            .unwrap();

        let most_played = library.most_played_songs().await.unwrap();
        assert_eq!(most_played[0].video_id, "FGBhQbmPwH8");
        assert_eq!(most_played[0].plays, 3);
        assert!(library.was_played("K0HSD_i2DvA").await.unwrap());

        library
            .remove_playback_history_item("K0HSD_i2DvA")
            .await
            .unwrap();
        assert!(!library.was_played("K0HSD_i2DvA").await.unwrap());
    }

    #[tokio::test]
    async fn test_watchers_reject_empty_id() {
        let library = test_library().await;
        assert!(library.favourite_watcher("").is_none());
        assert!(library.was_played_watcher("").is_none());
    }

    #[tokio::test]
    async fn test_playlist_entry_events_carry_playlist_id() {
        let library = test_library().await;
        let id = library.create_playlist("Mix", "").await.unwrap();
        let mut events = library.subscribe();

        library
            .add_playlist_entry(id, &NewSong::new("a", "A", "", ""))
            .await
            .unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            LibraryEvent::PlaylistEntriesChanged(id)
        );
    }
}
