//! Database repository - main entry point
//! Delegates to ops modules for actual operations

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Acquire, Pool, Sqlite};
use tracing::info;

use super::{models::*, ops, schema};

/// Database connection pool wrapper
#[derive(Debug, Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (and create if needed) the library database at the given path
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        // WAL keeps reads from models unblocked by background writes
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;

        schema::run_migrations(&pool).await?;
        info!("Library database opened at {}", db_path.display());

        Ok(Self { pool })
    }

    /// Private in-memory database, used by tests
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Every connection would see its own empty database, so keep exactly one alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        schema::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    // ============ Song Operations ============

    pub async fn insert_song(&self, song: &NewSong) -> Result<()> {
        ops::insert_song(&self.pool, song).await
    }

    pub async fn get_song(&self, video_id: &str) -> Result<Option<DbSong>> {
        ops::get_song(&self.pool, video_id).await
    }

    pub async fn count_songs(&self) -> Result<i64> {
        ops::count_songs(&self.pool).await
    }

    // ============ Favourite Operations ============

    pub async fn add_favourite(&self, video_id: &str) -> Result<()> {
        ops::add_favourite(&self.pool, video_id).await
    }

    pub async fn remove_favourite(&self, video_id: &str) -> Result<()> {
        ops::remove_favourite(&self.pool, video_id).await
    }

    pub async fn get_favourites(&self) -> Result<Vec<DbSong>> {
        ops::get_favourites(&self.pool).await
    }

    pub async fn is_favourite(&self, video_id: &str) -> Result<bool> {
        ops::is_favourite(&self.pool, video_id).await
    }

    // ============ Search History Operations ============

    pub async fn add_search(&self, query: &str) -> Result<()> {
        ops::add_search(&self.pool, query).await
    }

    pub async fn remove_search(&self, query: &str) -> Result<()> {
        ops::remove_search(&self.pool, query).await
    }

    pub async fn get_searches(&self) -> Result<Vec<String>> {
        ops::get_searches(&self.pool).await
    }

    pub async fn clear_searches(&self) -> Result<()> {
        ops::clear_searches(&self.pool).await
    }

    // ============ Playback History Operations ============

    pub async fn record_play(&self, video_id: &str) -> Result<()> {
        ops::record_play(&self.pool, video_id).await
    }

    pub async fn remove_played_song(&self, video_id: &str) -> Result<()> {
        ops::remove_played_song(&self.pool, video_id).await
    }

    pub async fn get_playback_history(&self) -> Result<Vec<DbPlayedSong>> {
        ops::get_playback_history(&self.pool).await
    }

    pub async fn get_most_played(&self, limit: i64) -> Result<Vec<DbPlayedSong>> {
        ops::get_most_played(&self.pool, limit).await
    }

    pub async fn was_played(&self, video_id: &str) -> Result<bool> {
        ops::was_played(&self.pool, video_id).await
    }

    // ============ Playlist Operations ============

    pub async fn create_playlist(&self, playlist: &NewPlaylist) -> Result<i64> {
        ops::create_playlist(&self.pool, playlist).await
    }

    pub async fn get_playlists(&self) -> Result<Vec<DbPlaylist>> {
        ops::get_playlists(&self.pool).await
    }

    pub async fn get_playlist(&self, playlist_id: i64) -> Result<Option<DbPlaylist>> {
        ops::get_playlist(&self.pool, playlist_id).await
    }

    pub async fn rename_playlist(
        &self,
        playlist_id: i64,
        title: &str,
        description: &str,
    ) -> Result<()> {
        ops::rename_playlist(&self.pool, playlist_id, title, description).await
    }

    pub async fn delete_playlist(&self, playlist_id: i64) -> Result<()> {
        ops::delete_playlist(&self.pool, playlist_id).await
    }

    /// Store the song if needed and append it to the playlist, in one transaction
    pub async fn add_playlist_entry(&self, playlist_id: i64, song: &NewSong) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        ops::insert_song(&mut *tx, song).await?;
        ops::add_playlist_entry(&mut *tx, playlist_id, &song.video_id).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn remove_playlist_entry(&self, playlist_id: i64, video_id: &str) -> Result<()> {
        ops::remove_playlist_entry(&self.pool, playlist_id, video_id).await
    }

    pub async fn get_playlist_entries(&self, playlist_id: i64) -> Result<Vec<DbPlaylistEntry>> {
        ops::get_playlist_entries(&self.pool, playlist_id).await
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}
