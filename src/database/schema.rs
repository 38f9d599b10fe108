//! Database schema migrations

use anyhow::Result;
use sqlx::{Pool, Sqlite};

/// Create the library tables if they do not exist yet
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    // Songs table, shared by favourites, history and playlists
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            video_id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            artist TEXT NOT NULL DEFAULT '',
            album TEXT NOT NULL DEFAULT ''
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS favourites (
            video_id TEXT PRIMARY KEY NOT NULL,
            added_at INTEGER NOT NULL,
            FOREIGN KEY (video_id) REFERENCES songs(video_id) ON DELETE CASCADE
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS searches (
            search_id INTEGER PRIMARY KEY AUTOINCREMENT,
            search_query TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_searches_query ON searches(search_query);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS played_songs (
            video_id TEXT PRIMARY KEY NOT NULL,
            plays INTEGER NOT NULL DEFAULT 0,
            last_played INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (video_id) REFERENCES songs(video_id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_played_songs_plays ON played_songs(plays);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlists (
            playlist_id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_on INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlist_entries (
            playlist_id INTEGER NOT NULL,
            video_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            FOREIGN KEY (playlist_id) REFERENCES playlists(playlist_id) ON DELETE CASCADE,
            FOREIGN KEY (video_id) REFERENCES songs(video_id) ON DELETE CASCADE,
            UNIQUE(playlist_id, video_id)
        );

        CREATE INDEX IF NOT EXISTS idx_playlist_entries_playlist ON playlist_entries(playlist_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
