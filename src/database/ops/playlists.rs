//! Local playlist operations

use anyhow::Result;
use sqlx::{Executor, Pool, Sqlite};

use crate::database::{DbPlaylist, DbPlaylistEntry, NewPlaylist};
use crate::utils::current_timestamp;

/// Create a new playlist, returns its id
pub async fn create_playlist(pool: &Pool<Sqlite>, playlist: &NewPlaylist) -> Result<i64> {
    let result =
        sqlx::query("INSERT INTO playlists (title, description, created_on) VALUES (?, ?, ?)")
            .bind(&playlist.title)
            .bind(&playlist.description)
            .bind(current_timestamp())
            .execute(pool)
            .await?;

    Ok(result.last_insert_rowid())
}

/// All playlists in creation order
pub async fn get_playlists(pool: &Pool<Sqlite>) -> Result<Vec<DbPlaylist>> {
    let playlists = sqlx::query_as::<_, DbPlaylist>(
        "SELECT playlist_id, title, description, created_on FROM playlists ORDER BY playlist_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(playlists)
}

pub async fn get_playlist(pool: &Pool<Sqlite>, playlist_id: i64) -> Result<Option<DbPlaylist>> {
    let playlist = sqlx::query_as::<_, DbPlaylist>(
        "SELECT playlist_id, title, description, created_on FROM playlists WHERE playlist_id = ?",
    )
    .bind(playlist_id)
    .fetch_optional(pool)
    .await?;
    Ok(playlist)
}

/// Update playlist title and description
pub async fn rename_playlist(
    pool: &Pool<Sqlite>,
    playlist_id: i64,
    title: &str,
    description: &str,
) -> Result<()> {
    sqlx::query("UPDATE playlists SET title = ?, description = ? WHERE playlist_id = ?")
        .bind(title)
        .bind(description)
        .bind(playlist_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a playlist together with its entries
/// Delete a playlist; its entries go with it through `ON DELETE CASCADE`
pub async fn delete_playlist(pool: &Pool<Sqlite>, playlist_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM playlists WHERE playlist_id = ?")
        .bind(playlist_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Append a stored song to a playlist. A song is listed at most once per playlist.
pub async fn add_playlist_entry<'e, E>(executor: E, playlist_id: i64, video_id: &str) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO playlist_entries (playlist_id, video_id, position)
        VALUES (?, ?, (SELECT COALESCE(MAX(position), -1) + 1 FROM playlist_entries WHERE playlist_id = ?))
        "#,
    )
    .bind(playlist_id)
    .bind(video_id)
    .bind(playlist_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn remove_playlist_entry(
    pool: &Pool<Sqlite>,
    playlist_id: i64,
    video_id: &str,
) -> Result<()> {
    sqlx::query("DELETE FROM playlist_entries WHERE playlist_id = ? AND video_id = ?")
        .bind(playlist_id)
        .bind(video_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Songs of a playlist in the order they were added
pub async fn get_playlist_entries(
    pool: &Pool<Sqlite>,
    playlist_id: i64,
) -> Result<Vec<DbPlaylistEntry>> {
    let entries = sqlx::query_as::<_, DbPlaylistEntry>(
        r#"
        SELECT e.playlist_id, e.video_id, e.position, s.title, s.artist, s.album
        FROM playlist_entries e
        INNER JOIN songs s ON s.video_id = e.video_id
        WHERE e.playlist_id = ?
        ORDER BY e.position
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}
