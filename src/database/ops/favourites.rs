//! Favourite operations

use anyhow::Result;
use sqlx::{Pool, Sqlite};

use crate::database::DbSong;
use crate::utils::current_timestamp;

/// Mark a stored song as favourite. Adding it twice is a no-op.
pub async fn add_favourite(pool: &Pool<Sqlite>, video_id: &str) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO favourites (video_id, added_at) VALUES (?, ?)")
        .bind(video_id)
        .bind(current_timestamp())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn remove_favourite(pool: &Pool<Sqlite>, video_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM favourites WHERE video_id = ?")
        .bind(video_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// All favourite songs, most recently added first
pub async fn get_favourites(pool: &Pool<Sqlite>) -> Result<Vec<DbSong>> {
    let songs = sqlx::query_as::<_, DbSong>(
        r#"
        SELECT s.video_id, s.title, s.artist, s.album FROM favourites f
        INNER JOIN songs s ON s.video_id = f.video_id
        ORDER BY f.added_at DESC, f.rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(songs)
}

pub async fn is_favourite(pool: &Pool<Sqlite>, video_id: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favourites WHERE video_id = ?")
        .bind(video_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}
