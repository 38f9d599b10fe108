//! Playback history operations

use anyhow::Result;
use sqlx::{Acquire, Pool, Sqlite};

use crate::database::DbPlayedSong;
use crate::utils::current_timestamp;

/// Count a play of a stored song
pub async fn record_play(pool: &Pool<Sqlite>, video_id: &str) -> Result<()> {
    let mut conn = pool.acquire().await?;
    let mut tx = conn.begin().await?;

    sqlx::query("INSERT OR IGNORE INTO played_songs (video_id, plays, last_played) VALUES (?, 0, 0)")
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE played_songs SET plays = plays + 1, last_played = ? WHERE video_id = ?")
        .bind(current_timestamp())
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn remove_played_song(pool: &Pool<Sqlite>, video_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM played_songs WHERE video_id = ?")
        .bind(video_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Played songs, most recently played first
pub async fn get_playback_history(pool: &Pool<Sqlite>) -> Result<Vec<DbPlayedSong>> {
    let songs = sqlx::query_as::<_, DbPlayedSong>(
        r#"
        SELECT p.video_id, p.plays, p.last_played, s.title, s.artist, s.album FROM played_songs p
        INNER JOIN songs s ON s.video_id = p.video_id
        ORDER BY p.last_played DESC, p.rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(songs)
}

/// The `limit` songs with the highest play count
pub async fn get_most_played(pool: &Pool<Sqlite>, limit: i64) -> Result<Vec<DbPlayedSong>> {
    let songs = sqlx::query_as::<_, DbPlayedSong>(
        r#"
        SELECT p.video_id, p.plays, p.last_played, s.title, s.artist, s.album FROM played_songs p
        INNER JOIN songs s ON s.video_id = p.video_id
        ORDER BY p.plays DESC, p.last_played DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(songs)
}

pub async fn was_played(pool: &Pool<Sqlite>, video_id: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM played_songs WHERE video_id = ?")
        .bind(video_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}
