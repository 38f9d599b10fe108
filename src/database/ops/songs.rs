//! Song operations

use anyhow::Result;
use sqlx::{Executor, Pool, Sqlite};

use crate::database::{DbSong, NewSong};

/// Store a song unless one with the same video id already exists
pub async fn insert_song<'e, E>(executor: E, song: &NewSong) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT OR IGNORE INTO songs (video_id, title, artist, album) VALUES (?, ?, ?, ?)")
        .bind(&song.video_id)
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.album)
        .execute(executor)
        .await?;
    Ok(())
}

/// Get song by video id
pub async fn get_song(pool: &Pool<Sqlite>, video_id: &str) -> Result<Option<DbSong>> {
    let song = sqlx::query_as::<_, DbSong>(
        "SELECT video_id, title, artist, album FROM songs WHERE video_id = ?",
    )
    .bind(video_id)
    .fetch_optional(pool)
    .await?;
    Ok(song)
}

/// Number of songs known to the library
pub async fn count_songs(pool: &Pool<Sqlite>) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
