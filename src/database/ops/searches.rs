//! Search history operations

use anyhow::Result;
use sqlx::{Acquire, Pool, Sqlite};

/// Record a search query. A query that was searched before moves to the top
/// instead of being listed twice.
pub async fn add_search(pool: &Pool<Sqlite>, query: &str) -> Result<()> {
    let mut conn = pool.acquire().await?;
    let mut tx = conn.begin().await?;

    sqlx::query("DELETE FROM searches WHERE search_query = ?")
        .bind(query)
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT INTO searches (search_query) VALUES (?)")
        .bind(query)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn remove_search(pool: &Pool<Sqlite>, query: &str) -> Result<()> {
    sqlx::query("DELETE FROM searches WHERE search_query = ?")
        .bind(query)
        .execute(pool)
        .await?;
    Ok(())
}

/// Search queries, newest first
pub async fn get_searches(pool: &Pool<Sqlite>) -> Result<Vec<String>> {
    let searches =
        sqlx::query_scalar::<_, String>("SELECT search_query FROM searches ORDER BY search_id DESC")
            .fetch_all(pool)
            .await?;
    Ok(searches)
}

pub async fn clear_searches(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query("DELETE FROM searches").execute(pool).await?;
    Ok(())
}
