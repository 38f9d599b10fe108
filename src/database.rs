//! Database module for the local library
//! Uses SQLite via sqlx for favourites, search history, playback history and playlists

mod models;
mod ops;
mod repository;
mod schema;

pub use models::*;
pub use repository::Database;
