//! Database models for the local library
//! These map directly to rows of the SQLite tables

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Song known to the library, keyed by its YouTube video id
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct DbSong {
    pub video_id: String,
    pub title: String,
    /// Artists display string ("A, B")
    pub artist: String,
    pub album: String,
}

/// Song from the playback history together with its play statistics
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct DbPlayedSong {
    pub video_id: String,
    pub plays: i64,
    /// Unix timestamp of the most recent play
    pub last_played: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
}

/// Locally stored playlist
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct DbPlaylist {
    pub playlist_id: i64,
    pub title: String,
    pub description: String,
    pub created_on: i64,
}

/// Song as part of a local playlist
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct DbPlaylistEntry {
    pub playlist_id: i64,
    pub video_id: String,
    pub position: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
}

// ============ Input structs for creating new records ============

/// Input for storing a song
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewSong {
    pub video_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl NewSong {
    pub fn new(
        video_id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
        }
    }
}

/// Input for creating a playlist
#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub title: String,
    pub description: String,
}
