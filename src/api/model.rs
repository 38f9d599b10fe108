//! Typed records returned by the YouTube Music client
//!
//! These are plain values: the client fills them from its JSON payloads and
//! the models display them as-is.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// An artist credit attached to a song, album or video
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Artist {
    pub name: String,
    /// Channel id, when the credit links to an artist page
    pub id: Option<String>,
}

impl Artist {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }
}

/// Album reference inside a track
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Album {
    pub name: String,
    pub id: Option<String>,
}

/// A thumbnail variant. Ordered by pixel area, so the last of a sorted list
/// is the largest one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl PartialOrd for Thumbnail {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Thumbnail {
    fn cmp(&self, other: &Self) -> Ordering {
        self.area()
            .cmp(&other.area())
            .then_with(|| self.url.cmp(&other.url))
    }
}

/// Url of the largest thumbnail, if there is any
pub fn largest_thumbnail(thumbnails: &[Thumbnail]) -> Option<&str> {
    thumbnails.iter().max().map(|t| t.url.as_str())
}

/// One row of a search response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "result_type", rename_all = "snake_case")]
pub enum SearchResultItem {
    Album {
        title: String,
        browse_id: String,
        artists: Vec<Artist>,
        thumbnails: Vec<Thumbnail>,
    },
    Artist {
        artist: String,
        browse_id: String,
        thumbnails: Vec<Thumbnail>,
    },
    Playlist {
        title: String,
        browse_id: String,
        author: String,
    },
    Song {
        title: String,
        video_id: String,
        artists: Vec<Artist>,
        album: Option<Album>,
    },
    Video {
        title: String,
        video_id: String,
        artists: Vec<Artist>,
    },
}

impl SearchResultItem {
    /// Text shown for the row: the artist name for artists, the title otherwise
    pub fn display_title(&self) -> &str {
        match self {
            SearchResultItem::Album { title, .. }
            | SearchResultItem::Playlist { title, .. }
            | SearchResultItem::Song { title, .. }
            | SearchResultItem::Video { title, .. } => title,
            SearchResultItem::Artist { artist, .. } => artist,
        }
    }
}

/// Release listed on an artist page (albums and singles)
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ArtistRelease {
    pub title: String,
    pub browse_id: String,
    pub year: Option<String>,
    pub thumbnails: Vec<Thumbnail>,
}

/// Playable item listed on an artist page (songs and videos)
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ArtistTrack {
    pub title: String,
    pub video_id: String,
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ArtistPage {
    pub name: String,
    pub channel_id: String,
    pub description: Option<String>,
    pub thumbnails: Vec<Thumbnail>,
    pub albums: Vec<ArtistRelease>,
    pub singles: Vec<ArtistRelease>,
    pub songs: Vec<ArtistTrack>,
    pub videos: Vec<ArtistTrack>,
}

/// A track of a playlist or album
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Track {
    /// Missing for tracks that were taken down
    pub video_id: Option<String>,
    pub title: String,
    pub artists: Vec<Artist>,
    pub album: Option<Album>,
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct PlaylistPage {
    pub id: String,
    pub title: String,
    pub author: Artist,
    pub thumbnails: Vec<Thumbnail>,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct AlbumPage {
    pub title: String,
    pub artists: Vec<Artist>,
    pub year: Option<String>,
    pub thumbnails: Vec<Thumbnail>,
    pub tracks: Vec<Track>,
    /// Playlist id that plays the whole album
    pub audio_playlist_id: Option<String>,
}

/// Song details as returned by a single-song lookup
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct SongDetails {
    pub video_id: String,
    pub title: String,
    pub author: String,
}

/// A stream format of a video
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Format {
    pub url: String,
    /// Audio codec, "none" for video-only streams
    pub acodec: String,
    /// Video codec, "none" for audio-only streams
    pub vcodec: String,
    pub quality: f64,
}

impl Format {
    pub fn is_audio_only(&self) -> bool {
        self.acodec != "none" && self.vcodec == "none"
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub thumbnail: String,
    pub formats: Vec<Format>,
}

impl VideoInfo {
    /// Stream url of the best audio-only format
    pub fn best_audio_url(&self) -> Option<&str> {
        self.formats
            .iter()
            .filter(|f| f.is_audio_only())
            .max_by(|a, b| a.quality.total_cmp(&b.quality))
            .map(|f| f.url.as_str())
    }
}
