//! Playlist import
//!
//! Handles:
//! - Importing a remote YouTube Music playlist by url
//! - Importing a text file of watch urls, one per line
//! - Renaming imported playlists

use std::path::{Path, PathBuf};

use anyhow::Result;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::api::{ApiWorker, SongDetails, Track};
use crate::database::NewSong;
use crate::library::{Library, LibraryEvent};
use crate::utils::{artists_to_string, local_file_path};

const UNKNOWN_TITLE: &str = "Unknown";
const NO_DESCRIPTION: &str = "No description";
const NO_TITLE: &str = "No title";
const NO_ALBUM: &str = "No album";

/// Length of a YouTube video id
const VIDEO_ID_LEN: usize = 11;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("cannot import from non-local target {0}")]
    NotLocal(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Playlist id from a playlist url
///
/// Takes the text after `?list=` (the whole input when absent) up to the first
/// `?` or `&`.
pub fn crop_url(url: &str) -> &str {
    const LIST_PARAM: &str = "?list=";
    let rest = match url.find(LIST_PARAM) {
        Some(pos) => &url[pos + LIST_PARAM.len()..],
        None => url,
    };
    match rest.find(['?', '&']) {
        Some(end) => &rest[..end],
        None => rest,
    }
}

/// Video id from one line of a playlist file
fn video_id_from_line(line: &str) -> String {
    let id = match line.find("v=") {
        Some(pos) => &line[pos + 2..],
        None => line,
    };
    id.chars().take(VIDEO_ID_LEN).collect()
}

fn track_to_song(track: &Track) -> Option<NewSong> {
    if !track.is_available {
        return None;
    }
    let video_id = track.video_id.as_deref()?;
    let title = if track.title.is_empty() {
        NO_TITLE
    } else {
        track.title.as_str()
    };
    let album = track
        .album
        .as_ref()
        .map(|a| a.name.as_str())
        .unwrap_or(NO_ALBUM);
    Some(NewSong::new(
        video_id,
        title,
        artists_to_string(&track.artists),
        album,
    ))
}

fn details_to_song(song: &SongDetails) -> NewSong {
    NewSong::new(&*song.video_id, &*song.title, &*song.author, "")
}

/// Copies remote playlists into the local library
#[derive(Debug, Clone)]
pub struct PlaylistImporter {
    library: Library,
    worker: ApiWorker,
}

impl PlaylistImporter {
    pub fn new(library: Library, worker: ApiWorker) -> Self {
        Self { library, worker }
    }

    /// Import a YouTube Music playlist, returning the id of the local copy
    ///
    /// The local playlist is created before the remote one is fetched and is
    /// kept as "Unknown" when fetching fails.
    pub async fn import_playlist(&self, url: &str) -> Result<i64> {
        let remote_id = crop_url(url);
        let playlist_id = self
            .library
            .create_playlist(UNKNOWN_TITLE, NO_DESCRIPTION)
            .await?;

        let remote = self.worker.fetch_playlist(remote_id).await?;
        self.rename_playlist(playlist_id, &remote.title, &remote.author.name)
            .await?;

        let mut added = 0;
        for song in remote.tracks.iter().filter_map(track_to_song) {
            self.library.add_playlist_entry(playlist_id, &song).await?;
            added += 1;
        }

        self.library.emit(LibraryEvent::PlaylistsChanged);
        info!(
            "Imported {} of {} tracks from {} into playlist {}",
            added,
            remote.tracks.len(),
            remote_id,
            playlist_id
        );
        Ok(playlist_id)
    }

    /// Import a text file of watch urls; lines starting with `#` are skipped
    ///
    /// `target` is a path or a `file://` url. The playlist is named after the
    /// file. Ids that do not resolve to a song are left out.
    pub async fn import_playlist_from_file(&self, target: &str) -> Result<i64> {
        let path = local_file_path(target).ok_or_else(|| ImportError::NotLocal(target.into()))?;
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ImportError::Read {
                path: path.clone(),
                source,
            })?;

        let title = file_title(&path);
        let playlist_id = self.library.create_playlist(&title, NO_DESCRIPTION).await?;

        let video_ids: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(video_id_from_line)
            .collect();
        debug!("Found {} entries in {}", video_ids.len(), path.display());

        let lookups = join_all(video_ids.iter().map(|id| self.worker.fetch_song(id))).await;

        let mut added = 0;
        for (video_id, lookup) in video_ids.iter().zip(lookups) {
            match lookup {
                Ok(Some(song)) => {
                    self.library
                        .add_playlist_entry(playlist_id, &details_to_song(&song))
                        .await?;
                    added += 1;
                }
                Ok(None) => debug!("No song found for {}", video_id),
                Err(e) => warn!("Skipping {}: {}", video_id, e),
            }
        }

        self.library.emit(LibraryEvent::PlaylistsChanged);
        info!(
            "Imported {} of {} songs from {} into playlist {}",
            added,
            video_ids.len(),
            path.display(),
            playlist_id
        );
        Ok(playlist_id)
    }

    pub async fn rename_playlist(
        &self,
        playlist_id: i64,
        name: &str,
        description: &str,
    ) -> Result<()> {
        self.library
            .rename_playlist(playlist_id, name, description)
            .await
    }
}

fn file_title(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::testing::{FakeClient, track};
    use crate::api::{Album, Artist, PlaylistPage};
    use crate::library::test_library;

    #[test]
    fn test_crop_url() {
        assert_eq!(
            crop_url("https://music.youtube.com/playlist?list=PLabc123&si=xyz"),
            "PLabc123"
        );
        assert_eq!(
            crop_url("https://music.youtube.com/playlist?list=PLabc123"),
            "PLabc123"
        );
        assert_eq!(crop_url("PLabc123"), "PLabc123");
        assert_eq!(crop_url("https://youtube.com/watch?list=PLx?feature=share"), "PLx");
    }

    #[test]
    fn test_video_id_from_line() {
        assert_eq!(
            video_id_from_line("https://music.youtube.com/watch?v=FGBhQbmPwH8&list=RD"),
            "FGBhQbmPwH8"
        );
        assert_eq!(video_id_from_line("FGBhQbmPwH8"), "FGBhQbmPwH8");
    }

    fn remote_playlist() -> PlaylistPage {
        let untitled = track("untitled001", "", "Anonymous");

        let mut with_album = track("FGBhQbmPwH8", "One More Time", "Daft Punk");
        with_album.album = Some(Album {
            name: "Discovery".into(),
            id: None,
        });
        with_album.artists.push(Artist::named("Romanthony"));

        let mut unavailable = track("gone0000001", "Gone", "Nobody");
        unavailable.is_available = false;

        let mut no_id = track("", "Private", "Nobody");
        no_id.video_id = None;

        PlaylistPage {
            id: "PLimport".into(),
            title: "Road trip".into(),
            author: Artist::named("Someone"),
            thumbnails: vec![],
            tracks: vec![with_album, untitled, unavailable, no_id],
        }
    }

    #[tokio::test]
    async fn test_import_playlist() {
        let library = test_library().await;
        let worker = ApiWorker::spawn(Arc::new(
            FakeClient::default().with_playlist(remote_playlist()),
        ));
        let importer = PlaylistImporter::new(library.clone(), worker);

        let id = importer
            .import_playlist("https://music.youtube.com/playlist?list=PLimport&si=abc")
            .await
            .unwrap();

        let playlist = library.playlist(id).await.unwrap().unwrap();
        assert_eq!(playlist.title, "Road trip");
        assert_eq!(playlist.description, "Someone");

        let entries = library.playlist_entries(id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].artist, "Daft Punk, Romanthony");
        assert_eq!(entries[0].album, "Discovery");
        assert_eq!(entries[1].title, "No title");
        assert_eq!(entries[1].album, "No album");
    }

    #[tokio::test]
    async fn test_failed_import_keeps_placeholder() {
        let library = test_library().await;
        let worker = ApiWorker::spawn(Arc::new(FakeClient::default()));
        let importer = PlaylistImporter::new(library.clone(), worker);

        assert!(importer.import_playlist("PLmissing").await.is_err());

        let playlists = library.all_playlists().await.unwrap();
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].title, "Unknown");
        assert_eq!(playlists[0].description, "No description");
    }

    #[tokio::test]
    async fn test_import_playlist_from_file() {
        let library = test_library().await;
        let worker = ApiWorker::spawn(Arc::new(
            FakeClient::default()
                .with_song("FGBhQbmPwH8", "One More Time", "Daft Punk")
                .with_song("K0HSD_i2DvA", "Around the World", "Daft Punk"),
        ));
        let importer = PlaylistImporter::new(library.clone(), worker);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daft.txt");
        std::fs::write(
            &path,
            "# exported playlist\n\
             https://music.youtube.com/watch?v=FGBhQbmPwH8\n\
             \n\
             https://music.youtube.com/watch?v=unknown0000\n\
             https://music.youtube.com/watch?v=K0HSD_i2DvA&t=10\n",
        )
        .unwrap();

        let id = importer
            .import_playlist_from_file(path.to_str().unwrap())
            .await
            .unwrap();

        let playlist = library.playlist(id).await.unwrap().unwrap();
        assert_eq!(playlist.title, "daft.txt");

        let entries = library.playlist_entries(id).await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.video_id.as_str()).collect();
        assert_eq!(ids, ["FGBhQbmPwH8", "K0HSD_i2DvA"]);
        assert_eq!(entries[0].artist, "Daft Punk");
        assert_eq!(entries[0].album, "");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_import_error() {
        let library = test_library().await;
        let worker = ApiWorker::spawn(Arc::new(FakeClient::default()));
        let importer = PlaylistImporter::new(library.clone(), worker);

        let err = importer
            .import_playlist_from_file("/nonexistent/list.txt")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::Read { .. })
        ));

        let err = importer
            .import_playlist_from_file("https://example.com/list.txt")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::NotLocal(_))
        ));
        assert!(library.all_playlists().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rename_playlist() {
        let library = test_library().await;
        let worker = ApiWorker::spawn(Arc::new(FakeClient::default()));
        let importer = PlaylistImporter::new(library.clone(), worker);

        let id = library.create_playlist("Unknown", "No description").await.unwrap();
        importer.rename_playlist(id, "Chill", "Evenings").await.unwrap();

        let playlist = library.playlist(id).await.unwrap().unwrap();
        assert_eq!(playlist.title, "Chill");
        assert_eq!(playlist.description, "Evenings");
    }
}
