//! Local playlists

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::models::load_rows;
use super::{FollowHandle, Library, LibraryEvent};
use crate::database::{DbPlaylist, DbPlaylistEntry};
use crate::models::{Generation, ListModel};
use crate::utils::local_file_path;

/// All local playlists, oldest first
#[derive(Debug, Clone)]
pub struct LocalPlaylistsModel {
    library: Library,
    rows: ListModel<DbPlaylist>,
}

impl LocalPlaylistsModel {
    pub(super) fn new(library: Library) -> Self {
        Self {
            library,
            rows: ListModel::new(),
        }
    }

    pub async fn refresh(&self) -> Result<()> {
        load_rows(&self.rows, self.library.all_playlists()).await
    }

    pub fn follow(&self) -> FollowHandle {
        let model = self.clone();
        self.library.follow(
            |event| matches!(event, LibraryEvent::PlaylistsChanged),
            move || {
                let model = model.clone();
                async move {
                    if let Err(e) = model.refresh().await {
                        warn!("Failed to reload playlists: {}", e);
                    }
                }
            },
        )
    }

    pub async fn create_playlist(&self, title: &str, description: &str) -> Result<i64> {
        let id = self.library.create_playlist(title, description).await?;
        self.refresh().await?;
        Ok(id)
    }

    pub async fn delete_playlist(&self, playlist_id: i64) -> Result<()> {
        self.library.delete_playlist(playlist_id).await?;
        self.refresh().await
    }

    pub fn loading(&self) -> bool {
        self.rows.is_loading()
    }

    pub fn row_count(&self) -> usize {
        self.rows.row_count()
    }

    pub fn playlist(&self, row: usize) -> Option<DbPlaylist> {
        self.rows.get(row)
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.rows.subscribe()
    }
}

/// Entries of one local playlist
#[derive(Debug, Clone)]
pub struct LocalPlaylistModel {
    library: Library,
    playlist_id: Arc<RwLock<Option<i64>>>,
    generation: Generation,
    rows: ListModel<DbPlaylistEntry>,
}

impl LocalPlaylistModel {
    pub(super) fn new(library: Library) -> Self {
        Self {
            library,
            playlist_id: Arc::default(),
            generation: Generation::default(),
            rows: ListModel::new(),
        }
    }

    pub fn playlist_id(&self) -> Option<i64> {
        *self.playlist_id.read()
    }

    pub async fn set_playlist_id(&self, playlist_id: i64) -> Result<()> {
        *self.playlist_id.write() = Some(playlist_id);
        self.refresh().await
    }

    /// Reload the entries. Entries read for an earlier playlist id or an
    /// earlier reload are dropped.
    pub async fn refresh(&self) -> Result<()> {
        let generation = self.generation.next();
        let Some(id) = self.playlist_id() else {
            self.rows.fail_loading();
            return Ok(());
        };

        self.rows.set_loading(true);
        let result = self.library.playlist_entries(id).await;

        if !self.generation.is_current(generation) {
            debug!("Dropping outdated entries of playlist {}", id);
            return Ok(());
        }

        match result {
            Ok(entries) => {
                self.rows.finish_loading(entries);
                Ok(())
            }
            Err(e) => {
                self.rows.fail_loading();
                Err(e)
            }
        }
    }

    /// Reload when entries of the current playlist change or playlists are deleted
    pub fn follow(&self) -> FollowHandle {
        let current = self.playlist_id.clone();
        let model = self.clone();
        self.library.follow(
            move |event| match event {
                LibraryEvent::PlaylistEntriesChanged(id) => *current.read() == Some(*id),
                LibraryEvent::PlaylistsChanged => true,
                _ => false,
            },
            move || {
                let model = model.clone();
                async move {
                    if let Err(e) = model.refresh().await {
                        warn!("Failed to reload playlist entries: {}", e);
                    }
                }
            },
        )
    }

    pub async fn remove_song(&self, video_id: &str) -> Result<()> {
        let Some(playlist_id) = self.playlist_id() else {
            bail!("No playlist selected");
        };
        self.library
            .remove_playlist_entry(playlist_id, video_id)
            .await?;
        self.refresh().await
    }

    /// Write one watch url per entry to a local file
    ///
    /// `target` is a path or a `file://` url.
    pub async fn export_playlist(&self, target: &str) -> Result<()> {
        let Some(path) = local_file_path(target) else {
            bail!("Cannot export playlist to non-local target {}", target);
        };

        let base_url = &self.library.settings().export_base_url;
        let contents: String = self.rows.with_rows(|rows| {
            rows.iter()
                .map(|entry| format!("{}{}\n", base_url, entry.video_id))
                .collect()
        });

        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("Failed to write playlist to {}", path.display()))?;
        info!("Exported {} songs to {}", self.row_count(), path.display());
        Ok(())
    }

    pub fn loading(&self) -> bool {
        self.rows.is_loading()
    }

    pub fn row_count(&self) -> usize {
        self.rows.row_count()
    }

    pub fn entry(&self, row: usize) -> Option<DbPlaylistEntry> {
        self.rows.get(row)
    }

    pub fn entries(&self) -> Vec<DbPlaylistEntry> {
        self.rows.rows()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.rows.subscribe()
    }
}
