//! Per-song flags that follow the library

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::warn;

use super::{FollowHandle, Library, LibraryEvent};
use crate::models::Observable;

#[derive(Debug, Clone)]
struct FavouriteState {
    library: Library,
    video_id: Arc<str>,
    flag: Observable<bool>,
}

impl FavouriteState {
    async fn refresh(&self) -> Result<()> {
        let favourite = self.library.is_favourite(&self.video_id).await?;
        self.flag.update(|f| *f = favourite);
        Ok(())
    }
}

/// Whether one song is a favourite, kept up to date while the watcher lives
#[derive(Debug)]
pub struct FavouriteWatcher {
    state: FavouriteState,
    _follow: FollowHandle,
}

impl FavouriteWatcher {
    pub(super) fn new(library: Library, video_id: &str) -> Self {
        let state = FavouriteState {
            library: library.clone(),
            video_id: video_id.into(),
            flag: Observable::default(),
        };

        let follower = state.clone();
        let follow = library.follow(
            |event| matches!(event, LibraryEvent::FavouritesChanged),
            move || {
                let state = follower.clone();
                async move {
                    if let Err(e) = state.refresh().await {
                        warn!("Failed to refresh favourite state of {}: {}", state.video_id, e);
                    }
                }
            },
        );

        Self {
            state,
            _follow: follow,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.state.video_id
    }

    pub fn is_favourite(&self) -> bool {
        self.state.flag.read(|f| *f)
    }

    pub async fn refresh(&self) -> Result<()> {
        self.state.refresh().await
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.flag.subscribe()
    }
}

#[derive(Debug, Clone)]
struct PlayedState {
    library: Library,
    video_id: Arc<str>,
    flag: Observable<bool>,
}

impl PlayedState {
    async fn refresh(&self) -> Result<()> {
        let played = self.library.was_played(&self.video_id).await?;
        self.flag.update(|f| *f = played);
        Ok(())
    }
}

/// Whether one song appears in the playback history
#[derive(Debug)]
pub struct WasPlayedWatcher {
    state: PlayedState,
    _follow: FollowHandle,
}

impl WasPlayedWatcher {
    pub(super) fn new(library: Library, video_id: &str) -> Self {
        let state = PlayedState {
            library: library.clone(),
            video_id: video_id.into(),
            flag: Observable::default(),
        };

        let follower = state.clone();
        let follow = library.follow(
            |event| matches!(event, LibraryEvent::PlaybackHistoryChanged),
            move || {
                let state = follower.clone();
                async move {
                    if let Err(e) = state.refresh().await {
                        warn!("Failed to refresh play state of {}: {}", state.video_id, e);
                    }
                }
            },
        );

        Self {
            state,
            _follow: follow,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.state.video_id
    }

    pub fn was_played(&self) -> bool {
        self.state.flag.read(|f| *f)
    }

    pub async fn refresh(&self) -> Result<()> {
        self.state.refresh().await
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.flag.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::library::test_library;

    async fn wait_until(rx: &mut watch::Receiver<u64>, mut done: impl FnMut() -> bool) {
        timeout(Duration::from_secs(5), async {
            while !done() {
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("watcher did not update in time");
    }

    #[tokio::test]
    async fn test_favourite_watcher_follows_changes() {
        let library = test_library().await;
        library
            .add_favourite("FGBhQbmPwH8", "One More Time", "Daft Punk", "")
            .await
            .unwrap();

        let watcher = library.favourite_watcher("FGBhQbmPwH8").unwrap();
        let mut rx = watcher.subscribe();
        wait_until(&mut rx, || watcher.is_favourite()).await;

        library.remove_favourite("FGBhQbmPwH8").await.unwrap();
        wait_until(&mut rx, || !watcher.is_favourite()).await;
    }

    #[tokio::test]
    async fn test_was_played_watcher_follows_history() {
        let library = test_library().await;
        let watcher = library.was_played_watcher("K0HSD_i2DvA").unwrap();
        watcher.refresh().await.unwrap();
        assert!(!watcher.was_played());

        let mut rx = watcher.subscribe();
        library
            .add_playback_history_item("K0HSD_i2DvA", "Around the World", "Daft Punk", "")
            .await
            .unwrap();
        wait_until(&mut rx, || watcher.was_played()).await;
        assert_eq!(watcher.video_id(), "K0HSD_i2DvA");
    }
}
