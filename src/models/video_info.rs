//! Resolves a video id into playable stream information

use tokio::sync::watch;
use tracing::debug;

use super::{Generation, Observable};
use crate::api::{ApiWorker, VideoInfo};

#[derive(Debug, Default)]
struct ExtractorState {
    video_id: String,
    info: Option<VideoInfo>,
    loading: bool,
}

#[derive(Debug, Clone)]
pub struct VideoInfoExtractor {
    worker: ApiWorker,
    state: Observable<ExtractorState>,
    generation: Generation,
}

impl VideoInfoExtractor {
    pub fn new(worker: ApiWorker) -> Self {
        Self {
            worker,
            state: Observable::default(),
            generation: Generation::default(),
        }
    }

    pub fn video_id(&self) -> String {
        self.state.read(|s| s.video_id.clone())
    }

    /// Extract info for a video. An empty id clears the current info.
    pub async fn set_video_id(&self, video_id: &str) {
        let generation = self.generation.next();

        if video_id.is_empty() {
            self.state.update(|s| {
                s.video_id.clear();
                s.info = None;
                s.loading = false;
            });
            return;
        }

        self.state.update(|s| {
            s.video_id = video_id.to_string();
            s.loading = true;
        });

        let result = self.worker.extract_video_info(video_id).await;
        if !self.generation.is_current(generation) {
            debug!("Dropping outdated video info for {}", video_id);
            return;
        }

        self.state.update(|s| {
            s.info = result.ok();
            s.loading = false;
        });
    }

    pub fn loading(&self) -> bool {
        self.state.read(|s| s.loading)
    }

    pub fn title(&self) -> String {
        self.state
            .read(|s| s.info.as_ref().map(|i| i.title.clone()))
            .unwrap_or_default()
    }

    pub fn thumbnail(&self) -> String {
        self.state
            .read(|s| s.info.as_ref().map(|i| i.thumbnail.clone()))
            .unwrap_or_default()
    }

    /// Stream url of the best audio-only format
    pub fn audio_url(&self) -> Option<String> {
        self.state.read(|s| {
            s.info
                .as_ref()
                .and_then(|i| i.best_audio_url())
                .map(str::to_string)
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.subscribe()
    }
}
