//! Single background worker in front of the API client
//!
//! Requests are served one at a time in arrival order. Each caller gets its
//! result back through a oneshot channel; failures are also published on the
//! shared [`ErrorHandler`].

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error};

use super::{
    AlbumPage, ApiError, ApiResult, ArtistPage, PlaylistPage, SearchResultItem, SongDetails,
    VideoInfo, YtMusicClient,
};

const ERROR_CHANNEL_CAPACITY: usize = 32;

/// Broadcasts human readable error messages from failed API calls
#[derive(Debug, Clone)]
pub struct ErrorHandler {
    tx: broadcast::Sender<String>,
}

impl Default for ErrorHandler {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl ErrorHandler {
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn report(&self, err: &ApiError) {
        error!("API error: {}", err);
        // Nobody listening is fine
        let _ = self.tx.send(err.to_string());
    }
}

enum Request {
    Search {
        query: String,
        reply: oneshot::Sender<ApiResult<Vec<SearchResultItem>>>,
    },
    Artist {
        channel_id: String,
        reply: oneshot::Sender<ApiResult<ArtistPage>>,
    },
    Album {
        browse_id: String,
        reply: oneshot::Sender<ApiResult<AlbumPage>>,
    },
    Playlist {
        playlist_id: String,
        reply: oneshot::Sender<ApiResult<PlaylistPage>>,
    },
    Song {
        video_id: String,
        reply: oneshot::Sender<ApiResult<Option<SongDetails>>>,
    },
    VideoInfo {
        video_id: String,
        reply: oneshot::Sender<ApiResult<VideoInfo>>,
    },
}

/// Cheap-to-clone handle to the background worker
#[derive(Clone)]
pub struct ApiWorker {
    tx: mpsc::UnboundedSender<Request>,
    errors: ErrorHandler,
}

impl std::fmt::Debug for ApiWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiWorker")
            .field("running", &!self.tx.is_closed())
            .finish()
    }
}

impl ApiWorker {
    /// Start the worker task on the current tokio runtime
    ///
    /// The task ends once every handle has been dropped.
    pub fn spawn(client: Arc<dyn YtMusicClient>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let errors = ErrorHandler::default();
        tokio::spawn(run(client, rx, errors.clone()));
        Self { tx, errors }
    }

    pub fn errors(&self) -> &ErrorHandler {
        &self.errors
    }

    pub async fn search(&self, query: &str) -> ApiResult<Vec<SearchResultItem>> {
        let query = query.to_string();
        self.call(|reply| Request::Search { query, reply }).await
    }

    pub async fn fetch_artist(&self, channel_id: &str) -> ApiResult<ArtistPage> {
        let channel_id = channel_id.to_string();
        self.call(|reply| Request::Artist { channel_id, reply })
            .await
    }

    pub async fn fetch_album(&self, browse_id: &str) -> ApiResult<AlbumPage> {
        let browse_id = browse_id.to_string();
        self.call(|reply| Request::Album { browse_id, reply }).await
    }

    pub async fn fetch_playlist(&self, playlist_id: &str) -> ApiResult<PlaylistPage> {
        let playlist_id = playlist_id.to_string();
        self.call(|reply| Request::Playlist { playlist_id, reply })
            .await
    }

    pub async fn fetch_song(&self, video_id: &str) -> ApiResult<Option<SongDetails>> {
        let video_id = video_id.to_string();
        self.call(|reply| Request::Song { video_id, reply }).await
    }

    pub async fn extract_video_info(&self, video_id: &str) -> ApiResult<VideoInfo> {
        let video_id = video_id.to_string();
        self.call(|reply| Request::VideoInfo { video_id, reply })
            .await
    }

    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<ApiResult<T>>) -> Request,
    ) -> ApiResult<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .map_err(|_| ApiError::WorkerGone)?;
        rx.await.map_err(|_| ApiError::WorkerGone)?
    }
}

async fn run(
    client: Arc<dyn YtMusicClient>,
    mut rx: mpsc::UnboundedReceiver<Request>,
    errors: ErrorHandler,
) {
    debug!("API worker started");

    while let Some(request) = rx.recv().await {
        match request {
            Request::Search { query, reply } => {
                debug!("search: {}", query);
                respond(reply, client.search(&query).await, &errors);
            }
            Request::Artist { channel_id, reply } => {
                debug!("fetch artist: {}", channel_id);
                respond(reply, client.fetch_artist(&channel_id).await, &errors);
            }
            Request::Album { browse_id, reply } => {
                debug!("fetch album: {}", browse_id);
                respond(reply, client.fetch_album(&browse_id).await, &errors);
            }
            Request::Playlist { playlist_id, reply } => {
                debug!("fetch playlist: {}", playlist_id);
                respond(reply, client.fetch_playlist(&playlist_id).await, &errors);
            }
            Request::Song { video_id, reply } => {
                debug!("fetch song: {}", video_id);
                respond(reply, client.fetch_song(&video_id).await, &errors);
            }
            Request::VideoInfo { video_id, reply } => {
                debug!("extract video info: {}", video_id);
                respond(reply, client.extract_video_info(&video_id).await, &errors);
            }
        }
    }

    debug!("API worker stopped");
}

fn respond<T>(reply: oneshot::Sender<ApiResult<T>>, result: ApiResult<T>, errors: &ErrorHandler) {
    if let Err(e) = &result {
        errors.report(e);
    }
    // The caller may have given up on the answer
    let _ = reply.send(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeClient;

    #[tokio::test]
    async fn test_worker_returns_client_results() {
        let client = FakeClient::default().with_song("dQw4w9WgXcQ", "Never Gonna Give You Up", "Rick Astley");
        let worker = ApiWorker::spawn(Arc::new(client));

        let song = worker.fetch_song("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(song.unwrap().author, "Rick Astley");
        assert_eq!(worker.fetch_song("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_worker_reports_errors() {
        let worker = ApiWorker::spawn(Arc::new(FakeClient::default()));
        let mut errors = worker.errors().subscribe();

        let result = worker.fetch_artist("UCnope").await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));

        let message = errors.recv().await.unwrap();
        assert!(message.contains("UCnope"));
    }
}
