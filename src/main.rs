//! AudioTube library maintenance
//!
//! Opens the local library, tidies the thumbnail cache and either prints a
//! summary of the library or exports one playlist.

use anyhow::{Context, Result, bail};
use tracing::info;

use audiotube::library::Library;
use audiotube::settings::Settings;
use audiotube::thumbnails;

const USAGE: &str = "usage: audiotube [export <playlist-id> <file>]";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let settings = Settings::load();
    let library = Library::open(&settings).await?;

    let thumbnails_dir = settings.thumbnails_dir();
    thumbnails::cleanup_temp_files(&thumbnails_dir);
    thumbnails::enforce_cache_limit(&thumbnails_dir, settings.storage.max_cache_mb);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => summary(&library, &settings).await,
        [command, playlist_id, target] if command == "export" => {
            export(&library, playlist_id, target).await
        }
        _ => bail!(USAGE),
    }
}

async fn export(library: &Library, playlist_id: &str, target: &str) -> Result<()> {
    let playlist_id: i64 = playlist_id
        .parse()
        .with_context(|| format!("Invalid playlist id {}", playlist_id))?;
    let Some(playlist) = library.playlist(playlist_id).await? else {
        bail!("No playlist with id {}", playlist_id);
    };

    let model = library.local_playlist();
    model.set_playlist_id(playlist_id).await?;
    model.export_playlist(target).await?;

    info!("Exported \"{}\" to {}", playlist.title, target);
    Ok(())
}

async fn summary(library: &Library, settings: &Settings) -> Result<()> {
    let songs = library.database().count_songs().await?;
    let favourites = library.favourite_songs().await?;
    let history = library.played_songs().await?;
    let searches = library.search_history().await?;
    let playlists = library.all_playlists().await?;
    let cache = thumbnails::cache_stats(&settings.thumbnails_dir());

    info!("Library at {}", settings.database_path().display());
    info!(
        "{} songs, {} favourites, {} played, {} searches",
        songs,
        favourites.len(),
        history.len(),
        searches.len()
    );
    for playlist in &playlists {
        let entries = library.playlist_entries(playlist.playlist_id).await?;
        info!(
            "Playlist {}: {} ({} songs)",
            playlist.playlist_id,
            playlist.title,
            entries.len()
        );
    }
    info!(
        "Thumbnail cache: {} files, {} MB",
        cache.file_count,
        cache.total_mb()
    );
    Ok(())
}
