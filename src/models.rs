//! List models over the YouTube Music client
//!
//! Each model is a cheap-to-clone handle: views keep one copy to read rows and
//! wait for changes, while the async setters on another copy fetch through the
//! API worker and replace the rows once the answer arrives.

mod album;
mod artist;
mod list;
mod observable;
mod playlist;
mod search;
mod video_info;

pub use album::AlbumModel;
pub use artist::{ArtistItem, ArtistItemKind, ArtistModel};
pub use list::ListModel;
pub use observable::{Generation, Observable};
pub use playlist::PlaylistModel;
pub use search::SearchModel;
pub use video_info::VideoInfoExtractor;

/// Page a view should open after a row was activated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    OpenAlbum(String),
    OpenArtist(String),
    OpenPlaylist(String),
    OpenSong(String),
    OpenVideo(String),
}
