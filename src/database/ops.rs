//! Database operations organized by table

mod favourites;
mod history;
mod playlists;
mod searches;
mod songs;

pub use favourites::*;
pub use history::*;
pub use playlists::*;
pub use searches::*;
pub use songs::*;
