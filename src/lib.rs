//! AudioTube core - local library, list models and thumbnail cache for a
//! YouTube Music desktop client
//!
//! The YouTube Music web client itself is not part of this crate; it is
//! plugged in through [`api::YtMusicClient`].

pub mod api;
pub mod database;
pub mod import;
pub mod library;
pub mod models;
pub mod settings;
pub mod thumbnails;
pub mod utils;
