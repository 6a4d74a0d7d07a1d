//! Track resolution and queue orchestration for a terminal music player.
//!
//! Identifiers typed by the user are resolved through a [`backend::MediaBackend`],
//! placed into the play queue, and reported to listeners through the player's
//! event bus. Settings are persisted on every change.

pub mod auth;
pub mod backend;
pub mod config;
pub mod controller;
pub mod devices;
pub mod error;
pub mod logging;
pub mod model;
pub mod shell;

pub use controller::{MusicPlayer, MusicPlayerEvents, PlayerEvent, PlayerStatus};
pub use error::{PlayerError, ResolveError, SettingsError};
