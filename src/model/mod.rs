//! Model module - data types shared across the player
//!
//! - `types`: resolution modes, requests and small setting enums
//! - `track`: track descriptors and playlists returned by a backend
//! - `settings`: the persisted settings snapshot

mod types;
mod track;
mod settings;

pub use types::{
    Attempt, OverlayPosition, Repeat, ResolutionRequest, ResolveMode,
    DEFAULT_SEARCH_PREFIXES,
};

pub use track::{Playlist, SourceKind, TrackDescriptor};

pub use settings::{Settings, DEFAULT_VOLUME_PERCENT, MAX_VOLUME_PERCENT};
