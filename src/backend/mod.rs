//! Media resolution backends
//!
//! A backend turns an identifier into exactly one [`LoadResult`]. The
//! resolver never talks to a concrete service directly, so tests can plug in
//! a scripted backend and the binary uses [`SpotifyBackend`].

mod spotify;

use async_trait::async_trait;

use crate::model::{Playlist, TrackDescriptor};

pub use spotify::{SpotifyBackend, SpotifyIdentifier};

/// The four possible outcomes of one load request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadResult {
    TrackLoaded(TrackDescriptor),
    PlaylistLoaded(Playlist),
    NoMatches,
    LoadFailed(String),
}

impl LoadResult {
    pub fn kind(&self) -> &'static str {
        match self {
            LoadResult::TrackLoaded(_) => "track_loaded",
            LoadResult::PlaylistLoaded(_) => "playlist_loaded",
            LoadResult::NoMatches => "no_matches",
            LoadResult::LoadFailed(_) => "load_failed",
        }
    }
}

#[async_trait]
pub trait MediaBackend: Send + Sync + 'static {
    /// Resolve `identifier`. Implementations must not panic on unknown input;
    /// anything they cannot interpret is `NoMatches`.
    async fn load_item(&self, identifier: &str) -> LoadResult;

    fn name(&self) -> &str {
        "backend"
    }
}
