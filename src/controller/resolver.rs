//! Track search: turns backend load results into queue mutations and events.
//!
//! The resolver is a pure state machine over `(request, outcome)`. It never
//! awaits; the player task feeds it outcomes that the loader task produced,
//! so all queue and bus mutations happen on one task.
//!
//! Retry policy: a zero-result outcome (no matches, or an empty playlist) is
//! retried once with the fallback search prefix unless the identifier was
//! already a search query. An explicit load failure is terminal.

use crate::backend::LoadResult;
use crate::error::ResolveError;
use crate::model::{
    Playlist, ResolutionRequest, ResolveMode, TrackDescriptor, DEFAULT_SEARCH_PREFIXES,
};
use super::events::{EventBus, PlayerEvent};
use super::scheduler::TrackScheduler;

pub const DEFAULT_FALLBACK_PREFIX: &str = "spsearch:";
const NO_MATCHES_REASON: &str = "no matches";

#[derive(Clone, Debug)]
pub struct ResolverConfig {
    pub search_prefixes: Vec<String>,
    pub fallback_prefix: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_prefixes: DEFAULT_SEARCH_PREFIXES.iter().map(|p| p.to_string()).collect(),
            fallback_prefix: DEFAULT_FALLBACK_PREFIX.to_string(),
        }
    }
}

impl ResolverConfig {
    /// The fallback prefix always counts as a search prefix, otherwise a
    /// custom prefix could retry forever.
    pub fn with_fallback_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !self.search_prefixes.contains(&prefix) {
            self.search_prefixes.push(prefix.clone());
        }
        self.fallback_prefix = prefix;
        self
    }
}

pub struct TrackSearch {
    config: ResolverConfig,
}

impl TrackSearch {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn request(&self, identifier: impl Into<String>, mode: ResolveMode) -> ResolutionRequest {
        ResolutionRequest::new(identifier, mode, &self.config.search_prefixes)
    }

    /// Apply one backend outcome. Returns the fallback request to dispatch,
    /// if the outcome warrants one.
    pub fn handle(
        &self,
        request: &ResolutionRequest,
        outcome: LoadResult,
        scheduler: &mut TrackScheduler,
        bus: &EventBus,
    ) -> Option<ResolutionRequest> {
        tracing::debug!(
            identifier = %request.identifier,
            mode = %request.mode,
            attempt = ?request.attempt,
            outcome = outcome.kind(),
            "Resolution finished"
        );

        match outcome {
            LoadResult::TrackLoaded(track) => {
                self.apply_track(request.mode, track, scheduler, bus);
                None
            }
            LoadResult::PlaylistLoaded(playlist) => {
                if playlist.is_empty() {
                    return self.no_matches(request, bus);
                }
                if playlist.is_search_result {
                    if let Some(first) = playlist.tracks.into_iter().next() {
                        self.apply_track(request.mode, first, scheduler, bus);
                    }
                } else {
                    self.apply_playlist(request.mode, playlist, scheduler, bus);
                }
                None
            }
            LoadResult::NoMatches => self.no_matches(request, bus),
            LoadResult::LoadFailed(reason) => {
                tracing::warn!(identifier = %request.identifier, reason = %reason, "Load failed");
                bus.publish(PlayerEvent::SearchFailed {
                    cause: ResolveError::load_failed(reason.clone()),
                    reason,
                });
                None
            }
        }
    }

    /// Empty playlists and no-match outcomes are reported the same way
    fn no_matches(&self, request: &ResolutionRequest, bus: &EventBus) -> Option<ResolutionRequest> {
        if let Some(retry) = request.fallback(&self.config.fallback_prefix) {
            tracing::info!(
                identifier = %request.identifier,
                retry = %retry.identifier,
                "No matches, retrying as search"
            );
            return Some(retry);
        }

        bus.publish(PlayerEvent::SearchFailed {
            reason: NO_MATCHES_REASON.to_string(),
            cause: ResolveError::NoMatches,
        });
        None
    }

    fn apply_track(
        &self,
        mode: ResolveMode,
        track: TrackDescriptor,
        scheduler: &mut TrackScheduler,
        bus: &EventBus,
    ) {
        bus.publish(PlayerEvent::TrackResolved {
            mode,
            track: track.clone(),
        });
        match mode {
            ResolveMode::PlayNow => {
                scheduler.play(track);
            }
            ResolveMode::Enqueue => scheduler.queue_last(track),
        }
        bus.publish(PlayerEvent::QueueUpdated(scheduler.snapshot()));
    }

    fn apply_playlist(
        &self,
        mode: ResolveMode,
        playlist: Playlist,
        scheduler: &mut TrackScheduler,
        bus: &EventBus,
    ) {
        bus.publish(PlayerEvent::PlaylistResolved {
            mode,
            playlist: playlist.clone(),
        });

        match mode {
            ResolveMode::PlayNow => {
                let mut tracks = playlist.tracks.into_iter();
                if let Some(first) = tracks.next() {
                    scheduler.play(first);
                }
                // Inserted back to front so the playlist keeps its order
                // ahead of anything already pending
                for track in tracks.rev() {
                    scheduler.queue_first(track);
                }
            }
            ResolveMode::Enqueue => {
                for track in playlist.tracks {
                    scheduler.queue_last(track);
                }
            }
        }
        bus.publish(PlayerEvent::QueueUpdated(scheduler.snapshot()));
    }
}

impl Default for TrackSearch {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}
