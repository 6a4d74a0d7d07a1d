//! In-process event bus for resolution and queue updates.
//!
//! Listeners are invoked synchronously, in registration order, on the
//! player's owner task. Every invocation is isolated: an error or a panic in
//! one listener is logged and the remaining listeners still run. A broadcast
//! channel carries the same events to async subscribers.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use anyhow::Result;
use tokio::sync::broadcast;

use crate::error::ResolveError;
use crate::model::{Playlist, ResolveMode, TrackDescriptor};
use super::scheduler::QueueSnapshot;

const BROADCAST_CAPACITY: usize = 64;

/// State changes published by the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    TrackResolved { mode: ResolveMode, track: TrackDescriptor },
    PlaylistResolved { mode: ResolveMode, playlist: Playlist },
    SearchFailed { reason: String, cause: ResolveError },
    QueueUpdated(QueueSnapshot),
}

impl PlayerEvent {
    /// Route this event to the matching listener callback
    pub fn dispatch(&self, listener: &dyn MusicPlayerEvents) -> Result<()> {
        match self {
            PlayerEvent::TrackResolved { mode, track } => listener.on_search_track(*mode, track),
            PlayerEvent::PlaylistResolved { mode, playlist } => {
                listener.on_search_track_list(*mode, playlist)
            }
            PlayerEvent::SearchFailed { reason, cause } => listener.on_search_failed(reason, cause),
            PlayerEvent::QueueUpdated(snapshot) => listener.on_queue_updated(snapshot),
        }
    }
}

/// Callbacks for UI layers and overlays. All methods default to no-ops.
pub trait MusicPlayerEvents: Send + Sync {
    fn on_search_track(&self, _mode: ResolveMode, _track: &TrackDescriptor) -> Result<()> {
        Ok(())
    }

    fn on_search_track_list(&self, _mode: ResolveMode, _playlist: &Playlist) -> Result<()> {
        Ok(())
    }

    fn on_search_failed(&self, _reason: &str, _cause: &ResolveError) -> Result<()> {
        Ok(())
    }

    fn on_queue_updated(&self, _snapshot: &QueueSnapshot) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct EventBus {
    listeners: Vec<(ListenerId, Arc<dyn MusicPlayerEvents>)>,
    next_id: u64,
    sender: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            listeners: Vec::new(),
            next_id: 0,
            sender,
        }
    }

    pub fn register(&mut self, listener: Arc<dyn MusicPlayerEvents>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        tracing::debug!(listener_id = id.0, total = self.listeners.len(), "Listener registered");
        id
    }

    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        before != self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Run `action` once per listener. Returns how many invocations failed.
    pub fn for_each<F>(&self, action: F) -> usize
    where
        F: Fn(&dyn MusicPlayerEvents) -> Result<()>,
    {
        let mut failures = 0;
        for (id, listener) in &self.listeners {
            match panic::catch_unwind(AssertUnwindSafe(|| action(listener.as_ref()))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    tracing::warn!(listener_id = id.0, error = %e, "Event listener failed");
                }
                Err(_) => {
                    failures += 1;
                    tracing::error!(listener_id = id.0, "Event listener panicked");
                }
            }
        }
        failures
    }

    /// Deliver `event` to every listener, then to broadcast subscribers
    pub fn publish(&self, event: PlayerEvent) {
        self.for_each(|listener| event.dispatch(listener));
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn sender(&self) -> broadcast::Sender<PlayerEvent> {
        self.sender.clone()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes every event to the tracing log
pub struct LogListener;

impl MusicPlayerEvents for LogListener {
    fn on_search_track(&self, mode: ResolveMode, track: &TrackDescriptor) -> Result<()> {
        tracing::info!(
            mode = %mode,
            track = %track,
            identifier = %track.identifier,
            "Track resolved"
        );
        Ok(())
    }

    fn on_search_track_list(&self, mode: ResolveMode, playlist: &Playlist) -> Result<()> {
        tracing::info!(
            mode = %mode,
            name = %playlist.name,
            tracks = playlist.tracks.len(),
            search_result = playlist.is_search_result,
            "Playlist resolved"
        );
        Ok(())
    }

    fn on_search_failed(&self, reason: &str, cause: &ResolveError) -> Result<()> {
        tracing::warn!(reason, cause = ?cause, "Search failed");
        Ok(())
    }

    fn on_queue_updated(&self, snapshot: &QueueSnapshot) -> Result<()> {
        tracing::debug!(
            current = ?snapshot.current.as_ref().map(|t| t.title.as_str()),
            pending = snapshot.pending.len(),
            "Queue updated"
        );
        Ok(())
    }
}
