//! Track queue: one current slot plus a pending FIFO with head insertion

use std::collections::VecDeque;
use rand::Rng;

use crate::model::{Repeat, Settings, TrackDescriptor};

/// How `next_track` picks the following track
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvancePolicy {
    pub repeat: Repeat,
    pub shuffle: bool,
}

impl From<&Settings> for AdvancePolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            repeat: settings.repeat,
            shuffle: settings.shuffle,
        }
    }
}

/// Point-in-time copy of the queue for listeners and status queries
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub current: Option<TrackDescriptor>,
    pub pending: Vec<TrackDescriptor>,
}

#[derive(Debug, Default)]
pub struct TrackScheduler {
    current: Option<TrackDescriptor>,
    pending: VecDeque<TrackDescriptor>,
}

impl TrackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `track` immediately. The pending queue is left untouched.
    /// Returns the track that was playing before, if any.
    pub fn play(&mut self, track: TrackDescriptor) -> Option<TrackDescriptor> {
        tracing::debug!(track = %track.title, "Scheduler: play");
        self.current.replace(track)
    }

    /// Insert at the front of the pending queue. Repeated calls reverse
    /// call order, so playlists are inserted back to front.
    pub fn queue_first(&mut self, track: TrackDescriptor) {
        self.pending.push_front(track);
    }

    pub fn queue_last(&mut self, track: TrackDescriptor) {
        self.pending.push_back(track);
    }

    /// Advance after the current track finished
    pub fn next_track(&mut self, policy: AdvancePolicy) -> Option<&TrackDescriptor> {
        self.next_track_with(policy, &mut rand::rng())
    }

    pub fn next_track_with<R: Rng + ?Sized>(
        &mut self,
        policy: AdvancePolicy,
        rng: &mut R,
    ) -> Option<&TrackDescriptor> {
        if policy.repeat == Repeat::Single && self.current.is_some() {
            return self.current.as_ref();
        }

        let finished = self.current.take();
        if policy.repeat == Repeat::All {
            if let Some(track) = finished {
                self.pending.push_back(track);
            }
        }

        self.current = if policy.shuffle && !self.pending.is_empty() {
            let index = rng.random_range(0..self.pending.len());
            self.pending.remove(index)
        } else {
            self.pending.pop_front()
        };

        tracing::debug!(
            current = ?self.current.as_ref().map(|t| t.title.as_str()),
            pending = self.pending.len(),
            "Scheduler: next track"
        );
        self.current.as_ref()
    }

    /// Drop the current track without advancing
    pub fn stop(&mut self) -> Option<TrackDescriptor> {
        self.current.take()
    }

    /// Drop all pending tracks, keep the current one
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn current(&self) -> Option<&TrackDescriptor> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> &VecDeque<TrackDescriptor> {
        &self.pending
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            current: self.current.clone(),
            pending: self.pending.iter().cloned().collect(),
        }
    }
}
