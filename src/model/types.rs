//! Core type definitions shared by the resolver, scheduler and settings

use serde::{Deserialize, Serialize};

/// Search prefixes understood as "this identifier is already a query"
pub const DEFAULT_SEARCH_PREFIXES: &[&str] = &["ytsearch:", "scsearch:", "spsearch:"];

/// What to do with a resolved identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveMode {
    /// Replace the current track and start it immediately
    PlayNow,
    /// Append to the pending queue
    Enqueue,
}

impl std::fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveMode::PlayNow => f.write_str("play"),
            ResolveMode::Enqueue => f.write_str("queue"),
        }
    }
}

/// Whether a request is the user's original one or the broadened retry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    Fallback,
}

/// One pending resolution of a user-supplied identifier
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub identifier: String,
    pub mode: ResolveMode,
    pub attempt: Attempt,
    pub is_search: bool,
}

impl ResolutionRequest {
    /// Classify `identifier` against the known search prefixes
    pub fn new(
        identifier: impl Into<String>,
        mode: ResolveMode,
        search_prefixes: &[String],
    ) -> Self {
        let identifier = identifier.into();
        let is_search = search_prefixes
            .iter()
            .any(|prefix| identifier.starts_with(prefix.as_str()));
        Self {
            identifier,
            mode,
            attempt: Attempt::Initial,
            is_search,
        }
    }

    /// The single broadened retry issued after a zero-result resolution.
    ///
    /// Returns `None` when this request is already a search query, which
    /// makes a second retry impossible.
    pub fn fallback(&self, fallback_prefix: &str) -> Option<Self> {
        if self.is_search {
            return None;
        }
        Some(Self {
            identifier: format!("{}{}", fallback_prefix, self.identifier),
            mode: self.mode,
            attempt: Attempt::Fallback,
            is_search: true,
        })
    }
}

/// Repeat mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    #[default]
    No,
    Single,
    All,
}

impl Repeat {
    pub fn cycle(self) -> Self {
        match self {
            Repeat::No => Repeat::Single,
            Repeat::Single => Repeat::All,
            Repeat::All => Repeat::No,
        }
    }
}

/// Screen corner used by the in-game overlay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPosition {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

impl OverlayPosition {
    pub fn forward_cycle(self) -> Self {
        match self {
            OverlayPosition::TopLeft => OverlayPosition::TopRight,
            OverlayPosition::TopRight => OverlayPosition::BottomLeft,
            OverlayPosition::BottomLeft => OverlayPosition::BottomRight,
            OverlayPosition::BottomRight => OverlayPosition::TopLeft,
        }
    }
}
