//! Track descriptors produced by resolution

use chrono::TimeDelta;

/// Where a resolved track came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Direct,
    SearchResult,
    PlaylistMember,
}

/// A playable track as reported by the media backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub identifier: String,
    pub title: String,
    pub author: String,
    pub duration_ms: u32,
    pub source: SourceKind,
}

impl TrackDescriptor {
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        source: SourceKind,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            author: String::new(),
            duration_ms: 0,
            source,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Duration formatted as `m:ss`, or `h:mm:ss` for long tracks
    pub fn display_duration(&self) -> String {
        let duration = TimeDelta::milliseconds(self.duration_ms as i64);
        let hours = duration.num_hours();
        let minutes = duration.num_minutes() % 60;
        let seconds = duration.num_seconds() % 60;
        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{}:{:02}", minutes, seconds)
        }
    }
}

impl std::fmt::Display for TrackDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.author.is_empty() {
            write!(f, "{} [{}]", self.title, self.display_duration())
        } else {
            write!(f, "{} - {} [{}]", self.author, self.title, self.display_duration())
        }
    }
}

/// A multi-track result: an album, a playlist, or a wrapped list of search hits
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<TrackDescriptor>,
    pub is_search_result: bool,
}

impl Playlist {
    pub fn new(name: impl Into<String>, tracks: Vec<TrackDescriptor>) -> Self {
        Self {
            name: name.into(),
            tracks,
            is_search_result: false,
        }
    }

    pub fn search_result(query: impl Into<String>, tracks: Vec<TrackDescriptor>) -> Self {
        Self {
            name: format!("Search results for: {}", query.into()),
            tracks,
            is_search_result: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
