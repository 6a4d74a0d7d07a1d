//! Spotify Web API backend

use std::sync::Arc;
use async_trait::async_trait;
use chrono::TimeDelta;
use futures::{StreamExt, TryStreamExt};
use rspotify::{
    model::{
        AlbumId, PlayableItem, PlaylistId, SearchResult, SearchType, SimplifiedArtist, TrackId,
    },
    prelude::*,
    ClientCredsSpotify,
};

use crate::model::{Playlist, SourceKind, TrackDescriptor};
use super::{LoadResult, MediaBackend};

pub const SPOTIFY_SEARCH_PREFIX: &str = "spsearch:";
const COLLECTION_TRACK_LIMIT: usize = 500;
const WEB_HOSTS: &[&str] = &[
    "https://open.spotify.com/",
    "http://open.spotify.com/",
    "open.spotify.com/",
];

/// What a user-supplied identifier points at on Spotify
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpotifyIdentifier {
    Track(String),
    Album(String),
    Playlist(String),
    Search(String),
    Unsupported,
}

impl SpotifyIdentifier {
    /// Accepts `spotify:<kind>:<id>` URIs, open.spotify.com links and
    /// `spsearch:` queries.
    pub fn parse(identifier: &str) -> Self {
        let trimmed = identifier.trim();

        if let Some(query) = trimmed.strip_prefix(SPOTIFY_SEARCH_PREFIX) {
            let query = query.trim();
            if query.is_empty() {
                return Self::Unsupported;
            }
            return Self::Search(query.to_string());
        }

        if let Some(rest) = trimmed.strip_prefix("spotify:") {
            let mut parts = rest.split(':');
            return match (parts.next(), parts.next(), parts.next()) {
                (Some(kind), Some(id), None) => Self::from_kind(kind, id),
                _ => Self::Unsupported,
            };
        }

        for host in WEB_HOSTS {
            if let Some(path) = trimmed.strip_prefix(host) {
                let path = path.split(['?', '#']).next().unwrap_or_default();
                let mut segments = path
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .skip_while(|s| s.starts_with("intl-"));
                return match (segments.next(), segments.next()) {
                    (Some(kind), Some(id)) => Self::from_kind(kind, id),
                    _ => Self::Unsupported,
                };
            }
        }

        Self::Unsupported
    }

    fn from_kind(kind: &str, id: &str) -> Self {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Self::Unsupported;
        }
        match kind {
            "track" => Self::Track(id.to_string()),
            "album" => Self::Album(id.to_string()),
            "playlist" => Self::Playlist(id.to_string()),
            _ => Self::Unsupported,
        }
    }
}

/// Resolves identifiers against the Spotify catalogue
#[derive(Clone)]
pub struct SpotifyBackend {
    client: Arc<ClientCredsSpotify>,
    search_limit: u32,
}

impl SpotifyBackend {
    pub fn new(client: ClientCredsSpotify, search_limit: u32) -> Self {
        Self {
            client: Arc::new(client),
            search_limit: search_limit.max(1),
        }
    }

    async fn load_track(&self, id: &str) -> LoadResult {
        let track_id = match TrackId::from_id(id) {
            Ok(track_id) => track_id,
            Err(e) => {
                tracing::debug!(id, error = %e, "Invalid track id");
                return LoadResult::NoMatches;
            }
        };

        match self.client.track(track_id, None).await {
            Ok(track) => match descriptor(
                track.id.as_ref(),
                &track.name,
                &track.artists,
                track.duration,
                SourceKind::Direct,
            ) {
                Some(descriptor) => LoadResult::TrackLoaded(descriptor),
                None => LoadResult::NoMatches,
            },
            Err(e) => LoadResult::LoadFailed(e.to_string()),
        }
    }

    async fn load_album(&self, id: &str) -> LoadResult {
        let album_id = match AlbumId::from_id(id) {
            Ok(album_id) => album_id,
            Err(e) => {
                tracing::debug!(id, error = %e, "Invalid album id");
                return LoadResult::NoMatches;
            }
        };

        let album = match self.client.album(album_id.clone(), None).await {
            Ok(album) => album,
            Err(e) => return LoadResult::LoadFailed(e.to_string()),
        };

        // The album object only embeds the first page of tracks
        let items: Vec<_> = match self
            .client
            .album_track(album_id, None)
            .take(COLLECTION_TRACK_LIMIT)
            .try_collect()
            .await
        {
            Ok(items) => items,
            Err(e) => return LoadResult::LoadFailed(e.to_string()),
        };

        let tracks = items
            .iter()
            .filter_map(|track| {
                descriptor(
                    track.id.as_ref(),
                    &track.name,
                    &track.artists,
                    track.duration,
                    SourceKind::PlaylistMember,
                )
            })
            .collect();

        LoadResult::PlaylistLoaded(Playlist::new(album.name, tracks))
    }

    async fn load_playlist(&self, id: &str) -> LoadResult {
        let playlist_id = match PlaylistId::from_id(id) {
            Ok(playlist_id) => playlist_id,
            Err(e) => {
                tracing::debug!(id, error = %e, "Invalid playlist id");
                return LoadResult::NoMatches;
            }
        };

        let playlist = match self.client.playlist(playlist_id.clone(), None, None).await {
            Ok(playlist) => playlist,
            Err(e) => return LoadResult::LoadFailed(e.to_string()),
        };

        let items: Vec<_> = match self
            .client
            .playlist_items(playlist_id, None, None)
            .take(COLLECTION_TRACK_LIMIT)
            .try_collect()
            .await
        {
            Ok(items) => items,
            Err(e) => return LoadResult::LoadFailed(e.to_string()),
        };

        // Episodes and unavailable entries are skipped
        let tracks = items
            .iter()
            .filter_map(|item| match &item.track {
                Some(PlayableItem::Track(track)) => descriptor(
                    track.id.as_ref(),
                    &track.name,
                    &track.artists,
                    track.duration,
                    SourceKind::PlaylistMember,
                ),
                _ => None,
            })
            .collect();

        LoadResult::PlaylistLoaded(Playlist::new(playlist.name, tracks))
    }

    async fn search(&self, query: &str) -> LoadResult {
        let result = self
            .client
            .search(query, SearchType::Track, None, None, Some(self.search_limit), None)
            .await;

        match result {
            Ok(SearchResult::Tracks(page)) => {
                let tracks: Vec<TrackDescriptor> = page
                    .items
                    .iter()
                    .filter_map(|track| {
                        descriptor(
                            track.id.as_ref(),
                            &track.name,
                            &track.artists,
                            track.duration,
                            SourceKind::SearchResult,
                        )
                    })
                    .collect();
                if tracks.is_empty() {
                    LoadResult::NoMatches
                } else {
                    LoadResult::PlaylistLoaded(Playlist::search_result(query, tracks))
                }
            }
            Ok(_) => LoadResult::NoMatches,
            Err(e) => LoadResult::LoadFailed(e.to_string()),
        }
    }
}

#[async_trait]
impl MediaBackend for SpotifyBackend {
    async fn load_item(&self, identifier: &str) -> LoadResult {
        let parsed = SpotifyIdentifier::parse(identifier);
        tracing::debug!(identifier, parsed = ?parsed, "API: load_item");

        match parsed {
            SpotifyIdentifier::Track(id) => self.load_track(&id).await,
            SpotifyIdentifier::Album(id) => self.load_album(&id).await,
            SpotifyIdentifier::Playlist(id) => self.load_playlist(&id).await,
            SpotifyIdentifier::Search(query) => self.search(&query).await,
            SpotifyIdentifier::Unsupported => LoadResult::NoMatches,
        }
    }

    fn name(&self) -> &str {
        "spotify"
    }
}

fn descriptor(
    id: Option<&TrackId<'_>>,
    name: &str,
    artists: &[SimplifiedArtist],
    duration: TimeDelta,
    source: SourceKind,
) -> Option<TrackDescriptor> {
    let id = id?;
    let author = artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Some(
        TrackDescriptor::new(format!("spotify:track:{}", id.id()), name, source)
            .with_author(author)
            .with_duration_ms(duration.num_milliseconds().max(0) as u32),
    )
}
