use anyhow::{Context, Result};
use rspotify::{ClientCredsSpotify, Config, Credentials};

use crate::config::SpotifyCredentials;

/// Authorize with the client-credentials flow.
///
/// Catalogue lookups (tracks, albums, playlists, search) need no user
/// scopes, so no browser round trip is involved. rspotify refreshes the
/// token on its own once it expires.
pub async fn authorize(credentials: &SpotifyCredentials) -> Result<ClientCredsSpotify> {
    tracing::info!("Requesting Spotify client-credentials token");

    let creds = Credentials::new(&credentials.client_id, &credentials.client_secret);
    let spotify = ClientCredsSpotify::with_config(
        creds,
        Config {
            token_cached: false,
            token_refreshing: true,
            ..Default::default()
        },
    );

    spotify
        .request_token()
        .await
        .context("Spotify rejected the client credentials")?;

    tracing::info!("Spotify token acquired");
    Ok(spotify)
}
