//! Command-line and environment configuration

use std::path::PathBuf;
use anyhow::{bail, Result};
use clap::Parser;

use crate::controller::{ResolverConfig, DEFAULT_FALLBACK_PREFIX};
use crate::logging::DEFAULT_LOG_DIR;

const DEFAULT_SETTINGS_PATH: &str = ".config/settings.json";
const DEFAULT_SEARCH_LIMIT: u32 = 5;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "musicplayer-rs",
    version,
    about = "Resolve tracks and manage a play queue from the terminal"
)]
pub struct Cli {
    /// Spotify application client id
    #[arg(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// Spotify application client secret
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Settings file, rewritten on every change
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
    pub settings: PathBuf,

    /// Directory for rotating log files
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,

    /// Number of hits requested for a search query
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub search_limit: u32,

    /// Prefix prepended when an identifier yields no results
    #[arg(long, default_value = DEFAULT_FALLBACK_PREFIX)]
    pub fallback_prefix: String,
}

#[derive(Clone, Debug)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub credentials: SpotifyCredentials,
    pub settings_path: PathBuf,
    pub log_dir: PathBuf,
    pub search_limit: u32,
    pub resolver: ResolverConfig,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let (client_id, client_secret) = match (cli.client_id, cli.client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => (id, secret),
            _ => bail!(
                "Spotify credentials missing: set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET"
            ),
        };

        if cli.fallback_prefix.trim().is_empty() {
            bail!("--fallback-prefix must not be empty");
        }

        Ok(Self {
            credentials: SpotifyCredentials { client_id, client_secret },
            settings_path: cli.settings,
            log_dir: cli.log_dir,
            search_limit: cli.search_limit.clamp(1, 50),
            resolver: ResolverConfig::default().with_fallback_prefix(cli.fallback_prefix),
        })
    }
}
