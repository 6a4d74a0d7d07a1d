use std::sync::Arc;
use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use musicplayer_rs::auth;
use musicplayer_rs::backend::SpotifyBackend;
use musicplayer_rs::config::{AppConfig, Cli};
use musicplayer_rs::controller::{JsonFileSink, LogListener, MusicPlayer, SettingsStore};
use musicplayer_rs::devices::{CpalDevices, OutputDevices};
use musicplayer_rs::logging;
use musicplayer_rs::shell::{self, ConsoleListener, ShellCommand};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init_logging(&cli.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== musicplayer-rs starting ===");

    let config = AppConfig::from_cli(cli)?;

    let settings = SettingsStore::open(JsonFileSink::new(&config.settings_path))?;
    tracing::info!(
        path = %config.settings_path.display(),
        volume = settings.volume(),
        repeat = ?settings.repeat(),
        "Settings ready"
    );

    let spotify = auth::authorize(&config.credentials).await?;
    let backend = SpotifyBackend::new(spotify, config.search_limit);

    let (player, task) = MusicPlayer::spawn(backend, settings, config.resolver.clone());
    player.register(Arc::new(LogListener)).await?;
    player.register(Arc::new(ConsoleListener)).await?;

    println!("{}", shell::HELP);

    let devices = CpalDevices::new();
    let res = run_shell(&player, &devices).await;

    player.shutdown();
    if let Err(e) = task.await {
        tracing::error!(error = %e, "Music player task ended abnormally");
    }

    if let Err(err) = &res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("musicplayer-rs shutting down");
    res
}

async fn run_shell(player: &MusicPlayer, devices: &dyn OutputDevices) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("! {}", e);
                continue;
            }
        };

        tracing::debug!(command = ?command, "Shell command");
        match shell::execute(player, devices, command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Command failed");
                println!("! {}", e);
            }
        }
    }

    Ok(())
}
