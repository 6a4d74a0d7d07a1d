//! Line-oriented command shell on top of [`MusicPlayer`]

use anyhow::{anyhow, Result};

use crate::controller::{
    MusicPlayer, MusicPlayerEvents, PlayerStatus, QueueSnapshot, SettingsUpdate,
};
use crate::devices::{pick_device, OutputDevices};
use crate::error::ResolveError;
use crate::model::{Playlist, ResolveMode, Settings, TrackDescriptor};

pub const HELP: &str = "\
commands:
  play <id>        resolve and play now (URI, link or search text)
  queue <id>       resolve and append to the queue
  next | stop | clear | status
  volume <0-100>   repeat | shuffle
  overlay | menu-overlay | key-in-gui | position
  devices          list audio output devices
  device <name|default>
  help | quit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Resolve { identifier: String, mode: ResolveMode },
    Next,
    Stop,
    Clear,
    Status,
    Settings(SettingsUpdate),
    Devices,
    SelectDevice(Option<String>),
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "play" | "p" => Self::resolve(rest, ResolveMode::PlayNow)?,
            "queue" | "q" => Self::resolve(rest, ResolveMode::Enqueue)?,
            "next" | "n" => Self::Next,
            "stop" => Self::Stop,
            "clear" => Self::Clear,
            "status" | "s" => Self::Status,
            "volume" | "vol" => {
                let volume = rest
                    .parse::<u8>()
                    .map_err(|_| anyhow!("volume expects a number between 0 and 100"))?;
                Self::Settings(SettingsUpdate::Volume(volume))
            }
            "repeat" => Self::Settings(SettingsUpdate::CycleRepeat),
            "shuffle" => Self::Settings(SettingsUpdate::ToggleShuffle),
            "overlay" => Self::Settings(SettingsUpdate::ToggleIngameOverlay),
            "menu-overlay" => Self::Settings(SettingsUpdate::ToggleIngameMenuOverlay),
            "key-in-gui" => Self::Settings(SettingsUpdate::ToggleKeyWorkInGui),
            "position" => Self::Settings(SettingsUpdate::CycleOverlayPosition),
            "device" => {
                let device = match rest {
                    "" => return Err(anyhow!("device expects a name or 'default'")),
                    "default" => None,
                    name => Some(name.to_string()),
                };
                Self::SelectDevice(device)
            }
            "devices" => Self::Devices,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(anyhow!("unknown command '{}', try 'help'", other)),
        };
        Ok(Some(command))
    }

    fn resolve(identifier: &str, mode: ResolveMode) -> Result<Self> {
        if identifier.is_empty() {
            return Err(anyhow!("{} expects an identifier", mode));
        }
        Ok(Self::Resolve {
            identifier: identifier.to_string(),
            mode,
        })
    }
}

/// Run one command. Returns `false` once the shell should exit.
pub async fn execute(
    player: &MusicPlayer,
    devices: &dyn OutputDevices,
    command: ShellCommand,
) -> Result<bool> {
    match command {
        ShellCommand::Resolve { identifier, mode } => player.resolve(identifier, mode),
        ShellCommand::Next => player.next(),
        ShellCommand::Stop => player.stop(),
        ShellCommand::Clear => player.clear(),
        ShellCommand::Status => println!("{}", format_status(&player.status().await?)),
        ShellCommand::Settings(update) => {
            let settings = player.update_settings(update).await?;
            println!("{}", format_settings(&settings));
        }
        ShellCommand::Devices => {
            let status = player.status().await?;
            let names = devices.names()?;
            println!("{}", format_devices(&names, status.settings.mixer_device.as_deref()));
        }
        ShellCommand::SelectDevice(needle) => {
            let device = select_device(devices, needle.as_deref())?;
            let settings = player.update_settings(SettingsUpdate::MixerDevice(device)).await?;
            println!("{}", format_settings(&settings));
        }
        ShellCommand::Help => println!("{}", HELP),
        ShellCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Map a user-typed device name onto a listed output device. `None` selects
/// the system default.
pub fn select_device(devices: &dyn OutputDevices, needle: Option<&str>) -> Result<Option<String>> {
    match needle {
        None => Ok(None),
        Some(needle) => pick_device(&devices.names()?, needle).map(Some),
    }
}

pub fn format_devices(names: &[String], selected: Option<&str>) -> String {
    if names.is_empty() {
        return "no output devices found".to_string();
    }
    let mut out = String::from("output devices:");
    let default_marker = if selected.is_none() { "*" } else { " " };
    out.push_str(&format!("\n  {} default", default_marker));
    for name in names {
        let marker = if selected == Some(name.as_str()) { "*" } else { " " };
        out.push_str(&format!("\n  {} {}", marker, name));
    }
    out
}

pub fn format_settings(settings: &Settings) -> String {
    format!(
        "volume {} | repeat {:?} | shuffle {} | overlay {} ({:?}) | menu overlay {} \
         | key in gui {} | device {}",
        settings.volume,
        settings.repeat,
        settings.shuffle,
        settings.show_ingame_overlay,
        settings.ingame_overlay_position,
        settings.show_ingame_menu_overlay,
        settings.key_work_in_gui,
        settings.mixer_device.as_deref().unwrap_or("default"),
    )
}

pub fn format_status(status: &PlayerStatus) -> String {
    let mut out = String::new();
    match &status.queue.current {
        Some(track) => out.push_str(&format!("now playing: {}\n", track)),
        None => out.push_str("now playing: nothing\n"),
    }
    if status.queue.pending.is_empty() {
        out.push_str("queue is empty");
    } else {
        out.push_str(&format!("queue ({}):", status.queue.pending.len()));
        for (index, track) in status.queue.pending.iter().enumerate() {
            out.push_str(&format!("\n  {:>3}. {}", index + 1, track));
        }
    }
    out
}

/// Prints resolution results to stdout
pub struct ConsoleListener;

impl MusicPlayerEvents for ConsoleListener {
    fn on_search_track(&self, mode: ResolveMode, track: &TrackDescriptor) -> Result<()> {
        match mode {
            ResolveMode::PlayNow => println!("> playing {}", track),
            ResolveMode::Enqueue => println!("> queued {}", track),
        }
        Ok(())
    }

    fn on_search_track_list(&self, mode: ResolveMode, playlist: &Playlist) -> Result<()> {
        let verb = match mode {
            ResolveMode::PlayNow => "playing",
            ResolveMode::Enqueue => "queued",
        };
        println!("> {} {} ({} tracks)", verb, playlist.name, playlist.tracks.len());
        Ok(())
    }

    fn on_search_failed(&self, reason: &str, _cause: &ResolveError) -> Result<()> {
        println!("! search failed: {}", reason);
        Ok(())
    }

    fn on_queue_updated(&self, snapshot: &QueueSnapshot) -> Result<()> {
        if let Some(track) = &snapshot.current {
            println!("> now playing {} ({} pending)", track, snapshot.pending.len());
        }
        Ok(())
    }
}
