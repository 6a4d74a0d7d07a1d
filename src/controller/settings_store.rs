//! Settings store with write-through persistence
//!
//! Every setter writes the complete snapshot through the configured sink,
//! even if the value did not change. Settings change rarely (user toggles),
//! so there is no dirty tracking or debounce.

use std::fs;
use std::path::PathBuf;

use crate::error::SettingsError;
use crate::model::{OverlayPosition, Repeat, Settings, MAX_VOLUME_PERCENT};

/// Durable storage for settings snapshots
pub trait SettingsSink: Send {
    fn persist(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Stores settings as pretty-printed JSON
#[derive(Clone, Debug)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the stored snapshot. A missing file yields defaults.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "No settings file, using defaults");
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        let mut settings: Settings = serde_json::from_str(&content)?;
        if settings.volume > MAX_VOLUME_PERCENT {
            tracing::warn!(volume = settings.volume, "Stored volume out of range, clamping");
            settings.volume = MAX_VOLUME_PERCENT;
        }
        tracing::debug!(path = %self.path.display(), "Settings loaded");
        Ok(settings)
    }
}

impl SettingsSink for JsonFileSink {
    fn persist(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)?;
        tracing::trace!(path = %self.path.display(), "Settings written");
        Ok(())
    }
}

/// A single settings mutation, as sent to the player task
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingsUpdate {
    Volume(u8),
    Repeat(Repeat),
    CycleRepeat,
    Shuffle(bool),
    ToggleShuffle,
    ToggleIngameOverlay,
    ToggleIngameMenuOverlay,
    ToggleKeyWorkInGui,
    CycleOverlayPosition,
    MixerDevice(Option<String>),
}

impl SettingsUpdate {
    pub fn apply(self, store: &mut SettingsStore) -> Result<(), SettingsError> {
        match self {
            SettingsUpdate::Volume(volume) => store.set_volume(volume),
            SettingsUpdate::Repeat(repeat) => store.set_repeat(repeat),
            SettingsUpdate::CycleRepeat => store.set_repeat(store.repeat().cycle()),
            SettingsUpdate::Shuffle(shuffle) => store.set_shuffle(shuffle),
            SettingsUpdate::ToggleShuffle => store.set_shuffle(!store.is_shuffle()),
            SettingsUpdate::ToggleIngameOverlay => {
                store.set_show_ingame_overlay(!store.is_show_ingame_overlay())
            }
            SettingsUpdate::ToggleIngameMenuOverlay => {
                store.set_show_ingame_menu_overlay(!store.is_show_ingame_menu_overlay())
            }
            SettingsUpdate::ToggleKeyWorkInGui => {
                store.set_key_work_in_gui(!store.is_key_work_in_gui())
            }
            SettingsUpdate::CycleOverlayPosition => {
                store.set_ingame_overlay_position(store.ingame_overlay_position().forward_cycle())
            }
            SettingsUpdate::MixerDevice(device) => store.set_mixer_device(device),
        }
    }
}

pub struct SettingsStore {
    settings: Settings,
    sink: Box<dyn SettingsSink>,
}

impl SettingsStore {
    pub fn new(settings: Settings, sink: Box<dyn SettingsSink>) -> Self {
        Self { settings, sink }
    }

    /// Load from `sink` and keep writing back to it
    pub fn open(sink: JsonFileSink) -> Result<Self, SettingsError> {
        let settings = sink.load()?;
        Ok(Self::new(settings, Box::new(sink)))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn volume(&self) -> u8 {
        self.settings.volume
    }

    pub fn repeat(&self) -> Repeat {
        self.settings.repeat
    }

    pub fn is_shuffle(&self) -> bool {
        self.settings.shuffle
    }

    pub fn is_show_ingame_overlay(&self) -> bool {
        self.settings.show_ingame_overlay
    }

    pub fn is_show_ingame_menu_overlay(&self) -> bool {
        self.settings.show_ingame_menu_overlay
    }

    pub fn is_key_work_in_gui(&self) -> bool {
        self.settings.key_work_in_gui
    }

    pub fn ingame_overlay_position(&self) -> OverlayPosition {
        self.settings.ingame_overlay_position
    }

    pub fn mixer_device(&self) -> Option<&str> {
        self.settings.mixer_device.as_deref()
    }

    pub fn is_finite(&self) -> bool {
        self.settings.is_finite()
    }

    pub fn is_single_repeat(&self) -> bool {
        self.settings.is_single_repeat()
    }

    /// Values above 100 are clamped
    pub fn set_volume(&mut self, volume: u8) -> Result<(), SettingsError> {
        self.settings.volume = volume.min(MAX_VOLUME_PERCENT);
        self.save()
    }

    pub fn set_repeat(&mut self, repeat: Repeat) -> Result<(), SettingsError> {
        self.settings.repeat = repeat;
        self.save()
    }

    pub fn set_shuffle(&mut self, shuffle: bool) -> Result<(), SettingsError> {
        self.settings.shuffle = shuffle;
        self.save()
    }

    pub fn set_show_ingame_overlay(&mut self, show: bool) -> Result<(), SettingsError> {
        self.settings.show_ingame_overlay = show;
        self.save()
    }

    pub fn set_show_ingame_menu_overlay(&mut self, show: bool) -> Result<(), SettingsError> {
        self.settings.show_ingame_menu_overlay = show;
        self.save()
    }

    pub fn set_key_work_in_gui(&mut self, enabled: bool) -> Result<(), SettingsError> {
        self.settings.key_work_in_gui = enabled;
        self.save()
    }

    pub fn set_ingame_overlay_position(
        &mut self,
        position: OverlayPosition,
    ) -> Result<(), SettingsError> {
        self.settings.ingame_overlay_position = position;
        self.save()
    }

    pub fn set_mixer_device(&mut self, device: Option<String>) -> Result<(), SettingsError> {
        self.settings.mixer_device = device;
        self.save()
    }

    fn save(&self) -> Result<(), SettingsError> {
        self.sink.persist(&self.settings).inspect_err(|e| {
            tracing::warn!(error = %e, "Failed to persist settings");
        })
    }
}
