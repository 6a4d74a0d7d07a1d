//! Persisted player settings

use serde::{Deserialize, Serialize};

use super::types::{OverlayPosition, Repeat};

pub const DEFAULT_VOLUME_PERCENT: u8 = 10;
pub const MAX_VOLUME_PERCENT: u8 = 100;

/// Full settings snapshot, written to disk after every change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub volume: u8,
    pub repeat: Repeat,
    pub shuffle: bool,
    pub show_ingame_overlay: bool,
    pub show_ingame_menu_overlay: bool,
    pub key_work_in_gui: bool,
    pub ingame_overlay_position: OverlayPosition,
    pub mixer_device: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME_PERCENT,
            repeat: Repeat::No,
            shuffle: false,
            show_ingame_overlay: true,
            show_ingame_menu_overlay: false,
            key_work_in_gui: true,
            ingame_overlay_position: OverlayPosition::TopRight,
            mixer_device: None,
        }
    }
}

impl Settings {
    /// Playback stops at the end of the queue
    pub fn is_finite(&self) -> bool {
        self.repeat == Repeat::No
    }

    pub fn is_single_repeat(&self) -> bool {
        self.repeat == Repeat::Single
    }
}
