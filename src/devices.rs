//! Audio output device discovery for the mixer device setting

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait};

/// Source of selectable output device names
pub trait OutputDevices {
    fn names(&self) -> Result<Vec<String>>;
}

/// Output devices of the platform's default audio host
pub struct CpalDevices {
    host: cpal::Host,
}

impl CpalDevices {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }
}

impl Default for CpalDevices {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDevices for CpalDevices {
    fn names(&self) -> Result<Vec<String>> {
        let devices = self.host.output_devices().context("No output devices")?;
        let names: Vec<String> = devices
            .filter_map(|d| d.description().ok().map(|n| n.name().to_string()))
            .collect();
        tracing::debug!(count = names.len(), "Enumerated output devices");
        Ok(names)
    }
}

/// Resolve `needle` to a listed device name. An exact, case-insensitive
/// match wins over a substring match.
pub fn pick_device(names: &[String], needle: &str) -> Result<String> {
    let needle_lc = needle.trim().to_lowercase();
    if needle_lc.is_empty() {
        return Err(anyhow!("Device name must not be empty"));
    }

    names
        .iter()
        .find(|name| name.to_lowercase() == needle_lc)
        .or_else(|| names.iter().find(|name| name.to_lowercase().contains(&needle_lc)))
        .cloned()
        .ok_or_else(|| anyhow!("No output device matched: {}", needle.trim()))
}
