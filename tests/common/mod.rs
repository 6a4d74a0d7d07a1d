#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use musicplayer_rs::backend::{LoadResult, MediaBackend};
use musicplayer_rs::controller::{PlayerEvent, SettingsSink, SettingsStore};
use musicplayer_rs::model::{Playlist, Settings, SourceKind, TrackDescriptor};
use musicplayer_rs::SettingsError;
use tokio::sync::broadcast;

/// Backend that answers from a per-identifier script and records every call
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<HashMap<String, VecDeque<LoadResult>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, identifier: &str, outcome: LoadResult) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry(identifier.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaBackend for ScriptedBackend {
    async fn load_item(&self, identifier: &str) -> LoadResult {
        self.calls.lock().unwrap().push(identifier.to_string());
        self.script
            .lock()
            .unwrap()
            .get_mut(identifier)
            .and_then(|outcomes| outcomes.pop_front())
            .unwrap_or(LoadResult::NoMatches)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[derive(Clone, Default)]
pub struct MemorySink {
    pub snapshots: Arc<Mutex<Vec<Settings>>>,
}

impl SettingsSink for MemorySink {
    fn persist(&self, settings: &Settings) -> Result<(), SettingsError> {
        self.snapshots.lock().unwrap().push(settings.clone());
        Ok(())
    }
}

pub fn memory_store() -> (SettingsStore, MemorySink) {
    let sink = MemorySink::default();
    (SettingsStore::new(Settings::default(), Box::new(sink.clone())), sink)
}

pub fn track(name: &str) -> TrackDescriptor {
    TrackDescriptor::new(format!("spotify:track:{}", name), name, SourceKind::Direct)
}

pub fn playlist(names: &[&str]) -> Playlist {
    Playlist::new(
        "mix",
        names
            .iter()
            .map(|name| {
                TrackDescriptor::new(
                    format!("spotify:track:{}", name),
                    *name,
                    SourceKind::PlaylistMember,
                )
            })
            .collect(),
    )
}

/// Wait for the next event matching `pred`, failing after two seconds
pub async fn wait_for<F>(rx: &mut broadcast::Receiver<PlayerEvent>, pred: F) -> PlayerEvent
where
    F: Fn(&PlayerEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = rx.recv().await.expect("event channel closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

pub fn titles(tracks: &[TrackDescriptor]) -> Vec<&str> {
    tracks.iter().map(|t| t.title.as_str()).collect()
}
