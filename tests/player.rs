mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use common::{memory_store, playlist, titles, track, wait_for, ScriptedBackend};
use musicplayer_rs::backend::LoadResult;
use musicplayer_rs::controller::{MusicPlayerEvents, PlayerEvent, ResolverConfig, SettingsUpdate};
use musicplayer_rs::model::{Playlist, Repeat, ResolveMode, TrackDescriptor};
use musicplayer_rs::{MusicPlayer, PlayerError, ResolveError};

fn spawn(backend: ScriptedBackend) -> (MusicPlayer, tokio::task::JoinHandle<()>) {
    let (store, _) = memory_store();
    MusicPlayer::spawn(backend, store, ResolverConfig::default())
}

fn is_queue_update(event: &PlayerEvent) -> bool {
    matches!(event, PlayerEvent::QueueUpdated(_))
}

fn is_playlist_resolved(event: &PlayerEvent) -> bool {
    matches!(event, PlayerEvent::PlaylistResolved { .. })
}

fn is_failure(event: &PlayerEvent) -> bool {
    matches!(event, PlayerEvent::SearchFailed { .. })
}

#[tokio::test]
async fn play_now_starts_a_single_track() -> Result<()> {
    let backend = ScriptedBackend::new().on("spotify:track:A", LoadResult::TrackLoaded(track("A")));
    let (player, _task) = spawn(backend);
    let mut events = player.subscribe();

    player.play("spotify:track:A");

    let resolved = wait_for(&mut events, |e| matches!(e, PlayerEvent::TrackResolved { .. })).await;
    assert_eq!(
        resolved,
        PlayerEvent::TrackResolved { mode: ResolveMode::PlayNow, track: track("A") }
    );
    wait_for(&mut events, is_queue_update).await;

    let status = player.status().await?;
    assert_eq!(status.queue.current, Some(track("A")));
    assert!(status.queue.pending.is_empty());
    Ok(())
}

#[tokio::test]
async fn zero_results_fall_back_to_search_once() -> Result<()> {
    let hits = Playlist::search_result("some song", vec![track("hit"), track("other")]);
    let backend = ScriptedBackend::new()
        .on("some song", LoadResult::NoMatches)
        .on("spsearch:some song", LoadResult::PlaylistLoaded(hits));
    let (player, _task) = spawn(backend.clone());
    let mut events = player.subscribe();

    player.queue("some song");

    let resolved = wait_for(&mut events, |e| matches!(e, PlayerEvent::TrackResolved { .. })).await;
    assert_eq!(
        resolved,
        PlayerEvent::TrackResolved { mode: ResolveMode::Enqueue, track: track("hit") }
    );
    wait_for(&mut events, is_queue_update).await;

    assert_eq!(backend.calls(), vec!["some song", "spsearch:some song"]);
    let status = player.status().await?;
    assert_eq!(titles(&status.queue.pending), vec!["hit"]);
    assert!(status.queue.current.is_none());
    Ok(())
}

#[tokio::test]
async fn second_empty_result_reports_failure() -> Result<()> {
    let backend = ScriptedBackend::new();
    let (player, _task) = spawn(backend.clone());
    let mut events = player.subscribe();

    player.play("nothing like this");

    let failed = wait_for(&mut events, is_failure).await;
    assert_eq!(
        failed,
        PlayerEvent::SearchFailed { reason: "no matches".into(), cause: ResolveError::NoMatches }
    );
    assert_eq!(backend.calls(), vec!["nothing like this", "spsearch:nothing like this"]);
    Ok(())
}

#[tokio::test]
async fn load_failures_are_never_retried() -> Result<()> {
    let backend = ScriptedBackend::new()
        .on("spotify:track:broken", LoadResult::LoadFailed("service unavailable".into()))
        .on("spotify:track:B", LoadResult::TrackLoaded(track("B")));
    let (player, _task) = spawn(backend.clone());
    let mut events = player.subscribe();

    player.play("spotify:track:broken");
    let failed = wait_for(&mut events, is_failure).await;
    assert_eq!(
        failed,
        PlayerEvent::SearchFailed {
            reason: "service unavailable".into(),
            cause: ResolveError::load_failed("service unavailable"),
        }
    );

    // Loads run in order, so a retry would have been issued before this one
    player.queue("spotify:track:B");
    wait_for(&mut events, is_queue_update).await;

    assert_eq!(backend.calls(), vec!["spotify:track:broken", "spotify:track:B"]);
    Ok(())
}

#[tokio::test]
async fn play_now_playlist_goes_ahead_of_pending_tracks() -> Result<()> {
    let backend = ScriptedBackend::new()
        .on("spotify:track:old", LoadResult::TrackLoaded(track("old")))
        .on("spotify:album:mix", LoadResult::PlaylistLoaded(playlist(&["A", "B", "C"])));
    let (player, _task) = spawn(backend);
    let mut events = player.subscribe();

    player.queue("spotify:track:old");
    wait_for(&mut events, is_queue_update).await;

    player.play("spotify:album:mix");
    let resolved = wait_for(&mut events, is_playlist_resolved).await;
    assert!(matches!(resolved, PlayerEvent::PlaylistResolved { mode: ResolveMode::PlayNow, .. }));
    wait_for(&mut events, is_queue_update).await;

    let status = player.status().await?;
    assert_eq!(status.queue.current.as_ref().map(|t| t.title.as_str()), Some("A"));
    assert_eq!(titles(&status.queue.pending), vec!["B", "C", "old"]);
    Ok(())
}

#[tokio::test]
async fn enqueued_playlist_is_appended_in_order() -> Result<()> {
    let backend = ScriptedBackend::new()
        .on("spotify:track:now", LoadResult::TrackLoaded(track("now")))
        .on("spotify:playlist:mix", LoadResult::PlaylistLoaded(playlist(&["A", "B", "C"])));
    let (player, _task) = spawn(backend);
    let mut events = player.subscribe();

    player.play("spotify:track:now");
    player.queue("spotify:playlist:mix");
    wait_for(&mut events, is_playlist_resolved).await;
    wait_for(&mut events, is_queue_update).await;

    let status = player.status().await?;
    assert_eq!(status.queue.current, Some(track("now")));
    assert_eq!(titles(&status.queue.pending), vec!["A", "B", "C"]);
    Ok(())
}

#[tokio::test]
async fn next_follows_repeat_settings() -> Result<()> {
    let backend = ScriptedBackend::new()
        .on("spotify:album:mix", LoadResult::PlaylistLoaded(playlist(&["A", "B"])));
    let (store, sink) = memory_store();
    let (player, _task) = MusicPlayer::spawn(backend, store, ResolverConfig::default());
    let mut events = player.subscribe();

    player.play("spotify:album:mix");
    wait_for(&mut events, is_queue_update).await;

    let settings = player.update_settings(SettingsUpdate::Repeat(Repeat::All)).await?;
    assert!(!settings.is_finite());
    assert_eq!(sink.snapshots.lock().unwrap().len(), 1);

    player.next();
    let PlayerEvent::QueueUpdated(snapshot) = wait_for(&mut events, is_queue_update).await else {
        unreachable!();
    };
    assert_eq!(snapshot.current.map(|t| t.title), Some("B".to_string()));
    assert_eq!(titles(&snapshot.pending), vec!["A"]);

    player.update_settings(SettingsUpdate::Repeat(Repeat::Single)).await?;
    player.next();
    let PlayerEvent::QueueUpdated(snapshot) = wait_for(&mut events, is_queue_update).await else {
        unreachable!();
    };
    assert_eq!(snapshot.current.map(|t| t.title), Some("B".to_string()));
    Ok(())
}

#[tokio::test]
async fn every_settings_update_is_persisted() -> Result<()> {
    let (store, sink) = memory_store();
    let (player, _task) =
        MusicPlayer::spawn(ScriptedBackend::new(), store, ResolverConfig::default());

    player.update_settings(SettingsUpdate::Volume(30)).await?;
    player.update_settings(SettingsUpdate::Volume(30)).await?;
    player.update_settings(SettingsUpdate::ToggleIngameOverlay).await?;
    let settings = player
        .update_settings(SettingsUpdate::MixerDevice(Some("Speakers".into())))
        .await?;

    let snapshots = sink.snapshots.lock().unwrap().clone();
    assert_eq!(snapshots.len(), 4);
    assert_eq!(snapshots.last(), Some(&settings));
    assert_eq!(settings.volume, 30);
    assert!(!settings.show_ingame_overlay);
    assert_eq!(player.status().await?.settings, settings);
    Ok(())
}

struct Collector(Arc<Mutex<Vec<String>>>);

impl MusicPlayerEvents for Collector {
    fn on_search_track(&self, mode: ResolveMode, track: &TrackDescriptor) -> Result<()> {
        self.0.lock().unwrap().push(format!("{}:{}", mode, track.title));
        Ok(())
    }
}

struct Grumpy;

impl MusicPlayerEvents for Grumpy {
    fn on_search_track(&self, _mode: ResolveMode, _track: &TrackDescriptor) -> Result<()> {
        anyhow::bail!("overlay hidden")
    }
}

#[tokio::test]
async fn registered_listeners_are_isolated_from_each_other() -> Result<()> {
    let backend = ScriptedBackend::new()
        .on("spotify:track:A", LoadResult::TrackLoaded(track("A")))
        .on("spotify:track:B", LoadResult::TrackLoaded(track("B")));
    let (player, _task) = spawn(backend);
    let mut events = player.subscribe();

    let seen = Arc::new(Mutex::new(Vec::new()));
    player.register(Arc::new(Grumpy)).await?;
    let id = player.register(Arc::new(Collector(seen.clone()))).await?;

    player.play("spotify:track:A");
    wait_for(&mut events, is_queue_update).await;

    player.unregister(id);
    player.queue("spotify:track:B");
    wait_for(&mut events, is_queue_update).await;

    assert_eq!(*seen.lock().unwrap(), vec!["play:A"]);
    Ok(())
}

#[tokio::test]
async fn shutdown_stops_the_player() -> Result<()> {
    let (player, task) = spawn(ScriptedBackend::new());

    player.shutdown();
    tokio::time::timeout(Duration::from_secs(2), task).await??;

    assert!(matches!(player.status().await, Err(PlayerError::Closed)));
    Ok(())
}

#[tokio::test]
async fn dropping_every_handle_stops_the_player() -> Result<()> {
    let (player, task) = spawn(ScriptedBackend::new());
    let clone = player.clone();
    drop(player);
    drop(clone);

    tokio::time::timeout(Duration::from_secs(2), task).await??;
    Ok(())
}

#[tokio::test]
async fn play_now_search_result_plays_only_the_first_hit() -> Result<()> {
    let hits = Playlist::search_result("hits", vec![track("hit"), track("other")]);
    let backend = ScriptedBackend::new().on("spsearch:hits", LoadResult::PlaylistLoaded(hits));
    let (player, _task) = spawn(backend);
    let mut events = player.subscribe();

    player.play("spsearch:hits");

    let resolved = wait_for(&mut events, |e| !is_queue_update(e)).await;
    assert_eq!(
        resolved,
        PlayerEvent::TrackResolved { mode: ResolveMode::PlayNow, track: track("hit") }
    );
    wait_for(&mut events, is_queue_update).await;

    let status = player.status().await?;
    assert_eq!(status.queue.current, Some(track("hit")));
    assert!(status.queue.pending.is_empty());
    Ok(())
}

#[tokio::test]
async fn fallback_search_load_failure_is_reported_once() -> Result<()> {
    let backend = ScriptedBackend::new()
        .on("lost song", LoadResult::NoMatches)
        .on("spsearch:lost song", LoadResult::LoadFailed("timed out".into()));
    let (player, _task) = spawn(backend.clone());
    let mut events = player.subscribe();

    player.queue("lost song");

    let failed = wait_for(&mut events, is_failure).await;
    assert_eq!(
        failed,
        PlayerEvent::SearchFailed {
            reason: "timed out".into(),
            cause: ResolveError::load_failed("timed out"),
        }
    );

    assert_eq!(backend.calls(), vec!["lost song", "spsearch:lost song"]);
    assert!(player.status().await?.queue.pending.is_empty());
    Ok(())
}

#[tokio::test]
async fn overlapping_resolutions_both_apply() -> Result<()> {
    let hits = Playlist::search_result("first song", vec![track("hit")]);
    let backend = ScriptedBackend::new()
        .on("first song", LoadResult::NoMatches)
        .on("spsearch:first song", LoadResult::PlaylistLoaded(hits))
        .on("spotify:track:B", LoadResult::TrackLoaded(track("B")));
    let (player, _task) = spawn(backend.clone());
    let mut events = player.subscribe();

    player.queue("first song");
    player.queue("spotify:track:B");

    wait_for(&mut events, |e| {
        matches!(e, PlayerEvent::QueueUpdated(snapshot) if snapshot.pending.len() == 2)
    })
    .await;

    // The fallback is submitted after the second request, so it loads last
    assert_eq!(
        backend.calls(),
        vec!["first song", "spotify:track:B", "spsearch:first song"]
    );
    let status = player.status().await?;
    assert_eq!(titles(&status.queue.pending), vec!["B", "hit"]);
    Ok(())
}
