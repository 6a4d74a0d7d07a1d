//! Controller module - player orchestration
//!
//! The player runs as a single owner task that holds the scheduler, the
//! settings store and the event bus. Everything else talks to it through a
//! cloneable [`MusicPlayer`] handle. Backend loads run on a separate loader
//! task, one at a time in submission order, and their outcomes come back to
//! the owner task as commands, so no queue mutation ever happens off it.
//!
//! - `events`: event bus and listener trait
//! - `scheduler`: current track + pending queue
//! - `resolver`: load outcome handling and fallback search
//! - `settings_store`: settings with write-through persistence

mod events;
mod scheduler;
mod resolver;
mod settings_store;

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::backend::{LoadResult, MediaBackend};
use crate::error::PlayerError;
use crate::model::{ResolutionRequest, ResolveMode, Settings, TrackDescriptor};

pub use events::{EventBus, ListenerId, LogListener, MusicPlayerEvents, PlayerEvent};
pub use resolver::{ResolverConfig, TrackSearch, DEFAULT_FALLBACK_PREFIX};
pub use scheduler::{AdvancePolicy, QueueSnapshot, TrackScheduler};
pub use settings_store::{JsonFileSink, SettingsSink, SettingsStore, SettingsUpdate};

/// Queue and settings as seen by the owner task at one point in time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerStatus {
    pub queue: QueueSnapshot,
    pub settings: Settings,
}

enum Command {
    Resolve { identifier: String, mode: ResolveMode },
    Resolved { request: ResolutionRequest, outcome: LoadResult },
    Next,
    Stop,
    Clear,
    UpdateSettings {
        update: SettingsUpdate,
        reply: oneshot::Sender<Result<Settings, PlayerError>>,
    },
    Register {
        listener: Arc<dyn MusicPlayerEvents>,
        reply: oneshot::Sender<ListenerId>,
    },
    Unregister(ListenerId),
    Status(oneshot::Sender<PlayerStatus>),
    Shutdown,
}

#[derive(Clone)]
pub struct MusicPlayer {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<PlayerEvent>,
}

impl MusicPlayer {
    /// Start the owner and loader tasks. The returned handle resolves once
    /// the owner task exits, either on `shutdown` or when every
    /// `MusicPlayer` clone has been dropped.
    pub fn spawn<B: MediaBackend>(
        backend: B,
        settings: SettingsStore,
        config: ResolverConfig,
    ) -> (Self, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (load_tx, load_rx) = mpsc::unbounded_channel();

        let bus = EventBus::new();
        let events = bus.sender();

        // The loader only holds a weak sender so dropping every handle
        // still closes the command channel.
        tokio::spawn(run_loader(backend, load_rx, command_tx.downgrade()));

        let state = PlayerState {
            scheduler: TrackScheduler::new(),
            settings,
            bus,
            search: TrackSearch::new(config),
            loader: load_tx,
        };
        let task = tokio::spawn(state.run(command_rx));

        (Self { commands: command_tx, events }, task)
    }

    /// Resolve `identifier` and act on it according to `mode`.
    /// The outcome is only reported through events.
    pub fn resolve(&self, identifier: impl Into<String>, mode: ResolveMode) {
        self.send(Command::Resolve {
            identifier: identifier.into(),
            mode,
        });
    }

    pub fn play(&self, identifier: impl Into<String>) {
        self.resolve(identifier, ResolveMode::PlayNow);
    }

    pub fn queue(&self, identifier: impl Into<String>) {
        self.resolve(identifier, ResolveMode::Enqueue);
    }

    /// Advance to the next track using the repeat/shuffle settings
    pub fn next(&self) {
        self.send(Command::Next);
    }

    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    pub fn clear(&self) {
        self.send(Command::Clear);
    }

    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    pub async fn register(
        &self,
        listener: Arc<dyn MusicPlayerEvents>,
    ) -> Result<ListenerId, PlayerError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Register { listener, reply })?;
        rx.await.map_err(|_| PlayerError::Closed)
    }

    pub fn unregister(&self, id: ListenerId) {
        self.send(Command::Unregister(id));
    }

    /// Apply a settings change; the new snapshot is returned once persisted
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, PlayerError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::UpdateSettings { update, reply })?;
        rx.await.map_err(|_| PlayerError::Closed)?
    }

    pub async fn status(&self) -> Result<PlayerStatus, PlayerError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Status(reply))?;
        rx.await.map_err(|_| PlayerError::Closed)
    }

    fn request(&self, command: Command) -> Result<(), PlayerError> {
        self.commands.send(command).map_err(|_| PlayerError::Closed)
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Music player task is not running, command dropped");
        }
    }
}

async fn run_loader<B: MediaBackend>(
    backend: B,
    mut requests: mpsc::UnboundedReceiver<ResolutionRequest>,
    commands: mpsc::WeakUnboundedSender<Command>,
) {
    tracing::debug!(backend = backend.name(), "Loader started");
    while let Some(request) = requests.recv().await {
        crate::log_load_request!(backend.name(), identifier = %request.identifier);
        let outcome = backend.load_item(&request.identifier).await;
        crate::log_load_result!(backend.name(), &request.identifier, outcome);

        let Some(commands) = commands.upgrade() else {
            break;
        };
        if commands.send(Command::Resolved { request, outcome }).is_err() {
            break;
        }
    }
    tracing::debug!("Loader stopped");
}

struct PlayerState {
    scheduler: TrackScheduler,
    settings: SettingsStore,
    bus: EventBus,
    search: TrackSearch,
    loader: mpsc::UnboundedSender<ResolutionRequest>,
}

impl PlayerState {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        tracing::info!("Music player started");
        while let Some(command) = commands.recv().await {
            if matches!(command, Command::Shutdown) {
                break;
            }
            self.handle(command);
        }
        tracing::info!("Music player stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Resolve { identifier, mode } => {
                let request = self.search.request(identifier, mode);
                self.dispatch(request);
            }
            Command::Resolved { request, outcome } => {
                let retry = self
                    .search
                    .handle(&request, outcome, &mut self.scheduler, &self.bus);
                if let Some(retry) = retry {
                    self.dispatch(retry);
                }
            }
            Command::Next => {
                let policy = AdvancePolicy::from(self.settings.settings());
                let next = self.scheduler.next_track(policy).map(TrackDescriptor::to_string);
                tracing::info!(next = ?next, "Advanced to next track");
                self.publish_queue();
            }
            Command::Stop => {
                if self.scheduler.stop().is_some() {
                    self.publish_queue();
                }
            }
            Command::Clear => {
                self.scheduler.clear();
                self.publish_queue();
            }
            Command::UpdateSettings { update, reply } => {
                tracing::debug!(update = ?update, "Updating settings");
                let result = update
                    .apply(&mut self.settings)
                    .map(|_| self.settings.settings().clone())
                    .map_err(PlayerError::from);
                let _ = reply.send(result);
            }
            Command::Register { listener, reply } => {
                let id = self.bus.register(listener);
                let _ = reply.send(id);
            }
            Command::Unregister(id) => {
                self.bus.unregister(id);
            }
            Command::Status(reply) => {
                let _ = reply.send(PlayerStatus {
                    queue: self.scheduler.snapshot(),
                    settings: self.settings.settings().clone(),
                });
            }
            Command::Shutdown => {}
        }
    }

    fn dispatch(&self, request: ResolutionRequest) {
        tracing::debug!(
            identifier = %request.identifier,
            mode = %request.mode,
            is_search = request.is_search,
            "Dispatching resolution"
        );
        if self.loader.send(request).is_err() {
            tracing::error!("Loader task is gone, resolution dropped");
        }
    }

    fn publish_queue(&self) {
        self.bus.publish(PlayerEvent::QueueUpdated(self.scheduler.snapshot()));
    }
}
