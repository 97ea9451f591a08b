use crate::clip::Clip;
use crate::clipboard::{ClipboardHost, SystemClipboard};
use crate::config::Config;
use crate::storage::SqliteSettings;
use crate::store::{ClipSnapshot, ClipStore};
use crate::utils::paths::get_database_path;
use crate::watcher::ClipboardWatcher;
use anyhow::{Context, Result, anyhow};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::thread::{self, JoinHandle};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// User intents forwarded from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddClip { text: String, pinned: bool },
    TogglePin(Uuid),
    EditText { id: Uuid, text: String },
    Delete(Uuid),
    ClearUnpinned,
    CopyToClipboard(Uuid),
    BeginEditing(Uuid),
    EndEditing,
    SetTrimSpaces(bool),
    Shutdown,
}

/// Outcomes the presentation layer cannot read from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Copied,
    CopyFailed(String),
}

const NOTICE_CAPACITY: usize = 16;

/// Presentation-side access to the running service: send intents, read
/// snapshots. Cheap to clone.
#[derive(Clone)]
pub struct ClipHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<ClipSnapshot>,
    notices: broadcast::Sender<Notice>,
}

impl ClipHandle {
    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("Clip service has stopped, dropping command");
        }
    }

    pub fn add_clip(&self, text: impl Into<String>, pinned: bool) {
        self.send(Command::AddClip {
            text: text.into(),
            pinned,
        });
    }

    pub fn toggle_pin(&self, id: Uuid) {
        self.send(Command::TogglePin(id));
    }

    pub fn edit_text(&self, id: Uuid, text: impl Into<String>) {
        self.send(Command::EditText {
            id,
            text: text.into(),
        });
    }

    pub fn delete(&self, id: Uuid) {
        self.send(Command::Delete(id));
    }

    pub fn clear_unpinned(&self) {
        self.send(Command::ClearUnpinned);
    }

    pub fn copy_to_clipboard(&self, id: Uuid) {
        self.send(Command::CopyToClipboard(id));
    }

    pub fn begin_editing(&self, id: Uuid) {
        self.send(Command::BeginEditing(id));
    }

    pub fn end_editing(&self) {
        self.send(Command::EndEditing);
    }

    pub fn set_trim_spaces(&self, enabled: bool) {
        self.send(Command::SetTrimSpaces(enabled));
    }

    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }

    pub fn snapshot(&self) -> ClipSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ClipSnapshot> {
        self.snapshots.clone()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub fn filtered_and_sorted(&self, query: &str) -> Vec<Clip> {
        self.snapshots.borrow().filtered_and_sorted(query)
    }
}

/// Runs the store and the watcher on one task. Commands, poll ticks, the
/// ingest delay, the debounced save and external database changes are all
/// handled by the same loop, so the collection is never mutated concurrently.
pub struct ClipService<H: ClipboardHost> {
    store: ClipStore,
    watcher: ClipboardWatcher<H>,
    commands: mpsc::UnboundedReceiver<Command>,
    notices: broadcast::Sender<Notice>,
    external: Option<mpsc::UnboundedReceiver<()>>,
    db_watcher: Option<RecommendedWatcher>,
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

async fn recv_opt(rx: &mut Option<mpsc::UnboundedReceiver<()>>) -> Option<()> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

impl<H: ClipboardHost> ClipService<H> {
    pub fn new(store: ClipStore, watcher: ClipboardWatcher<H>) -> (Self, ClipHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        let handle = ClipHandle {
            commands: tx,
            snapshots: store.subscribe(),
            notices: notices.clone(),
        };
        let service = Self {
            store,
            watcher,
            commands: rx,
            notices,
            external: None,
            db_watcher: None,
        };
        (service, handle)
    }

    /// Every message on `changes` makes the store re-read pinned clips that
    /// another process may have written.
    pub fn with_external_changes(mut self, changes: mpsc::UnboundedReceiver<()>) -> Self {
        self.external = Some(changes);
        self
    }

    /// Runs until a `Shutdown` command arrives or every handle is dropped.
    /// On the way out the poll ticker is stopped and a pending save is
    /// written.
    pub async fn run(mut self) {
        self.watcher.start();
        info!("Clip service running");

        loop {
            let ingest_at = self.watcher.ingest_deadline();
            let save_at = self.store.save_deadline();

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
                _ = self.watcher.tick() => {
                    let newest = self.store.most_recent_unpinned_text();
                    self.watcher.check(newest);
                }
                _ = sleep_until_opt(ingest_at) => {
                    let now = Instant::now();
                    while let Some(text) = self.watcher.take_due_ingest(now) {
                        self.store.add_clip(&text, false);
                    }
                }
                changed = recv_opt(&mut self.external) => match changed {
                    Some(()) => {
                        self.store.reload_external();
                    }
                    None => self.external = None,
                },
                _ = sleep_until_opt(save_at) => {
                    self.store.flush_due(Instant::now());
                }
            }
        }

        self.watcher.stop();
        self.db_watcher = None;
        self.store.flush();
        info!("Clip service stopped");
    }

    fn apply(&mut self, command: Command) {
        debug!(?command, "Applying command");
        match command {
            Command::AddClip { text, pinned } => {
                self.store.add_clip(&text, pinned);
            }
            Command::TogglePin(id) => {
                self.store.toggle_pin(id);
            }
            Command::EditText { id, text } => {
                self.store.edit_text(id, &text);
            }
            Command::Delete(id) => {
                self.store.delete(id);
            }
            Command::ClearUnpinned => {
                self.store.clear_unpinned();
            }
            Command::CopyToClipboard(id) => {
                let notice = match self.store.get(id).map(|clip| clip.text.clone()) {
                    None => Notice::CopyFailed("clip no longer exists".to_string()),
                    Some(text) => match self.watcher.copy_to_clipboard(&text) {
                        Ok(()) => Notice::Copied,
                        Err(e) => {
                            warn!(error = %e, "Failed to copy clip");
                            Notice::CopyFailed(format!("{e:#}"))
                        }
                    },
                };
                // Nobody listening is fine.
                let _ = self.notices.send(notice);
            }
            Command::BeginEditing(id) => {
                self.store.begin_editing(id);
            }
            Command::EndEditing => self.store.end_editing(),
            Command::SetTrimSpaces(enabled) => {
                if let Err(e) = self.store.set_trim_spaces(enabled) {
                    warn!(error = %e, "Failed to store trim setting");
                }
            }
            Command::Shutdown => {}
        }
    }
}

/// The service running on its own thread against the desktop clipboard and
/// the on-disk settings database.
pub struct ServiceThread {
    pub handle: ClipHandle,
    thread: JoinHandle<Result<()>>,
}

impl ServiceThread {
    pub fn spawn(config: &Config) -> Result<Self> {
        let config = config.clone();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();

        let thread = thread::Builder::new()
            .name("clipdeck-service".to_string())
            .spawn(move || -> Result<()> {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .context("Failed to start async runtime")?;

                runtime.block_on(async move {
                    let (service, handle) = build_system_service(&config)?;
                    let _ = ready_tx.send(handle);
                    service.run().await;
                    Ok::<(), anyhow::Error>(())
                })
            })
            .context("Failed to spawn service thread")?;

        match ready_rx.recv() {
            Ok(handle) => Ok(Self { handle, thread }),
            Err(_) => match thread.join() {
                Ok(Err(e)) => Err(e),
                _ => Err(anyhow!("Clip service failed to start")),
            },
        }
    }

    /// Asks the service to stop and waits for its final save.
    pub fn shutdown(self) -> Result<()> {
        self.handle.shutdown();
        self.thread
            .join()
            .map_err(|_| anyhow!("Clip service thread panicked"))?
    }
}

/// Wires the store and watcher to the system clipboard and settings database.
/// Must be called from within a tokio runtime.
pub fn build_system_service(config: &Config) -> Result<(ClipService<SystemClipboard>, ClipHandle)> {
    let settings = SqliteSettings::open_default()?;
    let store = ClipStore::load(
        Box::new(settings),
        config.max_recent_clips,
        config.save_debounce(),
    );
    let host = SystemClipboard::new()?;
    let watcher = ClipboardWatcher::new(host, config.poll_interval(), config.ingest_delay());
    let (mut service, handle) = ClipService::new(store, watcher);

    if let Some((db_watcher, changes)) = setup_database_watcher(&get_database_path()?) {
        service = service.with_external_changes(changes);
        service.db_watcher = Some(db_watcher);
    }
    Ok((service, handle))
}

/// Signals on every modification of the database file, including our own
/// writes; reloading after those finds nothing new.
fn setup_database_watcher(
    db_path: &Path,
) -> Option<(RecommendedWatcher, mpsc::UnboundedReceiver<()>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res
                && event.kind.is_modify()
            {
                let _ = tx.send(());
            }
        },
        notify::Config::default(),
    );

    let mut watcher = match watcher {
        Ok(watcher) => watcher,
        Err(e) => {
            warn!(error = %e, "Could not watch the database for outside changes");
            return None;
        }
    };
    if let Err(e) = watcher.watch(db_path, RecursiveMode::NonRecursive) {
        warn!(error = %e, path = %db_path.display(), "Could not watch the database for outside changes");
        return None;
    }
    Some((watcher, rx))
}
