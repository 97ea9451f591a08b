use crate::clipboard::ClipboardHost;
use anyhow::Result;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Checking,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingIngest {
    text: String,
    due: Instant,
}

/// Polls the host clipboard's change counter and hands new external text to
/// the store after a short settle delay. Each detected change gets its own
/// delay, so copies made faster than the delay are all kept, in order.
///
/// The poll ticker is owned here and released by [`ClipboardWatcher::stop`],
/// which also runs on drop.
pub struct ClipboardWatcher<H: ClipboardHost> {
    host: H,
    last_change_count: u64,
    state: WatchState,
    poll_interval: Duration,
    ingest_delay: Duration,
    ticker: Option<Interval>,
    pending: VecDeque<PendingIngest>,
}

impl<H: ClipboardHost> ClipboardWatcher<H> {
    /// Whatever is on the clipboard right now counts as already seen.
    pub fn new(mut host: H, poll_interval: Duration, ingest_delay: Duration) -> Self {
        let last_change_count = host.change_count();
        Self {
            host,
            last_change_count,
            state: WatchState::Idle,
            poll_interval,
            ingest_delay,
            ticker: None,
            pending: VecDeque::new(),
        }
    }

    /// Starts the poll ticker. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let mut ticker = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);
        info!(interval_ms = self.poll_interval.as_millis() as u64, "Clipboard polling started");
    }

    pub fn stop(&mut self) {
        if self.ticker.take().is_some() {
            self.pending.clear();
            info!("Clipboard polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Resolves on the next poll tick; never resolves once stopped.
    pub async fn tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// Compares the change counter against the last observed value and, on
    /// change, parks the new text for ingestion. Returns `true` if text was
    /// parked.
    ///
    /// `most_recent_unpinned` is the text of the newest unpinned clip; equal
    /// clipboard text is not recorded again.
    pub fn check(&mut self, most_recent_unpinned: Option<&str>) -> bool {
        self.state = WatchState::Checking;
        let parked = self.check_inner(most_recent_unpinned);
        self.state = WatchState::Idle;
        parked
    }

    fn check_inner(&mut self, most_recent_unpinned: Option<&str>) -> bool {
        let count = self.host.change_count();
        if count == self.last_change_count {
            return false;
        }
        self.last_change_count = count;

        let Some(text) = self.host.read_text() else {
            return false;
        };
        if text.trim().is_empty() {
            debug!("Clipboard holds blank text, skipping");
            return false;
        }
        let newest = self
            .pending
            .back()
            .map(|p| p.text.as_str())
            .or(most_recent_unpinned);
        if newest == Some(text.as_str()) {
            debug!("Clipboard text matches newest clip, skipping");
            return false;
        }

        debug!(len = text.len(), queued = self.pending.len(), "New clipboard text detected");
        self.pending.push_back(PendingIngest {
            text,
            due: Instant::now() + self.ingest_delay,
        });
        true
    }

    pub fn ingest_deadline(&self) -> Option<Instant> {
        self.pending.front().map(|p| p.due)
    }

    /// Releases the oldest parked text once its settle delay has passed.
    pub fn take_due_ingest(&mut self, now: Instant) -> Option<String> {
        if self.pending.front().is_some_and(|p| p.due <= now) {
            self.pending.pop_front().map(|p| p.text)
        } else {
            None
        }
    }

    /// Writes `text` to the clipboard on the user's behalf and marks the
    /// resulting change as observed so the next poll ignores it.
    pub fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        self.host.write_text(text)?;
        self.last_change_count = self.host.change_count();
        debug!(len = text.len(), "Copied clip to clipboard");
        Ok(())
    }
}

impl<H: ClipboardHost> Drop for ClipboardWatcher<H> {
    fn drop(&mut self) {
        self.stop();
    }
}
