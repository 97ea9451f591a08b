use std::time::Duration;
use tokio::time::Instant;

/// A single pending-deadline slot. Scheduling while a deadline is pending
/// replaces it, so a burst of triggers fires once, `delay` after the last one.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Clears the slot and returns `true` when the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Clears the slot regardless of the deadline; `true` if one was pending.
    pub fn take(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.schedule();

        advance(Duration::from_millis(499)).await;
        assert!(!debouncer.fire_if_due(Instant::now()));

        advance(Duration::from_millis(1)).await;
        assert!(debouncer.fire_if_due(Instant::now()));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_pushes_deadline() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.schedule();
        advance(Duration::from_millis(400)).await;
        debouncer.schedule();
        advance(Duration::from_millis(400)).await;

        assert!(!debouncer.fire_if_due(Instant::now()));
        advance(Duration::from_millis(100)).await;
        assert!(debouncer.fire_if_due(Instant::now()));
    }

    #[test]
    fn test_take() {
        let mut debouncer = Debouncer::new(Duration::from_secs(10));
        assert!(!debouncer.take());
        debouncer.schedule();
        assert!(debouncer.take());
        assert_eq!(debouncer.deadline(), None);
    }
}
