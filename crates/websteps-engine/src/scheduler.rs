//! Cancellable one-shot timers.
//!
//! The capture engine arms a timer per edited field and cancels it whenever the
//! field changes again. Expiry is not a callback into the engine: the host
//! collects fired handles from its scheduler and hands them back through
//! `CaptureEngine::on_timer_fired`, which keeps every state mutation on the
//! single event-processing path.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Opaque cancellation token for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

pub trait Scheduler {
    /// Arms a one-shot timer that fires after `delay`.
    fn schedule(&mut self, delay: Duration) -> TimerHandle;

    /// Cancels a timer. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Virtual-clock scheduler. Time only moves when [`ManualScheduler::advance`] is called.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerHandle, Duration>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the clock forward and returns the handles that expired, in deadline order.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerHandle> {
        self.now += by;
        let now = self.now;

        let mut due: Vec<(Duration, TimerHandle)> = self
            .timers
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(handle, deadline)| (*deadline, *handle))
            .collect();
        due.sort();

        for (_, handle) in &due {
            self.timers.remove(handle);
        }
        due.into_iter().map(|(_, handle)| handle).collect()
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.timers.insert(handle, self.now + delay);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.remove(&handle);
    }
}

/// Scheduler backed by tokio tasks. Fired handles arrive on the receiver
/// returned from [`TokioScheduler::new`].
///
/// Must be used from within a tokio runtime.
pub struct TokioScheduler {
    next_id: u64,
    tasks: HashMap<TimerHandle, JoinHandle<()>>,
    fired_tx: mpsc::UnboundedSender<TimerHandle>,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerHandle>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            next_id: 0,
            tasks: HashMap::new(),
            fired_tx,
        };
        (scheduler, fired_rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.tasks.retain(|_, task| !task.is_finished());

        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let tx = self.fired_tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the session ended; nothing left to notify.
            let _ = tx.send(handle);
        });
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_fires_in_deadline_order() {
        let mut scheduler = ManualScheduler::new();
        let late = scheduler.schedule(Duration::from_millis(900));
        let early = scheduler.schedule(Duration::from_millis(300));

        assert!(scheduler.advance(Duration::from_millis(200)).is_empty());
        assert_eq!(scheduler.advance(Duration::from_millis(800)), vec![early, late]);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_manual_cancel_unknown_is_noop() {
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.schedule(Duration::from_millis(10));
        scheduler.cancel(handle);
        scheduler.cancel(handle);
        assert!(!scheduler.is_scheduled(handle));
        assert!(scheduler.advance(Duration::from_secs(1)).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_reports_fired() {
        let (mut scheduler, mut fired) = TokioScheduler::new();
        let kept = scheduler.schedule(Duration::from_millis(1000));
        let dropped = scheduler.schedule(Duration::from_millis(500));
        scheduler.cancel(dropped);

        let got = fired.recv().await;
        assert_eq!(got, Some(kept));
        assert!(fired.try_recv().is_err());
    }
}
