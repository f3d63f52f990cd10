use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One countdown step. `generation` identifies the countdown that sent it so
/// receivers can drop ticks from a countdown that has since been replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
    pub remaining: u32,
}

impl Tick {
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }
}

/// A per-second countdown running on the tokio runtime. The task is aborted
/// when the handle is cancelled or dropped.
pub struct Countdown {
    generation: u64,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Must be called from within a tokio runtime.
    pub fn spawn(generation: u64, secs: u32, tx: mpsc::UnboundedSender<Tick>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_PERIOD);
            // first tick completes immediately
            interval.tick().await;
            let mut remaining = secs;
            while remaining > 0 {
                interval.tick().await;
                remaining -= 1;
                if tx.send(Tick { generation, remaining }).is_err() {
                    tracing::debug!(generation, "tick receiver gone, stopping countdown");
                    break;
                }
            }
        });
        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
