use std::time::Duration;

use rand::Rng;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::models::DISPLAY_SLOTS;
use crate::selector::DistinctImageSet;
use crate::slots::DisplaySlots;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);
/// Longest accepted replacement interval; anything above is treated as invalid.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 3600);

/// Parse interval string like "2s", "1m", "1h" into Duration. Zero,
/// overflowing and over-long values yield `None`.
pub fn parse_interval(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, suffix) = match s.char_indices().last() {
        Some((i, c @ ('s' | 'm' | 'h'))) => (&s[..i], c),
        // default to seconds if no suffix
        _ => (s, 's'),
    };

    let num: u64 = num_str.parse().ok()?;
    let secs = match suffix {
        's' => num,
        'm' => num.checked_mul(60)?,
        'h' => num.checked_mul(3600)?,
        _ => return None,
    };
    if secs == 0 || secs > MAX_INTERVAL.as_secs() {
        return None;
    }

    Some(Duration::from_secs(secs))
}

/// One firing of the replacement timer, stamped with the play session that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplacementTick {
    pub generation: u64,
}

/// A replacement chosen for a tick but not yet committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedReplacement {
    pub generation: u64,
    pub slot: usize,
    pub url: String,
}

/// Pick a random slot and a random pool URL that no slot currently shows.
///
/// Choosing uniformly among the unshown URLs gives the same distribution as
/// re-rolling until an unshown one comes up, and cannot spin.
pub fn pick_replacement<R: Rng>(
    rng: &mut R,
    slots: &DisplaySlots,
    pool: &DistinctImageSet,
) -> Option<(usize, String)> {
    let candidates: Vec<&String> = pool.urls().iter().filter(|u| !slots.is_shown(u)).collect();
    if candidates.is_empty() {
        return None;
    }
    let slot = rng.random_range(0..DISPLAY_SLOTS);
    let url = candidates[rng.random_range(0..candidates.len())].clone();
    Some((slot, url))
}

/// Hands out cancellable periodic timers, one per play session.
#[derive(Debug)]
pub struct ReplacementScheduler {
    period: Duration,
    next_generation: u64,
}

impl ReplacementScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_generation: 1,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start a timer task. The first tick arrives one period from now.
    /// Must be called inside a tokio runtime.
    pub fn start(&mut self) -> (PlayHandle, mpsc::UnboundedReceiver<ReplacementTick>) {
        let generation = self.next_generation;
        self.next_generation += 1;

        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // skip the first immediate tick
            timer.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = timer.tick() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                        if tick_tx.send(ReplacementTick { generation }).is_err() {
                            break;
                        }
                    }
                }
            }
            debug!(generation, "replacement timer stopped");
        });

        info!(generation, period_ms = period.as_millis() as u64, "replacement timer started");
        let handle = PlayHandle {
            generation,
            stop: stop_tx,
            task: Some(task),
        };
        (handle, tick_rx)
    }
}

impl Default for ReplacementScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

/// Owning handle for a running timer. Cancels on drop.
#[derive(Debug)]
pub struct PlayHandle {
    generation: u64,
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PlayHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the timer. No tick is sent after this returns. Idempotent.
    pub fn cancel(&mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(generation = self.generation, "replacement timer cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for PlayHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
