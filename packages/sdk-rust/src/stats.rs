//! Simulated protocol statistics.
//!
//! Nothing here reads the chain. [`StatsTicker`] owns a background task that
//! nudges a [`StatsSnapshot`] upward on a fixed period and publishes each
//! value through a `watch` channel.

use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
    time::{interval_at, Instant},
};

pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total_value_locked: u64,
    pub volume_24h:         u64,
    pub total_transactions: u64,
    pub active_users:       u64,
    pub total_pools:        u64,
    pub hook_validations:   u64,
}

impl StatsSnapshot {
    pub fn seed() -> Self {
        Self {
            total_value_locked: 2_547_831,
            volume_24h:         891_234,
            total_transactions: 1_247,
            active_users:       342,
            total_pools:        23,
            hook_validations:   15_623,
        }
    }

    /// One tick: volume +[0,1000), transactions +[0,5), hook validations +[0,3).
    pub fn perturb<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.volume_24h         = self.volume_24h.saturating_add(rng.gen_range(0..1000));
        self.total_transactions = self.total_transactions.saturating_add(rng.gen_range(0..5));
        self.hook_validations   = self.hook_validations.saturating_add(rng.gen_range(0..3));
    }
}

impl Default for StatsSnapshot {
    fn default() -> Self {
        Self::seed()
    }
}

/// Handle to the running ticker task.
///
/// Dropping the handle aborts the task; [`StatsTicker::stop`] ends it and
/// returns the last snapshot.
pub struct StatsTicker {
    rx:       watch::Receiver<StatsSnapshot>,
    shutdown: Option<oneshot::Sender<()>>,
    handle:   Option<JoinHandle<StatsSnapshot>>,
}

impl StatsTicker {
    /// Spawn on the current tokio runtime. A zero `period` is raised to 1 ms.
    pub fn spawn(seed: StatsSnapshot, period: Duration) -> Self {
        Self::spawn_with_rng(seed, period, StdRng::from_entropy())
    }

    pub fn spawn_with_rng<R>(seed: StatsSnapshot, period: Duration, mut rng: R) -> Self
    where
        R: Rng + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let (tx, rx) = watch::channel(seed);
        let (shutdown, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            let mut current = seed;
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticks.tick() => {
                        current.perturb(&mut rng);
                        tx.send_replace(current);
                    }
                }
            }
            log::debug!("stats ticker stopped");
            current
        });

        Self { rx, shutdown: Some(shutdown), handle: Some(handle) }
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<StatsSnapshot> {
        self.rx.clone()
    }

    pub fn current(&self) -> StatsSnapshot {
        *self.rx.borrow()
    }

    /// Stop the task and wait for it; no tick is published afterwards.
    pub async fn stop(mut self) -> StatsSnapshot {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        match self.handle.take() {
            Some(handle) => match handle.await {
                Ok(last) => last,
                Err(e) => {
                    log::warn!("stats ticker task failed: {e}");
                    self.current()
                }
            },
            None => self.current(),
        }
    }
}

impl Drop for StatsTicker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perturbation_only_grows_the_moving_counters() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut snap = StatsSnapshot::seed();
        for _ in 0..1_000 {
            let before = snap;
            snap.perturb(&mut rng);
            assert!(snap.volume_24h - before.volume_24h < 1000);
            assert!(snap.total_transactions - before.total_transactions < 5);
            assert!(snap.hook_validations - before.hook_validations < 3);
            assert_eq!(snap.total_value_locked, before.total_value_locked);
            assert_eq!(snap.active_users, before.active_users);
            assert_eq!(snap.total_pools, before.total_pools);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_publishes_non_decreasing_snapshots() {
        let ticker = StatsTicker::spawn(StatsSnapshot::seed(), DEFAULT_STATS_INTERVAL);
        let mut rx = ticker.subscribe();
        let mut last = StatsSnapshot::seed();

        for _ in 0..5 {
            rx.changed().await.unwrap();
            let next = *rx.borrow_and_update();
            assert!(next.volume_24h >= last.volume_24h);
            assert!(next.total_transactions >= last.total_transactions);
            assert!(next.hook_validations >= last.hook_validations);
            last = next;
        }
        assert_eq!(ticker.stop().await, last);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_changes_before_the_first_period() {
        let ticker = StatsTicker::spawn(StatsSnapshot::seed(), DEFAULT_STATS_INTERVAL);
        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert_eq!(ticker.current(), StatsSnapshot::seed());
        ticker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_deterministic() {
        let ticker = StatsTicker::spawn_with_rng(
            StatsSnapshot::seed(),
            DEFAULT_STATS_INTERVAL,
            StdRng::seed_from_u64(7),
        );
        let mut rx = ticker.subscribe();
        for _ in 0..3 {
            rx.changed().await.unwrap();
        }
        let stopped = ticker.stop().await;

        let mut expected = StatsSnapshot::seed();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..3 {
            expected.perturb(&mut rng);
        }
        assert_eq!(stopped, expected);

        // The sender is gone with the task.
        tokio::time::sleep(DEFAULT_STATS_INTERVAL * 4).await;
        assert!(rx.changed().await.is_err());
        assert_eq!(*rx.borrow(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_ends_the_task() {
        let ticker = StatsTicker::spawn(StatsSnapshot::seed(), DEFAULT_STATS_INTERVAL);
        let mut rx = ticker.subscribe();
        drop(ticker);
        assert!(rx.changed().await.is_err());
    }
}
