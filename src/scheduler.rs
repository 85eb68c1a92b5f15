// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    sync::{oneshot, Mutex, OwnedMutexGuard},
    task::{JoinError, JoinHandle},
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, span, Instrument, Level};

use crate::monitor::Monitor;

/// Counts of what the scheduler has done so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Cycles that ran to completion.
    pub completed: u64,
    /// Cycles that returned an error.
    pub failed: u64,
    /// Ticks dropped because the previous cycle was still running.
    pub skipped: u64,
}

#[derive(Default)]
struct Counters {
    completed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> Stats {
        Stats {
            completed: self.completed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
        }
    }
}

/// Runs the monitor's cycle on a fixed period. A tick that arrives while the previous cycle is
/// still running is dropped, never queued.
pub struct Scheduler {
    monitor: Arc<Mutex<Monitor>>,
    counters: Arc<Counters>,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Starts ticking after the initial delay. Must be called from within a tokio runtime.
    pub fn start(
        monitor: Arc<Mutex<Monitor>>,
        initial_delay: Duration,
        period: Duration,
    ) -> Scheduler {
        let counters = Arc::new(Counters::default());
        let (stop_tx, stop_rx) = oneshot::channel();

        info!(?initial_delay, ?period, "Starting scheduler.");
        let handle = tokio::spawn(
            Scheduler::run(
                monitor.clone(),
                counters.clone(),
                initial_delay,
                period,
                stop_rx,
            )
            .instrument(span!(Level::INFO, "scheduler")),
        );

        Scheduler {
            monitor,
            counters,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    async fn run(
        monitor: Arc<Mutex<Monitor>>,
        counters: Arc<Counters>,
        initial_delay: Duration,
        period: Duration,
        mut stop_rx: oneshot::Receiver<()>,
    ) {
        let mut interval = time::interval_at(Instant::now() + initial_delay, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = &mut stop_rx => {
                    info!("Scheduler stopping.");
                    return;
                }
                _ = interval.tick() => {
                    match monitor.clone().try_lock_owned() {
                        Ok(guard) => {
                            let counters = counters.clone();
                            tokio::task::spawn_blocking(move || run_cycle(guard, &counters));
                        }
                        Err(_) => {
                            counters.skipped.fetch_add(1, Ordering::SeqCst);
                            debug!("Previous cycle still running, skipping tick.");
                        }
                    }
                }
            }
        }
    }

    /// Counts of what the scheduler has done so far.
    pub fn stats(&self) -> Stats {
        self.counters.snapshot()
    }

    /// Stops ticking and waits for any cycle in progress to finish. Stopping twice is a no-op.
    pub async fn stop(&mut self) -> Result<Stats, JoinError> {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The receiver is gone only if the task already exited.
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await?;
        }

        // Cycles hold the lock for their whole run.
        drop(self.monitor.lock().await);

        let stats = self.stats();
        info!(
            completed = stats.completed,
            failed = stats.failed,
            skipped = stats.skipped,
            "Scheduler stopped."
        );
        Ok(stats)
    }
}

fn run_cycle(mut monitor: OwnedMutexGuard<Monitor>, counters: &Counters) {
    match monitor.cycle() {
        Ok(report) => {
            counters.completed.fetch_add(1, Ordering::SeqCst);
            debug!(
                value = report.value,
                chord = report.chord.name(),
                offset = report.offset.octaves(),
                "Cycle complete."
            );
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::SeqCst);
            error!(err = %e, "Cycle failed.");
        }
    }
}

#[cfg(test)]
mod test {
    use std::{error::Error, time::Duration};

    use crate::{
        metric,
        midi::test::{Device, Message},
        player::PlaybackState,
        progress::Silent,
        resources::ResourceManager,
        testutil::eventually_async,
    };

    use super::*;

    fn monitor(values: &str, recorder: &Device) -> Result<Arc<Mutex<Monitor>>, Box<dyn Error>> {
        Ok(Arc::new(Mutex::new(Monitor::new(
            metric::get_source(Some(values), None)?,
            ResourceManager::new(Box::new(recorder.clone()), None),
            Box::new(Silent),
        ))))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_runs_cycles() -> Result<(), Box<dyn Error>> {
        let recorder = Device::get("mock");
        let monitor = monitor("mock:5,15,95", &recorder)?;
        let mut scheduler = Scheduler::start(
            monitor.clone(),
            Duration::from_millis(10),
            Duration::from_millis(20),
        );

        eventually_async(
            || {
                let stats = scheduler.stats();
                async move { stats.completed >= 3 }
            },
            "scheduler never completed three cycles",
        )
        .await;
        let stats = scheduler.stop().await?;
        assert!(stats.completed >= 3);
        assert_eq!(0, stats.failed);

        // The first three cycles play the scripted values in order.
        let sent = recorder.sent();
        assert_eq!(Message::NoteOn { key: 36, velocity: 127 }, sent[0]);
        assert_eq!(Message::NoteOff { key: 36, velocity: 0 }, sent[3]);
        assert_eq!(Message::NoteOn { key: 50, velocity: 127 }, sent[6]);
        assert_eq!(Message::NoteOn { key: 88, velocity: 127 }, sent[12]);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_skips_ticks_while_busy() -> Result<(), Box<dyn Error>> {
        let recorder = Device::get("mock");
        // Six sends of 15ms each make a cycle far longer than the 5ms period.
        recorder.set_delay(Duration::from_millis(15));
        let monitor = monitor("mock:5,95", &recorder)?;
        let mut scheduler = Scheduler::start(
            monitor.clone(),
            Duration::ZERO,
            Duration::from_millis(5),
        );

        eventually_async(
            || {
                let stats = scheduler.stats();
                async move { stats.completed >= 2 && stats.skipped >= 2 }
            },
            "scheduler never skipped a tick",
        )
        .await;
        scheduler.stop().await?;

        assert_eq!(1, recorder.max_concurrent_sends());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_waits_for_cycle_then_shutdown() -> Result<(), Box<dyn Error>> {
        let recorder = Device::get("mock");
        recorder.set_delay(Duration::from_millis(5));
        let monitor = monitor("mock:50", &recorder)?;
        let mut scheduler = Scheduler::start(
            monitor.clone(),
            Duration::ZERO,
            Duration::from_millis(10),
        );

        eventually_async(
            || {
                let stats = scheduler.stats();
                async move { stats.completed >= 1 }
            },
            "scheduler never completed a cycle",
        )
        .await;
        scheduler.stop().await?;
        // Stopping twice is harmless.
        scheduler.stop().await?;

        let completed = scheduler.stats().completed;
        let mut monitor = monitor.lock().await;
        assert!(matches!(monitor.state(), PlaybackState::Sounding { .. }));
        monitor.shutdown()?;
        assert_eq!(PlaybackState::Idle, monitor.state());
        assert!(recorder.is_closed());

        // Messages end with the three note offs of the last chord.
        let sent = recorder.sent();
        assert_eq!(completed as usize * 6, sent.len());
        assert!(sent[sent.len() - 3..]
            .iter()
            .all(|message| matches!(message, Message::NoteOff { .. })));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failed_cycles_are_counted() -> Result<(), Box<dyn Error>> {
        let recorder = Device::get("mock");
        recorder.fail_after(0);
        let monitor = monitor("mock:50", &recorder)?;
        let mut scheduler = Scheduler::start(
            monitor.clone(),
            Duration::ZERO,
            Duration::from_millis(5),
        );

        eventually_async(
            || {
                let stats = scheduler.stats();
                async move { stats.failed >= 2 }
            },
            "scheduler stopped after a failed cycle",
        )
        .await;
        let stats = scheduler.stop().await?;
        assert_eq!(0, stats.completed);
        Ok(())
    }
}
