//! Timer loop driving the broadcaster

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use super::broadcaster::Broadcaster;
use crate::error::{BroadcastError, BroadcastResult};

/// Runs tick-then-broadcast once per period until shutdown or a fault
pub struct Ticker {
    broadcaster: Arc<Broadcaster>,
    period: Duration,
    shutdown: watch::Receiver<bool>,
}

impl Ticker {
    pub fn new(broadcaster: Arc<Broadcaster>) -> Self {
        let period = broadcaster.config().period;
        let shutdown = broadcaster.shutdown_signal();
        Self {
            broadcaster,
            period,
            shutdown,
        }
    }

    /// Run the loop as an async task.
    ///
    /// The first tick fires one full period after start. A period overrun by a
    /// slow fan-out delays the following ticks instead of bursting them.
    pub async fn run(mut self) -> BroadcastResult<()> {
        let mut timer = interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(period_ms = self.period.as_millis() as u64, "live update loop started");

        loop {
            if !self.broadcaster.is_running() {
                break;
            }

            tokio::select! {
                biased;

                changed = self.shutdown.changed() => {
                    // Sender gone means the broadcaster itself was dropped
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }

                _ = timer.tick() => {
                    if let Err(err) = self.run_tick().await {
                        error!(error = %err, "live update loop faulted");
                        self.broadcaster.stop();
                        return Err(err);
                    }
                }
            }
        }

        info!("live update loop stopped");
        Ok(())
    }

    /// One tick. Computation failures skip the tick; anything else is fatal.
    async fn run_tick(&self) -> BroadcastResult<()> {
        match self.broadcaster.tick() {
            Ok(frame) => {
                self.broadcaster.broadcast(frame).await;
                Ok(())
            }
            Err(BroadcastError::Computation(reason)) => {
                warn!(%reason, "skipping tick");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::api::websocket::broadcaster::{FrameReceiver, LoopState};
    use crate::api::websocket::telemetry::{
        FixedTelemetry, Telemetry, TelemetryError, TelemetrySource,
    };
    use crate::config::BroadcastConfig;
    use tokio::time::sleep;

    fn config(period_ms: u64) -> BroadcastConfig {
        BroadcastConfig::default().with_period(Duration::from_millis(period_ms))
    }

    fn fixed() -> Arc<dyn TelemetrySource> {
        Arc::new(FixedTelemetry(Telemetry {
            predictions_processed: 200,
            alerts: 0,
        }))
    }

    fn received(rx: &mut FrameReceiver) -> Vec<u64> {
        let mut seen = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            seen.push(frame.snapshot.sequence_id);
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_join_leave() {
        let (broadcaster, handle) = Broadcaster::spawn(config(1_000), fixed());

        let mut a = broadcaster.subscribe().unwrap();
        let b = broadcaster.subscribe().unwrap();
        let mut c = broadcaster.subscribe().unwrap();

        sleep(Duration::from_millis(2_500)).await;

        let a_seen = received(&mut a.rx);
        let c_seen = received(&mut c.rx);
        assert_eq!(a_seen, vec![0, 1]);
        assert_eq!(c_seen, vec![0, 1]);

        // `b` disconnects: its connection task deregisters and drops the queue
        let mut b_rx = b.rx;
        assert_eq!(received(&mut b_rx).len(), 2);
        broadcaster.deregister(b.id);
        drop(b_rx);

        sleep(Duration::from_millis(1_000)).await;

        assert_eq!(received(&mut a.rx), vec![2]);
        assert_eq!(received(&mut c.rx), vec![2]);
        assert_eq!(broadcaster.subscriber_count(), 2);

        broadcaster.shutdown();
        assert_eq!(handle.await.unwrap(), Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_shutdown() {
        let (broadcaster, handle) = Broadcaster::spawn(config(1_000), fixed());
        let mut sub = broadcaster.subscribe().unwrap();

        sleep(Duration::from_millis(1_500)).await;
        broadcaster.shutdown();
        assert_eq!(handle.await.unwrap(), Ok(()));

        sleep(Duration::from_millis(5_000)).await;
        assert_eq!(received(&mut sub.rx), vec![0]);
        assert!(sub.rx.recv().await.is_none());
        assert_eq!(broadcaster.current_sequence_id(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timestamps_non_decreasing_for_subscriber() {
        let (broadcaster, _handle) = Broadcaster::spawn(config(100), fixed());
        let mut sub = broadcaster.subscribe().unwrap();

        let mut previous = None;
        for _ in 0..10 {
            let frame = sub.rx.recv().await.unwrap();
            if let Some(prev) = previous {
                assert!(frame.snapshot.timestamp >= prev);
            }
            previous = Some(frame.snapshot.timestamp);
        }

        broadcaster.shutdown();
    }

    /// Fails on chosen calls, counting every sample
    struct Flaky {
        calls: AtomicUsize,
        unavailable_on: usize,
        fault_on: usize,
    }

    impl TelemetrySource for Flaky {
        fn sample(&self) -> Result<Telemetry, TelemetryError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == self.unavailable_on {
                Err(TelemetryError::Unavailable("sensor warming up".into()))
            } else if n == self.fault_on {
                Err(TelemetryError::Fault("counter store corrupted".into()))
            } else {
                Ok(Telemetry {
                    predictions_processed: 100,
                    alerts: 2,
                })
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_computation_failure_skips_tick_and_fault_stops_loop() {
        let telemetry = Arc::new(Flaky {
            calls: AtomicUsize::new(0),
            unavailable_on: 1,
            fault_on: 3,
        });
        let (broadcaster, handle) = Broadcaster::spawn(config(1_000), telemetry);
        let mut sub = broadcaster.subscribe().unwrap();

        // Ticks at 1s, 2s (skipped), 3s, 4s (fault)
        sleep(Duration::from_millis(4_500)).await;

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(BroadcastError::Fault(_))));
        assert_eq!(broadcaster.state(), LoopState::Stopped);
        assert_eq!(received(&mut sub.rx), vec![0, 1]);
        assert_eq!(
            broadcaster.subscribe().unwrap_err(),
            BroadcastError::ServiceUnavailable
        );
    }
}
