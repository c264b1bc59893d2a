//! Periodic tick driver
//!
//! Runs `Simulation::tick` on a fixed tokio interval and turns every kill
//! into a one-shot respawn timer. Ticks run inside one task, so they never
//! overlap; respawn timers take the same write lock and therefore land
//! between ticks.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, sleep_until, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::game::events::{EventPublisher, SimEvent};
use crate::game::performance::{BudgetStatus, PerformanceMonitor};
use crate::game::respawn::RespawnToken;
use crate::game::state::Simulation;
use crate::metrics::Metrics;

/// Simulation shared between the driver, respawn timers and readers
pub type SharedSimulation = Arc<RwLock<Simulation>>;

pub fn shared(sim: Simulation) -> SharedSimulation {
    Arc::new(RwLock::new(sim))
}

pub struct SimulationDriver {
    sim: SharedSimulation,
    tick_interval: Duration,
    events: Option<EventPublisher>,
    metrics: Option<Arc<Metrics>>,
}

impl SimulationDriver {
    /// Driver ticking at the simulation's configured interval
    pub fn new(sim: SharedSimulation) -> Self {
        let tick_interval = sim.read().config().tick_interval;
        Self {
            sim,
            tick_interval,
            events: None,
            metrics: None,
        }
    }

    /// Publish kills and respawns to an event feed
    pub fn with_events(mut self, publisher: EventPublisher) -> Self {
        self.events = Some(publisher);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Start the tick task on the current runtime
    pub fn spawn(self) -> DriverHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        DriverHandle { shutdown_tx, task }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut respawn_timers: JoinSet<()> = JoinSet::new();
        let mut perf = PerformanceMonitor::new(self.tick_interval);
        let mut last_status = perf.status();

        info!("Simulation driver started ({:?} per tick)", self.tick_interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,

                scheduled = ticker.tick() => {
                    let now = scheduled.into_std();

                    perf.tick_start();
                    let (events, stats) = {
                        let mut sim = self.sim.write();
                        let events = sim.tick(now);
                        (events, sim.stats())
                    };
                    let elapsed = perf.tick_end().unwrap_or_default();
                    trace!("Tick {} took {:?}", stats.tick, elapsed);

                    for event in events {
                        if let SimEvent::AgentKilled { token, respawn_at, .. } = event {
                            self.schedule_respawn(&mut respawn_timers, token, respawn_at);
                        }
                        if let Some(publisher) = &self.events {
                            publisher.publish(event);
                        }
                    }

                    if let Some(metrics) = &self.metrics {
                        metrics.record_tick_time(elapsed);
                        metrics.update_from_stats(&stats);
                        metrics.update_budget(&perf);
                    }

                    let status = perf.status();
                    if status != last_status {
                        if status == BudgetStatus::Overrun {
                            warn!("Tick budget overrun: {}", perf.status_message());
                        } else {
                            debug!("Tick budget {}", perf.status_message());
                        }
                        last_status = status;
                    }
                }

                Some(finished) = respawn_timers.join_next(), if !respawn_timers.is_empty() => {
                    if let Err(e) = finished {
                        if !e.is_cancelled() {
                            warn!("Respawn timer failed: {}", e);
                        }
                    }
                }
            }
        }

        let cancelled = respawn_timers.len();
        respawn_timers.shutdown().await;
        info!(
            "Simulation driver stopped ({} pending respawns cancelled)",
            cancelled
        );
    }

    fn schedule_respawn(
        &self,
        timers: &mut JoinSet<()>,
        token: RespawnToken,
        respawn_at: std::time::Instant,
    ) {
        let sim = self.sim.clone();
        let publisher = self.events.clone();

        timers.spawn(async move {
            sleep_until(tokio::time::Instant::from_std(respawn_at)).await;

            let event = sim.write().respawn(token);
            match (event, publisher) {
                (Some(event), Some(publisher)) => publisher.publish(event),
                (Some(_), None) => {}
                (None, _) => debug!("{} already fired", token),
            }
        });
    }
}

/// Handle to a running driver
pub struct DriverHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Stop ticking, cancel pending respawns and wait for the task to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!("Simulation driver task failed: {}", e);
        }
    }
}
