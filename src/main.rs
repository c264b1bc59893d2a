use std::sync::Arc;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use drift_sim::config::{RuntimeConfig, SimConfig};
use drift_sim::driver::{self, SimulationDriver};
use drift_sim::game::events::{EventFeed, SimEvent};
use drift_sim::game::state::Simulation;
use drift_sim::metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Drift simulation v{}", env!("CARGO_PKG_VERSION"));

    let runtime = RuntimeConfig::load_or_default();
    let sim_config = SimConfig::default();
    info!(
        "Plane {}x{}, {} agents, tick every {:?}",
        sim_config.width, sim_config.height, sim_config.initial_agents, sim_config.tick_interval
    );

    let sim = driver::shared(Simulation::new(sim_config)?);
    let metrics = Arc::new(Metrics::new());
    let feed = EventFeed::new(runtime.event_feed_capacity);

    #[cfg(feature = "metrics_http")]
    {
        if let Some(port) = runtime.metrics_port {
            let metrics = metrics.clone();
            tokio::spawn(async move {
                if let Err(e) = drift_sim::metrics::start_metrics_server(metrics, port).await {
                    error!("Metrics server error: {}", e);
                }
            });
        }
    }

    // Kill feed: log on a blocking thread so the runtime never waits on it
    let subscriber = feed.subscriber();
    let feed_logger = tokio::task::spawn_blocking(move || {
        for event in subscriber.iter() {
            match event {
                SimEvent::AgentKilled { killer, victim, position, .. } => info!(
                    "{} killed {} at ({:.0}, {:.0})",
                    killer, victim, position.x, position.y
                ),
                SimEvent::AgentRespawned { agent, position, .. } => debug!(
                    "{} spawned at ({:.0}, {:.0})",
                    agent, position.x, position.y
                ),
            }
        }
    });

    let handle = SimulationDriver::new(sim.clone())
        .with_events(feed.publisher())
        .with_metrics(metrics.clone())
        .spawn();

    let stats_sim = sim.clone();
    let stats_every = runtime.stats_interval;
    let stats_logger = tokio::spawn(async move {
        let mut ticker = interval(stats_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let stats = stats_sim.read().stats();
            info!(
                "Stats: tick={} live={} trails={} pending_respawns={} kills={} respawns={}",
                stats.tick,
                stats.live_agents,
                stats.trail_count,
                stats.pending_respawns,
                stats.kills_total,
                stats.respawns_total
            );
        }
    });

    let run_for = async {
        match runtime.run_for {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
            info!("Shutdown signal received");
        }
        _ = run_for => {
            info!("Run time elapsed");
        }
    }

    stats_logger.abort();
    handle.shutdown().await;

    // Dropping the last sender ends the feed logger
    drop(feed);
    if let Err(e) = feed_logger.await {
        error!("Event logger failed: {}", e);
    }

    let stats = sim.read().stats();
    info!(
        "Stopped after {} ticks: {} kills, {} respawns",
        stats.tick, stats.kills_total, stats.respawns_total
    );

    Ok(())
}
