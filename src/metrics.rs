//! Prometheus-compatible metrics
//!
//! Exposes simulation counters in Prometheus text format and as JSON.
//! The HTTP endpoint is only started when `METRICS_PORT` is set.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "metrics_http")]
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::json;
#[cfg(feature = "metrics_http")]
use tokio::io::{AsyncReadExt, AsyncWriteExt};
#[cfg(feature = "metrics_http")]
use tokio::net::TcpListener;
#[cfg(feature = "metrics_http")]
use tracing::{debug, info};

use crate::game::performance::{BudgetStatus, PerformanceMonitor};
use crate::game::state::SimStats;

/// Metrics registry for the simulation
#[derive(Debug)]
pub struct Metrics {
    // Population
    pub live_agents: AtomicU64,
    pub pending_respawns: AtomicU64,
    pub trail_count: AtomicU64,

    // Lifetime totals
    pub kills_total: AtomicU64,
    pub respawns_total: AtomicU64,

    // Tick timing (microseconds)
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_p99_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,

    // Budget status (0=Relaxed, 1=Nominal, 2=Strained, 3=Overrun)
    pub budget_status: AtomicU64,
    pub budget_usage_percent: AtomicU64,

    pub tick_count: AtomicU64,

    start_time: Instant,

    // Rolling tick times for percentile calculation
    tick_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            live_agents: AtomicU64::new(0),
            pending_respawns: AtomicU64::new(0),
            trail_count: AtomicU64::new(0),
            kills_total: AtomicU64::new(0),
            respawns_total: AtomicU64::new(0),
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_p99_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            budget_status: AtomicU64::new(0),
            budget_usage_percent: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(1000)),
        }
    }

    /// Record a tick time and update percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > 1000 {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            let p99_idx = (sorted.len() as f32 * 0.99) as usize;

            self.tick_time_p95_us.store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_p99_us.store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_max_us.store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    /// Copy the simulation counters into the gauges
    pub fn update_from_stats(&self, stats: &SimStats) {
        self.tick_count.store(stats.tick, Ordering::Relaxed);
        self.live_agents.store(stats.live_agents as u64, Ordering::Relaxed);
        self.pending_respawns.store(stats.pending_respawns as u64, Ordering::Relaxed);
        self.trail_count.store(stats.trail_count as u64, Ordering::Relaxed);
        self.kills_total.store(stats.kills_total, Ordering::Relaxed);
        self.respawns_total.store(stats.respawns_total, Ordering::Relaxed);
    }

    pub fn update_budget(&self, monitor: &PerformanceMonitor) {
        self.budget_status.store(monitor.status().as_gauge(), Ordering::Relaxed);
        self.budget_usage_percent
            .store(monitor.budget_usage_percent() as u64, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    fn budget_status_name(&self) -> &'static str {
        match self.budget_status.load(Ordering::Relaxed) {
            0 => BudgetStatus::Relaxed.name(),
            1 => BudgetStatus::Nominal.name(),
            2 => BudgetStatus::Strained.name(),
            _ => BudgetStatus::Overrun.name(),
        }
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("drift_sim_agents_live", "Agents currently on the plane", "gauge",
            self.live_agents.load(Ordering::Relaxed));
        metric!("drift_sim_respawns_pending", "Dead agents waiting to respawn", "gauge",
            self.pending_respawns.load(Ordering::Relaxed));
        metric!("drift_sim_trails", "Trail dots currently alive", "gauge",
            self.trail_count.load(Ordering::Relaxed));
        metric!("drift_sim_kills_total", "Agents killed since start", "counter",
            self.kills_total.load(Ordering::Relaxed));
        metric!("drift_sim_respawns_total", "Agents respawned since start", "counter",
            self.respawns_total.load(Ordering::Relaxed));

        metric!("drift_sim_tick_time_microseconds", "Last tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("drift_sim_tick_time_p95_microseconds", "95th percentile tick time", "gauge",
            self.tick_time_p95_us.load(Ordering::Relaxed));
        metric!("drift_sim_tick_time_p99_microseconds", "99th percentile tick time", "gauge",
            self.tick_time_p99_us.load(Ordering::Relaxed));
        metric!("drift_sim_tick_time_max_microseconds", "Maximum tick time in the window", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));
        metric!("drift_sim_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));

        metric!("drift_sim_budget_status", "Tick budget status (0=Relaxed, 3=Overrun)", "gauge",
            self.budget_status.load(Ordering::Relaxed));
        metric!("drift_sim_budget_usage_percent", "Tick budget usage percentage", "gauge",
            self.budget_usage_percent.load(Ordering::Relaxed));
        output.push_str(&format!(
            "# HELP drift_sim_budget_state Human-readable budget state\n# TYPE drift_sim_budget_state gauge\ndrift_sim_budget_state{{state=\"{}\"}} 1\n",
            self.budget_status_name()
        ));

        metric!("drift_sim_uptime_seconds", "Process uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// JSON form of the same metrics
    pub fn to_json(&self) -> String {
        let value = json!({
            "agents": {
                "live": self.live_agents.load(Ordering::Relaxed),
                "pending_respawns": self.pending_respawns.load(Ordering::Relaxed),
                "kills_total": self.kills_total.load(Ordering::Relaxed),
                "respawns_total": self.respawns_total.load(Ordering::Relaxed),
            },
            "trails": self.trail_count.load(Ordering::Relaxed),
            "performance": {
                "tick_time_us": self.tick_time_us.load(Ordering::Relaxed),
                "tick_time_p95_us": self.tick_time_p95_us.load(Ordering::Relaxed),
                "tick_time_p99_us": self.tick_time_p99_us.load(Ordering::Relaxed),
                "tick_time_max_us": self.tick_time_max_us.load(Ordering::Relaxed),
                "tick_count": self.tick_count.load(Ordering::Relaxed),
                "status": self.budget_status.load(Ordering::Relaxed),
                "status_name": self.budget_status_name(),
                "budget_percent": self.budget_usage_percent.load(Ordering::Relaxed),
            },
            "uptime_seconds": self.uptime_seconds(),
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the metrics HTTP server
#[cfg(feature = "metrics_http")]
pub async fn start_metrics_server(metrics: Arc<Metrics>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Metrics server listening on http://{}/metrics", addr);
    serve(listener, metrics).await
}

#[cfg(feature = "metrics_http")]
async fn serve(listener: TcpListener, metrics: Arc<Metrics>) -> anyhow::Result<()> {
    loop {
        let (mut socket, peer) = listener.accept().await?;
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 1024];

            match socket.read(&mut buffer).await {
                Ok(n) if n > 0 => {
                    let request = String::from_utf8_lossy(&buffer[..n]);
                    let response = respond(&request, &metrics);

                    if let Err(e) = socket.write_all(response.as_bytes()).await {
                        debug!("Failed to write metrics response to {}: {}", peer, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Failed to read from metrics socket {}: {}", peer, e);
                }
            }
        });
    }
}

#[cfg(feature = "metrics_http")]
fn respond(request: &str, metrics: &Metrics) -> String {
    let ok = |content_type: &str, body: &str| {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            content_type,
            body.len(),
            body
        )
    };

    // /metrics/json must be matched before /metrics
    if request.starts_with("GET /metrics/json") || request.starts_with("GET /json") {
        ok("application/json", &metrics.to_json())
    } else if request.starts_with("GET /metrics") {
        ok("text/plain; version=0.0.4", &metrics.to_prometheus())
    } else if request.starts_with("GET /health") {
        ok("text/plain", "OK")
    } else {
        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
    }
}
