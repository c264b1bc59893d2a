//! Tick budget monitoring
//!
//! Tracks how long each tick body takes relative to the tick interval.
//! Ticks are allowed to run late, but the driver logs when the rolling
//! average stops fitting the budget.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How much of the tick budget recent ticks consume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// Under 30% of the interval
    Relaxed,
    /// Under 70%
    Nominal,
    /// Under 100%
    Strained,
    /// Average tick exceeds the interval; the driver is skipping beats
    Overrun,
}

impl BudgetStatus {
    /// Gauge value exported to metrics
    pub fn as_gauge(&self) -> u64 {
        match self {
            BudgetStatus::Relaxed => 0,
            BudgetStatus::Nominal => 1,
            BudgetStatus::Strained => 2,
            BudgetStatus::Overrun => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BudgetStatus::Relaxed => "relaxed",
            BudgetStatus::Nominal => "nominal",
            BudgetStatus::Strained => "strained",
            BudgetStatus::Overrun => "overrun",
        }
    }
}

pub struct PerformanceMonitor {
    /// Rolling window of tick durations
    tick_durations: VecDeque<Duration>,
    max_samples: usize,
    budget: Duration,
    status: BudgetStatus,
    tick_start: Option<Instant>,
    /// Ticks that individually took longer than the budget
    late_ticks: u64,
}

impl PerformanceMonitor {
    pub fn new(budget: Duration) -> Self {
        Self {
            tick_durations: VecDeque::with_capacity(120), // ~2 seconds at 60Hz
            max_samples: 120,
            budget,
            status: BudgetStatus::Relaxed,
            tick_start: None,
            late_ticks: 0,
        }
    }

    pub fn tick_start(&mut self) {
        self.tick_start = Some(Instant::now());
    }

    /// Returns the measured duration of the tick started by `tick_start`
    pub fn tick_end(&mut self) -> Option<Duration> {
        let start = self.tick_start.take()?;
        let duration = start.elapsed();
        self.record_tick(duration);
        Some(duration)
    }

    fn record_tick(&mut self, duration: Duration) {
        if duration > self.budget {
            self.late_ticks += 1;
        }
        self.tick_durations.push_back(duration);
        while self.tick_durations.len() > self.max_samples {
            self.tick_durations.pop_front();
        }
        self.update_status();
    }

    fn update_status(&mut self) {
        if self.tick_durations.len() < 10 {
            // Not enough data yet
            return;
        }

        let ratio = self.budget_usage_percent() / 100.0;
        self.status = if ratio < 0.3 {
            BudgetStatus::Relaxed
        } else if ratio < 0.7 {
            BudgetStatus::Nominal
        } else if ratio < 1.0 {
            BudgetStatus::Strained
        } else {
            BudgetStatus::Overrun
        };
    }

    pub fn average_tick_duration(&self) -> Duration {
        if self.tick_durations.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.tick_durations.iter().sum();
        sum / self.tick_durations.len() as u32
    }

    pub fn p95_tick_duration(&self) -> Duration {
        if self.tick_durations.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<_> = self.tick_durations.iter().copied().collect();
        sorted.sort();
        let idx = (sorted.len() as f32 * 0.95) as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    pub fn status(&self) -> BudgetStatus {
        self.status
    }

    /// Average tick as a percentage of the budget (may exceed 100)
    pub fn budget_usage_percent(&self) -> f32 {
        self.average_tick_duration().as_secs_f32() / self.budget.as_secs_f32() * 100.0
    }

    pub fn late_ticks(&self) -> u64 {
        self.late_ticks
    }

    pub fn status_message(&self) -> String {
        format!(
            "{} - {:.1}% of {:?} budget, p95 {:?}, {} late",
            self.status.name(),
            self.budget_usage_percent(),
            self.budget,
            self.p95_tick_duration(),
            self.late_ticks
        )
    }
}
