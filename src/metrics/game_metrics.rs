use std::time::{Duration, Instant};

use crate::game::{GameStatus, SessionReport};

/// Wall-clock timing and running totals for the sessions a host has played
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub sessions_played: u32,
    pub wins: u32,
    pub best_fruit: u32,
    /// Set while the clock is stopped
    paused_at: Option<Instant>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            sessions_played: 0,
            wins: 0,
            best_fruit: 0,
            paused_at: None,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.running_time();
    }

    pub fn on_session_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
        if self.paused_at.is_some() {
            self.paused_at = Some(self.start_time);
        }
    }

    /// Stop the session clock
    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    /// Restart the session clock; time spent paused is not counted
    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.start_time += paused_at.elapsed();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    fn running_time(&self) -> Duration {
        self.paused_at
            .unwrap_or_else(Instant::now)
            .saturating_duration_since(self.start_time)
    }

    pub fn on_session_end(&mut self, report: &SessionReport) {
        self.sessions_played += 1;
        if report.status == GameStatus::Won {
            self.wins += 1;
        }
        if report.fruits_eaten > self.best_fruit {
            self.best_fruit = report.fruits_eaten;
        }
    }

    /// Whether the current session has run for at least `limit`
    pub fn exceeded(&self, limit: Duration) -> bool {
        self.running_time() >= limit
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
