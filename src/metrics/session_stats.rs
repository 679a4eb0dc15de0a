//! Statistics over a batch of sessions
//!
//! Keeps rolling windows of per-session fruit counts and tick counts, plus
//! lifetime totals per outcome, for the headless runner's progress lines.

use std::collections::VecDeque;

use crate::game::{EndReason, GameStatus, SessionReport};

/// Rolling statistics over finished sessions
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Fruit eaten per session (rolling window)
    fruit: VecDeque<u32>,

    /// Session lengths in ticks (rolling window)
    ticks: VecDeque<u32>,

    wins: usize,
    trapped: usize,
    collisions: usize,
    timeouts: usize,

    /// Total number of sessions recorded
    total_sessions: usize,

    /// Total ticks across all sessions
    total_ticks: u64,

    /// Window size for rolling averages
    window_size: usize,
}

impl SessionStats {
    /// Create a tracker averaging over the last `window_size` sessions
    pub fn new(window_size: usize) -> Self {
        Self {
            fruit: VecDeque::with_capacity(window_size),
            ticks: VecDeque::with_capacity(window_size),
            wins: 0,
            trapped: 0,
            collisions: 0,
            timeouts: 0,
            total_sessions: 0,
            total_ticks: 0,
            window_size,
        }
    }

    /// Record a finished session
    pub fn record(&mut self, report: &SessionReport) {
        Self::push_deque(&mut self.fruit, report.fruits_eaten, self.window_size);
        Self::push_deque(&mut self.ticks, report.ticks, self.window_size);

        match report.status {
            GameStatus::Won => self.wins += 1,
            GameStatus::GameOver(EndReason::Trapped) => self.trapped += 1,
            GameStatus::GameOver(EndReason::HitWall | EndReason::HitSelf) => {
                self.collisions += 1
            }
            GameStatus::TimedOut => self.timeouts += 1,
            GameStatus::Running => {}
        }

        self.total_sessions += 1;
        self.total_ticks += u64::from(report.ticks);
    }

    /// Mean fruit per session over the rolling window
    pub fn mean_fruit(&self) -> f32 {
        Self::mean(&self.fruit)
    }

    /// Mean session length in ticks over the rolling window
    pub fn mean_ticks(&self) -> f32 {
        Self::mean(&self.ticks)
    }

    pub fn wins(&self) -> usize {
        self.wins
    }

    pub fn trapped(&self) -> usize {
        self.trapped
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn timeouts(&self) -> usize {
        self.timeouts
    }

    pub fn total_sessions(&self) -> usize {
        self.total_sessions
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line summary of the current statistics
    pub fn format_summary(&self) -> String {
        format!(
            "Sessions: {} | Ticks: {} | Fruit: {:.2} | Ticks/session: {:.1} | Won: {} | Trapped: {} | Crashed: {} | Timed out: {}",
            self.total_sessions,
            self.total_ticks,
            self.mean_fruit(),
            self.mean_ticks(),
            self.wins,
            self.trapped,
            self.collisions,
            self.timeouts,
        )
    }

    fn mean(deque: &VecDeque<u32>) -> f32 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().map(|v| *v as f32).sum::<f32>() / deque.len() as f32
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: GameStatus, fruits_eaten: u32, ticks: u32) -> SessionReport {
        SessionReport {
            status,
            fruits_eaten,
            ticks,
            length: 20,
        }
    }

    #[test]
    fn test_new() {
        let stats = SessionStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_sessions(), 0);
        assert_eq!(stats.total_ticks(), 0);
        assert_eq!(stats.mean_fruit(), 0.0);
        assert_eq!(stats.mean_ticks(), 0.0);
    }

    #[test]
    fn test_outcome_counts() {
        let mut stats = SessionStats::new(10);
        stats.record(&report(GameStatus::Won, 50, 900));
        stats.record(&report(GameStatus::GameOver(EndReason::Trapped), 12, 300));
        stats.record(&report(GameStatus::GameOver(EndReason::HitSelf), 3, 40));
        stats.record(&report(GameStatus::TimedOut, 20, 6000));

        assert_eq!(stats.wins(), 1);
        assert_eq!(stats.trapped(), 1);
        assert_eq!(stats.collisions(), 1);
        assert_eq!(stats.timeouts(), 1);
        assert_eq!(stats.total_ticks(), 7240);
    }

    #[test]
    fn test_rolling_average() {
        let mut stats = SessionStats::new(3);

        stats.record(&report(GameStatus::Won, 1, 10));
        stats.record(&report(GameStatus::Won, 2, 20));
        stats.record(&report(GameStatus::Won, 3, 30));
        assert!((stats.mean_fruit() - 2.0).abs() < 1e-5);

        // A 4th session evicts the first
        stats.record(&report(GameStatus::Won, 4, 40));
        assert_eq!(stats.total_sessions(), 4);
        assert!((stats.mean_fruit() - 3.0).abs() < 1e-5);
        assert!((stats.mean_ticks() - 30.0).abs() < 1e-5);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = SessionStats::new(100);
        stats.record(&report(GameStatus::GameOver(EndReason::Trapped), 5, 150));

        let summary = stats.format_summary();
        assert!(summary.contains("Sessions: 1"));
        assert!(summary.contains("Ticks: 150"));
        assert!(summary.contains("Fruit: 5.00"));
        assert!(summary.contains("Ticks/session: 150.0"));
        assert!(summary.contains("Trapped: 1"));
    }
}
