//! Headless runner: plays sessions back to back as fast as the engine allows
//! and prints an end-of-session report for each, followed by batch statistics.
//!
//! # Example
//!
//! ```rust,ignore
//! use snake_autopilot::game::GameConfig;
//! use snake_autopilot::modes::{HeadlessMode, RunConfig};
//!
//! let mut run = HeadlessMode::new(RunConfig::new(10, GameConfig::default()))?;
//! run.run()?;
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, Write};
use std::iter::repeat;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::game::{GameConfig, GameEngine, SessionReport};
use crate::metrics::SessionStats;

/// Configuration for a headless batch
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of sessions to play
    pub sessions: usize,

    /// Wall-clock limit per session
    pub time_limit: Option<Duration>,

    /// Print one JSON object per session instead of text
    pub json: bool,

    pub game_config: GameConfig,
}

impl RunConfig {
    pub fn new(sessions: usize, game_config: GameConfig) -> Self {
        Self {
            sessions,
            time_limit: Some(Duration::from_secs(300)),
            json: false,
            game_config,
        }
    }
}

/// One line of JSON output
#[derive(Debug, Serialize)]
struct SessionRecord<'a> {
    session: usize,
    #[serde(flatten)]
    report: &'a SessionReport,
    elapsed_ms: u128,
}

pub struct HeadlessMode {
    engine: GameEngine,
    stats: SessionStats,
    config: RunConfig,
}

impl HeadlessMode {
    pub fn new(config: RunConfig) -> Result<Self> {
        let engine =
            GameEngine::new(config.game_config.clone()).context("Invalid game configuration")?;

        Ok(Self {
            engine,
            stats: SessionStats::new(100),
            config,
        })
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Play every session, reporting to stdout
    pub fn run(&mut self) -> Result<Vec<SessionReport>> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with(&mut out)
    }

    /// Play every session, reporting to `out`
    pub fn run_with<W: Write>(&mut self, out: &mut W) -> Result<Vec<SessionReport>> {
        if !self.config.json {
            self.print_header(out)?;
        }

        let mut reports = Vec::with_capacity(self.config.sessions);
        for session in 1..=self.config.sessions {
            let (report, elapsed) = self
                .play_session()
                .with_context(|| format!("Session {session} failed"))?;
            self.stats.record(&report);

            if self.config.json {
                let record = SessionRecord {
                    session,
                    report: &report,
                    elapsed_ms: elapsed.as_millis(),
                };
                serde_json::to_writer(&mut *out, &record)
                    .context("Failed to write session report")?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", format_report(session, &report, &elapsed))?;
            }
            reports.push(report);
        }

        if !self.config.json {
            writeln!(out)?;
            writeln!(out, "{}", self.stats.format_summary())?;
        }
        info!(summary = %self.stats.format_summary(), "batch finished");

        Ok(reports)
    }

    /// Run one session to its end state
    fn play_session(&mut self) -> Result<(SessionReport, Duration)> {
        let mut state = self.engine.reset()?;
        let started = Instant::now();

        while state.is_running() {
            if self
                .config
                .time_limit
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                warn!(ticks = state.ticks, "wall-clock limit reached");
                self.engine.time_out(&mut state);
                break;
            }
            self.engine.step(&mut state)?;
        }

        Ok((state.report(), started.elapsed()))
    }

    fn print_header<W: Write>(&self, out: &mut W) -> Result<()> {
        let game = &self.config.game_config;
        let rule: String = repeat('=').take(70).collect();
        writeln!(out, "{rule}")?;
        writeln!(out, "Snake Autopilot - headless run")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "Sessions: {}", self.config.sessions)?;
        writeln!(
            out,
            "Grid: {}x{}, obstacles {}% in {}x{} blocks",
            game.grid_width,
            game.grid_height,
            game.clamped_coverage(),
            game.obstacle_size,
            game.obstacle_size
        )?;
        writeln!(
            out,
            "Fruit target: {}, growth per fruit: {}",
            game.fruit_target, game.growth_per_fruit
        )?;
        writeln!(
            out,
            "Search: {} nodes, weight {:.2}",
            game.node_budget, game.heuristic_weight
        )?;
        match game.seed {
            Some(seed) => writeln!(out, "Seed: {seed}")?,
            None => writeln!(out, "Seed: entropy")?,
        }
        writeln!(out, "{rule}")?;
        writeln!(out)?;
        Ok(())
    }
}

fn format_report(session: usize, report: &SessionReport, elapsed: &Duration) -> String {
    format!(
        "Session {:>4}: {:<32} fruit {:>3} | ticks {:>6} | length {:>4} | {:.2}s",
        session,
        report.status.to_string(),
        report.fruits_eaten,
        report.ticks,
        report.length,
        elapsed.as_secs_f64()
    )
}
