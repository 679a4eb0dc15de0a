//! Terminal viewer that renders the autopilot playing session after session.
//!
//! # Controls
//!
//! - Space/P: Pause/unpause
//! - R: Start a new session
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stderr, Stderr};
use std::time::{Duration, Instant};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::info;

use crate::ai::Strategy;
use crate::game::{GameConfig, GameEngine, GameState};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{Overlay, Renderer};

/// How long a finished session stays on screen before the next one starts
const RESTART_DELAY: Duration = Duration::from_secs(3);

/// Playback speed settings, relative to the configured tick interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchSpeed {
    /// A quarter of normal speed
    Slow,
    /// The configured tick interval
    Normal,
    /// Four times normal speed
    Fast,
    /// One tick per millisecond
    VeryFast,
}

impl WatchSpeed {
    /// Tick interval for this speed given the normal interval
    pub fn tick_interval(&self, normal: Duration) -> Duration {
        let period = match self {
            Self::Slow => normal * 4,
            Self::Normal => normal,
            Self::Fast => normal / 4,
            Self::VeryFast => Duration::from_millis(1),
        };
        // tokio intervals reject a zero period
        period.max(Duration::from_millis(1))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very Fast",
        }
    }
}

/// Viewer settings taken from the command line
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    pub tick: Duration,
    pub time_limit: Option<Duration>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(50),
            time_limit: Some(Duration::from_secs(300)),
        }
    }
}

pub struct WatchMode {
    engine: GameEngine,
    state: GameState,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    options: WatchOptions,
    should_quit: bool,
    speed: WatchSpeed,
    last_strategy: Option<Strategy>,
    finished_at: Option<Instant>,
}

impl WatchMode {
    pub fn new(config: GameConfig, options: WatchOptions) -> Result<Self> {
        let mut engine = GameEngine::new(config).context("Invalid game configuration")?;
        let state = engine.reset().context("Failed to set up the first session")?;

        Ok(Self {
            engine,
            state,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            options,
            should_quit: false,
            speed: WatchSpeed::Normal,
            last_strategy: None,
            finished_at: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_watch_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_watch_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.speed.tick_interval(self.options.tick));
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer)?;
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.metrics.is_paused() {
                        self.update_game()?;
                    }
                }

                _ = render_timer.tick() => {
                    if self.state.is_running() {
                        self.metrics.update();
                    }
                    terminal.draw(|frame| {
                        let overlay = Overlay {
                            paused: self.metrics.is_paused(),
                            speed: self.speed.as_str(),
                            strategy: self.last_strategy,
                            fruit_target: self.engine.config().fruit_target,
                        };
                        self.renderer.render(frame, &self.state, &self.metrics, &overlay);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::TogglePause => self.toggle_pause(),
                KeyAction::Speed(speed) => self.change_speed(speed, tick_timer),
                KeyAction::Restart => self.new_session()?,
                KeyAction::Quit => self.should_quit = true,
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    /// Paused time does not count against the session's time limit
    fn toggle_pause(&mut self) {
        if self.metrics.is_paused() {
            self.metrics.resume();
        } else {
            self.metrics.pause();
        }
    }

    fn change_speed(&mut self, speed: WatchSpeed, tick_timer: &mut Interval) {
        self.speed = speed;
        *tick_timer = interval(self.speed.tick_interval(self.options.tick));
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    }

    /// Advance the session by one tick, or roll over to a new one once the
    /// finished session has been on screen long enough.
    fn update_game(&mut self) -> Result<()> {
        if !self.state.is_running() {
            if self
                .finished_at
                .is_some_and(|finished| finished.elapsed() >= RESTART_DELAY)
            {
                self.new_session()?;
            }
            return Ok(());
        }

        if self
            .options
            .time_limit
            .is_some_and(|limit| self.metrics.exceeded(limit))
        {
            self.engine.time_out(&mut self.state);
            self.end_session();
            return Ok(());
        }

        let result = self
            .engine
            .step(&mut self.state)
            .context("Failed to advance the session")?;
        if result.info.strategy.is_some() {
            self.last_strategy = result.info.strategy;
        }

        if result.terminated {
            self.end_session();
        }

        Ok(())
    }

    fn end_session(&mut self) {
        self.metrics.update();
        let report = self.state.report();
        self.metrics.on_session_end(&report);
        self.finished_at = Some(Instant::now());
        info!(
            status = %report.status,
            eaten = report.fruits_eaten,
            ticks = report.ticks,
            elapsed = %self.metrics.format_time(),
            "session finished"
        );
    }

    fn new_session(&mut self) -> Result<()> {
        self.state = self
            .engine
            .reset()
            .context("Failed to set up a new session")?;
        self.metrics.on_session_start();
        self.last_strategy = None;
        self.finished_at = None;
        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameStatus;

    fn mode(time_limit: Option<Duration>) -> WatchMode {
        let options = WatchOptions {
            tick: Duration::from_millis(40),
            time_limit,
        };
        WatchMode::new(GameConfig::small().with_seed(9), options).unwrap()
    }

    #[test]
    fn test_watch_speed() {
        let normal = Duration::from_millis(40);
        assert_eq!(WatchSpeed::Slow.tick_interval(normal), Duration::from_millis(160));
        assert_eq!(WatchSpeed::Normal.tick_interval(normal), normal);
        assert_eq!(WatchSpeed::Fast.tick_interval(normal), Duration::from_millis(10));
        assert_eq!(WatchSpeed::VeryFast.tick_interval(normal), Duration::from_millis(1));
        assert_eq!(
            WatchSpeed::Fast.tick_interval(Duration::from_millis(2)),
            Duration::from_millis(1)
        );
    }

    #[test]
    fn test_watch_initialization() {
        let mode = mode(None);
        assert!(mode.state.is_running());
        assert_eq!(mode.state.ticks, 0);
        assert!(!mode.metrics.is_paused());
        assert_eq!(mode.speed, WatchSpeed::Normal);
        assert!(mode.finished_at.is_none());
    }

    #[test]
    fn test_update_advances_session() {
        let mut mode = mode(None);
        mode.update_game().unwrap();
        assert_eq!(mode.state.ticks, 1);
        assert!(mode.last_strategy.is_some());
    }

    #[test]
    fn test_time_limit_ends_session() {
        let mut mode = mode(Some(Duration::ZERO));
        mode.update_game().unwrap();

        assert_eq!(mode.state.status, GameStatus::TimedOut);
        assert_eq!(mode.state.ticks, 0);
        assert_eq!(mode.metrics.sessions_played, 1);
        assert!(mode.finished_at.is_some());

        // Finished sessions wait on screen before the next one starts
        mode.update_game().unwrap();
        assert_eq!(mode.state.status, GameStatus::TimedOut);
    }

    #[test]
    fn test_pause_does_not_use_up_time_limit() {
        let mut mode = mode(Some(Duration::from_millis(50)));
        mode.toggle_pause();
        std::thread::sleep(Duration::from_millis(80));
        mode.toggle_pause();

        mode.update_game().unwrap();
        assert!(mode.state.is_running());
        assert_eq!(mode.state.ticks, 1);
    }

    #[test]
    fn test_restart_starts_fresh_session() {
        let mut mode = mode(None);
        for _ in 0..5 {
            mode.update_game().unwrap();
        }
        mode.new_session().unwrap();

        assert!(mode.state.is_running());
        assert_eq!(mode.state.ticks, 0);
        assert_eq!(mode.state.fruits_eaten, 0);
        assert!(mode.last_strategy.is_none());
    }
}
