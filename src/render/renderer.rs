use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::ai::Strategy;
use crate::game::{CellRole, GameState, GameStatus};
use crate::metrics::GameMetrics;

/// Viewer-side state shown next to the board
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a> {
    pub paused: bool,
    pub speed: &'a str,
    pub strategy: Option<Strategy>,
    pub fruit_target: u32,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        metrics: &GameMetrics,
        overlay: &Overlay<'_>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(chunks[0], state, metrics, overlay);
        frame.render_widget(stats, chunks[0]);

        if state.is_running() {
            let grid = self.render_grid(chunks[1], state);
            frame.render_widget(grid, chunks[1]);
        } else {
            let summary = self.render_summary(chunks[1], state, metrics, overlay);
            frame.render_widget(summary, chunks[1]);
        }

        let controls = self.render_controls(chunks[2]);
        frame.render_widget(controls, chunks[2]);
    }

    /// Rasterize the state's cell frame into styled rows
    fn render_grid(&self, _area: Rect, state: &GameState) -> Paragraph<'_> {
        let width = state.grid.width();
        let height = state.grid.height();
        let mut roles: Vec<Option<CellRole>> = vec![None; width * height];
        for (cell, role) in state.frame() {
            if state.grid.in_bounds(cell) {
                roles[cell.y as usize * width + cell.x as usize] = Some(role);
            }
        }

        let lines: Vec<Line> = roles
            .chunks(width)
            .map(|row| Line::from(row.iter().map(|role| cell_span(*role)).collect::<Vec<_>>()))
            .collect();

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Snake Autopilot "),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(
        &self,
        _area: Rect,
        state: &GameState,
        metrics: &GameMetrics,
        overlay: &Overlay<'_>,
    ) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);
        let mut spans = vec![
            Span::styled("Fruit: ", label),
            Span::styled(
                format!("{}/{}", state.fruits_eaten, overlay.fruit_target),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Ticks: ", label),
            Span::styled(state.ticks.to_string(), value),
            Span::raw("    "),
            Span::styled("Length: ", label),
            Span::styled(state.snake.len().to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(overlay.speed.to_string(), value),
        ];

        if let Some(strategy) = overlay.strategy {
            spans.push(Span::raw("    "));
            spans.push(Span::styled("Mode: ", label));
            spans.push(Span::styled(strategy.as_str(), value));
        }

        if overlay.paused {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                "PAUSED",
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ));
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_summary(
        &self,
        _area: Rect,
        state: &GameState,
        metrics: &GameMetrics,
        overlay: &Overlay<'_>,
    ) -> Paragraph<'_> {
        let (headline, color) = match state.status {
            GameStatus::Won => ("YOU WON".to_string(), Color::Green),
            GameStatus::TimedOut => ("TIME LIMIT REACHED".to_string(), Color::Yellow),
            GameStatus::GameOver(reason) => (format!("GAME OVER: {reason}"), Color::Red),
            GameStatus::Running => (String::new(), Color::White),
        };

        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                headline,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Fruit eaten: ", label),
                Span::styled(
                    format!("{}/{}", state.fruits_eaten, overlay.fruit_target),
                    value,
                ),
                Span::raw("    "),
                Span::styled("Ticks: ", label),
                Span::styled(state.ticks.to_string(), value),
                Span::raw("    "),
                Span::styled("Time: ", label),
                Span::styled(metrics.format_time(), value),
            ]),
            Line::from(vec![
                Span::styled("Sessions: ", label),
                Span::styled(metrics.sessions_played.to_string(), value),
                Span::raw("    "),
                Span::styled("Wins: ", label),
                Span::styled(metrics.wins.to_string(), value),
                Span::raw("    "),
                Span::styled("Best: ", label),
                Span::styled(metrics.best_fruit.to_string(), value),
            ]),
            Line::from(""),
            Line::from(vec![Span::styled(
                "Next session starts shortly",
                Style::default().fg(Color::Gray),
            )]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
    }

    fn render_controls(&self, _area: Rect) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" pause | "),
            Span::styled("1-4", Style::default().fg(Color::Cyan)),
            Span::raw(" speed | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" new session | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn cell_span(role: Option<CellRole>) -> Span<'static> {
    match role {
        Some(CellRole::Head) => Span::styled(
            "■ ",
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        ),
        Some(CellRole::Body) => Span::styled("□ ", Style::default().fg(Color::Green)),
        Some(CellRole::Fruit) => Span::styled(
            "● ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Some(CellRole::Obstacle) => Span::styled("█ ", Style::default().fg(Color::LightBlue)),
        None => Span::styled("· ", Style::default().fg(Color::DarkGray)),
    }
}
