use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use super::{
    config::GameConfig,
    direction::Direction,
    grid::Position,
    spawn::{generate_obstacles, spawn_fruit},
    state::{EndReason, GameState, GameStatus, Snake},
};
use crate::ai::{Decision, MovePolicy, Strategy};
use crate::error::Result;

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate fruit this step
    pub ate_fruit: bool,
    /// Cell the head was sent to, if any
    pub moved_to: Option<Position>,
    /// Policy tier that picked the move
    pub strategy: Option<Strategy>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Status after the step
    pub status: GameStatus,
    /// Whether the session has ended
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

impl StepResult {
    fn idle(status: GameStatus) -> Self {
        Self {
            status,
            terminated: status.is_terminal(),
            info: StepInfo {
                ate_fruit: false,
                moved_to: None,
                strategy: None,
            },
        }
    }
}

/// The tick controller: asks the policy for a move and applies it
pub struct GameEngine {
    config: GameConfig,
    policy: MovePolicy,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            policy: MovePolicy::for_config(&config),
            config,
            rng,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a fresh session: new obstacles, centred snake, first fruit
    pub fn reset(&mut self) -> Result<GameState> {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        );

        let grid = generate_obstacles(&self.config, &snake, &mut self.rng)?;
        let fruit = spawn_fruit(&grid, &snake, self.config.spawn_attempts, &mut self.rng)?;

        info!(
            width = grid.width(),
            height = grid.height(),
            obstacles = grid.obstacle_count(),
            length = snake.len(),
            ?fruit,
            "new session"
        );

        Ok(GameState::new(grid, snake, fruit))
    }

    /// Execute one tick of the game
    pub fn step(&mut self, state: &mut GameState) -> Result<StepResult> {
        if state.status.is_terminal() {
            return Ok(StepResult::idle(state.status));
        }

        if self.config.max_ticks.is_some_and(|limit| state.ticks >= limit) {
            self.time_out(state);
            return Ok(StepResult::idle(state.status));
        }

        let decision = self.policy.decide(state)?;
        self.apply(state, decision)
    }

    /// Apply a decided move to the session.
    ///
    /// Collisions are checked here independently of how the move was chosen.
    /// If the next fruit cannot be placed the state is left as it was before
    /// the call.
    pub fn apply(&mut self, state: &mut GameState, decision: Decision) -> Result<StepResult> {
        if state.status.is_terminal() {
            return Ok(StepResult::idle(state.status));
        }

        let mut info = StepInfo {
            ate_fruit: false,
            moved_to: decision.next,
            strategy: Some(decision.strategy),
        };

        let Some(next) = decision.next else {
            return Ok(self.finish(state, GameStatus::GameOver(EndReason::Trapped), info));
        };

        if !state.grid.is_open(next) {
            return Ok(self.finish(state, GameStatus::GameOver(EndReason::HitWall), info));
        }

        if state.snake.collides_with_body(next) {
            return Ok(self.finish(state, GameStatus::GameOver(EndReason::HitSelf), info));
        }

        if next == state.fruit {
            info.ate_fruit = true;
            let mut snake = state.snake.clone();
            snake.move_to(next, true);
            let eaten = state.fruits_eaten + 1;

            if eaten < self.config.fruit_target {
                state.fruit = spawn_fruit(
                    &state.grid,
                    &snake,
                    self.config.spawn_attempts,
                    &mut self.rng,
                )?;
                snake.add_growth(self.config.growth_per_fruit - 1);
            }

            state.snake = snake;
            state.fruits_eaten = eaten;
            state.ticks += 1;
            debug!(
                tick = state.ticks,
                eaten,
                length = state.snake.len(),
                "fruit eaten"
            );

            if eaten >= self.config.fruit_target {
                return Ok(self.finish_counted(state, GameStatus::Won, info));
            }
        } else {
            let grow = state.snake.take_growth();
            state.snake.move_to(next, grow);
            state.ticks += 1;
        }

        Ok(StepResult {
            status: state.status,
            terminated: false,
            info,
        })
    }

    /// End a running session because its time ran out
    pub fn time_out(&self, state: &mut GameState) {
        if state.is_running() {
            state.status = GameStatus::TimedOut;
            info!(
                ticks = state.ticks,
                eaten = state.fruits_eaten,
                "session timed out"
            );
        }
    }

    /// End the session on this tick
    fn finish(&self, state: &mut GameState, status: GameStatus, info: StepInfo) -> StepResult {
        state.ticks += 1;
        self.finish_counted(state, status, info)
    }

    /// End the session on a tick that has already been counted
    fn finish_counted(
        &self,
        state: &mut GameState,
        status: GameStatus,
        info: StepInfo,
    ) -> StepResult {
        state.status = status;
        info!(
            %status,
            ticks = state.ticks,
            eaten = state.fruits_eaten,
            target = self.config.fruit_target,
            length = state.snake.len(),
            "session ended"
        );

        StepResult {
            status,
            terminated: true,
            info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnakeError;
    use crate::game::Grid;
    use std::collections::HashSet;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn engine(config: GameConfig) -> GameEngine {
        GameEngine::new(config.with_seed(7)).unwrap()
    }

    fn open_state(head: Position, length: usize, fruit: Position) -> GameState {
        GameState::new(
            Grid::new(10, 10),
            Snake::new(head, Direction::Right, length),
            fruit,
        )
    }

    #[test]
    fn test_reset() {
        let mut engine = engine(GameConfig::default());
        let state = engine.reset().unwrap();

        assert!(state.is_running());
        assert_eq!(state.fruits_eaten, 0);
        assert_eq!(state.ticks, 0);
        assert_eq!(state.snake.len(), 20);
        assert_eq!(state.snake.head(), p(32, 32));
        assert!(state.snake.cells().all(|c| state.grid.is_open(c)));
        assert!(state.grid.is_open(state.fruit));
        assert!(!state.snake.contains(state.fruit));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GameConfig::small();
        config.grid_width = 1;
        assert!(GameEngine::new(config).is_err());
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = engine(GameConfig::small());
        let mut state = open_state(p(5, 5), 3, p(8, 5));

        let result = engine.step(&mut state).unwrap();

        assert!(!result.terminated);
        assert!(!result.info.ate_fruit);
        assert_eq!(result.info.strategy, Some(Strategy::Fruit));
        assert_eq!(state.ticks, 1);
        assert_eq!(state.snake.head(), p(6, 5));
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn test_fruit_consumption_grows_in_batches() {
        let mut config = GameConfig::small();
        config.growth_per_fruit = 3;
        let mut engine = engine(config);
        let mut state = open_state(p(5, 5), 3, p(6, 5));

        let result = engine.step(&mut state).unwrap();
        assert!(result.info.ate_fruit);
        assert_eq!(state.fruits_eaten, 1);
        assert_eq!(state.snake.len(), 4);
        assert_eq!(state.snake.pending_growth(), 2);
        assert_ne!(state.fruit, p(6, 5));

        // Keep the new fruit out of the way so the next ticks are plain moves
        let mut lengths = Vec::new();
        for _ in 0..3 {
            state.fruit = far_corner(&state);
            engine.step(&mut state).unwrap();
            lengths.push(state.snake.len());
        }
        assert_eq!(lengths, vec![5, 6, 6]);
    }

    fn far_corner(state: &GameState) -> Position {
        [p(0, 0), p(9, 0), p(0, 9), p(9, 9)]
            .into_iter()
            .filter(|c| !state.snake.contains(*c))
            .max_by_key(|c| c.manhattan(state.snake.head()))
            .unwrap()
    }

    #[test]
    fn test_win_on_exact_tick() {
        let mut config = GameConfig::small();
        config.fruit_target = 3;
        let mut engine = engine(config);
        let mut state = open_state(p(5, 5), 3, p(7, 5));
        state.fruits_eaten = 2;

        let first = engine.step(&mut state).unwrap();
        assert!(!first.terminated);
        assert_eq!(state.status, GameStatus::Running);

        let second = engine.step(&mut state).unwrap();
        assert!(second.terminated);
        assert_eq!(second.status, GameStatus::Won);
        assert_eq!(state.ticks, 2);
        assert_eq!(state.fruits_eaten, 3);
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = engine(GameConfig::small());
        let mut state = open_state(p(0, 5), 3, p(5, 5));

        let result = engine
            .apply(&mut state, Decision::step(p(-1, 5), Strategy::Clearance))
            .unwrap();

        assert!(result.terminated);
        assert_eq!(state.status, GameStatus::GameOver(EndReason::HitWall));
    }

    #[test]
    fn test_obstacle_counts_as_wall() {
        let mut engine = engine(GameConfig::small());
        let grid = Grid::with_obstacles(10, 10, [p(6, 5)]).unwrap();
        let mut state = GameState::new(grid, Snake::new(p(5, 5), Direction::Right, 3), p(0, 0));

        engine
            .apply(&mut state, Decision::step(p(6, 5), Strategy::Clearance))
            .unwrap();
        assert_eq!(state.status, GameStatus::GameOver(EndReason::HitWall));
    }

    #[test]
    fn test_self_collision() {
        let mut engine = engine(GameConfig::small());
        let mut state = open_state(p(5, 5), 4, p(0, 0));

        let result = engine
            .apply(&mut state, Decision::step(p(4, 5), Strategy::Clearance))
            .unwrap();

        assert!(result.terminated);
        assert_eq!(state.status, GameStatus::GameOver(EndReason::HitSelf));
    }

    #[test]
    fn test_trapped() {
        let mut engine = engine(GameConfig::small());
        let grid = Grid::with_obstacles(3, 3, [p(1, 0), p(0, 1)]).unwrap();
        let mut state = GameState::new(grid, Snake::from_cells([p(0, 0)]), p(2, 2));

        let result = engine.step(&mut state).unwrap();
        assert!(result.terminated);
        assert_eq!(result.info.strategy, Some(Strategy::Trapped));
        assert_eq!(state.status, GameStatus::GameOver(EndReason::Trapped));
        assert_eq!(state.ticks, 1);
    }

    #[test]
    fn test_moving_into_vacating_tail() {
        let mut engine = engine(GameConfig::small());
        let snake = Snake::from_cells([
            p(1, 1),
            p(2, 1),
            p(2, 0),
            p(1, 0),
            p(0, 0),
            p(0, 1),
            p(0, 2),
            p(1, 2),
        ]);
        let mut state = GameState::new(Grid::new(5, 5), snake, p(4, 4));

        let result = engine.step(&mut state).unwrap();
        assert!(!result.terminated);
        assert_eq!(state.snake.head(), p(1, 2));
        assert_eq!(state.snake.tail(), p(0, 2));
        assert_eq!(state.snake.len(), 8);
    }

    #[test]
    fn test_retained_tail_blocks() {
        let mut engine = engine(GameConfig::small());
        let mut state = open_state(p(5, 5), 4, p(0, 0));
        state.snake = Snake::from_cells([p(5, 5), p(5, 6), p(4, 6), p(4, 5)]);
        state.snake.add_growth(1);

        engine
            .apply(&mut state, Decision::step(p(4, 5), Strategy::Tail))
            .unwrap();
        assert_eq!(state.status, GameStatus::GameOver(EndReason::HitSelf));
    }

    #[test]
    fn test_tick_limit() {
        let mut config = GameConfig::small();
        config.max_ticks = Some(3);
        let mut engine = engine(config);
        let mut state = engine.reset().unwrap();

        for _ in 0..3 {
            assert!(!engine.step(&mut state).unwrap().terminated);
        }
        assert!(state.is_running());

        let result = engine.step(&mut state).unwrap();
        assert!(result.terminated);
        assert_eq!(state.status, GameStatus::TimedOut);
        assert_eq!(state.ticks, 3);
    }

    #[test]
    fn test_unplaceable_fruit_leaves_state_untouched() {
        let mut config = GameConfig::small();
        config.spawn_attempts = 50;
        let mut engine = engine(config);
        let snake = Snake::from_cells([p(0, 0), p(1, 0), p(1, 1)]);
        let mut state = GameState::new(Grid::new(2, 2), snake, p(0, 1));
        let before = state.clone();

        // Eating fills the whole board, so there is nowhere for the next fruit
        let result = engine.apply(&mut state, Decision::step(p(0, 1), Strategy::Fruit));
        assert!(matches!(
            result,
            Err(SnakeError::SpawnExhausted { attempts: 50 })
        ));
        assert_eq!(state, before);

        let result = engine.step(&mut state);
        assert!(result.is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_out_of_bounds_fruit_fails_step() {
        let mut engine = engine(GameConfig::small());
        let mut state = open_state(p(5, 5), 3, p(50, 50));
        let before = state.clone();

        let result = engine.step(&mut state);
        assert!(matches!(
            result,
            Err(SnakeError::InvalidCoordinate { x: 50, y: 50, .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut engine = engine(GameConfig::small());
        let mut state = engine.reset().unwrap();
        state.status = GameStatus::GameOver(EndReason::HitWall);
        let before = state.clone();

        let result = engine.step(&mut state).unwrap();

        assert!(result.terminated);
        assert_eq!(state, before);
    }

    #[test]
    fn test_time_out_only_running() {
        let engine = engine(GameConfig::small());
        let mut state = open_state(p(5, 5), 3, p(0, 0));
        engine.time_out(&mut state);
        assert_eq!(state.status, GameStatus::TimedOut);

        state.status = GameStatus::Won;
        engine.time_out(&mut state);
        assert_eq!(state.status, GameStatus::Won);
    }

    #[test]
    fn test_session_invariants() {
        let mut config = GameConfig::new(24, 24);
        config.initial_snake_length = 6;
        config.fruit_target = 12;
        config.growth_per_fruit = 3;
        config.obstacle_coverage = 8;
        config.max_ticks = Some(4_000);

        for seed in [1, 2, 3] {
            let mut engine = GameEngine::new(config.clone().with_seed(seed)).unwrap();
            let mut state = engine.reset().unwrap();

            while state.is_running() {
                let head = state.snake.head();
                let result = engine.step(&mut state).unwrap();
                if !state.is_running() {
                    break;
                }

                assert!(state.snake.head().is_adjacent(head));
                assert!(result.info.moved_to == Some(state.snake.head()));
                let unique: HashSet<_> = state.snake.cells().collect();
                assert_eq!(unique.len(), state.snake.len(), "duplicate body cell");
                assert!(state.snake.cells().all(|c| state.grid.is_open(c)));
                assert!(!state.snake.contains(state.fruit) || state.status == GameStatus::Won);
            }

            assert!(state.status.is_terminal());
        }
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut config = GameConfig::new(20, 20);
        config.initial_snake_length = 5;
        config.fruit_target = 5;
        config.growth_per_fruit = 2;

        let run = || {
            let mut engine = GameEngine::new(config.clone().with_seed(99)).unwrap();
            let mut state = engine.reset().unwrap();
            for _ in 0..300 {
                if engine.step(&mut state).unwrap().terminated {
                    break;
                }
            }
            state
        };

        assert_eq!(run(), run());
    }
}
