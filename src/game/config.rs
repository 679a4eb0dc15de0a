use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnakeError};

/// Configuration for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,

    /// Fruit to eat before the session counts as won
    pub fruit_target: u32,
    /// Cells gained per fruit
    pub growth_per_fruit: u32,

    /// Percentage of the field to cover with obstacles (clamped to 0-50)
    pub obstacle_coverage: u32,
    /// Side length of each square obstacle block
    pub obstacle_size: usize,

    // Search
    /// Maximum nodes expanded by a single path search
    pub node_budget: usize,
    /// Heuristic weight, 1.0 is plain A*
    pub heuristic_weight: f32,

    /// Draws the fruit spawner may make before giving up
    pub spawn_attempts: usize,
    /// Block placements obstacle generation may make before giving up
    pub placement_attempts: usize,

    /// End the session as timed out after this many ticks
    pub max_ticks: Option<u32>,
    /// Seed for obstacles and fruit, entropy when unset
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 64,
            grid_height: 64,
            initial_snake_length: 20,
            fruit_target: 50,
            growth_per_fruit: 10,
            obstacle_coverage: 5,
            obstacle_size: 5,
            node_budget: 20_000,
            heuristic_weight: 1.0,
            spawn_attempts: 10_000,
            placement_attempts: 10_000,
            max_ticks: None,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Small obstacle-free board for tests
    pub fn small() -> Self {
        Self {
            initial_snake_length: 3,
            obstacle_coverage: 0,
            growth_per_fruit: 1,
            ..Self::new(10, 10)
        }
    }

    /// Create a large grid
    pub fn large() -> Self {
        Self::new(128, 128)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load a JSON config; fields missing from the file keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Obstacle coverage actually used, clamped to 0-50 percent
    pub fn clamped_coverage(&self) -> u32 {
        self.obstacle_coverage.min(50)
    }

    /// Heuristic weight in hundredths, for integer queue ordering
    pub fn heuristic_weight_centi(&self) -> u32 {
        (self.heuristic_weight.max(1.0) * 100.0).round() as u32
    }

    /// Longest initial snake that fits: the body starts centred and trails
    /// to the left of the head
    pub fn max_snake_length(&self) -> usize {
        self.grid_width / 2 + 1
    }

    /// Shorten the initial snake so it fits the grid width
    pub fn fit_snake_length(&mut self) {
        self.initial_snake_length = self.initial_snake_length.min(self.max_snake_length());
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.grid_width < 2 || self.grid_height < 2 {
            return Err(SnakeError::config(format!(
                "grid must be at least 2x2, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }

        let max_length = self.max_snake_length();
        if self.initial_snake_length == 0 || self.initial_snake_length > max_length {
            return Err(SnakeError::config(format!(
                "initial_snake_length must be in 1..={max_length} for width {}, got {}",
                self.grid_width, self.initial_snake_length
            )));
        }

        if self.fruit_target == 0 {
            return Err(SnakeError::config("fruit_target must be positive"));
        }

        if self.growth_per_fruit == 0 {
            return Err(SnakeError::config("growth_per_fruit must be positive"));
        }

        if self.obstacle_size == 0 {
            return Err(SnakeError::config("obstacle_size must be positive"));
        }

        if self.node_budget == 0 {
            return Err(SnakeError::config("node_budget must be positive"));
        }

        if !self.heuristic_weight.is_finite() || self.heuristic_weight < 1.0 {
            return Err(SnakeError::config(format!(
                "heuristic_weight must be >= 1.0, got {}",
                self.heuristic_weight
            )));
        }

        if self.spawn_attempts == 0 || self.placement_attempts == 0 {
            return Err(SnakeError::config("attempt caps must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 64);
        assert_eq!(config.grid_height, 64);
        assert_eq!(config.initial_snake_length, 20);
        assert_eq!(config.fruit_target, 50);
        assert_eq!(config.growth_per_fruit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 15);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 15);
    }

    #[test]
    fn test_presets_validate() {
        assert!(GameConfig::small().validate().is_ok());
        assert!(GameConfig::large().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = GameConfig::small();
        config.heuristic_weight = 0.5;
        assert!(config.validate().is_err());

        let mut config = GameConfig::small();
        config.initial_snake_length = 7;
        assert!(config.validate().is_err());

        let mut config = GameConfig::small();
        config.node_budget = 0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::small();
        config.fruit_target = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fit_snake_length() {
        let mut config = GameConfig::new(32, 32);
        assert!(config.validate().is_err());

        config.fit_snake_length();
        assert_eq!(config.initial_snake_length, 17);
        assert!(config.validate().is_ok());

        // Already fitting lengths are kept
        let mut config = GameConfig::default();
        config.fit_snake_length();
        assert_eq!(config.initial_snake_length, 20);
    }

    #[test]
    fn test_coverage_clamped() {
        let mut config = GameConfig::default();
        config.obstacle_coverage = 90;
        assert_eq!(config.clamped_coverage(), 50);
    }

    #[test]
    fn test_weight_in_hundredths() {
        let mut config = GameConfig::default();
        assert_eq!(config.heuristic_weight_centi(), 100);
        config.heuristic_weight = 1.5;
        assert_eq!(config.heuristic_weight_centi(), 150);
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "grid_width": 32, "grid_height": 24, "initial_snake_length": 12, "seed": 7 }}"#
        )
        .unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.grid_width, 32);
        assert_eq!(config.initial_snake_length, 12);
        assert_eq!(config.grid_height, 24);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.fruit_target, 50);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "grid_width": 1 }}"#).unwrap();

        assert!(matches!(
            GameConfig::load(file.path()),
            Err(SnakeError::Config(_))
        ));
    }
}
