use std::time::Duration;

use anyhow::{bail, Result};

use crate::{Coords, GridInt};

/// Rows at the top taken by the score line and its borders.
pub const HUD_ROWS: GridInt = 3;

pub const INITIAL_SPEED: i32 = 20;
pub const INITIAL_SNAKE_LENGTH: usize = 20;
pub const INITIAL_SNAKE_HEAD: Coords = (50, 15);
pub const INITIAL_FOOD: Coords = (30, 15);

pub const FOOD_SCORE: u32 = 10;
pub const FOOD_SPEEDUP: i32 = 2;
pub const FOOD_GROWTH: usize = 3;

/// Character cells are taller than they are wide; vertical frames last this
/// much longer so the snake looks equally fast both ways.
pub const VERTICAL_DELAY_FACTOR: f64 = 1.2;

const MIN_WIDTH: GridInt = INITIAL_SNAKE_HEAD.0 + INITIAL_SNAKE_LENGTH as GridInt;
const MIN_HEIGHT: GridInt = INITIAL_SNAKE_HEAD.1 + 1;

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub width: GridInt,
    pub height: GridInt,
    /// Wrap around the edges instead of dying on them.
    pub mirroring: bool,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Cadence of the Space/Esc check after a round is lost.
    pub replay_poll: Duration,
    /// Fixed RNG seed for food placement; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 120,
            height: 50,
            mirroring: true,
            min_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(100),
            replay_poll: Duration::from_millis(10),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn new(width: GridInt, height: GridInt) -> Self {
        Self { width, height, ..Default::default() }
    }

    pub fn with_mirroring(mut self, mirroring: bool) -> Self {
        self.mirroring = mirroring;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            bail!(
                "grid must be at least {}x{}, got {}x{}",
                MIN_WIDTH, MIN_HEIGHT, self.width, self.height
            );
        }
        if self.width > u16::MAX as GridInt || self.height > u16::MAX as GridInt {
            bail!("grid {}x{} is too large for a terminal", self.width, self.height);
        }
        if self.min_delay > self.max_delay {
            bail!("minimum frame delay {:?} exceeds maximum {:?}", self.min_delay, self.max_delay);
        }
        Ok(())
    }

    /// Is `pos` inside the area the snake and food may occupy?
    pub fn in_playfield(&self, (x, y): Coords) -> bool {
        x >= 0 && x < self.width && y >= HUD_ROWS && y < self.height
    }

    /// Time budget for one frame: `MAX - speed` clamped to `[MIN, MAX]`,
    /// stretched when moving vertically.
    pub fn frame_delay(&self, speed: i32, vertical: bool) -> Duration {
        let min = self.min_delay.as_millis() as f64;
        let max = self.max_delay.as_millis() as f64;
        let mut ms = (max - speed as f64).clamp(min, max);
        if vertical {
            ms *= VERTICAL_DELAY_FACTOR;
        }
        Duration::from_secs_f64(ms / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = GameConfig::default();
        assert_eq!((config.width, config.height), (120, 50));
        assert!(config.mirroring);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_grids_too_small_for_spawn() {
        assert!(GameConfig::new(69, 50).validate().is_err());
        assert!(GameConfig::new(120, 15).validate().is_err());
        assert!(GameConfig::new(70, 16).validate().is_ok());
    }

    #[test]
    fn rejects_inverted_delays() {
        let mut config = GameConfig::default();
        config.min_delay = Duration::from_millis(200);
        assert!(config.validate().is_err());
    }

    #[test]
    fn playfield_excludes_hud() {
        let config = GameConfig::default();
        assert!(config.in_playfield((0, 3)));
        assert!(config.in_playfield((119, 49)));
        assert!(!config.in_playfield((0, 2)));
        assert!(!config.in_playfield((120, 10)));
        assert!(!config.in_playfield((-1, 10)));
    }

    #[test]
    fn frame_delay_clamps() {
        let config = GameConfig::default();
        assert_eq!(config.frame_delay(20, false), Duration::from_millis(80));
        assert_eq!(config.frame_delay(500, false), Duration::from_millis(5));
        assert_eq!(config.frame_delay(-50, false), Duration::from_millis(100));
    }

    #[test]
    fn vertical_frames_are_longer() {
        let config = GameConfig::default();
        let ms = config.frame_delay(20, true).as_secs_f64() * 1000.0;
        assert!((ms - 96.0).abs() < 1e-6);
    }
}
