//! Pentaro - A falling-ball merge puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, merging, loss detection)
//! - `driver`: Frame driver that turns display refreshes into physics steps
//! - `tuning`: Data-driven game balance and the stage table
//! - `settings`: Headless runner configuration
//! - `highscores`: Leaderboard fed by the final score of each session

pub mod driver;
pub mod highscores;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use driver::{FrameDriver, FrameObserver, FrameRequest};
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Reference configuration constants (pixel units, 60 Hz reference frame)
pub mod consts {
    /// Container dimensions
    pub const CONTAINER_WIDTH: f32 = 350.0;
    pub const CONTAINER_HEIGHT: f32 = 500.0;
    pub const WALL_THICKNESS: f32 = 12.0;

    /// Tokens settled above this line (from the top) end the game
    pub const GAME_OVER_LINE: f32 = 100.0;
    /// Top of a freshly dropped token
    pub const DROP_Y: f32 = 50.0;
    /// Drop position is kept this far from the container edges
    pub const DROP_MARGIN: f32 = 50.0;
    /// Minimum time between two accepted drops
    pub const DROP_COOLDOWN_MS: f64 = 400.0;

    /// Gravity (units per reference frame²)
    pub const GRAVITY: f32 = 0.35;
    /// Horizontal velocity kept on floor contact
    pub const FRICTION: f32 = 0.75;
    /// Restitution against walls and floor
    pub const BOUNCE: f32 = 0.3;
    /// Speed clamp per reference frame
    pub const MAX_SPEED: f32 = 12.0;
    /// Rotation speed kept per reference frame
    pub const ROTATION_DECAY: f32 = 0.95;
    /// Spin per unit of vertical speed on wall contact
    pub const WALL_SPIN: f32 = 0.02;
    /// Spin per unit of horizontal speed while rolling on the floor
    pub const ROLL_SPIN: f32 = 0.05;
    /// Floor contact snaps smaller velocity components to zero
    pub const REST_VY: f32 = 0.5;
    pub const REST_VX: f32 = 0.1;

    /// Relaxation passes of the pair solver per step
    pub const SOLVER_ITERATIONS: u32 = 8;
    /// Restitution between tokens
    pub const TOKEN_RESTITUTION: f32 = 0.8;
    /// Spin per unit of relative horizontal speed on impact
    pub const IMPACT_SPIN: f32 = 0.02;
    /// Upward kick of a merged token
    pub const MERGE_POP: f32 = 2.0;
    /// Merged tokens leave with at most this vertical velocity
    pub const MERGE_POP_FLOOR: f32 = -1.0;
    /// Flat reward when two terminal-stage tokens vanish
    pub const VANISH_BONUS: u32 = 100;

    /// Drops draw uniformly from stages `0..=MAX_DROP_STAGE`
    pub const MAX_DROP_STAGE: u8 = 3;

    /// Ability cost in charge points
    pub const PUNCH_COST: u32 = 50;
    /// Punch impulse ranges
    pub const PUNCH_VX: f32 = 15.0;
    pub const PUNCH_VY_MIN: f32 = 3.0;
    pub const PUNCH_VY_RANGE: f32 = 8.0;
    pub const PUNCH_SPIN: f32 = 8.0;

    /// Reference frame duration for delta normalization
    pub const REFERENCE_FRAME_MS: f64 = 16.67;
    /// Upper bound on the delta factor after a stall
    pub const MAX_DELTA_FACTOR: f32 = 2.0;

    /// Tokens must be older than this to trigger a loss
    pub const LOSS_MATURITY_MS: f64 = 2000.0;
    /// Both velocity components below this count as settled
    pub const SETTLE_SPEED: f32 = 1.0;

    /// Display lifetime of merge/vanish effects
    pub const EFFECT_LIFETIME_MS: f64 = 600.0;
}

/// Midpoint of two positions
#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}

/// Normalize a raw frame interval into a physics delta factor.
///
/// The first frame (no previous timestamp) advances exactly one reference
/// frame. Later frames are scaled relative to 60 Hz and clamped to
/// `[0, max_factor]`.
#[inline]
pub fn delta_factor(last_ms: Option<f64>, now_ms: f64, reference_ms: f64, max_factor: f32) -> f32 {
    match last_ms {
        Some(last) => (((now_ms - last) / reference_ms) as f32).clamp(0.0, max_factor),
        None => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_factor_first_frame() {
        assert_eq!(delta_factor(None, 1234.0, 16.67, 2.0), 1.0);
    }

    #[test]
    fn test_delta_factor_scales_and_clamps() {
        let d = delta_factor(Some(1000.0), 1016.67, 16.67, 2.0);
        assert!((d - 1.0).abs() < 1e-4);

        // Backgrounded tab: capped
        assert_eq!(delta_factor(Some(0.0), 5000.0, 16.67, 2.0), 2.0);
        // Clock went backwards: no negative time
        assert_eq!(delta_factor(Some(100.0), 50.0, 16.67, 2.0), 0.0);
    }

    #[test]
    fn test_midpoint() {
        let m = midpoint(Vec2::new(0.0, 10.0), Vec2::new(20.0, 30.0));
        assert_eq!(m, Vec2::new(10.0, 20.0));
    }
}
