//! Data-driven game balance
//!
//! Every physical constant the simulation reads lives here so a session can be
//! re-tuned from JSON without touching code. Defaults match `crate::consts`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::settings::ConfigError;
use crate::sim::stage::StageTable;

/// Stage table or container misconfiguration, detected before a session starts
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("stage table is empty")]
    EmptyStageTable,
    #[error("stage table has {0} stages, at most 256 are supported")]
    TooManyStages(usize),
    #[error("stage {index} has non-positive size {size}")]
    NonPositiveSize { index: usize, size: f32 },
    #[error("stage {index} size {size} is not larger than the previous stage ({previous})")]
    SizeNotIncreasing { index: usize, size: f32, previous: f32 },
    #[error("highest droppable stage {stage} is outside the stage table ({len} stages)")]
    DropStageOutOfRange { stage: u8, len: usize },
    #[error("container width {width} leaves no room between walls of thickness {wall}")]
    ContainerTooNarrow { width: f32, wall: f32 },
    #[error("solver needs at least one iteration")]
    NoSolverIterations,
    #[error("punch cost must be positive")]
    ZeroPunchCost,
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("reference frame duration must be positive, got {0}ms")]
    NonPositiveReferenceFrame(f64),
    #[error("delta factor cap must be positive, got {0}")]
    NonPositiveDeltaCap(f32),
}

/// Physics and rules configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Container ===
    pub container_width: f32,
    pub container_height: f32,
    pub wall_thickness: f32,
    pub game_over_line: f32,
    pub drop_y: f32,
    pub drop_margin: f32,

    // === Integrator ===
    pub gravity: f32,
    pub friction: f32,
    pub bounce: f32,
    pub max_speed: f32,
    pub rotation_decay: f32,
    /// Spin gained per unit of vertical speed on wall contact
    pub wall_spin: f32,
    /// Spin per unit of horizontal speed while rolling on the floor
    pub roll_spin: f32,
    /// Floor contact snaps |vy| below this to zero
    pub rest_vy: f32,
    /// Floor contact snaps |vx| below this to zero
    pub rest_vx: f32,

    // === Resolver ===
    pub solver_iterations: u32,
    pub restitution: f32,
    /// Spin gained per unit of relative horizontal speed on impact
    pub impact_spin: f32,
    /// Upward kick given to a freshly merged token
    pub merge_pop: f32,
    /// Merged tokens leave with at most this vertical velocity
    pub merge_pop_floor: f32,
    pub vanish_bonus: u32,

    // === Loss detector ===
    pub settle_speed: f32,
    pub loss_maturity_ms: f64,

    // === Commands ===
    pub drop_cooldown_ms: f64,
    /// Drops draw uniformly from stages `0..=max_drop_stage`
    pub max_drop_stage: u8,
    pub punch_cost: u32,
    /// Horizontal punch impulse is uniform in `±punch_vx / 2`
    pub punch_vx: f32,
    /// Vertical punch impulse is `-(punch_vy_min + U(0, punch_vy_range))`
    pub punch_vy_min: f32,
    pub punch_vy_range: f32,
    /// Spin impulse is uniform in `±punch_spin / 2`
    pub punch_spin: f32,

    // === Frame driver ===
    pub reference_frame_ms: f64,
    pub max_delta_factor: f32,

    pub stages: StageTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            container_width: CONTAINER_WIDTH,
            container_height: CONTAINER_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            game_over_line: GAME_OVER_LINE,
            drop_y: DROP_Y,
            drop_margin: DROP_MARGIN,

            gravity: GRAVITY,
            friction: FRICTION,
            bounce: BOUNCE,
            max_speed: MAX_SPEED,
            rotation_decay: ROTATION_DECAY,
            wall_spin: WALL_SPIN,
            roll_spin: ROLL_SPIN,
            rest_vy: REST_VY,
            rest_vx: REST_VX,

            solver_iterations: SOLVER_ITERATIONS,
            restitution: TOKEN_RESTITUTION,
            impact_spin: IMPACT_SPIN,
            merge_pop: MERGE_POP,
            merge_pop_floor: MERGE_POP_FLOOR,
            vanish_bonus: VANISH_BONUS,

            settle_speed: SETTLE_SPEED,
            loss_maturity_ms: LOSS_MATURITY_MS,

            drop_cooldown_ms: DROP_COOLDOWN_MS,
            max_drop_stage: MAX_DROP_STAGE,
            punch_cost: PUNCH_COST,
            punch_vx: PUNCH_VX,
            punch_vy_min: PUNCH_VY_MIN,
            punch_vy_range: PUNCH_VY_RANGE,
            punch_spin: PUNCH_SPIN,

            reference_frame_ms: REFERENCE_FRAME_MS,
            max_delta_factor: MAX_DELTA_FACTOR,

            stages: StageTable::default(),
        }
    }
}

impl Tuning {
    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.stages.is_empty() {
            return Err(TuningError::EmptyStageTable);
        }
        if self.stages.len() > u8::MAX as usize + 1 {
            return Err(TuningError::TooManyStages(self.stages.len()));
        }

        self.check_finite()?;

        let mut previous: Option<f32> = None;
        for (index, stage) in self.stages.iter().enumerate() {
            // Also catches NaN
            if !(stage.size > 0.0 && stage.size.is_finite()) {
                return Err(TuningError::NonPositiveSize {
                    index,
                    size: stage.size,
                });
            }
            if let Some(previous) = previous
                && stage.size <= previous
            {
                return Err(TuningError::SizeNotIncreasing {
                    index,
                    size: stage.size,
                    previous,
                });
            }
            previous = Some(stage.size);
        }

        if self.max_drop_stage as usize >= self.stages.len() {
            return Err(TuningError::DropStageOutOfRange {
                stage: self.max_drop_stage,
                len: self.stages.len(),
            });
        }
        if self.container_width <= self.wall_thickness * 2.0 {
            return Err(TuningError::ContainerTooNarrow {
                width: self.container_width,
                wall: self.wall_thickness,
            });
        }
        if self.solver_iterations == 0 {
            return Err(TuningError::NoSolverIterations);
        }
        if self.punch_cost == 0 {
            return Err(TuningError::ZeroPunchCost);
        }
        if self.reference_frame_ms <= 0.0 {
            return Err(TuningError::NonPositiveReferenceFrame(self.reference_frame_ms));
        }
        if self.max_delta_factor <= 0.0 {
            return Err(TuningError::NonPositiveDeltaCap(self.max_delta_factor));
        }
        Ok(())
    }

    /// Every float knob must be a real number
    fn check_finite(&self) -> Result<(), TuningError> {
        let fields: [(&'static str, f64); 28] = [
            ("container_width", self.container_width as f64),
            ("container_height", self.container_height as f64),
            ("wall_thickness", self.wall_thickness as f64),
            ("game_over_line", self.game_over_line as f64),
            ("drop_y", self.drop_y as f64),
            ("drop_margin", self.drop_margin as f64),
            ("gravity", self.gravity as f64),
            ("friction", self.friction as f64),
            ("bounce", self.bounce as f64),
            ("max_speed", self.max_speed as f64),
            ("rotation_decay", self.rotation_decay as f64),
            ("wall_spin", self.wall_spin as f64),
            ("roll_spin", self.roll_spin as f64),
            ("rest_vy", self.rest_vy as f64),
            ("rest_vx", self.rest_vx as f64),
            ("restitution", self.restitution as f64),
            ("impact_spin", self.impact_spin as f64),
            ("merge_pop", self.merge_pop as f64),
            ("merge_pop_floor", self.merge_pop_floor as f64),
            ("settle_speed", self.settle_speed as f64),
            ("loss_maturity_ms", self.loss_maturity_ms),
            ("drop_cooldown_ms", self.drop_cooldown_ms),
            ("punch_vx", self.punch_vx as f64),
            ("punch_vy_min", self.punch_vy_min as f64),
            ("punch_vy_range", self.punch_vy_range as f64),
            ("punch_spin", self.punch_spin as f64),
            ("reference_frame_ms", self.reference_frame_ms),
            ("max_delta_factor", self.max_delta_factor as f64),
        ];
        match fields.iter().find(|(_, value)| !value.is_finite()) {
            Some(&(field, _)) => Err(TuningError::NonFinite { field }),
            None => Ok(()),
        }
    }

    /// Parse a (possibly partial) JSON tuning and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Inner face of the left wall
    #[inline]
    pub fn left_wall(&self) -> f32 {
        self.wall_thickness
    }

    /// Inner face of the right wall
    #[inline]
    pub fn right_wall(&self) -> f32 {
        self.container_width - self.wall_thickness
    }

    /// Top face of the floor
    #[inline]
    pub fn floor(&self) -> f32 {
        self.container_height - self.wall_thickness
    }
}
