//! Game state and core simulation types
//!
//! The Entity Store (live tokens) and the per-session counters live here,
//! owned by a single `GameState` that every command and step goes through.

use glam::Vec2;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::punch::PunchCharge;
use crate::tuning::Tuning;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Fresh session, waiting for the first drop
    Idle,
    /// Physics advancing every frame
    Running,
    /// A token settled above the line; frames are no-ops until restart
    Over,
}

/// A single physical game piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: u32,
    /// Center, y grows downward
    pub pos: Vec2,
    pub vel: Vec2,
    pub stage: u8,
    /// Cosmetic orientation (degrees)
    pub rotation: f32,
    pub rotation_speed: f32,
    /// Spawn time, only read by the loss detector
    pub created_at_ms: f64,
}

/// Render-facing view of a token
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub stage: u8,
    pub rotation: f32,
}

impl From<&Token> for TokenSnapshot {
    fn from(token: &Token) -> Self {
        Self {
            id: token.id,
            x: token.pos.x,
            y: token.pos.y,
            stage: token.stage,
            rotation: token.rotation,
        }
    }
}

/// Complete session state
pub struct GameState {
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Live tokens in spawn order
    pub tokens: Vec<Token>,
    pub score: u64,
    /// Best final score seen by this state across restarts
    pub best_score: u64,
    pub punch: PunchCharge,
    /// Stage of the next drop
    pub next_stage: u8,
    /// Horizontal drop position
    pub drop_x: f32,
    /// Time of the last accepted drop
    last_drop_ms: Option<f64>,
    rng: Box<dyn RngCore + Send>,
    next_id: u32,
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("phase", &self.phase)
            .field("tokens", &self.tokens.len())
            .field("score", &self.score)
            .field("punch", &self.punch)
            .field("next_stage", &self.next_stage)
            .field("drop_x", &self.drop_x)
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// Create a new session seeded for reproducibility.
    ///
    /// The tuning is assumed valid (see `Tuning::validate`).
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self::with_rng(tuning, Box::new(Pcg32::seed_from_u64(seed)))
    }

    /// Create a new session drawing randomness from `rng`
    pub fn with_rng(tuning: Tuning, rng: Box<dyn RngCore + Send>) -> Self {
        let drop_x = tuning.container_width / 2.0;
        let mut state = Self {
            tuning,
            phase: GamePhase::Idle,
            tokens: Vec::new(),
            score: 0,
            best_score: 0,
            punch: PunchCharge::default(),
            next_stage: 0,
            drop_x,
            last_drop_ms: None,
            rng,
            next_id: 1,
        };
        state.next_stage = state.roll_next_stage();
        state
    }

    /// Allocate a new token ID (never reused, survives restarts)
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Physics radius of a stage
    #[inline]
    pub fn radius(&self, stage: u8) -> f32 {
        self.tuning.stages.radius(stage)
    }

    /// Insert a token with a fresh ID and return that ID
    pub fn spawn_token(&mut self, stage: u8, pos: Vec2, created_at_ms: f64) -> u32 {
        let id = self.next_entity_id();
        self.tokens.push(Token {
            id,
            pos,
            vel: Vec2::ZERO,
            stage,
            rotation: 0.0,
            rotation_speed: 0.0,
            created_at_ms,
        });
        id
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    /// Whether a drop at `now_ms` would be accepted
    pub fn can_drop(&self, now_ms: f64) -> bool {
        if self.is_over() {
            return false;
        }
        match self.last_drop_ms {
            Some(last) => now_ms - last >= self.tuning.drop_cooldown_ms,
            None => true,
        }
    }

    /// Move the drop guide, kept away from the container edges
    pub fn set_drop_x(&mut self, x: f32) {
        if self.is_over() {
            return;
        }
        let margin = self.tuning.drop_margin;
        let max = (self.tuning.container_width - margin).max(margin);
        self.drop_x = x.clamp(margin, max);
    }

    /// Drop the queued stage at the guide position.
    ///
    /// Returns false (and changes nothing) while game-over or cooling down.
    pub fn drop_token(&mut self, now_ms: f64) -> bool {
        if !self.can_drop(now_ms) {
            log::debug!("Drop rejected at {now_ms:.0}ms");
            return false;
        }
        if self.phase == GamePhase::Idle {
            log::info!("Session started");
            self.phase = GamePhase::Running;
        }

        let stage = self.next_stage;
        let pos = Vec2::new(self.drop_x, self.tuning.drop_y + self.radius(stage));
        let id = self.spawn_token(stage, pos, now_ms);
        self.last_drop_ms = Some(now_ms);
        self.next_stage = self.roll_next_stage();
        log::debug!("Dropped token {id} (stage {stage}) at x={:.1}", pos.x);
        true
    }

    /// Whether a punch would fire right now
    pub fn can_punch(&self) -> bool {
        self.phase == GamePhase::Running && self.punch.is_ready(self.tuning.punch_cost)
    }

    /// Fire the punch ability if charged and the session is running.
    ///
    /// Returns false (and changes nothing) when not permitted. Leftover charge
    /// at or above the cost allows another punch straight away.
    pub fn punch(&mut self) -> bool {
        if !self.can_punch() {
            log::debug!("Punch rejected (charge {})", self.punch.charge);
            return false;
        }
        self.punch.spend(self.tuning.punch_cost);
        super::punch::apply_punch(&mut self.tokens, &self.tuning, &mut self.rng);
        log::info!(
            "Punch fired on {} tokens, {} charge left",
            self.tokens.len(),
            self.punch.charge
        );
        true
    }

    /// Clear the session back to its pre-start state
    pub fn restart(&mut self) {
        self.tokens.clear();
        self.score = 0;
        self.punch = PunchCharge::default();
        self.last_drop_ms = None;
        self.drop_x = self.tuning.container_width / 2.0;
        self.phase = GamePhase::Idle;
        self.next_stage = self.roll_next_stage();
        log::info!("Session restarted");
    }

    /// Credit a flushed score delta to the score and the punch charge
    pub fn credit(&mut self, delta: u32) {
        if delta == 0 {
            return;
        }
        self.score += delta as u64;
        self.punch.add(delta);
    }

    /// Enter game-over, recording the best score
    pub fn finish(&mut self) {
        self.phase = GamePhase::Over;
        self.best_score = self.best_score.max(self.score);
    }

    /// Render-facing view of every live token, in store order
    pub fn snapshot(&self) -> Vec<TokenSnapshot> {
        self.tokens.iter().map(TokenSnapshot::from).collect()
    }

    /// Uniform pick among the droppable stages
    fn roll_next_stage(&mut self) -> u8 {
        self.rng.random_range(0..=self.tuning.max_drop_stage)
    }
}
