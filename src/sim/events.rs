//! Per-step event aggregation
//!
//! Merges and vanishes append here while the resolver runs. Everything is
//! flushed once at the end of the step as a single `FrameOutput`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::punch::PunchCharge;
use super::state::{GamePhase, TokenSnapshot};

/// Points earned by one merge or vanish (always positive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub delta: u32,
}

/// Display-only merge/vanish marker. Observers decide how long to show it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectEvent {
    pub x: f32,
    pub y: f32,
    /// Produced stage for merges, consumed stage for vanishes
    pub stage: u8,
    pub is_vanish: bool,
}

/// Game-over notification, emitted once per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub final_score: u64,
    pub best_score: u64,
}

/// Accumulator for one step
#[derive(Debug, Clone, Default)]
pub struct StepEvents {
    score_delta: u32,
    effects: Vec<EffectEvent>,
}

impl StepEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a merge that produced `stage` at `at`
    pub fn merge(&mut self, at: Vec2, stage: u8, reward: u32) {
        self.push(ScoreEvent { delta: reward }, at, stage, false);
    }

    /// Record two terminal-stage tokens vanishing at `at`
    pub fn vanish(&mut self, at: Vec2, stage: u8, bonus: u32) {
        self.push(ScoreEvent { delta: bonus }, at, stage, true);
    }

    fn push(&mut self, score: ScoreEvent, at: Vec2, stage: u8, is_vanish: bool) {
        self.score_delta = self.score_delta.saturating_add(score.delta);
        self.effects.push(EffectEvent {
            x: at.x,
            y: at.y,
            stage,
            is_vanish,
        });
    }

    pub fn score_delta(&self) -> u32 {
        self.score_delta
    }

    pub fn effects(&self) -> &[EffectEvent] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.score_delta == 0 && self.effects.is_empty()
    }

    /// Drain into the observer payload
    pub fn into_parts(self) -> (u32, Vec<EffectEvent>) {
        (self.score_delta, self.effects)
    }
}

/// Everything an observer receives for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    pub phase: GamePhase,
    pub tokens: Vec<TokenSnapshot>,
    /// Points earned this frame (0 if none)
    pub score_delta: u32,
    pub effects: Vec<EffectEvent>,
    /// Set only on the frame the session ends
    pub game_over: Option<GameOver>,
    pub score: u64,
    pub next_stage: u8,
    pub drop_x: f32,
    pub punch: PunchCharge,
    /// The punch would fire if requested now
    pub punch_ready: bool,
}

/// Observer-side helper that keeps effects visible for a fixed lifetime
#[derive(Debug, Clone)]
pub struct EffectTracker {
    lifetime_ms: f64,
    live: Vec<(f64, EffectEvent)>,
}

impl Default for EffectTracker {
    fn default() -> Self {
        Self::new(crate::consts::EFFECT_LIFETIME_MS)
    }
}

impl EffectTracker {
    pub fn new(lifetime_ms: f64) -> Self {
        Self {
            lifetime_ms,
            live: Vec::new(),
        }
    }

    /// Add this frame's effects and purge expired ones
    pub fn update(&mut self, now_ms: f64, effects: &[EffectEvent]) {
        self.live
            .retain(|(born, _)| now_ms - born < self.lifetime_ms);
        self.live.extend(effects.iter().map(|e| (now_ms, *e)));
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectEvent> {
        self.live.iter().map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_in_order() {
        let mut events = StepEvents::new();
        assert!(events.is_empty());

        events.merge(Vec2::new(10.0, 20.0), 1, 3);
        events.vanish(Vec2::new(30.0, 40.0), 6, 100);
        assert_eq!(events.score_delta(), 103);

        let (delta, effects) = events.into_parts();
        assert_eq!(delta, 103);
        assert_eq!(effects.len(), 2);
        assert!(!effects[0].is_vanish);
        assert_eq!(effects[0].stage, 1);
        assert!(effects[1].is_vanish);
        assert_eq!((effects[1].x, effects[1].y), (30.0, 40.0));
    }

    #[test]
    fn test_tracker_purges_after_lifetime() {
        let mut tracker = EffectTracker::default();
        let effect = EffectEvent {
            x: 0.0,
            y: 0.0,
            stage: 2,
            is_vanish: false,
        };
        tracker.update(0.0, &[effect]);
        tracker.update(300.0, &[effect]);
        assert_eq!(tracker.len(), 2);

        tracker.update(650.0, &[]);
        assert_eq!(tracker.len(), 1);

        tracker.update(1000.0, &[]);
        assert!(tracker.is_empty());
    }
}
