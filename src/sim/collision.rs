//! Collision and merge resolution between tokens
//!
//! A soft pairwise solver: several relaxation passes over every unordered
//! pair. Matching stages merge (or vanish at the terminal stage), everything
//! else is pushed apart with a partially elastic impulse. Removals and spawns
//! are buffered and applied once after the last pass so indices stay stable.

use glam::Vec2;

use super::events::StepEvents;
use super::state::{GameState, Token};
use crate::midpoint;
use crate::tuning::Tuning;

/// Overlap between two circles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from the first center toward the second
    pub normal: Vec2,
    /// `min_dist - dist`, always positive
    pub overlap: f32,
}

/// Overlap test for two circles.
///
/// Coincident centers report no contact: there is no meaningful normal.
pub fn circle_contact(a: Vec2, ra: f32, b: Vec2, rb: f32) -> Option<Contact> {
    let delta = b - a;
    let dist = delta.length();
    let min_dist = ra + rb;
    if dist >= min_dist || dist == 0.0 {
        return None;
    }
    Some(Contact {
        normal: delta / dist,
        overlap: min_dist - dist,
    })
}

/// Token produced by a merge, materialized when the buffer is applied
#[derive(Debug, Clone, PartialEq)]
pub struct MergeSpawn {
    pub stage: u8,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub rotation_speed: f32,
}

/// Deferred Entity Store mutations for one step
#[derive(Debug, Clone, Default)]
pub struct MutationBuffer {
    removed: Vec<bool>,
    spawned: Vec<MergeSpawn>,
}

impl MutationBuffer {
    pub fn new(len: usize) -> Self {
        Self {
            removed: vec![false; len],
            spawned: Vec::new(),
        }
    }

    #[inline]
    pub fn is_removed(&self, index: usize) -> bool {
        self.removed[index]
    }

    pub fn remove(&mut self, index: usize) {
        self.removed[index] = true;
    }

    pub fn spawn(&mut self, spawn: MergeSpawn) {
        self.spawned.push(spawn);
    }

    pub fn removed_count(&self) -> usize {
        self.removed.iter().filter(|r| **r).count()
    }

    pub fn spawned(&self) -> &[MergeSpawn] {
        &self.spawned
    }

    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && !self.removed.iter().any(|r| *r)
    }

    /// Drop removed tokens (keeping order) and append spawns with fresh IDs
    pub fn apply(self, state: &mut GameState, now_ms: f64) {
        if self.is_empty() {
            return;
        }

        let mut index = 0;
        state.tokens.retain(|_| {
            let keep = !self.removed[index];
            index += 1;
            keep
        });

        for spawn in self.spawned {
            let id = state.next_entity_id();
            state.tokens.push(Token {
                id,
                pos: spawn.pos,
                vel: spawn.vel,
                stage: spawn.stage,
                rotation: spawn.rotation,
                rotation_speed: spawn.rotation_speed,
                created_at_ms: now_ms,
            });
        }
    }
}

/// Run the solver on the post-integration store and apply its mutations
pub fn resolve(state: &mut GameState, now_ms: f64, events: &mut StepEvents) {
    let buffer = solve(&mut state.tokens, &state.tuning, events);
    if !buffer.is_empty() {
        log::debug!(
            "Resolver: {} removed, {} spawned",
            buffer.removed_count(),
            buffer.spawned().len()
        );
    }
    buffer.apply(state, now_ms);
}

/// Relaxation passes over all pairs. Mutates positions and velocities in
/// place; merges only go into the returned buffer.
pub fn solve(tokens: &mut [Token], tuning: &Tuning, events: &mut StepEvents) -> MutationBuffer {
    let stages = &tuning.stages;
    let mut buffer = MutationBuffer::new(tokens.len());

    for _ in 0..tuning.solver_iterations {
        for i in 0..tokens.len() {
            if buffer.is_removed(i) {
                continue;
            }
            for j in (i + 1)..tokens.len() {
                if buffer.is_removed(j) {
                    continue;
                }

                let (head, tail) = tokens.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];
                let ra = stages.radius(a.stage);
                let rb = stages.radius(b.stage);

                let Some(contact) = circle_contact(a.pos, ra, b.pos, rb) else {
                    continue;
                };

                if a.stage == b.stage {
                    buffer.remove(i);
                    buffer.remove(j);
                    let at = midpoint(a.pos, b.pos);

                    if stages.is_terminal(a.stage) {
                        events.vanish(at, a.stage, tuning.vanish_bonus);
                    } else {
                        let stage = a.stage + 1;
                        let vel = (a.vel + b.vel) * 0.5;
                        buffer.spawn(MergeSpawn {
                            stage,
                            pos: at,
                            vel: Vec2::new(
                                vel.x,
                                (vel.y - tuning.merge_pop).min(tuning.merge_pop_floor),
                            ),
                            rotation: (a.rotation + b.rotation) * 0.5,
                            rotation_speed: (a.rotation_speed + b.rotation_speed) * 0.5,
                        });
                        events.merge(at, stage, stages.get(stage).score);
                    }
                    // `i` is gone; its remaining pairs are skipped
                    break;
                }

                separate(a, ra, b, rb, contact, tuning);
            }
        }
    }

    buffer
}

/// Push two overlapping tokens apart and exchange momentum along the normal.
///
/// Each token moves by the other's share of the combined radius, so the
/// smaller one gives way more.
pub fn separate(a: &mut Token, ra: f32, b: &mut Token, rb: f32, contact: Contact, tuning: &Tuning) {
    let Contact { normal, overlap } = contact;
    let total = ra + rb;
    let ratio_a = rb / total;
    let ratio_b = ra / total;

    a.pos -= normal * overlap * ratio_a;
    b.pos += normal * overlap * ratio_b;

    // Only while approaching
    let dvn = (a.vel - b.vel).dot(normal);
    if dvn > 0.0 {
        a.vel -= normal * dvn * ratio_a * tuning.restitution;
        b.vel += normal * dvn * ratio_b * tuning.restitution;

        // Lateral impacts spin both tokens
        let a_vx = a.vel.x;
        a.rotation_speed += (b.vel.x - a_vx) * tuning.impact_spin;
        b.rotation_speed += (a_vx - b.vel.x) * tuning.impact_spin;
    }
}
