//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestamps only
//! - Seeded (or injected) RNG only
//! - Stable iteration order (Entity Store spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod events;
pub mod integrate;
pub mod loss;
pub mod punch;
pub mod stage;
pub mod state;
pub mod tick;

pub use collision::{Contact, MergeSpawn, MutationBuffer, circle_contact, resolve, separate, solve};
pub use events::{EffectEvent, EffectTracker, FrameOutput, GameOver, ScoreEvent, StepEvents};
pub use integrate::{integrate, integrate_token};
pub use loss::find_losing_token;
pub use punch::{PunchCharge, apply_punch};
pub use stage::{StageDef, StageTable};
pub use state::{GamePhase, GameState, Token, TokenSnapshot};
pub use tick::{Command, TickInput, apply_command, apply_input, tick};
