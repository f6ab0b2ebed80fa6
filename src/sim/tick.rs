//! One physics step
//!
//! Commands queued since the previous frame are applied first, in the order
//! they arrived. Then the engine integrates, resolves contacts, credits score
//! and checks for a loss.

use serde::{Deserialize, Serialize};

use super::collision::resolve;
use super::events::{FrameOutput, GameOver, StepEvents};
use super::integrate::integrate;
use super::loss::find_losing_token;
use super::state::{GamePhase, GameState};

/// A player command, applied at the start of the next step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Move the drop guide (pointer move)
    SetDropX(f32),
    /// Drop the queued token at the guide
    Drop,
    /// Fire the punch ability
    Punch,
    /// Reset the session
    Restart,
}

/// Commands collected between two frames, in arrival order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub commands: Vec<Command>,
}

impl TickInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Builder form of `push`
    pub fn with(mut self, command: Command) -> Self {
        self.push(command);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Queue another batch after this one
    pub fn append(&mut self, mut other: TickInput) {
        self.commands.append(&mut other.commands);
    }
}

impl FromIterator<Command> for TickInput {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

/// Apply one command. Returns false when the session rejected it.
pub fn apply_command(state: &mut GameState, command: Command, now_ms: f64) -> bool {
    match command {
        Command::SetDropX(x) => {
            state.set_drop_x(x);
            !state.is_over()
        }
        Command::Drop => state.drop_token(now_ms),
        Command::Punch => state.punch(),
        Command::Restart => {
            state.restart();
            true
        }
    }
}

/// Apply queued commands in arrival order
pub fn apply_input(state: &mut GameState, input: &TickInput, now_ms: f64) {
    for command in &input.commands {
        if !apply_command(state, *command, now_ms) {
            log::debug!("Command {:?} rejected", command);
        }
    }
}

/// Advance the session by one frame.
///
/// `d` is the normalized delta factor. Physics only runs while the session
/// is `Running`; idle and finished sessions just report their snapshot.
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: f64, d: f32) -> FrameOutput {
    apply_input(state, input, now_ms);

    let mut events = StepEvents::new();
    let mut game_over = None;

    if state.phase == GamePhase::Running {
        integrate(&mut state.tokens, &state.tuning, d);
        resolve(state, now_ms, &mut events);
        state.credit(events.score_delta());

        if let Some(token) = find_losing_token(&state.tokens, &state.tuning, now_ms) {
            log::info!(
                "Game over: token {} (stage {}) settled above the line, final score {}",
                token.id,
                token.stage,
                state.score
            );
            state.finish();
            game_over = Some(GameOver {
                final_score: state.score,
                best_score: state.best_score,
            });
        }
    }

    let (score_delta, effects) = events.into_parts();
    FrameOutput {
        phase: state.phase,
        tokens: state.snapshot(),
        score_delta,
        effects,
        game_over,
        score: state.score,
        next_stage: state.next_stage,
        drop_x: state.drop_x,
        punch: state.punch,
        punch_ready: state.can_punch(),
    }
}
