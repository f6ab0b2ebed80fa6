//! Frame driver
//!
//! Turns display refreshes into physics steps. The driver never schedules
//! anything itself: the host asks for a `FrameRequest`, calls back with it
//! and a timestamp when the frame fires, and stops the driver on teardown.
//! A request that was cancelled (or superseded) never steps the engine.
//!
//! Commands issued between frames are queued and drained at the start of the
//! next step, so hosts that receive input on another thread keep a single
//! writer for the session state.

use crate::delta_factor;
use crate::sim::{Command, FrameOutput, GameOver, GameState, TickInput, tick};

/// Receives every step's output
pub trait FrameObserver {
    fn on_frame(&mut self, frame: &FrameOutput);

    /// Fired exactly once per session, after `on_frame` for that step
    fn on_game_over(&mut self, _over: &GameOver) {}
}

/// Observer that ignores everything
impl FrameObserver for () {
    fn on_frame(&mut self, _frame: &FrameOutput) {}
}

/// Handle for one pending frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

/// Cooperative stepping loop around a single `GameState`
#[derive(Debug)]
pub struct FrameDriver {
    state: GameState,
    input: TickInput,
    last_frame_ms: Option<f64>,
    pending: Option<FrameRequest>,
    next_request: u64,
    stopped: bool,
}

impl FrameDriver {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            input: TickInput::default(),
            last_frame_ms: None,
            pending: None,
            next_request: 1,
            stopped: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Currently pending request, if any
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Ask for the next frame. Returns the existing request if one is
    /// already pending, and `None` once the driver has been stopped.
    pub fn request_frame(&mut self) -> Option<FrameRequest> {
        if self.stopped {
            return None;
        }
        if let Some(pending) = self.pending {
            return Some(pending);
        }
        let request = FrameRequest(self.next_request);
        self.next_request += 1;
        self.pending = Some(request);
        Some(request)
    }

    /// Run the step for `request` at `timestamp_ms`.
    ///
    /// Stale or cancelled requests return `None` without touching the state.
    /// Otherwise the step's output is returned (after notifying `observer`)
    /// and the next frame is requested.
    pub fn on_frame(
        &mut self,
        request: FrameRequest,
        timestamp_ms: f64,
        observer: &mut dyn FrameObserver,
    ) -> Option<FrameOutput> {
        if self.stopped || self.pending != Some(request) {
            log::debug!("Ignoring stale frame request {:?}", request);
            return None;
        }
        self.pending = None;

        let d = delta_factor(
            self.last_frame_ms,
            timestamp_ms,
            self.state.tuning.reference_frame_ms,
            self.state.tuning.max_delta_factor,
        );
        self.last_frame_ms = Some(timestamp_ms);

        let input = std::mem::take(&mut self.input);
        let output = tick(&mut self.state, &input, timestamp_ms, d);

        observer.on_frame(&output);
        if let Some(over) = &output.game_over {
            observer.on_game_over(over);
        }

        self.request_frame();
        Some(output)
    }

    /// Teardown: cancel the pending frame; no step runs afterwards
    pub fn stop(&mut self) {
        if !self.stopped {
            log::info!("Frame driver stopped");
        }
        self.stopped = true;
        self.pending = None;
    }

    /// Queue a command for the next step
    pub fn queue(&mut self, command: Command) {
        self.input.push(command);
    }

    /// Queue a batch of commands behind anything already pending
    pub fn queue_all(&mut self, input: TickInput) {
        self.input.append(input);
    }

    pub fn set_drop_x(&mut self, x: f32) {
        self.queue(Command::SetDropX(x));
    }

    pub fn drop_token(&mut self) {
        self.queue(Command::Drop);
    }

    pub fn punch(&mut self) {
        self.queue(Command::Punch);
    }

    /// Restart the session at the next step
    pub fn restart(&mut self) {
        self.queue(Command::Restart);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;
    use crate::tuning::Tuning;

    #[derive(Default)]
    struct Recorder {
        frames: usize,
        game_overs: Vec<GameOver>,
    }

    impl FrameObserver for Recorder {
        fn on_frame(&mut self, _frame: &FrameOutput) {
            self.frames += 1;
        }

        fn on_game_over(&mut self, over: &GameOver) {
            self.game_overs.push(*over);
        }
    }

    fn driver() -> FrameDriver {
        FrameDriver::new(GameState::new(Tuning::default(), 42))
    }

    #[test]
    fn test_frame_rearms_request() {
        let mut driver = driver();
        let mut rec = Recorder::default();
        let first = driver.request_frame().unwrap();
        assert!(driver.on_frame(first, 0.0, &mut rec).is_some());

        let next = driver.pending().unwrap();
        assert_ne!(next, first);
        // The consumed request cannot run again
        assert!(driver.on_frame(first, 16.0, &mut rec).is_none());
        assert_eq!(rec.frames, 1);
    }

    #[test]
    fn test_request_is_idempotent_while_pending() {
        let mut driver = driver();
        let a = driver.request_frame();
        let b = driver.request_frame();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stop_cancels_pending_frame() {
        let mut driver = driver();
        let mut rec = Recorder::default();
        let request = driver.request_frame().unwrap();
        driver.drop_token();
        driver.stop();

        assert!(driver.on_frame(request, 0.0, &mut rec).is_none());
        assert!(driver.request_frame().is_none());
        assert_eq!(rec.frames, 0);
        assert!(driver.state().tokens.is_empty());
    }

    #[test]
    fn test_commands_drain_at_step_start() {
        let mut driver = driver();
        let mut rec = Recorder::default();
        driver.set_drop_x(80.0);
        driver.drop_token();
        assert!(driver.state().tokens.is_empty());

        let request = driver.request_frame().unwrap();
        let out = driver.on_frame(request, 0.0, &mut rec).unwrap();
        assert_eq!(out.phase, GamePhase::Running);
        assert_eq!(out.tokens.len(), 1);
        assert_eq!(out.tokens[0].x, 80.0);
        assert_eq!(out.drop_x, 80.0);
    }

    #[test]
    fn test_stall_is_capped() {
        let mut driver = driver();
        let mut rec = Recorder::default();
        driver.drop_token();
        let r = driver.request_frame().unwrap();
        let out = driver.on_frame(r, 0.0, &mut rec).unwrap();
        let y0 = out.tokens[0].y;

        // Ten seconds later: advances at most two reference frames
        let r = driver.request_frame().unwrap();
        let out = driver.on_frame(r, 10_000.0, &mut rec).unwrap();
        let moved = out.tokens[0].y - y0;
        assert!(moved > 0.0);
        assert!(moved <= 12.0 * 2.0);
    }

    #[test]
    fn test_queued_commands_keep_arrival_order() {
        let mut driver = driver();
        let mut rec = Recorder::default();
        driver.set_drop_x(80.0);
        driver.drop_token();
        driver.set_drop_x(290.0);

        let request = driver.request_frame().unwrap();
        let out = driver.on_frame(request, 0.0, &mut rec).unwrap();
        assert_eq!(out.tokens.len(), 1);
        assert_eq!(out.tokens[0].x, 80.0);
        assert_eq!(out.drop_x, 290.0);
    }

    #[test]
    fn test_restart_after_drop_in_same_frame() {
        let mut driver = driver();
        let mut rec = Recorder::default();
        driver.drop_token();
        driver.restart();

        let request = driver.request_frame().unwrap();
        let out = driver.on_frame(request, 0.0, &mut rec).unwrap();
        assert_eq!(out.phase, GamePhase::Idle);
        assert!(out.tokens.is_empty());
    }

    #[test]
    fn test_every_queued_punch_fires() {
        let mut state = GameState::new(Tuning::default(), 42);
        state.drop_token(0.0);
        state.credit(100);
        let mut driver = FrameDriver::new(state);
        let mut rec = Recorder::default();
        driver.punch();
        driver.punch();

        let request = driver.request_frame().unwrap();
        let out = driver.on_frame(request, 16.67, &mut rec).unwrap();
        assert_eq!(out.punch.charge, 0);
        assert_eq!(driver.state().punch.charge, 0);
    }

    #[test]
    fn test_queue_all_appends_batch() {
        let mut driver = driver();
        let mut rec = Recorder::default();
        driver.set_drop_x(100.0);
        driver.queue_all(TickInput::new().with(Command::Drop).with(Command::SetDropX(200.0)));

        let request = driver.request_frame().unwrap();
        let out = driver.on_frame(request, 0.0, &mut rec).unwrap();
        assert_eq!(out.tokens[0].x, 100.0);
        assert_eq!(out.drop_x, 200.0);
    }
}
