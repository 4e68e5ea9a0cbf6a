//! Interval session engine.
//!
//! Drives a session through alternating WORK and REST phases:
//! - WORK expiry moves to REST, or straight to COMPLETE on the last exercise
//! - REST expiry moves the cursor to the next exercise and back to WORK
//! - Manual advance/previous jump between exercises and pause the countdown
//! - COMPLETE opens a one-shot feedback capture; submitting it moves the
//!   session to SAVED (or SAVE_FAILED) and nothing but `reset` reopens it
//!
//! All mutation happens inside the command methods and [`SessionEngine::handle_tick`];
//! the host calls them one at a time from its event loop.

use crate::biometrics::{self, RandomSource};
use crate::clock::{Clock, ClockSignal, PhaseClock, TickToken};
use crate::config::{SessionConfig, MAX_INTENSITY};
use crate::feedback::{Feedback, FeedbackCapture};
use crate::narrator::{Narrator, SessionEvent};
use crate::types::{ExerciseDescriptor, Phase, SessionResult, SessionState, SessionSummary};
use crate::wal::ResultSink;
use crate::Result;

/// One session over one exercise sequence
pub struct SessionEngine<C: Clock, R: RandomSource, N: Narrator> {
    config: SessionConfig,
    state: SessionState,
    clock: PhaseClock<C>,
    rng: R,
    narrator: N,
    started: bool,
    /// Exercises whose WORK interval ran to zero
    worked: Vec<bool>,
    capture: Option<FeedbackCapture>,
}

impl<C: Clock, R: RandomSource, N: Narrator> SessionEngine<C, R, N> {
    /// Create a paused session positioned on the first exercise
    pub fn new(config: SessionConfig, clock: C, rng: R, narrator: N) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            "New session {} with {} exercises ({}s work / {}s rest, intensity {})",
            config.session_key,
            config.exercises().len(),
            config.work_secs,
            config.rest_secs,
            config.intensity
        );

        Ok(Self {
            state: SessionState::initial(config.work_secs, config.intensity),
            worked: vec![false; config.exercises().len()],
            clock: PhaseClock::new(clock, config.work_secs),
            config,
            rng,
            narrator,
            started: false,
            capture: None,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Number of exercises, never zero
    pub fn len(&self) -> usize {
        self.config.exercises().len()
    }

    /// Exercise under the cursor
    pub fn current_exercise(&self) -> &ExerciseDescriptor {
        &self.config.exercises()[self.state.cursor]
    }

    /// Exercise after the cursor, if any
    pub fn next_exercise(&self) -> Option<&ExerciseDescriptor> {
        self.config.exercises().get(self.state.cursor + 1)
    }

    pub fn feedback_capture(&self) -> Option<&FeedbackCapture> {
        self.capture.as_ref()
    }

    /// Token of the tick source currently armed
    pub fn armed_token(&self) -> Option<TickToken> {
        self.clock.armed_token()
    }

    pub fn clock(&self) -> &C {
        self.clock.clock()
    }

    pub fn narrator(&self) -> &N {
        &self.narrator
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Begin the session, or resume it if already started
    pub fn start(&mut self) {
        if self.state.is_complete() {
            tracing::debug!("Ignoring start on a finished session");
            return;
        }

        if !self.started {
            self.started = true;
            self.narrator.announce(&SessionEvent::Started);
            self.announce_phase();
        }

        self.run_clock();
    }

    pub fn pause(&mut self) {
        if self.state.is_complete() || !self.state.running {
            return;
        }

        self.clock.stop();
        self.state.running = false;
        tracing::debug!("Paused with {}s remaining", self.state.remaining);
        self.narrator.announce(&SessionEvent::Paused);
    }

    pub fn resume(&mut self) {
        if self.state.is_complete() || self.state.running {
            return;
        }
        if !self.started {
            self.start();
            return;
        }

        self.run_clock();
        self.narrator.announce(&SessionEvent::Resumed);
    }

    /// Full restart from the first exercise with zeroed stats
    pub fn reset(&mut self) {
        self.clock.stop();
        self.clock.reset(self.config.work_secs);
        self.state = SessionState::initial(self.config.work_secs, self.config.intensity);
        self.started = false;
        self.worked.iter_mut().for_each(|w| *w = false);
        self.capture = None;

        tracing::info!("Session {} reset", self.config.session_key);
        self.narrator.announce(&SessionEvent::Reset);
    }

    /// Skip to the next exercise, paused; completes on the last exercise
    pub fn advance(&mut self) {
        if self.state.is_complete() {
            return;
        }

        if self.state.cursor + 1 < self.len() {
            self.state.cursor += 1;
            tracing::info!("Manual advance to exercise {}", self.state.cursor);
            self.enter_work_paused();
        } else {
            tracing::info!("Manual advance past the last exercise");
            self.complete();
        }
    }

    /// Go back one exercise, paused; no-op on the first exercise
    pub fn previous(&mut self) {
        if self.state.is_complete() || self.state.cursor == 0 {
            return;
        }

        self.state.cursor -= 1;
        tracing::info!("Manual step back to exercise {}", self.state.cursor);
        self.enter_work_paused();
    }

    /// Takes effect from the next tick
    pub fn set_intensity(&mut self, intensity: u8) {
        if self.state.is_complete() {
            return;
        }

        let intensity = intensity.min(MAX_INTENSITY);
        if intensity == self.state.intensity {
            return;
        }
        self.state.intensity = intensity;
        tracing::debug!("Intensity set to {}", intensity);
        self.narrator
            .announce(&SessionEvent::IntensityChanged(intensity));
    }

    /// Process one tick from the clock
    pub fn handle_tick(&mut self, token: TickToken) {
        if self.state.is_complete() || !self.state.running {
            tracing::debug!("Ignoring tick {:?} while not running", token);
            return;
        }

        let expired = match self.clock.tick(token) {
            ClockSignal::Stale | ClockSignal::Held => return,
            ClockSignal::Ticked(_) => false,
            ClockSignal::Expired => true,
        };

        let slot = self.state.cursor;
        let intensity = self.state.intensity;

        self.state.remaining = self.clock.remaining();
        self.state.elapsed_active += 1;
        self.state.heart_rate =
            biometrics::sample(&self.state.heart_rate, intensity, slot, &mut self.rng);
        self.state.calories_burned += biometrics::calories_per_tick(intensity, slot);

        self.narrator.announce(&SessionEvent::Tick {
            remaining: self.state.remaining,
            calories_burned: self.state.calories_burned,
            heart_rate: self.state.heart_rate,
        });

        if expired {
            self.on_phase_expired();
        }
    }

    /// Hand the finished session to `sink`, at most once
    ///
    /// Returns `Ok(None)` when there is nothing to submit: the session is
    /// still running, or its result was already handed off (successfully or
    /// not). A sink failure is returned as an error and is final until `reset`.
    pub fn submit_feedback(
        &mut self,
        feedback: Feedback,
        sink: &mut dyn ResultSink,
    ) -> Result<Option<SessionResult>> {
        if self.state.phase != Phase::Complete {
            tracing::debug!("Ignoring feedback in phase {:?}", self.state.phase);
            return Ok(None);
        }

        let Some(capture) = self.capture.take() else {
            return Ok(None);
        };

        match capture.submit(feedback, sink) {
            Ok(result) => {
                self.state.phase = Phase::Saved;
                self.narrator
                    .announce(&SessionEvent::Saved { result_id: result.id });
                Ok(Some(result))
            }
            Err(e) => {
                self.state.phase = Phase::SaveFailed;
                tracing::error!("Session {} result was not saved: {}", self.config.session_key, e);
                self.narrator.announce(&SessionEvent::SaveFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn run_clock(&mut self) {
        self.clock.start();
        self.state.running = true;
    }

    fn enter_work_paused(&mut self) {
        self.clock.stop();
        self.clock.reset(self.config.work_secs);
        self.state.running = false;
        self.state.phase = Phase::Work;
        self.state.remaining = self.config.work_secs;
        self.announce_phase();
    }

    fn on_phase_expired(&mut self) {
        match self.state.phase {
            Phase::Work => {
                self.worked[self.state.cursor] = true;
                match self.next_exercise().cloned() {
                    Some(next) => {
                        self.state.phase = Phase::Rest;
                        self.set_remaining(self.config.rest_secs);
                        self.announce_phase();
                        self.narrator.announce(&SessionEvent::RestBegins { next });
                    }
                    None => self.complete(),
                }
            }
            Phase::Rest => {
                if self.state.cursor + 1 < self.len() {
                    self.state.cursor += 1;
                    self.state.phase = Phase::Work;
                    self.set_remaining(self.config.work_secs);
                    self.announce_phase();
                } else {
                    self.complete();
                }
            }
            Phase::Complete | Phase::Saved | Phase::SaveFailed => {}
        }
    }

    fn set_remaining(&mut self, secs: u32) {
        self.clock.reset(secs);
        self.state.remaining = secs;
    }

    fn complete(&mut self) {
        self.clock.stop();
        self.state.running = false;
        self.state.phase = Phase::Complete;

        let exercise = self.current_exercise();
        let summary = SessionSummary {
            session_key: self.config.session_key.clone(),
            exercise_id: exercise.id.clone(),
            exercise_title: exercise.title.clone(),
            exercises_completed: self.worked.iter().filter(|w| **w).count(),
            total_duration_secs: self.state.elapsed_active,
            calories_burned: self.state.calories_burned,
            heart_rate: self.state.heart_rate,
        };

        tracing::info!(
            "Session {} complete after {}s, {:.1} kcal",
            summary.session_key,
            summary.total_duration_secs,
            summary.calories_burned
        );

        self.capture = Some(FeedbackCapture::open(summary.clone()));
        self.narrator.announce(&SessionEvent::Completed(summary));
    }

    fn announce_phase(&mut self) {
        self.narrator.announce(&SessionEvent::PhaseChanged {
            phase: self.state.phase,
            exercise_index: self.state.cursor,
            remaining: self.state.remaining,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biometrics::RngSource;
    use crate::clock::ManualClock;
    use crate::feedback::Difficulty;
    use crate::narrator::RecordingNarrator;
    use crate::types::HeartRate;
    use crate::Error;
    use rand::rngs::StdRng;

    type TestEngine = SessionEngine<ManualClock, RngSource<StdRng>, RecordingNarrator>;

    #[derive(Default)]
    struct CountingSink {
        saved: Vec<SessionResult>,
        fail: bool,
        calls: usize,
    }

    impl ResultSink for CountingSink {
        fn save(&mut self, result: &SessionResult) -> Result<()> {
            self.calls += 1;
            if self.fail {
                return Err(Error::Other("database unavailable".into()));
            }
            self.saved.push(result.clone());
            Ok(())
        }
    }

    fn exercises(n: usize) -> Vec<ExerciseDescriptor> {
        (0..n)
            .map(|i| {
                ExerciseDescriptor::new(
                    &format!("ex{}", i),
                    &format!("Exercise {}", i),
                    "45 sec",
                    "Move well.",
                )
            })
            .collect()
    }

    fn engine_with(exercises: Vec<ExerciseDescriptor>, work: u32, rest: u32) -> TestEngine {
        crate::logging::init_test();
        let config = SessionConfig::new("test", exercises).with_durations(work, rest);
        SessionEngine::new(
            config,
            ManualClock::new(),
            RngSource::seeded(42),
            RecordingNarrator::new(),
        )
        .unwrap()
    }

    fn engine(n: usize, work: u32, rest: u32) -> TestEngine {
        engine_with(exercises(n), work, rest)
    }

    /// Fire one tick from the armed source; false if nothing is armed
    fn tick(engine: &mut TestEngine) -> bool {
        match engine.clock().current() {
            Some(token) => {
                engine.handle_tick(token);
                true
            }
            None => false,
        }
    }

    fn run_ticks(engine: &mut TestEngine, n: usize) {
        for _ in 0..n {
            assert!(tick(engine), "no tick source armed");
        }
    }

    fn feedback() -> Feedback {
        Feedback::new(Difficulty::Medium, Some("solid".into()))
    }

    #[test]
    fn test_start_announces_first_phase() {
        let mut engine = engine(2, 10, 5);
        engine.start();

        assert!(engine.state().running);
        assert_eq!(
            engine.narrator().events()[..2],
            [
                SessionEvent::Started,
                SessionEvent::PhaseChanged {
                    phase: Phase::Work,
                    exercise_index: 0,
                    remaining: 10,
                },
            ]
        );
    }

    #[test]
    fn test_single_exercise_completes_without_rest() {
        let mut engine = engine(1, 45, 15);
        engine.start();

        run_ticks(&mut engine, 44);
        assert_eq!(engine.state().phase, Phase::Work);
        assert_eq!(engine.state().remaining, 1);

        run_ticks(&mut engine, 1);
        assert!(engine.state().is_complete());
        assert_eq!(engine.state().phase, Phase::Complete);
        assert!(!engine.state().running);
        assert_eq!(engine.clock().active_sources(), 0);
        assert!(engine.feedback_capture().is_some());
        assert_eq!(
            engine.narrator().count(|e| matches!(e, SessionEvent::RestBegins { .. })),
            0
        );
    }

    #[test]
    fn test_two_exercise_walkthrough() {
        let mut engine = engine(2, 10, 5);
        engine.set_intensity(50);
        engine.start();

        run_ticks(&mut engine, 10);
        assert_eq!(engine.state().phase, Phase::Rest);
        assert_eq!(engine.state().remaining, 5);
        assert_eq!(engine.state().cursor, 0);
        assert!(engine.narrator().events().iter().any(|e| matches!(
            e,
            SessionEvent::RestBegins { next } if next.id == "ex1"
        )));

        run_ticks(&mut engine, 5);
        assert_eq!(engine.state().phase, Phase::Work);
        assert_eq!(engine.state().cursor, 1);
        assert_eq!(engine.state().remaining, 10);

        run_ticks(&mut engine, 10);
        assert!(engine.state().is_complete());
        assert_eq!(engine.state().elapsed_active, 25);
        assert!(matches!(
            engine.narrator().events().last(),
            Some(SessionEvent::Completed(summary)) if summary.exercises_completed == 2
        ));
    }

    #[test]
    fn test_pause_then_reset() {
        let mut engine = engine(3, 45, 15);
        engine.start();
        run_ticks(&mut engine, 3);
        assert_eq!(engine.state().remaining, 42);

        let stale = engine.armed_token().unwrap();
        engine.pause();
        assert!(!engine.state().running);
        assert_eq!(engine.clock().active_sources(), 0);

        // A tick that was already in flight must not count
        engine.handle_tick(stale);
        assert!(!tick(&mut engine));
        assert_eq!(engine.state().remaining, 42);
        assert_eq!(engine.state().elapsed_active, 3);

        engine.reset();
        assert_eq!(engine.state().remaining, 45);
        assert_eq!(engine.state().cursor, 0);
        assert_eq!(engine.state().phase, Phase::Work);
        assert!(!engine.state().running);
        assert_eq!(engine.state().calories_burned, 0.0);
        assert_eq!(engine.state().elapsed_active, 0);
        assert_eq!(engine.state().heart_rate, HeartRate::default());
    }

    #[test]
    fn test_resume_continues_countdown() {
        let mut engine = engine(1, 10, 5);
        engine.start();
        run_ticks(&mut engine, 4);
        engine.pause();
        engine.resume();

        assert!(engine.state().running);
        assert_eq!(engine.state().remaining, 6);
        run_ticks(&mut engine, 1);
        assert_eq!(engine.state().remaining, 5);
        assert_eq!(engine.narrator().count(|e| *e == SessionEvent::Resumed), 1);
    }

    #[test]
    fn test_intensity_change_is_not_retroactive() {
        let mut engine = engine(2, 30, 10);
        engine.set_intensity(100);
        engine.start();
        run_ticks(&mut engine, 5);
        let burned = engine.state().calories_burned;
        assert!(burned > 0.0);

        engine.set_intensity(0);
        assert_eq!(engine.state().calories_burned, burned);

        run_ticks(&mut engine, 5);
        assert_eq!(engine.state().calories_burned, burned);
        assert_eq!(engine.state().elapsed_active, 10);
    }

    #[test]
    fn test_empty_sequence_uses_placeholder() {
        let mut engine = engine_with(vec![], 20, 10);
        assert_eq!(engine.len(), 1);
        assert!(engine.current_exercise().is_placeholder());

        engine.start();
        run_ticks(&mut engine, 20);
        assert!(engine.state().is_complete());
        assert_eq!(
            engine.narrator().count(|e| matches!(
                e,
                SessionEvent::PhaseChanged {
                    phase: Phase::Rest,
                    ..
                }
            )),
            0
        );
    }

    #[test]
    fn test_phase_tick_counts() {
        for (n, work, rest) in [(1, 7, 3), (3, 4, 2), (5, 6, 9)] {
            let mut engine = engine(n, work, rest);
            engine.start();

            let mut work_ticks = 0;
            let mut rest_ticks = 0;
            while !engine.state().is_complete() {
                match engine.state().phase {
                    Phase::Work => work_ticks += 1,
                    Phase::Rest => rest_ticks += 1,
                    _ => unreachable!(),
                }
                assert!(tick(&mut engine));
            }

            assert_eq!(work_ticks, n * work as usize);
            assert_eq!(rest_ticks, (n - 1) * rest as usize);
        }
    }

    #[test]
    fn test_advance_pauses_on_next_exercise() {
        let mut engine = engine(3, 20, 10);
        engine.start();
        run_ticks(&mut engine, 7);

        engine.advance();
        assert_eq!(engine.state().cursor, 1);
        assert_eq!(engine.state().phase, Phase::Work);
        assert_eq!(engine.state().remaining, 20);
        assert!(!engine.state().running);
        assert_eq!(engine.clock().active_sources(), 0);

        engine.resume();
        run_ticks(&mut engine, 1);
        assert_eq!(engine.state().remaining, 19);
    }

    #[test]
    fn test_advance_from_rest_goes_to_next_work() {
        let mut engine = engine(2, 5, 5);
        engine.start();
        run_ticks(&mut engine, 6);
        assert_eq!(engine.state().phase, Phase::Rest);

        engine.advance();
        assert_eq!(engine.state().phase, Phase::Work);
        assert_eq!(engine.state().cursor, 1);
        assert_eq!(engine.state().remaining, 5);
    }

    #[test]
    fn test_advance_on_last_exercise_completes() {
        let mut engine = engine(2, 20, 10);
        engine.advance();
        engine.advance();

        assert!(engine.state().is_complete());
        assert_eq!(engine.state().cursor, 1);
        assert_eq!(
            engine.narrator().count(|e| matches!(e, SessionEvent::Completed(_))),
            1
        );
    }

    #[test]
    fn test_skipped_exercises_not_counted_as_completed() {
        let mut engine = engine(3, 4, 2);
        engine.start();
        run_ticks(&mut engine, 4 + 2);
        assert_eq!(engine.state().cursor, 1);

        // Skip the second exercise, then go back and redo the first one
        engine.advance();
        engine.previous();
        engine.previous();
        engine.resume();
        run_ticks(&mut engine, 4);
        assert_eq!(engine.state().phase, Phase::Rest);
        engine.advance();
        engine.advance();
        engine.advance();
        assert!(engine.state().is_complete());

        let mut sink = CountingSink::default();
        let result = engine.submit_feedback(feedback(), &mut sink).unwrap().unwrap();
        assert_eq!(result.exercises_completed, 1);
        assert_eq!(result.exercise_id, "ex2");

        engine.reset();
        engine.advance();
        engine.advance();
        engine.advance();
        let result = engine.submit_feedback(feedback(), &mut sink).unwrap().unwrap();
        assert_eq!(result.exercises_completed, 0);
    }

    #[test]
    fn test_previous() {
        let mut engine = engine(3, 20, 10);
        engine.start();
        engine.previous();
        assert_eq!(engine.state().cursor, 0);
        assert!(engine.state().running, "previous at cursor 0 is a no-op");

        engine.advance();
        engine.advance();
        assert_eq!(engine.state().cursor, 2);

        engine.resume();
        run_ticks(&mut engine, 4);
        engine.previous();
        assert_eq!(engine.state().cursor, 1);
        assert_eq!(engine.state().remaining, 20);
        assert_eq!(engine.state().phase, Phase::Work);
        assert!(!engine.state().running);
    }

    #[test]
    fn test_terminal_state_ignores_commands() {
        let mut engine = engine(2, 3, 2);
        engine.start();
        run_ticks(&mut engine, 8);
        assert!(engine.state().is_complete());
        let before = engine.state().clone();

        engine.start();
        engine.resume();
        engine.advance();
        engine.previous();
        engine.pause();
        engine.set_intensity(90);
        engine.handle_tick(TickToken(1));

        assert_eq!(engine.state(), &before);
        assert_eq!(engine.clock().active_sources(), 0);
    }

    #[test]
    fn test_feedback_saved_exactly_once() {
        let mut engine = engine(1, 5, 5);
        engine.start();
        run_ticks(&mut engine, 5);

        let mut sink = CountingSink::default();
        let result = engine.submit_feedback(feedback(), &mut sink).unwrap();
        let result = result.expect("first submit saves");
        assert_eq!(result.session_key, "test");
        assert_eq!(result.exercise_id, "ex0");
        assert_eq!(result.total_duration_secs, 5);
        assert_eq!(result.notes.as_deref(), Some("solid"));
        assert_eq!(engine.state().phase, Phase::Saved);

        let again = engine.submit_feedback(feedback(), &mut sink).unwrap();
        assert!(again.is_none());
        assert_eq!(sink.calls, 1);
        assert_eq!(sink.saved.len(), 1);
    }

    #[test]
    fn test_feedback_before_completion_is_ignored() {
        let mut engine = engine(2, 5, 5);
        engine.start();
        run_ticks(&mut engine, 2);

        let mut sink = CountingSink::default();
        assert!(engine.submit_feedback(feedback(), &mut sink).unwrap().is_none());
        assert_eq!(sink.calls, 0);
        assert_eq!(engine.state().phase, Phase::Work);
    }

    #[test]
    fn test_failed_save_is_final_until_reset() {
        let mut engine = engine(1, 3, 3);
        engine.start();
        run_ticks(&mut engine, 3);

        let mut failing = CountingSink {
            fail: true,
            ..Default::default()
        };
        let err = engine.submit_feedback(feedback(), &mut failing).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert_eq!(engine.state().phase, Phase::SaveFailed);
        assert!(engine
            .narrator()
            .events()
            .iter()
            .any(|e| matches!(e, SessionEvent::SaveFailed { .. })));

        // No retry, even with a working sink
        let mut working = CountingSink::default();
        assert!(engine.submit_feedback(feedback(), &mut working).unwrap().is_none());
        assert_eq!(failing.calls, 1);
        assert_eq!(working.calls, 0);

        // Reset starts a fresh session that can be saved
        engine.reset();
        assert_eq!(engine.state().phase, Phase::Work);
        engine.start();
        run_ticks(&mut engine, 3);
        assert!(engine.submit_feedback(feedback(), &mut working).unwrap().is_some());
        assert_eq!(working.calls, 1);
    }

    #[test]
    fn test_only_one_tick_source_armed() {
        let mut engine = engine(3, 10, 5);
        engine.start();
        engine.start();
        engine.resume();
        assert_eq!(engine.clock().active_sources(), 1);

        let first = engine.armed_token().unwrap();
        engine.pause();
        engine.resume();
        let second = engine.armed_token().unwrap();
        assert_ne!(first, second);
        assert_eq!(engine.clock().active_sources(), 1);

        // Old source cannot double-decrement
        engine.handle_tick(first);
        engine.handle_tick(second);
        assert_eq!(engine.state().remaining, 9);
        assert_eq!(engine.state().elapsed_active, 1);
    }

    #[test]
    fn test_invariants_hold_under_mixed_commands() {
        let mut engine = engine(4, 6, 3);
        engine.start();

        let mut last_calories = 0.0;
        let mut last_max = 0.0;

        for step in 0..400 {
            match step % 37 {
                5 => engine.pause(),
                9 => engine.resume(),
                13 => engine.set_intensity((step % 101) as u8),
                21 if step % 3 == 0 => engine.previous(),
                29 if step % 5 == 0 => engine.advance(),
                _ => {
                    if !tick(&mut engine) {
                        engine.resume();
                    }
                }
            }

            let state = engine.state();
            assert!(state.cursor < engine.len());
            assert!(state.calories_burned >= last_calories);
            assert!(state.heart_rate.max >= last_max);
            assert!(engine.clock().active_sources() <= 1);
            assert_eq!(state.running, engine.clock().active_sources() == 1);
            if state.heart_rate.current > 0.0 {
                assert!((70.0..=180.0).contains(&state.heart_rate.current));
            }

            last_calories = state.calories_burned;
            last_max = state.heart_rate.max;

            if state.is_complete() {
                break;
            }
        }

        assert!(engine.state().is_complete());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let config = SessionConfig::new("bad", exercises(1)).with_durations(0, 10);
        let result = SessionEngine::new(
            config,
            ManualClock::new(),
            RngSource::seeded(1),
            RecordingNarrator::new(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
