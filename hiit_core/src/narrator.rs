//! Notifications from the engine to its host.

use crate::types::{ExerciseDescriptor, HeartRate, Phase, SessionSummary};
use uuid::Uuid;

/// Something the host may want to render or announce
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Started,
    PhaseChanged {
        phase: Phase,
        exercise_index: usize,
        remaining: u32,
    },
    /// Lookahead at the exercise that follows the rest
    RestBegins {
        next: ExerciseDescriptor,
    },
    Tick {
        remaining: u32,
        calories_burned: f64,
        heart_rate: HeartRate,
    },
    Paused,
    Resumed,
    Reset,
    IntensityChanged(u8),
    Completed(SessionSummary),
    Saved {
        result_id: Uuid,
    },
    SaveFailed {
        reason: String,
    },
}

/// Sink for session events
pub trait Narrator {
    fn announce(&mut self, event: &SessionEvent);
}

/// Logs every event through `tracing`
#[derive(Debug, Default)]
pub struct TracingNarrator;

impl Narrator for TracingNarrator {
    fn announce(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Tick { .. } => tracing::trace!(?event, "tick"),
            SessionEvent::SaveFailed { reason } => {
                tracing::warn!("Session result not saved: {}", reason)
            }
            _ => tracing::info!(?event, "session event"),
        }
    }
}

/// Keeps every event in order
#[derive(Debug, Default)]
pub struct RecordingNarrator {
    events: Vec<SessionEvent>,
}

impl RecordingNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// Count of events matching `pred`
    pub fn count(&self, pred: impl Fn(&SessionEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Narrator for RecordingNarrator {
    fn announce(&mut self, event: &SessionEvent) {
        self.events.push(event.clone());
    }
}
