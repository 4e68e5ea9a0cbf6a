//! Post-session feedback and the single hand-off to persistence.

use crate::types::{SessionResult, SessionSummary};
use crate::wal::ResultSink;
use crate::{Error, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How hard the session felt
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" | "1" => Ok(Difficulty::Easy),
            "medium" | "m" | "2" => Ok(Difficulty::Medium),
            "hard" | "h" | "3" => Ok(Difficulty::Hard),
            other => Err(Error::Other(format!(
                "Unknown difficulty '{}', expected easy, medium or hard",
                other
            ))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.pad(label)
    }
}

/// User-supplied rating and note
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub difficulty: Difficulty,
    pub notes: Option<String>,
}

impl Feedback {
    /// Blank notes are stored as `None`
    pub fn new(difficulty: Difficulty, notes: Option<String>) -> Self {
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Self { difficulty, notes }
    }
}

/// Feedback form opened when a session completes
///
/// Submitting consumes the capture, so one capture can reach the sink at
/// most once.
#[derive(Debug)]
pub struct FeedbackCapture {
    summary: SessionSummary,
}

impl FeedbackCapture {
    pub fn open(summary: SessionSummary) -> Self {
        Self { summary }
    }

    /// Build the result record and hand it to `sink`
    ///
    /// A sink failure is reported as [`Error::Persistence`]; nothing is retried.
    pub fn submit(self, feedback: Feedback, sink: &mut dyn ResultSink) -> Result<SessionResult> {
        let result = self.into_result(feedback);

        match sink.save(&result) {
            Ok(()) => {
                tracing::info!("Saved session result {}", result.id);
                Ok(result)
            }
            Err(e) => Err(Error::Persistence(e.to_string())),
        }
    }

    fn into_result(self, feedback: Feedback) -> SessionResult {
        let summary = self.summary;
        let recorded = summary.heart_rate.max > 0.0;

        SessionResult {
            id: Uuid::new_v4(),
            session_key: summary.session_key,
            exercise_id: summary.exercise_id,
            exercise_title: summary.exercise_title,
            exercises_completed: summary.exercises_completed,
            total_duration_secs: summary.total_duration_secs,
            calories_burned: summary.calories_burned.round() as u32,
            avg_hr: recorded.then(|| summary.heart_rate.avg.round() as u8),
            max_hr: recorded.then(|| summary.heart_rate.max.round() as u8),
            difficulty: feedback.difficulty,
            notes: feedback.notes,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HeartRate;

    struct VecSink(Vec<SessionResult>);

    impl ResultSink for VecSink {
        fn save(&mut self, result: &SessionResult) -> Result<()> {
            self.0.push(result.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl ResultSink for FailingSink {
        fn save(&mut self, _result: &SessionResult) -> Result<()> {
            Err(Error::Other("disk full".into()))
        }
    }

    fn summary() -> SessionSummary {
        SessionSummary {
            session_key: "core_blast".into(),
            exercise_id: "dead_bug".into(),
            exercise_title: "Dead Bug".into(),
            exercises_completed: 3,
            total_duration_secs: 165,
            calories_burned: 21.6,
            heart_rate: HeartRate {
                current: 120.0,
                max: 131.4,
                avg: 117.6,
            },
        }
    }

    #[test]
    fn test_parse_difficulty() {
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!(" m ".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!("3".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("brutal".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_blank_notes_dropped() {
        let feedback = Feedback::new(Difficulty::Easy, Some("   ".into()));
        assert_eq!(feedback.notes, None);

        let feedback = Feedback::new(Difficulty::Easy, Some(" sore knees ".into()));
        assert_eq!(feedback.notes.as_deref(), Some("sore knees"));
    }

    #[test]
    fn test_submit_builds_rounded_result() {
        let mut sink = VecSink(Vec::new());
        let capture = FeedbackCapture::open(summary());

        let result = capture
            .submit(
                Feedback::new(Difficulty::Hard, Some("tough".into())),
                &mut sink,
            )
            .unwrap();

        assert_eq!(sink.0.len(), 1);
        assert_eq!(sink.0[0], result);
        assert_eq!(result.calories_burned, 22);
        assert_eq!(result.avg_hr, Some(118));
        assert_eq!(result.max_hr, Some(131));
        assert_eq!(result.difficulty, Difficulty::Hard);
        assert_eq!(result.exercise_id, "dead_bug");
    }

    #[test]
    fn test_no_heart_rate_recorded() {
        let mut summary = summary();
        summary.heart_rate = HeartRate::default();

        let mut sink = VecSink(Vec::new());
        let result = FeedbackCapture::open(summary)
            .submit(Feedback::new(Difficulty::Easy, None), &mut sink)
            .unwrap();

        assert_eq!(result.avg_hr, None);
        assert_eq!(result.max_hr, None);
    }

    #[test]
    fn test_sink_failure_is_persistence_error() {
        let err = FeedbackCapture::open(summary())
            .submit(Feedback::new(Difficulty::Easy, None), &mut FailingSink)
            .unwrap_err();

        assert!(matches!(err, Error::Persistence(ref msg) if msg.contains("disk full")));
    }
}
