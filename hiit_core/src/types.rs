//! Core domain types for the interval session engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise descriptors supplied by the catalog
//! - Session phases and the mutable session state
//! - Heart rate aggregates
//! - The immutable result record handed to persistence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::feedback::Difficulty;

// ============================================================================
// Exercise Types
// ============================================================================

/// Identifier of the synthetic descriptor used when a workout has no exercises
pub const PLACEHOLDER_EXERCISE_ID: &str = "rest_recovery";

/// A single exercise in a workout, read-only to the engine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseDescriptor {
    pub id: String,
    pub title: String,
    /// Target reps or duration, e.g. "12 reps" or "45 sec"
    pub target: String,
    pub instructions: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl ExerciseDescriptor {
    pub fn new(id: &str, title: &str, target: &str, instructions: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            target: target.to_string(),
            instructions: instructions.to_string(),
            image: None,
        }
    }

    /// The rest/recovery exercise substituted for an empty workout
    pub fn placeholder() -> Self {
        Self::new(
            PLACEHOLDER_EXERCISE_ID,
            "Rest & Recovery",
            "Full interval",
            "Breathe slowly and walk in place. Suitable for all levels.",
        )
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_EXERCISE_ID
    }
}

// ============================================================================
// Phase and State Types
// ============================================================================

/// Phase of an interval session
///
/// `Complete`, `Saved` and `SaveFailed` are terminal. `Saved` and
/// `SaveFailed` record that the feedback hand-off has been consumed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    Rest,
    Complete,
    Saved,
    SaveFailed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Complete | Phase::Saved | Phase::SaveFailed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "WORK",
            Phase::Rest => "REST",
            Phase::Complete => "COMPLETE",
            Phase::Saved => "SAVED",
            Phase::SaveFailed => "SAVE FAILED",
        }
    }
}

/// Simulated heart rate in beats per minute
///
/// All-zero means no sample has been taken yet.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct HeartRate {
    pub current: f64,
    pub max: f64,
    pub avg: f64,
}

/// Mutable state of one session, owned by the engine
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub cursor: usize,
    pub phase: Phase,
    pub remaining: u32,
    pub running: bool,
    pub elapsed_active: u32,
    pub calories_burned: f64,
    pub heart_rate: HeartRate,
    pub intensity: u8,
}

impl SessionState {
    /// Initial state: first exercise, WORK phase, paused
    pub fn initial(work_secs: u32, intensity: u8) -> Self {
        Self {
            cursor: 0,
            phase: Phase::Work,
            remaining: work_secs,
            running: false,
            elapsed_active: 0,
            calories_burned: 0.0,
            heart_rate: HeartRate::default(),
            intensity,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }
}

/// Final aggregate stats captured at the moment a session completes
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub session_key: String,
    pub exercise_id: String,
    pub exercise_title: String,
    /// Exercises whose WORK interval ran out; skipped ones are not counted
    pub exercises_completed: usize,
    pub total_duration_secs: u32,
    pub calories_burned: f64,
    pub heart_rate: HeartRate,
}

// ============================================================================
// Result Type
// ============================================================================

/// The record handed to the persistence gateway once per session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionResult {
    pub id: Uuid,
    pub session_key: String,
    pub exercise_id: String,
    pub exercise_title: String,
    pub exercises_completed: usize,
    pub total_duration_secs: u32,
    pub calories_burned: u32,
    pub avg_hr: Option<u8>,
    pub max_hr: Option<u8>,
    pub difficulty: Difficulty,
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
}
