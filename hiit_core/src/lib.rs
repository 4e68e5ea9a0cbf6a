#![forbid(unsafe_code)]

//! Core domain model and session engine for hiit.
//!
//! This crate provides:
//! - Domain types (exercises, phases, session state, results)
//! - Exercise catalog accessor
//! - Biometric simulation
//! - Phase clock and the interval session engine
//! - Feedback capture and result persistence
//! - Configuration and logging

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod biometrics;
pub mod clock;
pub mod narrator;
pub mod feedback;
pub mod wal;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{get_default_catalog, BuiltinCatalog, ExerciseCatalog, WorkoutDefinition};
pub use config::{Config, SessionConfig};
pub use biometrics::{RandomSource, RngSource};
pub use clock::{Clock, ManualClock, TickToken, TICK_INTERVAL};
pub use narrator::{Narrator, RecordingNarrator, SessionEvent, TracingNarrator};
pub use feedback::{Difficulty, Feedback, FeedbackCapture};
pub use wal::{read_results, JsonlSink, ResultSink};
pub use engine::SessionEngine;
