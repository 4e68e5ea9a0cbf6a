//! Exercise catalog accessor and the built-in workouts.
//!
//! The engine only sees the [`ExerciseCatalog`] trait; this module ships a
//! default implementation backed by a handful of built-in workouts plus any
//! workouts defined in the user's config file.

use crate::types::ExerciseDescriptor;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A named, ordered list of exercises
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutDefinition {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub exercises: Vec<ExerciseDescriptor>,
}

/// Read-only source of exercise sequences
pub trait ExerciseCatalog {
    /// Ordered exercises for the given session key
    fn exercises(&self, session_key: &str) -> Result<Vec<ExerciseDescriptor>>;

    /// All workouts, sorted by key
    fn workouts(&self) -> Vec<&WorkoutDefinition>;
}

/// Catalog holding workouts keyed by session key
#[derive(Clone, Debug, Default)]
pub struct BuiltinCatalog {
    workouts: BTreeMap<String, WorkoutDefinition>,
}

/// Cached default workouts - built once and reused
static DEFAULT_CATALOG: Lazy<BuiltinCatalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static BuiltinCatalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// Prefer `get_default_catalog()` when no custom workouts need merging.
pub fn build_default_catalog() -> BuiltinCatalog {
    build_default_catalog_internal()
}

impl BuiltinCatalog {
    /// Add or replace a workout
    pub fn insert(&mut self, workout: WorkoutDefinition) {
        if self.workouts.contains_key(&workout.key) {
            tracing::info!("Workout {} overridden by custom definition", workout.key);
        }
        self.workouts.insert(workout.key.clone(), workout);
    }

    /// Default catalog extended with custom workouts
    pub fn with_custom(custom: &[WorkoutDefinition]) -> Self {
        let mut catalog = get_default_catalog().clone();
        for workout in custom {
            catalog.insert(workout.clone());
        }
        catalog
    }

    pub fn get(&self, session_key: &str) -> Option<&WorkoutDefinition> {
        self.workouts.get(session_key)
    }

    /// Collect human-readable validation problems
    ///
    /// An empty exercise list is not a problem: the engine substitutes a
    /// placeholder for it.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (key, workout) in &self.workouts {
            if workout.title.trim().is_empty() {
                errors.push(format!("Workout {} has an empty title", key));
            }

            let mut seen = HashSet::new();
            for exercise in &workout.exercises {
                if exercise.id.trim().is_empty() {
                    errors.push(format!("Workout {} has an exercise without an id", key));
                } else if !seen.insert(exercise.id.as_str()) {
                    errors.push(format!(
                        "Workout {} lists exercise {} more than once",
                        key, exercise.id
                    ));
                }
                if exercise.title.trim().is_empty() {
                    errors.push(format!(
                        "Exercise {} in workout {} has an empty title",
                        exercise.id, key
                    ));
                }
            }
        }

        errors
    }
}

impl ExerciseCatalog for BuiltinCatalog {
    fn exercises(&self, session_key: &str) -> Result<Vec<ExerciseDescriptor>> {
        self.get(session_key)
            .map(|w| w.exercises.clone())
            .ok_or_else(|| Error::UnknownWorkout(session_key.to_string()))
    }

    fn workouts(&self) -> Vec<&WorkoutDefinition> {
        self.workouts.values().collect()
    }
}

fn build_default_catalog_internal() -> BuiltinCatalog {
    let mut catalog = BuiltinCatalog::default();

    catalog.insert(WorkoutDefinition {
        key: "full_body_hiit".into(),
        title: "Full Body HIIT".into(),
        exercises: vec![
            ExerciseDescriptor::new(
                "jumping_jacks",
                "Jumping Jacks",
                "45 sec",
                "Jump feet wide while raising arms overhead, then return.",
            ),
            ExerciseDescriptor::new(
                "bodyweight_squat",
                "Bodyweight Squat",
                "15 reps",
                "Sit hips back and down, knees tracking over toes, chest up.",
            ),
            ExerciseDescriptor::new(
                "push_up",
                "Push-up",
                "10 reps",
                "Hands under shoulders, body in a straight line, lower chest to floor.",
            ),
            ExerciseDescriptor::new(
                "mountain_climber",
                "Mountain Climbers",
                "45 sec",
                "From a high plank, drive knees to chest alternately at pace.",
            ),
            ExerciseDescriptor::new(
                "burpee",
                "Burpee",
                "8 reps",
                "Squat, kick back to plank, return and jump with arms overhead.",
            ),
        ],
    });

    catalog.insert(WorkoutDefinition {
        key: "core_blast".into(),
        title: "Core Blast".into(),
        exercises: vec![
            ExerciseDescriptor::new(
                "plank",
                "Forearm Plank",
                "45 sec",
                "Elbows under shoulders, brace the abs, keep hips level.",
            ),
            ExerciseDescriptor::new(
                "bicycle_crunch",
                "Bicycle Crunch",
                "20 reps",
                "Alternate elbow to opposite knee with a slow, controlled twist.",
            ),
            ExerciseDescriptor::new(
                "dead_bug",
                "Dead Bug",
                "12 reps",
                "Lower opposite arm and leg while pressing the low back down.",
            ),
        ],
    });

    catalog.insert(WorkoutDefinition {
        key: "mobility_flow".into(),
        title: "Mobility Flow".into(),
        exercises: vec![
            ExerciseDescriptor::new(
                "hip_cars",
                "Hip CARs",
                "5 per side",
                "Slow controlled circles of the hip through its full range.",
            ),
            ExerciseDescriptor::new(
                "worlds_greatest_stretch",
                "World's Greatest Stretch",
                "4 per side",
                "Lunge, elbow to instep, rotate and reach to the ceiling.",
            ),
        ],
    });

    catalog
}
