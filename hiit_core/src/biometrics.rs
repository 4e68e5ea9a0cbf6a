//! Simulated biometric feedback.
//!
//! Heart rate follows a bounded random walk, symmetric around zero, whose
//! swing scales with intensity and the exercise slot; calories accrue at a per-second rate that varies a little
//! with the exercise slot. Randomness comes from an injected [`RandomSource`].

use crate::types::HeartRate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const RESTING_HR: f64 = 70.0;
pub const MAX_HR: f64 = 180.0;

/// Largest random swing per tick at intensity 50, in bpm
const HR_STEP_BPM: f64 = 3.0;
const HR_EMA_WEIGHT: f64 = 0.05;
const BASELINE_INTENSITY: f64 = 50.0;

/// Source of signed unit perturbations
pub trait RandomSource {
    /// A value in `[-1.0, 1.0]`
    fn next_unit(&mut self) -> f64;
}

/// Adapter turning any `rand` generator into a [`RandomSource`]
pub struct RngSource<R: Rng>(R);

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen_range(-1.0..=1.0)
    }
}

fn intensity_scale(intensity: u8) -> f64 {
    f64::from(intensity) / BASELINE_INTENSITY
}

/// Swing multiplier, cycling with the exercise slot
fn slot_swing(slot: usize) -> f64 {
    1.0 + 0.25 * (slot % 3) as f64
}

/// Calories per active second at baseline intensity
pub fn base_rate_per_second(slot: usize) -> f64 {
    const RATES: [f64; 4] = [0.12, 0.14, 0.13, 0.15];
    RATES[slot % RATES.len()]
}

/// Next heart rate sample
///
/// `current` moves by a small intensity-scaled step and is clamped to
/// `[RESTING_HR, MAX_HR]`. `max` only ever rises; `avg` is an exponential
/// moving average seeded by the first sample.
pub fn sample(
    prev: &HeartRate,
    intensity: u8,
    slot: usize,
    rng: &mut dyn RandomSource,
) -> HeartRate {
    let base = if prev.current <= 0.0 {
        RESTING_HR
    } else {
        prev.current
    };

    let step = rng.next_unit().clamp(-1.0, 1.0)
        * HR_STEP_BPM
        * slot_swing(slot)
        * intensity_scale(intensity);
    let next = (base + step).clamp(RESTING_HR, MAX_HR);

    let avg = if prev.avg <= 0.0 {
        next
    } else {
        prev.avg * (1.0 - HR_EMA_WEIGHT) + next * HR_EMA_WEIGHT
    };

    HeartRate {
        current: next,
        max: prev.max.max(next),
        avg,
    }
}

/// Calories burned during one active tick
pub fn calories_per_tick(intensity: u8, slot: usize) -> f64 {
    base_rate_per_second(slot) * intensity_scale(intensity)
}
