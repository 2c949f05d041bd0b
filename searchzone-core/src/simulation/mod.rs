//! Stochastic pedestrian movement over the road network
//!
//! A single walk is a pure function of the graph, its parameters and a
//! random stream. Populations of walks are aggregated into a frequency
//! distribution over terminal nodes.

mod golden_time;
mod monte_carlo;
mod walk;

pub use golden_time::{GoldenTimeConfig, estimate_golden_time};
pub use monte_carlo::{FrequencyDistribution, TrialBudget, run_monte_carlo};
pub use walk::simulate_walk;

use crate::model::{Demographics, Preference, TransitionWeights};
use crate::{Error, STALL_PROBABILITY, STEP_SECONDS};

/// Parameters of one simulated walk
#[derive(Debug, Clone, PartialEq)]
pub struct WalkParameters {
    /// Walking speed relative to an average adult
    pub speed_multiplier: f64,
    /// Elapsed time in minutes
    pub minutes: u32,
    /// Duration of one step in seconds
    pub step_seconds: u32,
    /// Probability of staying in place during a step
    pub stall_probability: f64,
    /// Road-class preference of the walker
    pub weights: TransitionWeights,
}

impl WalkParameters {
    pub fn new(speed_multiplier: f64, minutes: u32, weights: TransitionWeights) -> Self {
        Self {
            speed_multiplier,
            minutes,
            step_seconds: STEP_SECONDS,
            stall_probability: STALL_PROBABILITY,
            weights,
        }
    }

    pub fn from_profile(demographics: &Demographics, preference: Preference, minutes: u32) -> Self {
        Self::new(
            demographics.speed_multiplier(),
            minutes,
            preference.weights(),
        )
    }

    #[must_use]
    pub fn with_minutes(&self, minutes: u32) -> Self {
        Self {
            minutes,
            ..self.clone()
        }
    }

    /// Number of discrete steps the walk lasts
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn total_steps(&self) -> u64 {
        let adjusted_minutes = f64::from(self.minutes) * self.speed_multiplier;
        (adjusted_minutes * 60.0 / f64::from(self.step_seconds)).floor() as u64
    }

    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` for non-positive speed or step
    /// duration and stall probabilities outside `[0, 1]`
    pub fn validate(&self) -> Result<(), Error> {
        if !self.speed_multiplier.is_finite() || self.speed_multiplier <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "Speed multiplier must be positive, got {}",
                self.speed_multiplier
            )));
        }
        if self.step_seconds == 0 {
            return Err(Error::InvalidParameter(
                "Step duration must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.stall_probability) {
            return Err(Error::InvalidParameter(format!(
                "Stall probability must be within [0, 1], got {}",
                self.stall_probability
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgeGroup, Gender};

    #[test]
    fn total_steps_scale_with_speed() {
        let params = WalkParameters::new(1.0, 10, TransitionWeights::default());
        assert_eq!(params.total_steps(), 20);

        let fast = Demographics {
            gender: Gender::Male,
            age_group: AgeGroup::Adult,
        };
        let params = WalkParameters::from_profile(&fast, Preference::Road, 10);
        assert_eq!(params.total_steps(), 24);

        assert_eq!(params.with_minutes(0).total_steps(), 0);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut params = WalkParameters::new(1.0, 10, TransitionWeights::default());
        assert!(params.validate().is_ok());
        params.stall_probability = 1.5;
        assert!(params.validate().is_err());
        params.stall_probability = 0.5;
        params.speed_multiplier = 0.0;
        assert!(params.validate().is_err());
    }
}
