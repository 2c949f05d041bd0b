//! Walker profile: demographic speed and road preference

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::streets::RoadClass;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Child,
    Teen,
    #[default]
    Adult,
    Senior,
}

/// Demographic category of the missing person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub gender: Gender,
    #[serde(default)]
    pub age_group: AgeGroup,
}

impl Demographics {
    /// Walking speed relative to an average adult
    pub fn speed_multiplier(&self) -> f64 {
        let mut speed = 1.0;
        if self.gender == Gender::Male {
            speed += 0.2;
        }
        match self.age_group {
            AgeGroup::Teen => speed += 0.2,
            AgeGroup::Child => speed -= 0.2,
            AgeGroup::Senior => speed -= 0.3,
            AgeGroup::Adult => {}
        }
        speed
    }
}

/// Terrain the walker tends to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    #[default]
    Road,
    Nature,
}

impl Preference {
    pub fn weights(self) -> TransitionWeights {
        match self {
            Self::Road => TransitionWeights::road_preferring(),
            Self::Nature => TransitionWeights::nature_preferring(),
        }
    }
}

/// Relative attractiveness of each road class for the next step.
///
/// Classes missing from the table weigh 1.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionWeights {
    weights: HashMap<RoadClass, f64>,
}

impl TransitionWeights {
    pub fn road_preferring() -> Self {
        Self::preset([
            (RoadClass::Residential, 5.0),
            (RoadClass::Footway, 3.0),
            (RoadClass::Path, 1.0),
            (RoadClass::Service, 2.0),
        ])
    }

    pub fn nature_preferring() -> Self {
        Self::preset([
            (RoadClass::Residential, 2.0),
            (RoadClass::Footway, 3.0),
            (RoadClass::Path, 5.0),
            (RoadClass::Service, 2.0),
        ])
    }

    fn preset(entries: [(RoadClass, f64); 4]) -> Self {
        Self {
            weights: entries.into_iter().collect(),
        }
    }

    /// Custom weight table.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if any weight is not a positive
    /// finite number.
    pub fn custom(entries: impl IntoIterator<Item = (RoadClass, f64)>) -> Result<Self, Error> {
        let mut weights = HashMap::new();
        for (class, weight) in entries {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(Error::InvalidParameter(format!(
                    "Weight for road class '{class}' must be positive, got {weight}"
                )));
            }
            weights.insert(class, weight);
        }
        Ok(Self { weights })
    }

    pub fn weight(&self, class: &RoadClass) -> f64 {
        self.weights.get(class).copied().unwrap_or(1.0)
    }
}

impl Default for TransitionWeights {
    fn default() -> Self {
        Self::road_preferring()
    }
}
