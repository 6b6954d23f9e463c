//! Observation and action spaces.

use serde::Serialize;

/// A discrete action index in `[0, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Action(pub usize);

pub type Observation = Vec<f64>;

/// Space declared to the controller before the first step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Space {
    /// Bounded continuous box with a fixed shape.
    Box {
        low: f64,
        high: f64,
        shape: Vec<usize>,
        dtype: String,
    },
    Discrete { n: usize },
}

impl Space {
    pub fn boxed(low: f64, high: f64, len: usize) -> Self {
        Space::Box {
            low,
            high,
            shape: vec![len],
            dtype: "float64".to_string(),
        }
    }

    /// Number of scalars in a box, or of actions in a discrete space.
    pub fn size(&self) -> usize {
        match self {
            Space::Box { shape, .. } => shape.iter().product(),
            Space::Discrete { n } => *n,
        }
    }

    pub fn contains_observation(&self, obs: &[f64]) -> bool {
        match self {
            Space::Box { low, high, .. } => {
                obs.len() == self.size() && obs.iter().all(|v| v >= low && v <= high)
            }
            Space::Discrete { .. } => false,
        }
    }

    pub fn contains_action(&self, action: Action) -> bool {
        match self {
            Space::Discrete { n } => action.0 < *n,
            Space::Box { .. } => false,
        }
    }
}
