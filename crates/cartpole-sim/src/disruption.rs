//! External force disturbances, consumed one value per tick

use serde::{Deserialize, Serialize};

/// Scalar forces added to the controller output before integration
///
/// A finite sequence yields 0 once it is exhausted. A cyclic sequence wraps
/// around; an empty cyclic sequence behaves like an exhausted finite one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisruptionSequence {
    values: Vec<f64>,
    cyclic: bool,
    #[serde(skip)]
    cursor: usize,
}

impl Default for DisruptionSequence {
    fn default() -> Self {
        Self::none()
    }
}

impl DisruptionSequence {
    pub fn new(values: Vec<f64>, cyclic: bool) -> Self {
        Self {
            values,
            cyclic,
            cursor: 0,
        }
    }

    pub fn finite(values: Vec<f64>) -> Self {
        Self::new(values, false)
    }

    pub fn cyclic(values: Vec<f64>) -> Self {
        Self::new(values, true)
    }

    /// No disturbance at all
    pub fn none() -> Self {
        Self::finite(Vec::new())
    }

    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_exhausted(&self) -> bool {
        !self.cyclic && self.cursor >= self.values.len()
    }

    /// Next force; 0 when nothing is left
    pub fn next_force(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        if self.cyclic {
            let value = self.values[self.cursor];
            self.cursor = (self.cursor + 1) % self.values.len();
            return value;
        }
        match self.values.get(self.cursor) {
            Some(&value) => {
                self.cursor += 1;
                value
            }
            None => 0.0,
        }
    }
}
