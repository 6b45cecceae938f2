//! FuzzyAxis - the sets defined over one physical quantity

use cartpole_common::FuzzyError;
use serde::Serialize;

use crate::set::FuzzySet;

/// Named collection of possibly overlapping sets over one scalar domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyAxis {
    name: String,
    sets: Vec<FuzzySet>,
}

impl FuzzyAxis {
    /// Build an axis; set names must be unique within it
    pub fn new(name: impl Into<String>, sets: Vec<FuzzySet>) -> Result<Self, FuzzyError> {
        let name = name.into();
        for (i, set) in sets.iter().enumerate() {
            if sets[..i].iter().any(|s| s.name() == set.name()) {
                return Err(FuzzyError::DuplicateSet {
                    axis: name,
                    set: set.name().to_string(),
                });
            }
        }
        Ok(Self { name, sets })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sets(&self) -> &[FuzzySet] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Position of the set called `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.sets.iter().position(|s| s.name() == name)
    }

    /// Like [`index_of`](Self::index_of) but reports the miss as an error
    pub fn require(&self, name: &str) -> Result<usize, FuzzyError> {
        self.index_of(name).ok_or_else(|| FuzzyError::UnknownSet {
            axis: self.name.clone(),
            set: name.to_string(),
        })
    }

    /// Degree of a single set, without building the full reading
    #[inline]
    pub fn degree(&self, index: usize, value: f64) -> f64 {
        self.sets.get(index).map_or(0.0, |s| s.evaluate(value))
    }

    /// Evaluate every set at `value`
    pub fn evaluate(&self, value: f64) -> Memberships<'_> {
        Memberships {
            axis: &self.name,
            degrees: self
                .sets
                .iter()
                .map(|s| (s.name(), s.evaluate(value)))
                .collect(),
        }
    }
}

/// Set name to degree mapping produced by [`FuzzyAxis::evaluate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Memberships<'a> {
    axis: &'a str,
    degrees: Vec<(&'a str, f64)>,
}

impl<'a> Memberships<'a> {
    /// Name of the axis that produced this reading
    pub fn axis(&self) -> &'a str {
        self.axis
    }

    pub fn get(&self, set: &str) -> Option<f64> {
        self.degrees
            .iter()
            .find(|(name, _)| *name == set)
            .map(|(_, degree)| *degree)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + '_ {
        self.degrees.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }
}
