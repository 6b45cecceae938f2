//! RuleBase - fixed Mamdani rules over the angle, angular velocity, and position axes
//!
//! Each rule is a premise tree of AND/OR/NOT over set memberships and a
//! consequence ("push left" or "push right"). Activations of rules sharing a
//! consequence are aggregated with OR.

use cartpole_common::FuzzyError;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::axis::{FuzzyAxis, Memberships};
use crate::ops::{fuzzy_and, fuzzy_not, fuzzy_or};

/// The three fixed inputs of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    /// Pendulum angle (theta)
    Angle,
    /// Pendulum angular velocity (dtheta)
    Rotation,
    /// Cart position (x)
    Position,
}

/// Output the rule votes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Push {
    Left,
    Right,
}

/// Reference to a set by name, before it is resolved against the axes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRef {
    pub axis: AxisKind,
    pub set: String,
}

/// Resolved reference: axis, position of the set on it, and its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub axis: AxisKind,
    pub index: usize,
    pub set: String,
}

/// Premise tree over leaves of type `T`
#[derive(Debug, Clone, PartialEq)]
pub enum Premise<T> {
    Is(T),
    Not(Box<Premise<T>>),
    All(Vec<Premise<T>>),
    Any(Vec<Premise<T>>),
}

impl Premise<SetRef> {
    pub fn is(axis: AxisKind, set: impl Into<String>) -> Self {
        Premise::Is(SetRef {
            axis,
            set: set.into(),
        })
    }
}

impl<T> Premise<T> {
    #[allow(clippy::should_implement_trait)]
    pub fn not(premise: Premise<T>) -> Self {
        Premise::Not(Box::new(premise))
    }

    /// Degree of truth, with `leaf` supplying the membership of each leaf
    pub fn degree<F>(&self, leaf: &F) -> f64
    where
        F: Fn(&T) -> f64,
    {
        match self {
            Premise::Is(t) => leaf(t),
            Premise::Not(p) => fuzzy_not(p.degree(leaf)),
            Premise::All(ps) => fuzzy_and(ps.iter().map(|p| p.degree(leaf))),
            Premise::Any(ps) => fuzzy_or(ps.iter().map(|p| p.degree(leaf))),
        }
    }

    fn try_map<U, E, F>(self, f: &F) -> Result<Premise<U>, E>
    where
        F: Fn(T) -> Result<U, E>,
    {
        Ok(match self {
            Premise::Is(t) => Premise::Is(f(t)?),
            Premise::Not(p) => Premise::Not(Box::new((*p).try_map(f)?)),
            Premise::All(ps) => Premise::All(
                ps.into_iter()
                    .map(|p| p.try_map(f))
                    .collect::<Result<_, _>>()?,
            ),
            Premise::Any(ps) => Premise::Any(
                ps.into_iter()
                    .map(|p| p.try_map(f))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    fn leaves<'a>(&'a self, out: &mut Vec<&'a T>) {
        match self {
            Premise::Is(t) => out.push(t),
            Premise::Not(p) => p.leaves(out),
            Premise::All(ps) | Premise::Any(ps) => ps.iter().for_each(|p| p.leaves(out)),
        }
    }
}

/// A rule before its set names are resolved
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSpec {
    pub name: String,
    pub premise: Premise<SetRef>,
    pub consequence: Push,
}

impl RuleSpec {
    pub fn new(name: impl Into<String>, premise: Premise<SetRef>, consequence: Push) -> Self {
        Self {
            name: name.into(),
            premise,
            consequence,
        }
    }
}

/// A resolved rule
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    name: String,
    premise: Premise<Term>,
    consequence: Push,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn consequence(&self) -> Push {
        self.consequence
    }

    pub fn premise(&self) -> &Premise<Term> {
        &self.premise
    }
}

/// Aggregated output degrees of the rule base
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    pub push_left: f64,
    pub push_right: f64,
}

/// Fixed rule set together with the axes it reads
#[derive(Debug, Clone)]
pub struct RuleBase {
    angle: FuzzyAxis,
    rotation: FuzzyAxis,
    position: FuzzyAxis,
    rules: Vec<Rule>,
}

impl RuleBase {
    /// Resolve every rule's set names against the axes
    pub fn new(
        angle: FuzzyAxis,
        rotation: FuzzyAxis,
        position: FuzzyAxis,
        specs: Vec<RuleSpec>,
    ) -> Result<Self, FuzzyError> {
        let mut base = Self {
            angle,
            rotation,
            position,
            rules: Vec::with_capacity(specs.len()),
        };
        for spec in specs {
            let premise = spec.premise.try_map(&|r: SetRef| -> Result<Term, FuzzyError> {
                let index = base.axis(r.axis).require(&r.set)?;
                Ok(Term {
                    axis: r.axis,
                    index,
                    set: r.set,
                })
            })?;
            base.rules.push(Rule {
                name: spec.name,
                premise,
                consequence: spec.consequence,
            });
        }
        Ok(base)
    }

    pub fn axis(&self, kind: AxisKind) -> &FuzzyAxis {
        match kind {
            AxisKind::Angle => &self.angle,
            AxisKind::Rotation => &self.rotation,
            AxisKind::Position => &self.position,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate all rules for one plant reading
    ///
    /// Cart velocity is accepted for signature symmetry with the plant state
    /// but no rule reads it.
    pub fn evaluate(&self, x: f64, theta: f64, _dx: f64, dtheta: f64) -> Activation {
        let leaf = |t: &Term| {
            let value = match t.axis {
                AxisKind::Angle => theta,
                AxisKind::Rotation => dtheta,
                AxisKind::Position => x,
            };
            self.axis(t.axis).degree(t.index, value)
        };
        let activation = self.aggregate(&leaf);
        trace!(
            x,
            theta,
            dtheta,
            push_left = activation.push_left,
            push_right = activation.push_right,
            "rules evaluated"
        );
        activation
    }

    /// Evaluate all rules against precomputed axis readings, in any order
    pub fn apply(&self, readings: &[Memberships<'_>]) -> Result<Activation, FuzzyError> {
        let reading_for = |kind: AxisKind| {
            let name = self.axis(kind).name();
            readings.iter().find(|r| r.axis() == name)
        };

        let mut leaves = Vec::new();
        for rule in &self.rules {
            rule.premise.leaves(&mut leaves);
        }
        for term in leaves {
            let reading = reading_for(term.axis).ok_or_else(|| FuzzyError::MissingReading {
                axis: self.axis(term.axis).name().to_string(),
            })?;
            if reading.get(&term.set).is_none() {
                return Err(FuzzyError::UnknownSet {
                    axis: reading.axis().to_string(),
                    set: term.set.clone(),
                });
            }
        }

        let leaf = |t: &Term| {
            reading_for(t.axis)
                .and_then(|r| r.get(&t.set))
                .unwrap_or(0.0)
        };
        Ok(self.aggregate(&leaf))
    }

    fn aggregate<F>(&self, leaf: &F) -> Activation
    where
        F: Fn(&Term) -> f64,
    {
        let mut activation = Activation::default();
        for rule in &self.rules {
            let degree = rule.premise.degree(leaf);
            match rule.consequence {
                Push::Left => activation.push_left = fuzzy_or([activation.push_left, degree]),
                Push::Right => activation.push_right = fuzzy_or([activation.push_right, degree]),
            }
        }
        activation
    }
}
