//! FuzzySet - trapezoidal membership function
//!
//! ```text
//!                 left_end      right_start
//!        1 ─ ─ ─ ─ ┌─────────────┐
//!                 /               \
//!                /                 \
//!        0 ─────┘                   └──────
//!          left_start               right_end
//! ```
//!
//! `left_end == right_start` gives a triangle. A `-∞` left_start or a `+∞`
//! right_end turns the corresponding slope into a plateau, so the set stays at
//! 1 all the way out to that side.

use cartpole_common::FuzzyError;
use serde::{Deserialize, Serialize};

/// First degree polynomial `y = gradient * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slope {
    pub gradient: f64,
    pub intercept: f64,
}

impl Slope {
    /// Horizontal line at `value`
    pub const fn constant(value: f64) -> Self {
        Self {
            gradient: 0.0,
            intercept: value,
        }
    }

    /// Line through `(x0, y0)` and `(x1, y1)`; a zero or infinite span degenerates to a plateau at 1
    fn through(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let span = x1 - x0;
        if !span.is_finite() || span <= 0.0 {
            return Self::constant(1.0);
        }
        let gradient = (y1 - y0) / span;
        Self {
            gradient,
            intercept: y0 - gradient * x0,
        }
    }

    #[inline]
    pub fn at(&self, x: f64) -> f64 {
        self.gradient * x + self.intercept
    }
}

/// One named characteristic on a fuzzy axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzySet {
    name: String,
    left_start: f64,
    left_end: f64,
    right_start: f64,
    right_end: f64,
    rising: Slope,
    falling: Slope,
}

impl FuzzySet {
    /// Build a trapezoid from `[left_start, left_end, right_start, right_end]`
    ///
    /// Breakpoints must be non-decreasing and not NaN.
    pub fn new(name: impl Into<String>, breakpoints: [f64; 4]) -> Result<Self, FuzzyError> {
        let name = name.into();
        let [left_start, left_end, right_start, right_end] = breakpoints;

        let ordered = breakpoints.iter().all(|b| !b.is_nan())
            && left_start <= left_end
            && left_end <= right_start
            && right_start <= right_end;
        if !ordered {
            return Err(FuzzyError::InvalidBreakpoints {
                set: name,
                left_start,
                left_end,
                right_start,
                right_end,
            });
        }

        Ok(Self {
            rising: Slope::through(left_start, 0.0, left_end, 1.0),
            falling: Slope::through(right_start, 1.0, right_end, 0.0),
            name,
            left_start,
            left_end,
            right_start,
            right_end,
        })
    }

    pub fn trapezoid(
        name: impl Into<String>,
        left_start: f64,
        left_end: f64,
        right_start: f64,
        right_end: f64,
    ) -> Result<Self, FuzzyError> {
        Self::new(name, [left_start, left_end, right_start, right_end])
    }

    /// Peak at `peak`, no flat top
    pub fn triangle(
        name: impl Into<String>,
        start: f64,
        peak: f64,
        end: f64,
    ) -> Result<Self, FuzzyError> {
        Self::new(name, [start, peak, peak, end])
    }

    /// 1 for everything below `right_start`, falling to 0 at `right_end`
    pub fn left_shoulder(
        name: impl Into<String>,
        right_start: f64,
        right_end: f64,
    ) -> Result<Self, FuzzyError> {
        Self::new(
            name,
            [f64::NEG_INFINITY, f64::NEG_INFINITY, right_start, right_end],
        )
    }

    /// Rising from 0 at `left_start` to 1 at `left_end`, then 1 for everything above
    pub fn right_shoulder(
        name: impl Into<String>,
        left_start: f64,
        left_end: f64,
    ) -> Result<Self, FuzzyError> {
        Self::new(name, [left_start, left_end, f64::INFINITY, f64::INFINITY])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn breakpoints(&self) -> [f64; 4] {
        [
            self.left_start,
            self.left_end,
            self.right_start,
            self.right_end,
        ]
    }

    /// Degree of membership of `x`, always within `[0, 1]`
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        if x <= self.left_start || x >= self.right_end {
            return 0.0;
        }
        if x >= self.left_end && x <= self.right_start {
            return 1.0;
        }
        let degree = if x < self.left_end {
            self.rising.at(x)
        } else {
            self.falling.at(x)
        };
        // NaN input lands here and is mapped to 0 by `max`
        degree.max(0.0).min(1.0)
    }
}
