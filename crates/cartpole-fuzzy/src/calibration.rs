//! Calibration data for the fixed cart-pole controller
//!
//! Set names and rules are fixed; only breakpoints and the two extreme forces
//! may be tuned. Each set is given as `[left_start, left_end, right_start, right_end]`
//! with `±inf` for one-sided plateaus.
//!
//! Sign conventions: a positive angle leans the pendulum to the left, a
//! positive angular velocity rotates it further left, and a negative force
//! pushes the cart left.

use cartpole_common::{FuzzyError, MAX_PUSH_LEFT_FORCE, MAX_PUSH_RIGHT_FORCE};
use serde::{Deserialize, Serialize};

use crate::axis::FuzzyAxis;
use crate::defuzz::Defuzzifier;
use crate::rules::{AxisKind, Premise, Push, RuleBase, RuleSpec};
use crate::set::FuzzySet;

pub const ANGLE_AXIS: &str = "pendulum_angle";
pub const ROTATION_AXIS: &str = "angular_velocity";
pub const POSITION_AXIS: &str = "cart_position";

pub const TILTED_LEFT: &str = "tilted_left";
pub const TILTED_RIGHT: &str = "tilted_right";
pub const CENTERED: &str = "centered";
pub const ROTATING_LEFT: &str = "rotating_left";
pub const ROTATING_RIGHT: &str = "rotating_right";
pub const CART_ON_LEFT: &str = "cart_on_left";
pub const CART_ON_RIGHT: &str = "cart_on_right";

const INF: f64 = f64::INFINITY;

/// Breakpoints of every set on the three axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesCalibration {
    pub tilted_left: [f64; 4],
    pub tilted_right: [f64; 4],
    pub centered: [f64; 4],
    pub rotating_left: [f64; 4],
    pub rotating_right: [f64; 4],
    pub cart_on_left: [f64; 4],
    pub cart_on_right: [f64; 4],
}

impl Default for AxesCalibration {
    fn default() -> Self {
        Self {
            tilted_left: [-0.005, 0.39, INF, INF],
            tilted_right: [-INF, -INF, -0.39, 0.005],
            centered: [-0.54, -0.19, 0.19, 0.54],
            rotating_left: [-0.006, 0.10, INF, INF],
            rotating_right: [-INF, -INF, -0.10, 0.006],
            // Position rules only engage far from the center of the rail
            cart_on_left: [-INF, -INF, -470.0, -55.0],
            cart_on_right: [55.0, 470.0, INF, INF],
        }
    }
}

impl AxesCalibration {
    pub fn angle_axis(&self) -> Result<FuzzyAxis, FuzzyError> {
        FuzzyAxis::new(
            ANGLE_AXIS,
            vec![
                FuzzySet::new(TILTED_LEFT, self.tilted_left)?,
                FuzzySet::new(TILTED_RIGHT, self.tilted_right)?,
                FuzzySet::new(CENTERED, self.centered)?,
            ],
        )
    }

    pub fn rotation_axis(&self) -> Result<FuzzyAxis, FuzzyError> {
        FuzzyAxis::new(
            ROTATION_AXIS,
            vec![
                FuzzySet::new(ROTATING_LEFT, self.rotating_left)?,
                FuzzySet::new(ROTATING_RIGHT, self.rotating_right)?,
            ],
        )
    }

    pub fn position_axis(&self) -> Result<FuzzyAxis, FuzzyError> {
        FuzzyAxis::new(
            POSITION_AXIS,
            vec![
                FuzzySet::new(CART_ON_LEFT, self.cart_on_left)?,
                FuzzySet::new(CART_ON_RIGHT, self.cart_on_right)?,
            ],
        )
    }
}

/// Everything needed to build a [`FuzzyController`](crate::FuzzyController)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerCalibration {
    pub push_left_force: f64,
    pub push_right_force: f64,
    pub axes: AxesCalibration,
}

impl Default for ControllerCalibration {
    fn default() -> Self {
        Self {
            push_left_force: MAX_PUSH_LEFT_FORCE,
            push_right_force: MAX_PUSH_RIGHT_FORCE,
            axes: AxesCalibration::default(),
        }
    }
}

impl ControllerCalibration {
    pub fn defuzzifier(&self) -> Defuzzifier {
        Defuzzifier::new(self.push_left_force, self.push_right_force)
    }

    /// Build the axes and resolve the fixed rules against them
    pub fn rule_base(&self) -> Result<RuleBase, FuzzyError> {
        RuleBase::new(
            self.axes.angle_axis()?,
            self.axes.rotation_axis()?,
            self.axes.position_axis()?,
            standard_rules(),
        )
    }
}

/// The four cart-pole rules
///
/// | rule | premise | output |
/// |---|---|---|
/// | A | tilted left AND rotating left | push left |
/// | B | tilted right AND rotating right | push right |
/// | C | centered AND cart on left | push right |
/// | D | centered AND cart on right AND NOT (rotating left OR rotating right) | push left |
pub fn standard_rules() -> Vec<RuleSpec> {
    use AxisKind::{Angle, Position, Rotation};

    vec![
        RuleSpec::new(
            "falling_left",
            Premise::All(vec![
                Premise::is(Angle, TILTED_LEFT),
                Premise::is(Rotation, ROTATING_LEFT),
            ]),
            Push::Left,
        ),
        RuleSpec::new(
            "falling_right",
            Premise::All(vec![
                Premise::is(Angle, TILTED_RIGHT),
                Premise::is(Rotation, ROTATING_RIGHT),
            ]),
            Push::Right,
        ),
        RuleSpec::new(
            "recenter_from_left",
            Premise::All(vec![
                Premise::is(Angle, CENTERED),
                Premise::is(Position, CART_ON_LEFT),
            ]),
            Push::Right,
        ),
        RuleSpec::new(
            "recenter_from_right",
            Premise::All(vec![
                Premise::is(Angle, CENTERED),
                Premise::is(Position, CART_ON_RIGHT),
                Premise::not(Premise::Any(vec![
                    Premise::is(Rotation, ROTATING_LEFT),
                    Premise::is(Rotation, ROTATING_RIGHT),
                ])),
            ]),
            Push::Left,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_calibration_builds() {
        let base = ControllerCalibration::default().rule_base().unwrap();
        assert_eq!(base.rules().len(), 4);
        assert_eq!(base.axis(AxisKind::Angle).len(), 3);
        assert_eq!(base.axis(AxisKind::Rotation).len(), 2);
        assert_eq!(base.axis(AxisKind::Position).name(), POSITION_AXIS);
    }

    #[test]
    fn test_sets_are_mirrored() {
        let axes = AxesCalibration::default();
        let mirror = |bp: [f64; 4]| [-bp[3], -bp[2], -bp[1], -bp[0]];
        assert_eq!(mirror(axes.tilted_left), axes.tilted_right);
        assert_eq!(mirror(axes.rotating_left), axes.rotating_right);
        assert_eq!(mirror(axes.cart_on_left), axes.cart_on_right);
        assert_eq!(mirror(axes.centered), axes.centered);
    }

    #[test]
    fn test_bad_breakpoints_surface_at_construction() {
        let mut calibration = ControllerCalibration::default();
        calibration.axes.centered = [0.5, 0.1, 0.2, 0.6];
        let err = calibration.rule_base().unwrap_err();
        match err {
            FuzzyError::InvalidBreakpoints { set, .. } => assert_eq!(set, CENTERED),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_partial_calibration_uses_defaults() {
        let calibration: ControllerCalibration =
            serde_json::from_str(r#"{"push_left_force": -300.0, "push_right_force": 300.0}"#)
                .unwrap();
        assert_eq!(calibration.axes, AxesCalibration::default());
        assert_eq!(calibration.defuzzifier().force(1.0, 0.0), -300.0);
    }
}
