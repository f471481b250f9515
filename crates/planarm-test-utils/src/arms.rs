//! Reference arms shared by the solver test suites.

use nalgebra::Point2;
use planarm_core::ArmConfiguration;

/// Link lengths of the three-link gradient-descent reference arm.
pub const THREE_LINK_LENGTHS: [f64; 3] = [1.5, 1.0, 1.0];

/// Starting joint angles of the three-link arm, in degrees.
pub const THREE_LINK_ANGLES_DEG: [f64; 3] = [45.0, 30.0, 0.0];

/// Target the three-link arm is expected to reach.
pub const THREE_LINK_TARGET: [f64; 2] = [2.5, 1.5];

/// Joint positions of the five-joint CCD reference arm, base first.
pub fn five_joint_positions() -> Vec<Point2<f64>> {
    vec![
        Point2::new(0.0, 5.0),
        Point2::new(0.0, 4.0),
        Point2::new(-1.0, 3.0),
        Point2::new(-1.0, 2.0),
        Point2::new(0.0, 1.8),
    ]
}

/// The five-joint reference arm with link lengths taken from its positions.
pub fn five_joint_arm() -> ArmConfiguration {
    match ArmConfiguration::from_joints(five_joint_positions()) {
        Ok(arm) => arm,
        Err(err) => panic!("reference arm is invalid: {err}"),
    }
}
