//! Angle-parameterized planar chain and forward kinematics.
//!
//! An [`AngleChain`] is a fixed base point, a base heading and an ordered
//! list of link lengths. Joint angles are relative: each one rotates its
//! segment against the previous one, so segment `k` points along the
//! cumulative angle `heading + t1 + ... + tk`.

use std::f64::consts::{PI, TAU};

use nalgebra::{Point2, Vector2};

use planarm_core::{ArmConfiguration, ConfigurationError, validate_link_lengths};

/// Compute every joint position, base first, from relative joint angles.
///
/// Angles beyond the number of links (or links beyond the number of angles)
/// are ignored. An empty chain yields just the base, which is then also the
/// end-effector.
pub fn forward_kinematics(
    base: Point2<f64>,
    heading: f64,
    link_lengths: &[f64],
    angles: &[f64],
) -> Vec<Point2<f64>> {
    let mut positions = Vec::with_capacity(link_lengths.len() + 1);
    positions.push(base);

    let mut current = base;
    let mut cumulative = heading;
    for (&length, &angle) in link_lengths.iter().zip(angles) {
        cumulative += angle;
        let (sin, cos) = cumulative.sin_cos();
        current += Vector2::new(cos, sin) * length;
        positions.push(current);
    }
    positions
}

/// Absolute heading of every segment: `heading + t1 + ... + tk`.
pub fn cumulative_angles(heading: f64, angles: &[f64]) -> Vec<f64> {
    angles
        .iter()
        .scan(heading, |sum, &angle| {
            *sum += angle;
            Some(*sum)
        })
        .collect()
}

/// Clamp every angle into `[lower, upper]`.
pub fn clamp_angles(angles: &mut [f64], lower: f64, upper: f64) {
    for angle in angles {
        *angle = angle.clamp(lower, upper);
    }
}

/// Wrap an angle into `(-pi, pi]`.
fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// A planar serial chain described by link lengths and relative angles.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleChain {
    base: Point2<f64>,
    heading: f64,
    link_lengths: Vec<f64>,
}

impl AngleChain {
    /// Build a chain rooted at `base`, pointing along +x when all angles are
    /// zero.
    pub fn new(base: Point2<f64>, link_lengths: Vec<f64>) -> Result<Self, ConfigurationError> {
        if link_lengths.is_empty() {
            return Err(ConfigurationError::TooFewJoints { got: 1 });
        }
        if !(base.x.is_finite() && base.y.is_finite()) {
            return Err(ConfigurationError::NonFiniteJoint { index: 0 });
        }
        validate_link_lengths(&link_lengths)?;
        Ok(Self {
            base,
            heading: 0.0,
            link_lengths,
        })
    }

    /// Set the base heading (radians) that all-zero angles point along.
    #[must_use]
    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = heading;
        self
    }

    /// Recover an angle chain from an existing arm.
    ///
    /// The base heading is the direction of the first segment, so the first
    /// angle is zero and every later angle is the bend relative to the
    /// previous segment, wrapped into `(-pi, pi]`. Link lengths are taken
    /// from the arm, so forward kinematics reproduces its positions whenever
    /// the arm honours its own lengths.
    pub fn from_configuration(arm: &ArmConfiguration) -> (Self, Vec<f64>) {
        let directions: Vec<f64> = arm
            .joints()
            .windows(2)
            .map(|pair| {
                let segment = pair[1] - pair[0];
                segment.y.atan2(segment.x)
            })
            .collect();
        let heading = directions.first().copied().unwrap_or(0.0);

        let mut angles = Vec::with_capacity(directions.len());
        let mut previous = heading;
        for &absolute in &directions {
            angles.push(wrap_angle(absolute - previous));
            previous = absolute;
        }

        let chain = Self {
            base: arm.base(),
            heading,
            link_lengths: arm.link_lengths().to_vec(),
        };
        (chain, angles)
    }

    /// Absolute direction of every segment for `angles`, wrapped into
    /// `(-pi, pi]`.
    pub fn segment_directions(&self, angles: &[f64]) -> Vec<f64> {
        cumulative_angles(self.heading, angles)
            .into_iter()
            .map(wrap_angle)
            .collect()
    }

    /// Recover an angle chain from joint positions, deriving link lengths
    /// from the distances between consecutive joints.
    pub fn from_positions(
        joints: &[Point2<f64>],
    ) -> Result<(Self, Vec<f64>), ConfigurationError> {
        let arm = ArmConfiguration::from_joints(joints.to_vec())?;
        Ok(Self::from_configuration(&arm))
    }

    /// Number of controllable joints (one per link).
    pub fn dof(&self) -> usize {
        self.link_lengths.len()
    }

    pub fn base(&self) -> Point2<f64> {
        self.base
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn link_lengths(&self) -> &[f64] {
        &self.link_lengths
    }

    /// Maximum reach: the sum of all link lengths.
    pub fn reach(&self) -> f64 {
        self.link_lengths.iter().sum()
    }

    /// Check that `angles` has one finite entry per link.
    pub fn check_angles(&self, angles: &[f64]) -> Result<(), ConfigurationError> {
        if angles.len() != self.dof() {
            return Err(ConfigurationError::AngleCountMismatch {
                expected: self.dof(),
                got: angles.len(),
            });
        }
        if let Some(index) = angles.iter().position(|a| !a.is_finite()) {
            return Err(ConfigurationError::NonFiniteAngle { index });
        }
        Ok(())
    }

    /// All joint positions for `angles`, base first.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `angles.len() != self.dof()`.
    pub fn forward_kinematics(&self, angles: &[f64]) -> Vec<Point2<f64>> {
        debug_assert_eq!(angles.len(), self.dof(), "angles.len() must equal chain DOF");
        forward_kinematics(self.base, self.heading, &self.link_lengths, angles)
    }

    /// End-effector position for `angles`.
    pub fn end_effector(&self, angles: &[f64]) -> Point2<f64> {
        let mut current = self.base;
        for (&length, &heading) in self
            .link_lengths
            .iter()
            .zip(cumulative_angles(self.heading, angles).iter())
        {
            let (sin, cos) = heading.sin_cos();
            current += Vector2::new(cos, sin) * length;
        }
        current
    }

    /// Arm configuration for `angles`, carrying this chain's link lengths.
    pub fn to_configuration(&self, angles: &[f64]) -> Result<ArmConfiguration, ConfigurationError> {
        self.check_angles(angles)?;
        ArmConfiguration::with_link_lengths(
            self.forward_kinematics(angles),
            self.link_lengths.clone(),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn three_link() -> AngleChain {
        AngleChain::new(Point2::origin(), vec![1.5, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn fk_zero_angles_is_straight_line() {
        let chain = three_link();
        let positions = chain.forward_kinematics(&[0.0, 0.0, 0.0]);
        assert_eq!(positions.len(), 4);
        assert_relative_eq!(positions[1].x, 1.5, epsilon = 1e-12);
        assert_relative_eq!(positions[2].x, 2.5, epsilon = 1e-12);
        assert_relative_eq!(positions[3].x, 3.5, epsilon = 1e-12);
        for p in &positions {
            assert_relative_eq!(p.y, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn fk_zero_angles_follows_heading() {
        let chain = three_link().with_heading(FRAC_PI_2);
        let end = chain.end_effector(&[0.0, 0.0, 0.0]);
        assert_relative_eq!(end.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(end.y, 3.5, epsilon = 1e-12);
    }

    #[test]
    fn fk_matches_closed_form_three_link() {
        let chain = three_link();
        let (t1, t2, t3) = (45f64.to_radians(), 30f64.to_radians(), 0.0);
        let x = 1.5 * t1.cos() + (t1 + t2).cos() + (t1 + t2 + t3).cos();
        let y = 1.5 * t1.sin() + (t1 + t2).sin() + (t1 + t2 + t3).sin();

        let positions = chain.forward_kinematics(&[t1, t2, t3]);
        let end = positions[3];
        assert_relative_eq!(end.x, x, epsilon = 1e-12);
        assert_relative_eq!(end.y, y, epsilon = 1e-12);
        let direct = chain.end_effector(&[t1, t2, t3]);
        assert_relative_eq!(direct.x, end.x, epsilon = 1e-12);
        assert_relative_eq!(direct.y, end.y, epsilon = 1e-12);
    }

    #[test]
    fn fk_right_angle_elbow() {
        let chain = AngleChain::new(Point2::new(1.0, 1.0), vec![1.0, 1.0]).unwrap();
        let positions = chain.forward_kinematics(&[0.0, FRAC_PI_2]);
        assert_relative_eq!(positions[1].x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(positions[1].y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(positions[2].x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(positions[2].y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn fk_empty_chain_returns_base() {
        let base = Point2::new(3.0, -2.0);
        let positions = forward_kinematics(base, 0.0, &[], &[]);
        assert_eq!(positions, vec![base]);
    }

    #[test]
    fn cumulative_angles_sum_prefixes() {
        let sums = cumulative_angles(0.5, &[0.1, 0.2, -0.3]);
        assert_relative_eq!(sums[0], 0.6, epsilon = 1e-12);
        assert_relative_eq!(sums[1], 0.8, epsilon = 1e-12);
        assert_relative_eq!(sums[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn clamp_angles_to_limits() {
        let mut angles = [2.0, -2.0, 0.3];
        clamp_angles(&mut angles, -FRAC_PI_2, FRAC_PI_2);
        assert_relative_eq!(angles[0], FRAC_PI_2);
        assert_relative_eq!(angles[1], -FRAC_PI_2);
        assert_relative_eq!(angles[2], 0.3);
    }

    #[test]
    fn wrap_angle_range() {
        assert_relative_eq!(wrap_angle(2.5 * PI), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-PI), PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(0.25), 0.25, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-0.25 - TAU), -0.25, epsilon = 1e-12);
    }

    #[test]
    fn from_positions_reproduces_reference_arm() {
        let joints = [
            Point2::new(0.0, 5.0),
            Point2::new(0.0, 4.0),
            Point2::new(-1.0, 3.0),
            Point2::new(-1.0, 2.0),
            Point2::new(0.0, 1.8),
        ];
        let (chain, angles) = AngleChain::from_positions(&joints).unwrap();
        assert_eq!(chain.dof(), 4);
        assert_relative_eq!(chain.heading(), -FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(angles[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(angles[1], -FRAC_PI_4, epsilon = 1e-12);

        let positions = chain.forward_kinematics(&angles);
        for (expected, actual) in joints.iter().zip(&positions) {
            assert_relative_eq!(expected.x, actual.x, epsilon = 1e-12);
            assert_relative_eq!(expected.y, actual.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn from_configuration_starts_reversed_arm_at_zero() {
        let arm = ArmConfiguration::from_joints(vec![
            Point2::origin(),
            Point2::new(-1.0, 0.0),
            Point2::new(-2.0, 0.0),
        ])
        .unwrap();
        let (chain, angles) = AngleChain::from_configuration(&arm);
        assert_relative_eq!(chain.heading(), PI, epsilon = 1e-12);
        assert_relative_eq!(angles[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(angles[1], 0.0, epsilon = 1e-12);

        let end = chain.end_effector(&angles);
        assert_relative_eq!(end.x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(end.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn segment_directions_are_absolute() {
        let chain = three_link().with_heading(FRAC_PI_2);
        let directions = chain.segment_directions(&[0.0, FRAC_PI_2, FRAC_PI_2]);
        assert_relative_eq!(directions[0], FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(directions[1], PI, epsilon = 1e-12);
        assert_relative_eq!(directions[2], -FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn to_configuration_carries_link_lengths() {
        let chain = three_link();
        let arm = chain.to_configuration(&[0.2, -0.4, 0.1]).unwrap();
        assert_eq!(arm.link_lengths(), &[1.5, 1.0, 1.0]);
        assert!(arm.max_length_drift() < 1e-12);
    }

    #[test]
    fn empty_chain_rejected() {
        let err = AngleChain::new(Point2::origin(), vec![]).unwrap_err();
        assert_eq!(err, ConfigurationError::TooFewJoints { got: 1 });
    }

    #[test]
    fn negative_link_rejected() {
        let err = AngleChain::new(Point2::origin(), vec![1.0, -1.0]).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::NonPositiveLinkLength { index: 1, .. }
        ));
    }

    #[test]
    fn angle_count_checked() {
        let chain = three_link();
        assert_eq!(
            chain.check_angles(&[0.0, 0.0]),
            Err(ConfigurationError::AngleCountMismatch {
                expected: 3,
                got: 2
            })
        );
        assert_eq!(
            chain.check_angles(&[0.0, f64::NAN, 0.0]),
            Err(ConfigurationError::NonFiniteAngle { index: 1 })
        );
        assert!(chain.to_configuration(&[0.0]).is_err());
    }

    #[test]
    fn reach_is_sum_of_links() {
        assert_relative_eq!(three_link().reach(), 3.5);
    }
}
