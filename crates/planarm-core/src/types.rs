use nalgebra::{Point2, distance};

use crate::error::ConfigurationError;

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Check that every link length is finite and strictly positive.
pub fn validate_link_lengths(link_lengths: &[f64]) -> Result<(), ConfigurationError> {
    for (index, &length) in link_lengths.iter().enumerate() {
        if !(length.is_finite() && length > 0.0) {
            return Err(ConfigurationError::NonPositiveLinkLength { index, length });
        }
    }
    Ok(())
}

fn validate_joints(joints: &[Point2<f64>]) -> Result<(), ConfigurationError> {
    if joints.len() < 2 {
        return Err(ConfigurationError::TooFewJoints { got: joints.len() });
    }
    if let Some(index) = joints
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite()))
    {
        return Err(ConfigurationError::NonFiniteJoint { index });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ArmConfiguration
// ---------------------------------------------------------------------------

/// An ordered chain of planar joint positions with fixed link lengths.
///
/// Joint 0 is the immovable base, the last joint is the end-effector. The
/// link lengths are fixed at construction and never change; solvers mutate
/// the joint positions in place and must keep every realized segment at its
/// link length.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmConfiguration {
    joints: Vec<Point2<f64>>,
    link_lengths: Vec<f64>,
}

impl ArmConfiguration {
    /// Build from joint positions, deriving each link length from the
    /// distance between consecutive joints.
    pub fn from_joints(joints: Vec<Point2<f64>>) -> Result<Self, ConfigurationError> {
        validate_joints(&joints)?;
        let link_lengths: Vec<f64> = joints
            .windows(2)
            .map(|pair| distance(&pair[0], &pair[1]))
            .collect();
        validate_link_lengths(&link_lengths)?;
        Ok(Self {
            joints,
            link_lengths,
        })
    }

    /// Build from joint positions and explicit link lengths.
    ///
    /// The given lengths are authoritative: if the initial positions
    /// disagree with them, the first solver step snaps the segments back.
    pub fn with_link_lengths(
        joints: Vec<Point2<f64>>,
        link_lengths: Vec<f64>,
    ) -> Result<Self, ConfigurationError> {
        validate_joints(&joints)?;
        let expected = joints.len() - 1;
        if link_lengths.len() != expected {
            return Err(ConfigurationError::LinkCountMismatch {
                expected,
                got: link_lengths.len(),
            });
        }
        validate_link_lengths(&link_lengths)?;
        Ok(Self {
            joints,
            link_lengths,
        })
    }

    /// All joint positions, base first.
    pub fn joints(&self) -> &[Point2<f64>] {
        &self.joints
    }

    /// Mutable joint positions for solvers.
    ///
    /// Callers are responsible for restoring the fixed link lengths before
    /// handing the configuration back.
    pub fn joints_mut(&mut self) -> &mut [Point2<f64>] {
        &mut self.joints
    }

    /// Mutable joint positions alongside the fixed link lengths they must
    /// honour.
    pub fn joints_and_lengths_mut(&mut self) -> (&mut [Point2<f64>], &[f64]) {
        (&mut self.joints, &self.link_lengths)
    }

    /// Fixed link lengths, one per segment.
    pub fn link_lengths(&self) -> &[f64] {
        &self.link_lengths
    }

    pub fn base(&self) -> Point2<f64> {
        self.joints[0]
    }

    pub fn end_effector(&self) -> Point2<f64> {
        self.joints[self.joints.len() - 1]
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn segment_count(&self) -> usize {
        self.link_lengths.len()
    }

    /// Maximum reach: the sum of all link lengths.
    pub fn reach(&self) -> f64 {
        self.link_lengths.iter().sum()
    }

    /// Whether `target` lies within the outer reach circle around the base.
    ///
    /// Informational only. Solvers never refuse an unreachable target.
    pub fn can_reach(&self, target: &Point2<f64>) -> bool {
        distance(&self.base(), target) <= self.reach()
    }

    /// Realized length of segment `index` from the current joint positions.
    pub fn segment_length(&self, index: usize) -> f64 {
        distance(&self.joints[index], &self.joints[index + 1])
    }

    /// Largest absolute difference between a realized segment and its link
    /// length.
    pub fn max_length_drift(&self) -> f64 {
        (0..self.segment_count())
            .map(|i| (self.segment_length(i) - self.link_lengths[i]).abs())
            .fold(0.0, f64::max)
    }

    /// Euclidean distance from the end-effector to `target`.
    pub fn distance_to(&self, target: &Point2<f64>) -> f64 {
        distance(&self.end_effector(), target)
    }
}

// ---------------------------------------------------------------------------
// SolveResult
// ---------------------------------------------------------------------------

/// Outcome of a solver step or full solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// End-effector position after the step.
    pub end_effector: Point2<f64>,
    /// All joint positions after the step, base first.
    pub joint_positions: Vec<Point2<f64>>,
    /// Loss against the target. Squared distance for gradient descent,
    /// Euclidean distance for CCD.
    pub loss: f64,
    /// Whether `loss` is below the solver tolerance.
    pub converged: bool,
    /// Number of steps taken to produce this result.
    pub iterations: u32,
}

impl SolveResult {
    /// Snapshot an arm configuration.
    pub fn from_arm(arm: &ArmConfiguration, loss: f64, converged: bool, iterations: u32) -> Self {
        Self {
            end_effector: arm.end_effector(),
            joint_positions: arm.joints().to_vec(),
            loss,
            converged,
            iterations,
        }
    }

    /// Build from a full list of positions, base first.
    pub fn from_positions(
        joint_positions: Vec<Point2<f64>>,
        loss: f64,
        converged: bool,
        iterations: u32,
    ) -> Self {
        let end_effector = joint_positions.last().copied().unwrap_or_else(Point2::origin);
        Self {
            end_effector,
            joint_positions,
            loss,
            converged,
            iterations,
        }
    }

    /// Result for a solver with no target: the pose is held as-is.
    pub fn holding(arm: &ArmConfiguration) -> Self {
        Self::from_arm(arm, 0.0, true, 0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_joints() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 5.0),
            Point2::new(0.0, 4.0),
            Point2::new(-1.0, 3.0),
            Point2::new(-1.0, 2.0),
            Point2::new(0.0, 1.8),
        ]
    }

    #[test]
    fn link_lengths_derived_from_joints() {
        let arm = ArmConfiguration::from_joints(reference_joints()).unwrap();
        assert_eq!(arm.segment_count(), 4);
        assert_eq!(arm.joint_count(), 5);
        assert_relative_eq!(arm.link_lengths()[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(arm.link_lengths()[1], 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(arm.link_lengths()[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(arm.link_lengths()[3], 1.04_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(arm.max_length_drift(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn base_and_end_effector() {
        let arm = ArmConfiguration::from_joints(reference_joints()).unwrap();
        assert_eq!(arm.base(), Point2::new(0.0, 5.0));
        assert_eq!(arm.end_effector(), Point2::new(0.0, 1.8));
        assert_relative_eq!(arm.distance_to(&Point2::new(0.0, 0.0)), 1.8, epsilon = 1e-12);
    }

    #[test]
    fn reach_is_sum_of_link_lengths() {
        let arm = ArmConfiguration::from_joints(reference_joints()).unwrap();
        let expected = 1.0 + 2.0_f64.sqrt() + 1.0 + 1.04_f64.sqrt();
        assert_relative_eq!(arm.reach(), expected, epsilon = 1e-12);
        assert!(arm.can_reach(&Point2::new(0.0, 1.0)));
        assert!(!arm.can_reach(&Point2::new(0.0, 0.0)));
    }

    #[test]
    fn single_joint_rejected() {
        let err = ArmConfiguration::from_joints(vec![Point2::origin()]).unwrap_err();
        assert_eq!(err, ConfigurationError::TooFewJoints { got: 1 });
    }

    #[test]
    fn coincident_joints_rejected() {
        let err = ArmConfiguration::from_joints(vec![Point2::new(1.0, 1.0), Point2::new(1.0, 1.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::NonPositiveLinkLength { index: 0, .. }
        ));
    }

    #[test]
    fn non_finite_joint_rejected() {
        let err = ArmConfiguration::from_joints(vec![Point2::origin(), Point2::new(f64::NAN, 1.0)])
            .unwrap_err();
        assert_eq!(err, ConfigurationError::NonFiniteJoint { index: 1 });
    }

    #[test]
    fn explicit_link_lengths_count_checked() {
        let err = ArmConfiguration::with_link_lengths(reference_joints(), vec![1.0, 1.0])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::LinkCountMismatch {
                expected: 4,
                got: 2
            }
        );
    }

    #[test]
    fn explicit_link_lengths_positivity_checked() {
        let err = ArmConfiguration::with_link_lengths(
            vec![Point2::origin(), Point2::new(1.0, 0.0)],
            vec![0.0],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::NonPositiveLinkLength { index: 0, .. }
        ));
    }

    #[test]
    fn explicit_link_lengths_may_disagree_with_positions() {
        let arm = ArmConfiguration::with_link_lengths(
            vec![Point2::origin(), Point2::new(1.0, 0.0)],
            vec![2.0],
        )
        .unwrap();
        assert_relative_eq!(arm.max_length_drift(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn validate_link_lengths_rejects_nan() {
        let err = validate_link_lengths(&[1.0, f64::NAN]).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::NonPositiveLinkLength { index: 1, .. }
        ));
    }

    #[test]
    fn solve_result_snapshot() {
        let arm = ArmConfiguration::from_joints(reference_joints()).unwrap();
        let result = SolveResult::from_arm(&arm, 0.25, false, 7);
        assert_eq!(result.end_effector, arm.end_effector());
        assert_eq!(result.joint_positions, arm.joints());
        assert_eq!(result.iterations, 7);
        assert!(!result.converged);

        let from_positions =
            SolveResult::from_positions(arm.joints().to_vec(), 0.25, false, 7);
        assert_eq!(from_positions, result);

        let held = SolveResult::holding(&arm);
        assert!(held.converged);
        assert_eq!(held.iterations, 0);
        assert_relative_eq!(held.loss, 0.0);
    }
}
