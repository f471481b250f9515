//! Cyclic coordinate descent over a joint-position chain.
//!
//! One step sweeps the pivots from the joint before the end-effector back to
//! the base. At each pivot the distal part of the chain is rotated by a
//! fraction of the angle that would point the end-effector at the target.
//! A final base-to-tip pass restores every segment to its fixed length.

use nalgebra::{Point2, Rotation2, Vector2};
use tracing::{debug, trace};

use planarm_core::{
    ArmConfiguration, CcdConfig, ConfigurationError, IkSolver, SolveResult, validate_step_fraction,
};

/// Vectors shorter than this are treated as zero-length.
const DEGENERATE_LENGTH: f64 = 1e-12;

/// Iterations between progress events during a full solve.
const PROGRESS_INTERVAL: u32 = 50;

/// Signed angle that rotates `pivot -> end` onto `pivot -> target`.
///
/// Positive is counter-clockwise. Returns `None` when either vector has zero
/// length, since no direction is defined.
pub fn alignment_angle(
    pivot: &Point2<f64>,
    end: &Point2<f64>,
    target: &Point2<f64>,
) -> Option<f64> {
    let to_end = (end - pivot).try_normalize(DEGENERATE_LENGTH)?;
    let to_target = (target - pivot).try_normalize(DEGENERATE_LENGTH)?;
    let angle = to_end.dot(&to_target).clamp(-1.0, 1.0).acos();
    // z component of the 3D cross product of the two in-plane vectors
    if to_end.perp(&to_target) < 0.0 {
        Some(-angle)
    } else {
        Some(angle)
    }
}

/// Rotate the distal chain at each pivot, tip to base.
fn sweep(joints: &mut [Point2<f64>], target: &Point2<f64>, step_fraction: f64) {
    let tip = joints.len() - 1;
    for i in (1..joints.len()).rev() {
        let pivot = joints[i - 1];
        let Some(angle) = alignment_angle(&pivot, &joints[tip], target) else {
            trace!(pivot = i - 1, "degenerate pivot, rotation skipped");
            continue;
        };

        let rotation = Rotation2::new(angle * step_fraction);
        for joint in &mut joints[i..] {
            *joint = pivot + rotation * (*joint - pivot);
        }
    }
}

/// Walk base to tip, resetting each segment to its fixed length along its
/// current direction.
///
/// A collapsed segment has no direction and is laid out along +x.
pub fn restore_link_lengths(joints: &mut [Point2<f64>], link_lengths: &[f64]) {
    for (i, &length) in link_lengths.iter().enumerate() {
        let direction = (joints[i + 1] - joints[i])
            .try_normalize(DEGENERATE_LENGTH)
            .unwrap_or_else(Vector2::x);
        joints[i + 1] = joints[i] + direction * length;
    }
}

/// Stateless CCD method over a borrowed arm.
#[derive(Debug, Clone)]
pub struct Ccd {
    config: CcdConfig,
}

impl Ccd {
    /// Create a method with the given configuration.
    pub fn new(config: CcdConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a method with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: CcdConfig::default(),
        }
    }

    pub const fn config(&self) -> &CcdConfig {
        &self.config
    }

    /// Evaluate the current pose without changing it.
    pub fn evaluate(&self, arm: &ArmConfiguration, target: &Point2<f64>) -> SolveResult {
        let loss = arm.distance_to(target);
        SolveResult::from_arm(arm, loss, loss < self.config.tolerance, 0)
    }

    /// One sweep at the configured step fraction.
    pub fn step(&self, arm: &mut ArmConfiguration, target: &Point2<f64>) -> SolveResult {
        self.advance(arm, target, self.config.step_fraction)
    }

    /// One sweep at an explicit step fraction in `(0, 1]`, followed by the
    /// link length pass. The loss is the Euclidean end-effector distance.
    pub fn step_with_fraction(
        &self,
        arm: &mut ArmConfiguration,
        target: &Point2<f64>,
        step_fraction: f64,
    ) -> Result<SolveResult, ConfigurationError> {
        validate_step_fraction(step_fraction)?;
        Ok(self.advance(arm, target, step_fraction))
    }

    fn advance(
        &self,
        arm: &mut ArmConfiguration,
        target: &Point2<f64>,
        step_fraction: f64,
    ) -> SolveResult {
        let (joints, link_lengths) = arm.joints_and_lengths_mut();
        sweep(joints, target, step_fraction);
        restore_link_lengths(joints, link_lengths);

        let mut result = self.evaluate(arm, target);
        result.iterations = 1;
        trace!(loss = result.loss, "ccd step");
        result
    }

    /// Step until converged or `max_iterations` sweeps have been made.
    pub fn solve(&self, arm: &mut ArmConfiguration, target: &Point2<f64>) -> SolveResult {
        let mut result = self.evaluate(arm, target);
        if result.converged {
            return result;
        }

        for iteration in 1..=self.config.max_iterations {
            result = self.step(arm, target);
            result.iterations = iteration;

            if result.converged {
                debug!(iterations = iteration, loss = result.loss, "ccd converged");
                return result;
            }
            if iteration % PROGRESS_INTERVAL == 0 {
                debug!(iteration, loss = result.loss, "ccd progress");
            }
        }

        debug!(
            iterations = self.config.max_iterations,
            loss = result.loss,
            "ccd did not converge"
        );
        result
    }
}

// ---------------------------------------------------------------------------
// CcdSolver
// ---------------------------------------------------------------------------

/// Stateful CCD solver owning its arm and target.
#[derive(Debug, Clone)]
pub struct CcdSolver {
    method: Ccd,
    arm: ArmConfiguration,
    target: Option<Point2<f64>>,
}

impl CcdSolver {
    pub fn new(arm: ArmConfiguration, config: CcdConfig) -> Result<Self, ConfigurationError> {
        Ok(Self {
            method: Ccd::new(config)?,
            arm,
            target: None,
        })
    }

    /// Build from joint positions, deriving link lengths from them.
    pub fn from_joints(
        joints: Vec<Point2<f64>>,
        config: CcdConfig,
    ) -> Result<Self, ConfigurationError> {
        Self::new(ArmConfiguration::from_joints(joints)?, config)
    }

    pub const fn config(&self) -> &CcdConfig {
        self.method.config()
    }

    /// Change the step fraction for subsequent steps.
    pub fn set_step_fraction(&mut self, step_fraction: f64) -> Result<(), ConfigurationError> {
        self.method = Ccd::new(CcdConfig {
            step_fraction,
            ..*self.method.config()
        })?;
        Ok(())
    }
}

impl IkSolver for CcdSolver {
    fn set_target(&mut self, target: Point2<f64>) {
        self.target = Some(target);
    }

    fn clear_target(&mut self) {
        self.target = None;
    }

    fn target(&self) -> Option<Point2<f64>> {
        self.target
    }

    fn step(&mut self) -> SolveResult {
        match self.target {
            Some(target) => self.method.step(&mut self.arm, &target),
            None => SolveResult::holding(&self.arm),
        }
    }

    fn solve(&mut self) -> SolveResult {
        match self.target {
            Some(target) => self.method.solve(&mut self.arm, &target),
            None => SolveResult::holding(&self.arm),
        }
    }

    fn configuration(&self) -> &ArmConfiguration {
        &self.arm
    }

    fn loss(&self) -> f64 {
        self.target
            .map_or(0.0, |target| self.arm.distance_to(&target))
    }

    fn is_converged(&self) -> bool {
        self.loss() < self.method.config().tolerance
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ccd"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
