//! Joint-angle gradient descent.
//!
//! Each step moves every joint angle against the analytic loss gradient,
//! then clamps the angles into the configured limits. A full solve repeats
//! steps until the squared-distance loss drops below the tolerance or the
//! iteration budget runs out; running out is reported, never raised.

use nalgebra::Point2;
use tracing::{debug, trace};

use planarm_core::{
    ArmConfiguration, ConfigurationError, GradientDescentConfig, IkSolver, SolveResult,
    validate_learning_rate,
};

use crate::chain::{AngleChain, clamp_angles};
use crate::loss::{loss_and_gradient, squared_loss};

/// Iterations between progress events during a full solve.
const PROGRESS_INTERVAL: u32 = 50;

/// Rounding allowance when checking starting angles against the limits.
const LIMIT_SLACK: f64 = 1e-9;

/// Stateless gradient-descent method over a borrowed chain and angles.
#[derive(Debug, Clone)]
pub struct GradientDescent {
    config: GradientDescentConfig,
}

impl GradientDescent {
    /// Create a method with the given configuration.
    pub fn new(config: GradientDescentConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a method with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: GradientDescentConfig::default(),
        }
    }

    pub const fn config(&self) -> &GradientDescentConfig {
        &self.config
    }

    /// Evaluate the current angles without changing them.
    pub fn evaluate(
        &self,
        chain: &AngleChain,
        angles: &[f64],
        target: &Point2<f64>,
    ) -> Result<SolveResult, ConfigurationError> {
        chain.check_angles(angles)?;
        Ok(self.evaluate_unchecked(chain, angles, target))
    }

    /// One descent step at the configured learning rate.
    pub fn step(
        &self,
        chain: &AngleChain,
        angles: &mut [f64],
        target: &Point2<f64>,
    ) -> Result<SolveResult, ConfigurationError> {
        self.step_with_rate(chain, angles, target, self.config.learning_rate)
    }

    /// One descent step at an explicit learning rate.
    ///
    /// Updates `angles` in place: `t_i <- t_i - rate * dL/dt_i`, then clamps
    /// each angle into the configured limits.
    pub fn step_with_rate(
        &self,
        chain: &AngleChain,
        angles: &mut [f64],
        target: &Point2<f64>,
        rate: f64,
    ) -> Result<SolveResult, ConfigurationError> {
        validate_learning_rate(rate)?;
        chain.check_angles(angles)?;
        Ok(self.step_unchecked(chain, angles, target, rate))
    }

    /// Step until converged or `max_iterations` steps have been taken.
    ///
    /// Returns immediately with zero iterations if the starting pose already
    /// satisfies the tolerance.
    pub fn solve(
        &self,
        chain: &AngleChain,
        angles: &mut [f64],
        target: &Point2<f64>,
    ) -> Result<SolveResult, ConfigurationError> {
        chain.check_angles(angles)?;
        Ok(self.solve_unchecked(chain, angles, target))
    }

    fn evaluate_unchecked(&self, chain: &AngleChain, angles: &[f64], target: &Point2<f64>) -> SolveResult {
        let positions = chain.forward_kinematics(angles);
        let loss = squared_loss(&positions[positions.len() - 1], target);
        SolveResult::from_positions(positions, loss, loss < self.config.tolerance, 0)
    }

    fn step_unchecked(
        &self,
        chain: &AngleChain,
        angles: &mut [f64],
        target: &Point2<f64>,
        rate: f64,
    ) -> SolveResult {
        let (_, gradient) = loss_and_gradient(chain, angles, target);
        for (angle, partial) in angles.iter_mut().zip(gradient.iter()) {
            *angle -= rate * partial;
        }

        let (lower, upper) = self.config.angle_limits();
        clamp_angles(angles, lower, upper);

        let mut result = self.evaluate_unchecked(chain, angles, target);
        result.iterations = 1;
        trace!(loss = result.loss, "gradient descent step");
        result
    }

    fn solve_unchecked(&self, chain: &AngleChain, angles: &mut [f64], target: &Point2<f64>) -> SolveResult {
        let mut result = self.evaluate_unchecked(chain, angles, target);
        if result.converged {
            return result;
        }

        for iteration in 1..=self.config.max_iterations {
            result = self.step_unchecked(chain, angles, target, self.config.learning_rate);
            result.iterations = iteration;

            if result.converged {
                debug!(iterations = iteration, loss = result.loss, "gradient descent converged");
                return result;
            }
            if iteration % PROGRESS_INTERVAL == 0 {
                debug!(iteration, loss = result.loss, "gradient descent progress");
            }
        }

        debug!(
            iterations = self.config.max_iterations,
            loss = result.loss,
            "gradient descent did not converge"
        );
        result
    }
}

/// Reject starting angles the first step would clamp.
fn check_limits(angles: &[f64], config: &GradientDescentConfig) -> Result<(), ConfigurationError> {
    let (lower, upper) = config.angle_limits();
    match angles
        .iter()
        .position(|&a| a < lower - LIMIT_SLACK || a > upper + LIMIT_SLACK)
    {
        Some(index) => Err(ConfigurationError::AngleOutOfLimits {
            index,
            angle_deg: angles[index].to_degrees(),
        }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// GradientDescentSolver
// ---------------------------------------------------------------------------

/// Stateful gradient-descent solver owning its chain, angles and target.
#[derive(Debug, Clone)]
pub struct GradientDescentSolver {
    method: GradientDescent,
    chain: AngleChain,
    angles: Vec<f64>,
    arm: ArmConfiguration,
    target: Option<Point2<f64>>,
}

impl GradientDescentSolver {
    /// Create a solver for `chain` starting at `angles` (radians).
    ///
    /// Every starting angle must already lie within the configured limits,
    /// so the first step never snaps the arm to a clamped pose.
    pub fn new(
        chain: AngleChain,
        angles: Vec<f64>,
        config: GradientDescentConfig,
    ) -> Result<Self, ConfigurationError> {
        let method = GradientDescent::new(config)?;
        let arm = chain.to_configuration(&angles)?;
        check_limits(&angles, &config)?;
        Ok(Self {
            method,
            chain,
            angles,
            arm,
            target: None,
        })
    }

    /// Create a solver that drives an existing joint-position arm, using
    /// its recovered relative joint angles.
    ///
    /// The base heading follows the first segment, so only the bends between
    /// segments are checked against the limits.
    pub fn from_arm(
        arm: &ArmConfiguration,
        config: GradientDescentConfig,
    ) -> Result<Self, ConfigurationError> {
        let (chain, angles) = AngleChain::from_configuration(arm);
        Self::new(chain, angles, config)
    }

    pub fn chain(&self) -> &AngleChain {
        &self.chain
    }

    /// Current joint angles in radians.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub const fn config(&self) -> &GradientDescentConfig {
        self.method.config()
    }

    /// Change the learning rate for subsequent steps.
    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<(), ConfigurationError> {
        self.method = GradientDescent::new(GradientDescentConfig {
            learning_rate,
            ..*self.method.config()
        })?;
        Ok(())
    }

    fn sync(&mut self, result: &SolveResult) {
        self.arm
            .joints_mut()
            .copy_from_slice(&result.joint_positions);
    }
}

impl IkSolver for GradientDescentSolver {
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
        let Some(target) = self.target else {
            return SolveResult::holding(&self.arm);
        };
        let rate = self.method.config.learning_rate;
        let result = self
            .method
            .step_unchecked(&self.chain, &mut self.angles, &target, rate);
        self.sync(&result);
        result
    }

    fn solve(&mut self) -> SolveResult {
        let Some(target) = self.target else {
            return SolveResult::holding(&self.arm);
        };
        let result = self
            .method
            .solve_unchecked(&self.chain, &mut self.angles, &target);
        self.sync(&result);
        result
    }

    fn configuration(&self) -> &ArmConfiguration {
        &self.arm
    }

    fn loss(&self) -> f64 {
        self.target
            .map_or(0.0, |target| squared_loss(&self.arm.end_effector(), &target))
    }

    fn is_converged(&self) -> bool {
        self.loss() < self.method.config().tolerance
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "gradient_descent"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
