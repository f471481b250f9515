use nalgebra::Point2;

use crate::types::{ArmConfiguration, SolveResult};

// ---------------------------------------------------------------------------
// IkSolver
// ---------------------------------------------------------------------------

/// Common capability of every inverse kinematics strategy.
///
/// A solver owns its arm configuration and the active target. Hosts call
/// [`step`](IkSolver::step) once per frame (or [`solve`](IkSolver::solve)
/// to run to convergence) and read the joint positions back between calls.
/// Target changes take effect at the next step.
pub trait IkSolver: Send + Sync {
    /// Replace the active target.
    fn set_target(&mut self, target: Point2<f64>);

    /// Drop the active target. The arm holds its pose until a new one is set.
    fn clear_target(&mut self);

    /// The active target, if any.
    fn target(&self) -> Option<Point2<f64>>;

    /// Advance the arm by one solver iteration toward the active target.
    fn step(&mut self) -> SolveResult;

    /// Iterate until converged or the iteration budget runs out.
    fn solve(&mut self) -> SolveResult;

    /// Current arm state.
    fn configuration(&self) -> &ArmConfiguration;

    /// Loss of the current pose against the active target. Zero when no
    /// target is set.
    fn loss(&self) -> f64;

    /// Whether the current pose satisfies the solver tolerance.
    fn is_converged(&self) -> bool;

    /// Human-readable name for this solver.
    fn name(&self) -> &str;

    /// Current joint positions, base first.
    fn joint_positions(&self) -> &[Point2<f64>] {
        self.configuration().joints()
    }

    /// Current end-effector position.
    fn end_effector(&self) -> Point2<f64> {
        self.configuration().end_effector()
    }
}
