//! Squared-distance loss and its gradient with respect to joint angles.
//!
//! The loss is `|p_end - p_target|^2`. Its gradient is the transpose of the
//! 2 x n position Jacobian applied to `2 * (p_end - p_target)`, so it shrinks
//! to zero as the end-effector reaches the target.

use nalgebra::{DVector, Matrix2xX, Point2};

use crate::chain::{AngleChain, cumulative_angles};

/// Squared Euclidean distance between end-effector and target.
pub fn squared_loss(end_effector: &Point2<f64>, target: &Point2<f64>) -> f64 {
    (end_effector - target).norm_squared()
}

/// Position Jacobian of the end-effector with respect to each joint angle.
///
/// Column `i` is `sum_{k >= i} L_k * (-sin(phi_k), cos(phi_k))`, where
/// `phi_k` is the cumulative heading of segment `k`. Like forward
/// kinematics, only links that have an angle contribute.
pub fn jacobian(chain: &AngleChain, angles: &[f64]) -> Matrix2xX<f64> {
    let n = chain.dof().min(angles.len());
    let headings = cumulative_angles(chain.heading(), angles);
    let mut jacobian = Matrix2xX::zeros(n);

    // Accumulate from the tip so each column reuses the distal sum.
    let (mut dx, mut dy) = (0.0, 0.0);
    for i in (0..n).rev() {
        let (sin, cos) = headings[i].sin_cos();
        let length = chain.link_lengths()[i];
        dx -= length * sin;
        dy += length * cos;
        jacobian[(0, i)] = dx;
        jacobian[(1, i)] = dy;
    }

    jacobian
}

/// Loss and analytic gradient for the current angles.
///
/// Returns `(loss, dL/dtheta)`.
pub fn loss_and_gradient(
    chain: &AngleChain,
    angles: &[f64],
    target: &Point2<f64>,
) -> (f64, DVector<f64>) {
    let error = chain.end_effector(angles) - target;
    let gradient = jacobian(chain, angles).transpose() * (error * 2.0);
    (error.norm_squared(), gradient)
}

/// Central-difference approximation of the loss gradient.
///
/// Used to cross-check the analytic gradient. `step` is the angle
/// perturbation in radians.
pub fn numeric_gradient(
    chain: &AngleChain,
    angles: &[f64],
    target: &Point2<f64>,
    step: f64,
) -> DVector<f64> {
    let mut shifted = angles.to_vec();
    DVector::from_fn(angles.len(), |i, _| {
        let saved = shifted[i];
        shifted[i] = saved + step;
        let forward = squared_loss(&chain.end_effector(&shifted), target);
        shifted[i] = saved - step;
        let backward = squared_loss(&chain.end_effector(&shifted), target);
        shifted[i] = saved;
        (forward - backward) / (2.0 * step)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
