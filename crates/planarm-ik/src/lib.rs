//! Inverse kinematics for planar serial arms.
//!
//! Provides forward kinematics over relative joint angles, the squared
//! distance loss with its analytic gradient, and two iterative solvers:
//! joint-angle gradient descent and cyclic coordinate descent (CCD) over
//! joint positions.
//!
//! # Architecture
//!
//! ```text
//! AngleChain ──► loss_and_gradient ──► GradientDescent ─┐
//!                                                       ├─► IkSolver ──► joint positions
//! ArmConfiguration ─────────────────► Ccd ──────────────┘
//! ```
//!
//! Both stateful solvers implement [`IkSolver`](planarm_core::IkSolver) and
//! can be selected at runtime through [`Solver`].

pub mod ccd;
pub mod chain;
pub mod gradient;
pub mod loss;
pub mod solver;

pub use ccd::{Ccd, CcdSolver};
pub use chain::{AngleChain, clamp_angles, forward_kinematics};
pub use gradient::{GradientDescent, GradientDescentSolver};
pub use loss::{jacobian, loss_and_gradient, numeric_gradient, squared_loss};
pub use solver::Solver;
