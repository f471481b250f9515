//! Shared test fixtures and utilities for planarm crates.
//!
//! Provides the reference arms used across the test suites and seeded
//! generators for targets and joint angles.

pub mod arms;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use arms::{
    THREE_LINK_ANGLES_DEG, THREE_LINK_LENGTHS, THREE_LINK_TARGET, five_joint_arm,
    five_joint_positions,
};
pub use rng::{random_angles, random_targets, seeded_rng};
