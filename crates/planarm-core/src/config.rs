use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigurationError};
use crate::types::validate_link_lengths;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_learning_rate() -> f64 {
    0.05
}
const fn default_gradient_tolerance() -> f64 {
    1e-3
}
const fn default_gradient_max_iterations() -> u32 {
    1000
}
const fn default_angle_limits_deg() -> [f64; 2] {
    [-90.0, 90.0]
}
const fn default_step_fraction() -> f64 {
    0.2
}
const fn default_ccd_tolerance() -> f64 {
    1e-2
}
const fn default_ccd_max_iterations() -> u32 {
    200
}

fn validate_tolerance(tolerance: f64) -> Result<(), ConfigurationError> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidTolerance(tolerance))
    }
}

/// A learning rate must be positive and finite.
pub fn validate_learning_rate(learning_rate: f64) -> Result<(), ConfigurationError> {
    if learning_rate.is_finite() && learning_rate > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidLearningRate(learning_rate))
    }
}

/// A CCD step fraction must lie in `(0, 1]`.
pub fn validate_step_fraction(step_fraction: f64) -> Result<(), ConfigurationError> {
    if step_fraction > 0.0 && step_fraction <= 1.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidStepFraction(step_fraction))
    }
}

// ---------------------------------------------------------------------------
// GradientDescentConfig
// ---------------------------------------------------------------------------

/// Parameters for the joint-angle gradient-descent solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientDescentConfig {
    /// Step size applied to the loss gradient (default: 0.05).
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Squared-distance loss below which the arm counts as converged
    /// (default: 1e-3).
    #[serde(default = "default_gradient_tolerance")]
    pub tolerance: f64,

    /// Step budget for a full solve (default: 1000).
    #[serde(default = "default_gradient_max_iterations")]
    pub max_iterations: u32,

    /// Lower and upper joint angle limits in degrees (default: [-90, 90]).
    /// Every angle is clamped into this range after each update.
    #[serde(default = "default_angle_limits_deg")]
    pub angle_limits_deg: [f64; 2],
}

impl Default for GradientDescentConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            tolerance: default_gradient_tolerance(),
            max_iterations: default_gradient_max_iterations(),
            angle_limits_deg: default_angle_limits_deg(),
        }
    }
}

impl GradientDescentConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_learning_rate(self.learning_rate)?;
        validate_tolerance(self.tolerance)?;
        let [lower, upper] = self.angle_limits_deg;
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(ConfigurationError::InvertedAngleLimits { lower, upper });
        }
        Ok(())
    }

    /// Angle limits in radians as `(lower, upper)`.
    pub fn angle_limits(&self) -> (f64, f64) {
        let [lower, upper] = self.angle_limits_deg;
        (lower.to_radians(), upper.to_radians())
    }
}

// ---------------------------------------------------------------------------
// CcdConfig
// ---------------------------------------------------------------------------

/// Parameters for the cyclic coordinate descent solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CcdConfig {
    /// Fraction of each per-joint alignment rotation applied in one step,
    /// in (0, 1] (default: 0.2). Smaller values give smoother motion.
    #[serde(default = "default_step_fraction")]
    pub step_fraction: f64,

    /// End-effector to target distance below which the arm counts as
    /// converged (default: 1e-2).
    #[serde(default = "default_ccd_tolerance")]
    pub tolerance: f64,

    /// Step budget for a full solve (default: 200).
    #[serde(default = "default_ccd_max_iterations")]
    pub max_iterations: u32,
}

impl Default for CcdConfig {
    fn default() -> Self {
        Self {
            step_fraction: default_step_fraction(),
            tolerance: default_ccd_tolerance(),
            max_iterations: default_ccd_max_iterations(),
        }
    }
}

impl CcdConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_step_fraction(self.step_fraction)?;
        validate_tolerance(self.tolerance)
    }
}

// ---------------------------------------------------------------------------
// SolverConfig
// ---------------------------------------------------------------------------

/// Solver strategy selection plus its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolverConfig {
    GradientDescent(GradientDescentConfig),
    Ccd(CcdConfig),
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::Ccd(CcdConfig::default())
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            Self::GradientDescent(config) => config.validate(),
            Self::Ccd(config) => config.validate(),
        }
    }

    pub const fn tolerance(&self) -> f64 {
        match self {
            Self::GradientDescent(config) => config.tolerance,
            Self::Ccd(config) => config.tolerance,
        }
    }

    pub const fn max_iterations(&self) -> u32 {
        match self {
            Self::GradientDescent(config) => config.max_iterations,
            Self::Ccd(config) => config.max_iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// ArmLayout
// ---------------------------------------------------------------------------

/// How an arm is described in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ArmLayout {
    /// Explicit joint positions, base first. Link lengths default to the
    /// distances between consecutive joints.
    Joints {
        joints: Vec<[f64; 2]>,
        #[serde(default)]
        link_lengths: Option<Vec<f64>>,
    },
    /// Base point, link lengths and relative joint angles in degrees.
    Angles {
        #[serde(default)]
        base: [f64; 2],
        #[serde(default)]
        base_heading_deg: f64,
        link_lengths: Vec<f64>,
        angles_deg: Vec<f64>,
    },
}

impl ArmLayout {
    /// Structural checks that do not need any kinematics.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            Self::Joints {
                joints,
                link_lengths,
            } => {
                if joints.len() < 2 {
                    return Err(ConfigurationError::TooFewJoints { got: joints.len() });
                }
                if let Some(lengths) = link_lengths {
                    let expected = joints.len() - 1;
                    if lengths.len() != expected {
                        return Err(ConfigurationError::LinkCountMismatch {
                            expected,
                            got: lengths.len(),
                        });
                    }
                    validate_link_lengths(lengths)?;
                }
                Ok(())
            }
            Self::Angles {
                link_lengths,
                angles_deg,
                ..
            } => {
                if link_lengths.is_empty() {
                    return Err(ConfigurationError::TooFewJoints { got: 1 });
                }
                if angles_deg.len() != link_lengths.len() {
                    return Err(ConfigurationError::AngleCountMismatch {
                        expected: link_lengths.len(),
                        got: angles_deg.len(),
                    });
                }
                validate_link_lengths(link_lengths)
            }
        }
    }

    /// Joint positions as points, for the `Joints` form.
    pub fn joint_points(&self) -> Option<Vec<Point2<f64>>> {
        match self {
            Self::Joints { joints, .. } => {
                Some(joints.iter().map(|&[x, y]| Point2::new(x, y)).collect())
            }
            Self::Angles { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ScenarioConfig
// ---------------------------------------------------------------------------

/// A complete solver scenario: arm, solver and optional initial target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Initial target point. `None` leaves the arm holding its pose until a
    /// target is set.
    #[serde(default)]
    pub target: Option<[f64; 2]>,

    pub arm: ArmLayout,

    #[serde(default)]
    pub solver: SolverConfig,
}

impl ScenarioConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arm.validate()?;
        self.solver.validate()?;
        if let Some([x, y]) = self.target {
            if !(x.is_finite() && y.is_finite()) {
                return Err(ConfigError::InvalidValue {
                    field: "target".into(),
                    message: format!("coordinates must be finite, got [{x}, {y}]"),
                });
            }
        }
        Ok(())
    }

    pub fn target_point(&self) -> Option<Point2<f64>> {
        self.target.map(|[x, y]| Point2::new(x, y))
    }

    /// Parse and validate from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
