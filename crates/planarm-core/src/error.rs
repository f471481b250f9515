use thiserror::Error;

/// Top-level error type for planarm.
#[derive(Debug, Error)]
pub enum PlanarmError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),
}

/// Errors raised while loading a scenario file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigurationError),
}

/// Structural problems with an arm or solver parameters, detected at
/// construction time.
///
/// Copy + static messages so builders can return them without allocating.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Chain needs at least 2 joints, got {got}")]
    TooFewJoints { got: usize },

    #[error("Link {index} has non-positive length {length}")]
    NonPositiveLinkLength { index: usize, length: f64 },

    #[error("Joint {index} has a non-finite coordinate")]
    NonFiniteJoint { index: usize },

    #[error("Joint angle {index} is not finite")]
    NonFiniteAngle { index: usize },

    #[error("Link length count mismatch: expected {expected}, got {got}")]
    LinkCountMismatch { expected: usize, got: usize },

    #[error("Joint angle count mismatch: expected {expected}, got {got}")]
    AngleCountMismatch { expected: usize, got: usize },

    #[error("Joint angle {index} is {angle_deg} deg, outside the configured limits")]
    AngleOutOfLimits { index: usize, angle_deg: f64 },

    #[error("Angle limits inverted: lower={lower} > upper={upper}")]
    InvertedAngleLimits { lower: f64, upper: f64 },

    #[error("Learning rate must be positive and finite, got {0}")]
    InvalidLearningRate(f64),

    #[error("Step fraction must lie in (0, 1], got {0}")]
    InvalidStepFraction(f64),

    #[error("Tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planarm_error_from_config_error() {
        let err = ConfigError::InvalidValue {
            field: "target".into(),
            message: "must have two coordinates".into(),
        };
        let top: PlanarmError = err.into();
        assert!(matches!(top, PlanarmError::Config(_)));
        assert!(top.to_string().contains("target"));
    }

    #[test]
    fn planarm_error_from_configuration_error() {
        let err = ConfigurationError::TooFewJoints { got: 1 };
        let top: PlanarmError = err.into();
        assert!(matches!(top, PlanarmError::InvalidConfiguration(_)));
        assert!(top.to_string().contains("got 1"));
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::Io(_)));
    }

    #[test]
    fn config_error_wraps_configuration_error() {
        let config_err: ConfigError = ConfigurationError::InvalidTolerance(0.0).into();
        assert!(matches!(
            config_err,
            ConfigError::Invalid(ConfigurationError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn configuration_error_is_copy() {
        let err = ConfigurationError::InvalidStepFraction(1.5);
        let err2 = err;
        assert_eq!(err, err2);
    }

    #[test]
    fn angle_out_of_limits_display() {
        assert_eq!(
            ConfigurationError::AngleOutOfLimits {
                index: 1,
                angle_deg: 120.0
            }
            .to_string(),
            "Joint angle 1 is 120 deg, outside the configured limits"
        );
    }

    #[test]
    fn configuration_error_display_messages() {
        assert_eq!(
            ConfigurationError::TooFewJoints { got: 1 }.to_string(),
            "Chain needs at least 2 joints, got 1"
        );
        assert_eq!(
            ConfigurationError::NonPositiveLinkLength {
                index: 2,
                length: -0.5
            }
            .to_string(),
            "Link 2 has non-positive length -0.5"
        );
        assert_eq!(
            ConfigurationError::NonFiniteJoint { index: 3 }.to_string(),
            "Joint 3 has a non-finite coordinate"
        );
        assert_eq!(
            ConfigurationError::LinkCountMismatch {
                expected: 4,
                got: 3
            }
            .to_string(),
            "Link length count mismatch: expected 4, got 3"
        );
        assert_eq!(
            ConfigurationError::AngleCountMismatch {
                expected: 3,
                got: 2
            }
            .to_string(),
            "Joint angle count mismatch: expected 3, got 2"
        );
        assert_eq!(
            ConfigurationError::InvertedAngleLimits {
                lower: 1.0,
                upper: -1.0
            }
            .to_string(),
            "Angle limits inverted: lower=1 > upper=-1"
        );
        assert_eq!(
            ConfigurationError::InvalidLearningRate(0.0).to_string(),
            "Learning rate must be positive and finite, got 0"
        );
        assert_eq!(
            ConfigurationError::InvalidStepFraction(1.5).to_string(),
            "Step fraction must lie in (0, 1], got 1.5"
        );
    }

    #[test]
    fn config_error_display_messages() {
        assert_eq!(
            ConfigError::InvalidValue {
                field: "angles_deg".into(),
                message: "must not be empty".into()
            }
            .to_string(),
            "Invalid value for angles_deg: must not be empty"
        );
        assert_eq!(
            ConfigError::Invalid(ConfigurationError::InvalidTolerance(-1.0)).to_string(),
            "Invalid configuration: Tolerance must be positive and finite, got -1"
        );
    }
}
