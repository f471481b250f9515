// planarm-core: Types, traits, config and errors for planar arm kinematics.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{
    ArmLayout, CcdConfig, GradientDescentConfig, ScenarioConfig, SolverConfig,
    validate_learning_rate, validate_step_fraction,
};
pub use error::{ConfigError, ConfigurationError, PlanarmError};
pub use traits::IkSolver;
pub use types::{ArmConfiguration, SolveResult, validate_link_lengths};

pub mod prelude {
    pub use crate::config::{ArmLayout, CcdConfig, GradientDescentConfig, ScenarioConfig, SolverConfig};
    pub use crate::error::{ConfigError, ConfigurationError, PlanarmError};
    pub use crate::traits::IkSolver;
    pub use crate::types::{ArmConfiguration, SolveResult};
}
