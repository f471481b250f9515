//! Runtime selection between the available solver strategies.

use nalgebra::Point2;
use tracing::debug;

use planarm_core::{
    ArmConfiguration, ArmLayout, IkSolver, PlanarmError, ScenarioConfig, SolveResult, SolverConfig,
};

use crate::ccd::CcdSolver;
use crate::chain::AngleChain;
use crate::gradient::GradientDescentSolver;

/// Either solver strategy behind one concrete type.
#[derive(Debug, Clone)]
pub enum Solver {
    GradientDescent(GradientDescentSolver),
    Ccd(CcdSolver),
}

impl Solver {
    /// Build the solver a scenario describes, with its initial target set.
    pub fn from_scenario(scenario: &ScenarioConfig) -> Result<Self, PlanarmError> {
        scenario.validate()?;

        let mut solver = match scenario.solver {
            SolverConfig::GradientDescent(config) => {
                let (chain, angles) = angle_chain(&scenario.arm)?;
                Self::GradientDescent(GradientDescentSolver::new(chain, angles, config)?)
            }
            SolverConfig::Ccd(config) => {
                Self::Ccd(CcdSolver::new(arm_configuration(&scenario.arm)?, config)?)
            }
        };

        if let Some(target) = scenario.target_point() {
            solver.set_target(target);
        }
        debug!(
            solver = solver.name(),
            joints = solver.configuration().joint_count(),
            "solver built from scenario"
        );
        Ok(solver)
    }

    /// Short identifier of the active strategy.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GradientDescent(_) => "gradient_descent",
            Self::Ccd(_) => "ccd",
        }
    }

    fn inner(&self) -> &dyn IkSolver {
        match self {
            Self::GradientDescent(solver) => solver,
            Self::Ccd(solver) => solver,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn IkSolver {
        match self {
            Self::GradientDescent(solver) => solver,
            Self::Ccd(solver) => solver,
        }
    }
}

fn arm_configuration(layout: &ArmLayout) -> Result<ArmConfiguration, PlanarmError> {
    match layout {
        ArmLayout::Joints {
            link_lengths: Some(lengths),
            ..
        } => Ok(ArmConfiguration::with_link_lengths(
            joint_points(layout),
            lengths.clone(),
        )?),
        ArmLayout::Joints { .. } => Ok(ArmConfiguration::from_joints(joint_points(layout))?),
        ArmLayout::Angles { .. } => {
            let (chain, angles) = angle_chain(layout)?;
            Ok(chain.to_configuration(&angles)?)
        }
    }
}

fn angle_chain(layout: &ArmLayout) -> Result<(AngleChain, Vec<f64>), PlanarmError> {
    match layout {
        ArmLayout::Joints { .. } => {
            let arm = arm_configuration(layout)?;
            Ok(AngleChain::from_configuration(&arm))
        }
        ArmLayout::Angles {
            base: [x, y],
            base_heading_deg,
            link_lengths,
            angles_deg,
        } => {
            let chain = AngleChain::new(Point2::new(*x, *y), link_lengths.clone())?
                .with_heading(base_heading_deg.to_radians());
            let angles: Vec<f64> = angles_deg.iter().map(|a| a.to_radians()).collect();
            chain.check_angles(&angles)?;
            Ok((chain, angles))
        }
    }
}

fn joint_points(layout: &ArmLayout) -> Vec<Point2<f64>> {
    layout.joint_points().unwrap_or_default()
}

impl From<GradientDescentSolver> for Solver {
    fn from(solver: GradientDescentSolver) -> Self {
        Self::GradientDescent(solver)
    }
}

impl From<CcdSolver> for Solver {
    fn from(solver: CcdSolver) -> Self {
        Self::Ccd(solver)
    }
}

impl IkSolver for Solver {
    fn set_target(&mut self, target: Point2<f64>) {
        self.inner_mut().set_target(target);
    }

    fn clear_target(&mut self) {
        self.inner_mut().clear_target();
    }

    fn target(&self) -> Option<Point2<f64>> {
        self.inner().target()
    }

    fn step(&mut self) -> SolveResult {
        self.inner_mut().step()
    }

    fn solve(&mut self) -> SolveResult {
        self.inner_mut().solve()
    }

    fn configuration(&self) -> &ArmConfiguration {
        self.inner().configuration()
    }

    fn loss(&self) -> f64 {
        self.inner().loss()
    }

    fn is_converged(&self) -> bool {
        self.inner().is_converged()
    }

    fn name(&self) -> &str {
        self.kind()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
