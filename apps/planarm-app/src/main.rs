//! Planar arm inverse kinematics CLI.
//!
//! Provides four modes of operation:
//! - `gradient`: Solve the three-link reference arm with gradient descent
//! - `ccd`: Animate the five-joint reference arm with CCD, one step per frame
//! - `run`: Load a TOML scenario and solve it
//! - `info`: Print crate versions and the reference arms

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use nalgebra::Point2;

use planarm_core::prelude::*;
use planarm_ik::{AngleChain, CcdSolver, GradientDescentSolver, Solver};

const THREE_LINK_LENGTHS: [f64; 3] = [1.5, 1.0, 1.0];
const THREE_LINK_ANGLES_DEG: [f64; 3] = [45.0, 30.0, 0.0];
const FIVE_JOINTS: [[f64; 2]; 5] = [
    [0.0, 5.0],
    [0.0, 4.0],
    [-1.0, 3.0],
    [-1.0, 2.0],
    [0.0, 1.8],
];

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Inverse kinematics for planar serial arms.
#[derive(Parser)]
#[command(name = "planarm", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the three-link reference arm with joint-angle gradient descent.
    Gradient {
        /// Target point as `x,y`.
        #[arg(
            short,
            long,
            default_value = "2.5,1.5",
            value_parser = parse_point,
            allow_hyphen_values = true
        )]
        target: Point2<f64>,

        /// Learning rate.
        #[arg(short, long, default_value_t = 0.05)]
        rate: f64,

        /// Squared-distance tolerance.
        #[arg(long, default_value_t = 1e-3)]
        tolerance: f64,

        /// Maximum number of iterations.
        #[arg(short, long, default_value_t = 1000)]
        max_iterations: u32,
    },

    /// Animate the five-joint reference arm with CCD, one sweep per frame.
    Ccd {
        /// Target point as `x,y`.
        #[arg(
            short,
            long,
            default_value = "0,1",
            value_parser = parse_point,
            allow_hyphen_values = true
        )]
        target: Point2<f64>,

        /// Fraction of the alignment angle applied per joint per sweep.
        #[arg(short, long, default_value_t = 0.2)]
        step_fraction: f64,

        /// Euclidean distance tolerance.
        #[arg(long, default_value_t = 1e-2)]
        tolerance: f64,

        /// Number of frames to animate.
        #[arg(short, long, default_value_t = 200)]
        frames: u32,

        /// Print joint positions after every frame.
        #[arg(short, long)]
        print_frames: bool,
    },

    /// Load a scenario file and solve it.
    Run {
        /// Path to a TOML scenario.
        #[arg(short, long)]
        config: PathBuf,

        /// Step frame by frame for this many frames instead of a full solve.
        #[arg(short, long)]
        frames: Option<u32>,

        /// Print joint positions after every frame.
        #[arg(short, long)]
        print_frames: bool,
    },

    /// Print crate information and the reference arms.
    Info,
}

fn parse_point(s: &str) -> Result<Point2<f64>, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x `{x}`: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y `{y}`: {e}"))?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(format!("coordinates must be finite, got `{s}`"));
    }
    Ok(Point2::new(x, y))
}

// ---------------------------------------------------------------------------
// Driving and reporting
// ---------------------------------------------------------------------------

/// Step once per frame until converged or out of frames.
fn animate(solver: &mut dyn IkSolver, frames: u32, print_frames: bool) -> SolveResult {
    let mut result = SolveResult::from_arm(
        solver.configuration(),
        solver.loss(),
        solver.is_converged(),
        0,
    );
    for frame in 1..=frames {
        if result.converged {
            break;
        }
        let step = solver.step();
        result = SolveResult {
            iterations: frame,
            ..step
        };
        if print_frames {
            println!(
                "frame {frame:>4}: loss={:.6} joints={}",
                result.loss,
                format_points(&result.joint_positions)
            );
        }
    }
    result
}

fn format_points(points: &[Point2<f64>]) -> String {
    points
        .iter()
        .map(|p| format!("({:.4}, {:.4})", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn report(
    name: &str,
    result: &SolveResult,
    chain: &AngleChain,
    angles: &[f64],
    target: Option<Point2<f64>>,
) {
    if result.converged {
        info!("{name} converged after {} iterations", result.iterations);
    } else {
        warn!(
            "{name} stopped after {} iterations without converging (loss {:.6})",
            result.iterations, result.loss
        );
    }

    let degrees = |values: &[f64]| {
        values
            .iter()
            .map(|a| format!("{:.2}", a.to_degrees()))
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("solver:          {name}");
    println!("converged:       {}", result.converged);
    println!("iterations:      {}", result.iterations);
    println!("loss:            {:.6}", result.loss);
    println!("base heading:    {:.2} deg", chain.heading().to_degrees());
    println!("joint angles:    [{}] deg", degrees(angles));
    println!(
        "segment heading: [{}] deg",
        degrees(&chain.segment_directions(angles))
    );
    println!("joints:          {}", format_points(&result.joint_positions));
    println!(
        "end-effector:    ({:.4}, {:.4})",
        result.end_effector.x, result.end_effector.y
    );
    match target {
        Some(target) => println!("target:          ({:.4}, {:.4})", target.x, target.y),
        None => println!("target:          none"),
    }
}

/// Angle chain and relative joint angles of the solver's current pose.
fn solver_angles(solver: &Solver) -> (AngleChain, Vec<f64>) {
    match solver {
        Solver::GradientDescent(gd) => (gd.chain().clone(), gd.angles().to_vec()),
        Solver::Ccd(ccd) => AngleChain::from_configuration(ccd.configuration()),
    }
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_gradient(
    target: Point2<f64>,
    rate: f64,
    tolerance: f64,
    max_iterations: u32,
) -> Result<()> {
    let config = GradientDescentConfig {
        learning_rate: rate,
        tolerance,
        max_iterations,
        ..GradientDescentConfig::default()
    };
    let chain = AngleChain::new(Point2::origin(), THREE_LINK_LENGTHS.to_vec())?;
    let angles = THREE_LINK_ANGLES_DEG.iter().map(|a| a.to_radians()).collect();
    let mut solver = GradientDescentSolver::new(chain, angles, config)
        .context("invalid gradient descent settings")?;

    if !solver.configuration().can_reach(&target) {
        warn!("target ({}, {}) is beyond the arm's reach", target.x, target.y);
    }
    solver.set_target(target);
    let result = solver.solve();
    report(
        solver.name(),
        &result,
        solver.chain(),
        solver.angles(),
        Some(target),
    );
    Ok(())
}

fn run_ccd(
    target: Point2<f64>,
    step_fraction: f64,
    tolerance: f64,
    frames: u32,
    print_frames: bool,
) -> Result<()> {
    let config = CcdConfig {
        step_fraction,
        tolerance,
        max_iterations: frames,
    };
    let joints = FIVE_JOINTS.iter().map(|&[x, y]| Point2::new(x, y)).collect();
    let mut solver = CcdSolver::from_joints(joints, config).context("invalid CCD settings")?;

    if !solver.configuration().can_reach(&target) {
        warn!("target ({}, {}) is beyond the arm's reach", target.x, target.y);
    }
    solver.set_target(target);
    let result = animate(&mut solver, frames, print_frames);
    let (chain, angles) = AngleChain::from_configuration(solver.configuration());
    report(solver.name(), &result, &chain, &angles, Some(target));
    Ok(())
}

fn run_scenario(path: &Path, frames: Option<u32>, print_frames: bool) -> Result<()> {
    let scenario = ScenarioConfig::from_file(path)
        .with_context(|| format!("failed to load scenario {}", path.display()))?;
    if scenario.target.is_none() {
        warn!("scenario {} has no target, the arm holds its pose", path.display());
    }
    let mut solver = Solver::from_scenario(&scenario)?;
    info!(
        "loaded {} scenario with {} joints",
        solver.kind(),
        solver.configuration().joint_count()
    );

    let result = match frames {
        Some(frames) => animate(&mut solver, frames, print_frames),
        None => solver.solve(),
    };
    let (chain, angles) = solver_angles(&solver);
    report(solver.kind(), &result, &chain, &angles, solver.target());
    Ok(())
}

fn run_info() -> Result<()> {
    println!("planarm v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  planarm-core {}", env!("CARGO_PKG_VERSION"));
    println!("  planarm-ik   {}", env!("CARGO_PKG_VERSION"));
    println!();

    let chain = AngleChain::new(Point2::origin(), THREE_LINK_LENGTHS.to_vec())?;
    println!("three-link arm:");
    println!("  link lengths: {:?}", chain.link_lengths());
    println!("  reach:        {:.4}", chain.reach());

    let joints = FIVE_JOINTS.iter().map(|&[x, y]| Point2::new(x, y)).collect();
    let arm = ArmConfiguration::from_joints(joints)?;
    let lengths: Vec<String> = arm
        .link_lengths()
        .iter()
        .map(|l| format!("{l:.4}"))
        .collect();
    println!("five-joint arm:");
    println!("  link lengths: [{}]", lengths.join(", "));
    println!("  reach:        {:.4}", arm.reach());
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Gradient {
            target,
            rate,
            tolerance,
            max_iterations,
        }) => run_gradient(target, rate, tolerance, max_iterations),
        Some(Commands::Ccd {
            target,
            step_fraction,
            tolerance,
            frames,
            print_frames,
        }) => run_ccd(target, step_fraction, tolerance, frames, print_frames),
        Some(Commands::Run {
            config,
            frames,
            print_frames,
        }) => run_scenario(&config, frames, print_frames),
        Some(Commands::Info) => run_info(),
        None => run_ccd(Point2::new(0.0, 1.0), 0.2, 1e-2, 200, false),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_point_accepts_negative_coordinates() {
        assert_eq!(parse_point("-1.5, 2.5").unwrap(), Point2::new(-1.5, 2.5));
        assert!(parse_point("1.0").is_err());
        assert!(parse_point("a,1").is_err());
        assert!(parse_point("inf,1").is_err());
    }

    #[test]
    fn ccd_subcommand_parses_target() {
        let cli = Cli::try_parse_from([
            "planarm", "ccd", "--target", "-1.5,2.5", "--frames", "50",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Ccd { target, frames, .. }) => {
                assert_eq!(target, Point2::new(-1.5, 2.5));
                assert_eq!(frames, 50);
            }
            _ => panic!("expected ccd subcommand"),
        }
    }

    #[test]
    fn reference_arms_match_fixtures() {
        assert_eq!(THREE_LINK_LENGTHS, planarm_test_utils::THREE_LINK_LENGTHS);
        assert_eq!(THREE_LINK_ANGLES_DEG, planarm_test_utils::THREE_LINK_ANGLES_DEG);
        let joints: Vec<Point2<f64>> = FIVE_JOINTS
            .iter()
            .map(|&[x, y]| Point2::new(x, y))
            .collect();
        assert_eq!(joints, planarm_test_utils::five_joint_positions());
    }

    #[test]
    fn animate_stops_at_convergence() {
        let joints = FIVE_JOINTS.iter().map(|&[x, y]| Point2::new(x, y)).collect();
        let mut solver = CcdSolver::from_joints(joints, CcdConfig::default()).unwrap();
        solver.set_target(Point2::new(1.0, 2.0));
        let result = animate(&mut solver, 200, false);
        assert!(result.converged);
        assert!(result.iterations < 200);
    }
}
