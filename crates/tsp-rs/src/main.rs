//! Command-line entry point. Loads or generates an instance, builds a starting tour, drives the
//! pure-cut loop and (if enabled) the branch controller, and writes the result. No argument
//! parsing crate is pulled in: the flag set is small enough to hand-parse directly.

use std::{path::PathBuf, process::ExitCode};

use log::{error, info, warn};
use thiserror::Error;

use tsp_core::{Instance, Node};
use tsp_lp::{simplex::DenseBoundedSimplex, LpSolver};
use tsp_solvers::{
    branch::{BranchController, BranchOutcome, NodeBudget},
    context::CutSelectionPreset,
    corelp::PivType,
    pure_cut::cutting_loop,
    SolverContext,
};

const DEFAULT_GRID: u32 = 1_000_000;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    BadInput(String),
    #[error("{0}")]
    Runtime(String),
}

impl From<tsp_parser::ParserError> for CliError {
    fn from(err: tsp_parser::ParserError) -> Self {
        CliError::BadInput(err.to_string())
    }
}

impl From<tsp_core::error::SolveError> for CliError {
    fn from(err: tsp_core::error::SolveError) -> Self {
        match &err {
            tsp_core::error::SolveError::BadInput(_) => CliError::BadInput(err.to_string()),
            _ => CliError::Runtime(err.to_string()),
        }
    }
}

struct CliArgs {
    problem_file: Option<PathBuf>,
    seed: u64,
    node_count: Option<usize>,
    grid_size: u32,
    tour_file: Option<PathBuf>,
    preset: CutSelectionPreset,
    pricing: bool,
    branching: bool,
    out_prefix: Option<String>,
    write_xy: bool,
    max_branch_nodes: Option<usize>,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            problem_file: None,
            seed: 0,
            node_count: None,
            grid_size: DEFAULT_GRID,
            tour_file: None,
            preset: CutSelectionPreset::Vanilla,
            pricing: true,
            branching: true,
            out_prefix: None,
            write_xy: false,
            max_branch_nodes: None,
        }
    }
}

fn usage() -> String {
    "usage: tsp-rs <problem.tsp> | -R ncount [-s seed] [-g grid]\n          \
     [-t tour.sol] [-c vanilla|aggressive|sparse] [-p on|off] [-b on|off]\n          \
     [-n max-branch-nodes] [-o out-prefix] [-x]"
        .to_string()
}

fn parse_args(argv: impl IntoIterator<Item = String>) -> Result<CliArgs, CliError> {
    let mut args = CliArgs::default();
    let mut iter = argv.into_iter();
    let mut positional: Option<String> = None;

    fn need_value(flag: &str, iter: &mut impl Iterator<Item = String>) -> Result<String, CliError> {
        iter.next().ok_or_else(|| CliError::Usage(format!("{flag} requires a value\n{}", usage())))
    }

    while let Some(tok) = iter.next() {
        match tok.as_str() {
            "-s" => args.seed = parse_num(&need_value("-s", &mut iter)?)?,
            "-R" => args.node_count = Some(parse_num(&need_value("-R", &mut iter)?)?),
            "-g" => args.grid_size = parse_num(&need_value("-g", &mut iter)?)?,
            "-t" => args.tour_file = Some(PathBuf::from(need_value("-t", &mut iter)?)),
            "-o" => args.out_prefix = Some(need_value("-o", &mut iter)?),
            "-n" => args.max_branch_nodes = Some(parse_num(&need_value("-n", &mut iter)?)?),
            "-x" => args.write_xy = true,
            "-c" => {
                let val = need_value("-c", &mut iter)?;
                args.preset = match val.as_str() {
                    "vanilla" => CutSelectionPreset::Vanilla,
                    "aggressive" => CutSelectionPreset::Aggressive,
                    "sparse" => CutSelectionPreset::Sparse,
                    other => return Err(CliError::Usage(format!("unknown preset '{other}'\n{}", usage()))),
                };
            }
            "-p" => args.pricing = parse_toggle("-p", &need_value("-p", &mut iter)?)?,
            "-b" => args.branching = parse_toggle("-b", &need_value("-b", &mut iter)?)?,
            "-h" | "--help" => return Err(CliError::Usage(usage())),
            other if other.starts_with('-') => {
                return Err(CliError::Usage(format!("unrecognized flag '{other}'\n{}", usage())))
            }
            other => {
                if positional.is_some() {
                    return Err(CliError::Usage(format!("unexpected extra argument '{other}'\n{}", usage())));
                }
                positional = Some(other.to_string());
            }
        }
    }
    args.problem_file = positional.map(PathBuf::from);

    match (&args.problem_file, args.node_count) {
        (Some(_), Some(_)) => {
            return Err(CliError::Usage(format!(
                "pass either a problem file or -R ncount, not both\n{}",
                usage()
            )))
        }
        (None, None) => return Err(CliError::Usage(usage())),
        _ => {}
    }
    Ok(args)
}

fn parse_num<T: std::str::FromStr>(raw: &str) -> Result<T, CliError> {
    raw.parse()
        .map_err(|_| CliError::Usage(format!("'{raw}' is not a valid number\n{}", usage())))
}

fn parse_toggle(flag: &str, raw: &str) -> Result<bool, CliError> {
    match raw {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(CliError::Usage(format!("{flag} expects on|off, got '{other}'\n{}", usage()))),
    }
}

/// Nearest-neighbor construction for the initial tour when no `-t` file is given: the same
/// greedy-nearest-unvisited step the x-tour heuristic uses to complete a broken fragment set,
/// here run from scratch over every node.
fn nearest_neighbor_tour(instance: &Instance) -> Vec<Node> {
    let n = instance.dimension();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut current = Node(0);
    visited[0] = true;
    order.push(current);
    for _ in 1..n {
        let next = (0..n)
            .filter(|&i| !visited[i])
            .map(Node)
            .min_by_key(|&cand| instance.length(current, cand))
            .expect("n - order.len() unvisited nodes remain");
        visited[next.0] = true;
        order.push(next);
        current = next;
    }
    order
}

fn load_instance(args: &CliArgs) -> Result<Instance, CliError> {
    if let Some(path) = &args.problem_file {
        Ok(tsp_parser::parse_instance(path)?)
    } else {
        let node_count = args.node_count.expect("checked by parse_args");
        Ok(tsp_parser::random_euclidean_instance(args.seed, node_count, args.grid_size))
    }
}

fn starting_tour(args: &CliArgs, instance: &Instance) -> Result<Vec<Node>, CliError> {
    match &args.tour_file {
        Some(path) => {
            let nodes = tsp_parser::read_tour(path)?;
            if nodes.len() != instance.dimension() {
                return Err(CliError::BadInput(format!(
                    "starting tour has {} nodes, instance has {}",
                    nodes.len(),
                    instance.dimension()
                )));
            }
            Ok(nodes)
        }
        None => Ok(nearest_neighbor_tour(instance)),
    }
}

fn write_outputs(args: &CliArgs, instance: &Instance, best: &[Node]) -> Result<(), CliError> {
    let prefix = args
        .out_prefix
        .clone()
        .unwrap_or_else(|| instance.metadata().name.clone());
    tsp_parser::write_tour(format!("{prefix}.sol"), best)?;
    tsp_parser::write_tour_edges(format!("{prefix}_tour.x"), best)?;
    if args.write_xy {
        match &instance.metadata().coords {
            Some(coords) => tsp_parser::write_xy(format!("{prefix}.xy"), coords)?,
            None => warn!("-x given but instance carries no node coordinates, skipping .xy dump"),
        }
    }
    Ok(())
}

fn run(args: CliArgs) -> Result<bool, CliError> {
    let instance = load_instance(&args)?;
    info!(
        "loaded instance '{}' with {} nodes",
        instance.metadata().name,
        instance.dimension()
    );

    let tour_nodes = starting_tour(&args, &instance)?;
    let lp: Box<dyn LpSolver> = Box::new(DenseBoundedSimplex::new());
    let mut ctx = SolverContext::new(
        instance,
        lp,
        tour_nodes,
        args.preset,
        args.seed,
        args.pricing,
        args.branching,
    )?;
    info!("starting tour length {:?}", ctx.best_length());

    let piv = cutting_loop(&mut ctx, args.pricing, true)?;

    let proved_optimal = match piv {
        PivType::FathomedTour => true,
        PivType::Tour => unreachable!("cutting_loop never returns on a Tour pivot"),
        PivType::Subtour => unreachable!("cutting_loop never returns on an unresolved Subtour pivot"),
        PivType::Frac => {
            if ctx.branching_enabled {
                let budget = NodeBudget { max_nodes: args.max_branch_nodes };
                match BranchController::new().run(&mut ctx, &budget)? {
                    BranchOutcome::Exhausted => true,
                    BranchOutcome::BudgetExpired => {
                        info!("branch node budget expired before the tree was exhausted");
                        false
                    }
                }
            } else {
                warn!("branching disabled and the cutting loop could not fathom the root; reporting the best heuristic tour found");
                false
            }
        }
    };

    write_outputs(&args, &ctx.instance, ctx.best_tour.nodes())?;

    if proved_optimal {
        info!("proved optimum: {:?}", ctx.best_length());
    } else {
        info!("best known tour on exit: {:?} (not proved optimal)", ctx.best_length());
    }
    Ok(proved_optimal)
}

fn main() -> ExitCode {
    env_logger::init();
    let argv = std::env::args().skip(1);
    let parsed = match parse_args(argv) {
        Ok(args) => args,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            return ExitCode::from(1);
        }
        Err(other) => {
            error!("{other}");
            return ExitCode::from(1);
        }
    };

    match run(parsed) {
        // Exit 0 covers both a proved optimum and a budget-expired informational stop: the run
        // itself completed without error either way.
        Ok(_) => ExitCode::from(0),
        Err(CliError::Usage(msg)) | Err(CliError::BadInput(msg)) => {
            error!("{msg}");
            ExitCode::from(1)
        }
        Err(CliError::Runtime(msg)) => {
            error!("{msg}");
            ExitCode::from(2)
        }
    }
}
