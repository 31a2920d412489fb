//! qbfpt CLI: Tabu Search over QBF-PT instance files.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use qbfpt_tabu::experiment::Experiment;
use qbfpt_tabu::tabu::{Objective, TabuConfig, TabuResult};
use qbfpt_tabu::QbfPt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qbfpt")]
#[command(about = "Tabu Search for quadratic binary functions with prohibited triples")]
#[command(version)]
struct Cli {
    /// Instance files (dimension followed by the upper triangle of A)
    #[arg(required = true)]
    instances: Vec<PathBuf>,

    /// Tabu tenure
    #[arg(short, long, default_value = "10")]
    tenure: usize,

    /// Number of iterations
    #[arg(short, long, default_value = "1000")]
    iterations: usize,

    /// Scan every move instead of stopping at the first improving one
    #[arg(long)]
    best_improving: bool,

    /// Enable power-move diversification
    #[arg(long)]
    power_moves: bool,

    /// Enable restart intensification
    #[arg(long)]
    restart: bool,

    /// Minimize f(x) instead of maximizing it
    #[arg(long)]
    minimize: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Run the standard variant suite on every instance
    #[arg(long)]
    suite: bool,
}

impl Cli {
    fn config(&self) -> TabuConfig {
        let objective = if self.minimize {
            Objective::Minimize
        } else {
            Objective::Maximize
        };
        let config = TabuConfig::default()
            .with_tenure(self.tenure)
            .with_max_iterations(self.iterations)
            .with_best_improving(self.best_improving)
            .with_power_moves(self.power_moves)
            .with_restart(self.restart)
            .with_objective(objective);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    for instance in &cli.instances {
        let outcome = if cli.suite {
            cmd_suite(instance, &cli)
        } else {
            cmd_solve(instance, &cli.config())
        };
        if let Err(e) = outcome {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_solve(path: &Path, config: &TabuConfig) -> qbfpt_tabu::Result<()> {
    let problem = QbfPt::load(path)?;
    let start = Instant::now();
    let result = problem.solve(config)?;
    let elapsed = start.elapsed().as_secs_f64();

    println!("{}", path.display());
    print_result(&result, elapsed);
    Ok(())
}

fn cmd_suite(path: &Path, cli: &Cli) -> qbfpt_tabu::Result<()> {
    let problem = QbfPt::load(path)?;
    let mut suite = Experiment::standard_suite(problem.model().size(), cli.iterations);
    if let Some(seed) = cli.seed {
        suite = suite.with_seed(seed);
    }

    for summary in suite.run(&problem)? {
        println!("{} [{}]", path.display(), summary.label);
        print_result(&summary.result, summary.elapsed.as_secs_f64());
    }
    Ok(())
}

fn print_result(result: &TabuResult, elapsed: f64) {
    println!("{}", result.best.bit_string());
    println!("maxVal = {}", result.best_value);
    println!(
        "best at iteration {} of {}, restarts {}, power phases {}",
        result.best_iteration, result.iterations, result.restarts, result.power_phases
    );
    println!("Time = {elapsed:.3} s");
    println!();
}
