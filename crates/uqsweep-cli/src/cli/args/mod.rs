use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use uqsweep_core::{ExecutionMode, RunOptions, SurrogateKind};

#[cfg(test)]
mod tests;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "uqsweep",
    version,
    about = "Sweep sparse-grid and polynomial-chaos surrogates over their benchmark scenarios"
)]
pub struct Cli {
    /// Surrogate models to sweep: sg | pce | both (sparse grids first)
    #[arg(long, value_enum, default_value_t = SurrogateArg::Both)]
    pub surrogate: SurrogateArg,

    /// Run the full model (forwarded to sparse-grid runs as isFull)
    #[arg(long)]
    pub full: bool,

    /// Run the reduced model (forwarded unchanged to sparse-grid runs only)
    #[arg(long)]
    pub reduced: bool,

    /// Let runners write their results to file
    #[arg(long)]
    pub out: bool,

    /// Plot results (1d)
    #[arg(long)]
    pub plot: bool,

    /// Run every scenario in its own process, started after enumeration
    #[arg(long)]
    pub parallel: bool,

    /// Sweep file (YAML) replacing the built-in scenario tables
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Runner program invoked once per scenario and budget
    #[arg(long, env = "UQSWEEP_RUNNER")]
    pub runner: Option<PathBuf>,

    /// Print the scenarios without running or spawning anything
    #[arg(long)]
    pub dry_run: bool,

    /// Write the JSON dispatch report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Cli {
    pub fn mode(&self) -> ExecutionMode {
        if self.dry_run {
            ExecutionMode::DryRun
        } else if self.parallel {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Synchronous
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            full: self.full,
            reduced: self.reduced,
            write_out: self.out,
            plot: self.plot,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SurrogateArg {
    Sg,
    Pce,
    #[default]
    Both,
}

impl SurrogateArg {
    pub fn kinds(self) -> Vec<SurrogateKind> {
        match self {
            SurrogateArg::Sg => vec![SurrogateKind::SparseGrid],
            SurrogateArg::Pce => vec![SurrogateKind::PolynomialChaosExpansion],
            SurrogateArg::Both => vec![
                SurrogateKind::SparseGrid,
                SurrogateKind::PolynomialChaosExpansion,
            ],
        }
    }
}
