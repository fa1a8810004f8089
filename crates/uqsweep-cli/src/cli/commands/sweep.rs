use crate::cli::args::Cli;
use crate::exit_codes::SUCCESS;
use anyhow::{Context, Result};
use uqsweep_core::report::DispatchEntry;
use uqsweep_core::{run_sweep, ProcessRunner, SweepConfig, SweepReport, SweepSettings};

pub fn run(args: Cli) -> Result<i32> {
    let config = match &args.config {
        Some(path) => SweepConfig::load(path)?,
        None => SweepConfig::builtin(),
    };

    let program =
        ProcessRunner::resolve_program(args.runner.as_deref(), config.runner.program.as_deref());
    let runner = ProcessRunner::new(program).with_args(config.runner.args.iter().cloned());

    let settings = SweepSettings {
        surrogates: args.surrogate.kinds(),
        mode: args.mode(),
        options: args.run_options(),
    };

    println!("Surrogate Benchmark Sweep");
    println!("=========================");
    println!(
        "Surrogates: {}",
        settings
            .surrogates
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Mode:       {:?}", settings.mode);
    println!("Runner:     {}", runner.program().display());
    match &args.config {
        Some(path) => println!("Config:     {}", path.display()),
        None => println!("Config:     (built-in atan tables)"),
    }
    println!();

    let outcome = run_sweep(&config, &settings, &runner).context("sweep aborted")?;

    print_table(&outcome.report);

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&outcome.report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
        println!("Report saved to {}", path.display());
    }

    // Started workers are detached: they keep running after this process exits.
    drop(outcome.workers);
    Ok(SUCCESS)
}

fn print_table(report: &SweepReport) {
    println!(
        "{:<6} {:<5} {:<10} {:<45} {:<8} {:<12}",
        "INDEX", "KIND", "DIST", "SCENARIO", "BUDGET", "STATUS"
    );
    println!("{:-<6} {:-<5} {:-<10} {:-<45} {:-<8} {:-<12}", "", "", "", "", "", "");
    for entry in &report.entries {
        println!(
            "{:<6} {:<5} {:<10} {:<45} {:<8} {:<12}",
            entry.index,
            entry.kind.to_string(),
            entry.distribution,
            scenario_cell(entry),
            entry.budget,
            format!("{:?}", entry.status)
        );
    }
    println!();

    let s = &report.summary;
    println!(
        "SUMMARY: total={} completed={} planned={} started={} start_failed={}",
        s.total, s.completed, s.planned, s.started, s.start_failed
    );
    if s.start_failed > 0 {
        eprintln!(
            "\n{} worker(s) failed to start; see the log above.",
            s.start_failed
        );
    }
}

fn scenario_cell(entry: &DispatchEntry) -> String {
    entry
        .params
        .iter()
        .map(|p| p.value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
