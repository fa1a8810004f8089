use super::*;
use clap::CommandFactory;
use clap::Parser;

#[test]
fn cli_debug_assert() {
    Cli::command().debug_assert();
}

#[test]
fn defaults_sweep_both_kinds_synchronously() {
    let cli = Cli::try_parse_from(["uqsweep"]).expect("parse should succeed");
    assert_eq!(cli.surrogate, SurrogateArg::Both);
    assert_eq!(
        cli.surrogate.kinds(),
        vec![
            SurrogateKind::SparseGrid,
            SurrogateKind::PolynomialChaosExpansion
        ]
    );
    assert_eq!(cli.mode(), ExecutionMode::Synchronous);
    assert_eq!(cli.run_options(), RunOptions::default());
    assert!(cli.config.is_none());
    assert!(cli.report.is_none());
}

#[test]
fn flags_map_to_run_options() {
    let cli = Cli::try_parse_from([
        "uqsweep",
        "--surrogate",
        "sg",
        "--full",
        "--reduced",
        "--out",
        "--plot",
        "--parallel",
    ])
    .expect("parse should succeed");

    assert_eq!(cli.surrogate.kinds(), vec![SurrogateKind::SparseGrid]);
    assert_eq!(cli.mode(), ExecutionMode::Parallel);
    assert_eq!(
        cli.run_options(),
        RunOptions {
            full: true,
            reduced: true,
            write_out: true,
            plot: true,
        }
    );
}

#[test]
fn dry_run_takes_precedence_over_parallel() {
    let cli = Cli::try_parse_from(["uqsweep", "--parallel", "--dry-run"]).unwrap();
    assert_eq!(cli.mode(), ExecutionMode::DryRun);
}

#[test]
fn unknown_surrogate_rejected() {
    let err = Cli::try_parse_from(["uqsweep", "--surrogate", "kriging"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
}

#[test]
fn sparse_grid_only_flags_say_so_in_help() {
    let cmd = Cli::command();
    for id in ["full", "reduced"] {
        let help = cmd
            .get_arguments()
            .find(|a| a.get_id() == id)
            .and_then(|a| a.get_help())
            .map(ToString::to_string)
            .unwrap_or_default();
        assert!(help.contains("sparse-grid"), "--{id} help: {help}");
    }
}
