use super::args::Cli;

pub mod sweep;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    sweep::run(cli)
}
