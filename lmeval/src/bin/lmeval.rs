use anyhow::Result;
use clap::Parser;
use lmeval::cli::{run, Cli};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(Cli::parse())
}
