pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{align::Align, command::Command};
use enum_dispatch::enum_dispatch;
use env_logger::Env;

#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[enum_dispatch(Command)]
#[derive(Parser, Debug)]
enum Subcommand {
    Align(Align),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args: Args = Args::parse();
    args.subcommand.execute()
}
