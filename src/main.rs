use anyhow::Result;
use clap::Parser;

use inputmap::cli::CliArgs;

fn main() -> Result<()> {
    inputmap::tracing::init();

    let args = CliArgs::parse();
    tracing::debug!(command = ?args.command, "starting");

    let stdout = std::io::stdout();
    args.run(&mut stdout.lock())
}
