use anyhow::bail;
use clap::Parser;
use text_colorizer::Colorize;

use crate::args::Args;
use crate::orchestrator::Orchestrator;
use crate::player::Timing;
use crate::roster::Roster;

mod args;
mod connection;
mod error;
mod orchestrator;
mod parser;
mod player;
mod protocol;
mod roster;
#[cfg(test)]
mod testutil;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = args.validate() {
        bail!(e);
    }

    let roster = match &args.roster {
        Some(path) => Roster::from_file(path)?,
        None => Roster::generate(args.players),
    };

    let orchestrator = Orchestrator::new(&args.server, roster, Timing::default());
    let summary = orchestrator.run().await;

    if summary.failed > 0 {
        bail!(
            "{} of {} players did not finish",
            summary.failed,
            summary.completed + summary.failed
        );
    }

    println!("{}", "[+] All players finished".bold().green());
    Ok(())
}

// ******************************************************************************************
// ************************************* UNIT TESTS *****************************************
// ******************************************************************************************
