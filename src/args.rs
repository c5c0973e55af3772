use std::path::PathBuf;

use clap::Parser;

/// This program exercises a line-protocol card-game server by simulating a
/// full table of concurrent players. Each player connects on its own, finds
/// or creates a table, joins it, and plays the scripted five turns by
/// brute-forcing the slot of every card. The first player additionally
/// starts the game, and the harness shuts the server down once every player
/// is done.
#[derive(Parser, Debug, PartialEq)]
#[command(about, version)]
pub struct Args {
    /// Address of the game server under test
    #[arg(long, default_value = "127.0.0.1:2342")]
    pub server: String,

    /// Number of players to simulate (ignored when --roster is given)
    #[arg(long, default_value_t = 4)]
    pub players: usize,

    /// JSON file with an array of player names, in seating order
    #[arg(long)]
    pub roster: Option<PathBuf>,
}

impl Args {
    /// Checks the parsed values against the program's constraints.
    pub fn validate(&self) -> Result<(), String> {
        if self.players == 0 {
            return Err("error: --players must be greater than 0".to_owned());
        }
        Ok(())
    }
}

// ******************************************************************************************
// ************************************* UNIT TESTS *****************************************
// ******************************************************************************************
