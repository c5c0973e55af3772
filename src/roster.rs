use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Represents the identity of one simulated player.
///
/// The ordinal doubles as the player's role: ordinal 0 is the starter, who
/// creates the table, starts the game, and ends the session; every other
/// ordinal joins and waits its turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerIdentity {
    /// The display name announced to the server.
    name: String,
    /// The player's position in the roster. Determines the starter role and
    /// the magnitude of this player's stagger delays.
    ordinal: usize,
}

impl PlayerIdentity {
    pub fn new(name: &str, ordinal: usize) -> Self {
        Self {
            name: name.to_owned(),
            ordinal,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The starter creates the table, starts the game and closes the
    /// session down at the end.
    pub fn is_starter(&self) -> bool {
        self.ordinal == 0
    }

    /// Label for the table this player would open.
    pub fn table_label(&self) -> String {
        format!("{}-table", self.name)
    }
}

/// An ordered list of player identities for one harness run.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    players: Vec<PlayerIdentity>,
}

impl Roster {
    /// Returns a roster of `count` distinct numbered identities.
    pub fn generate(count: usize) -> Self {
        let players = (0..count)
            .map(|ordinal| PlayerIdentity::new(&format!("player-{}", ordinal + 1), ordinal))
            .collect();
        Self { players }
    }

    /// Receives the contents of a roster file, a JSON array of player names
    /// in seating order, and attempts to build a roster from it. Ordinals
    /// follow the order of the array.
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let names: Vec<String> =
            serde_json::from_str(raw).context("roster must be a JSON array of player names")?;
        anyhow::ensure!(!names.is_empty(), "roster lists no players");

        let players = names
            .iter()
            .enumerate()
            .map(|(ordinal, name)| PlayerIdentity::new(name, ordinal))
            .collect();
        Ok(Self { players })
    }

    /// Attempts to read a roster from the JSON file at `path`.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read roster file {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn players(&self) -> &[PlayerIdentity] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }
}

// ******************************************************************************************
// ************************************* UNIT TESTS *****************************************
// ******************************************************************************************
