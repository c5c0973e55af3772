use std::io;

use thiserror::Error;

/// Conditions that end a single player simulation.
///
/// Absence of data is never an error in this harness: a read timeout and a
/// reply that fails to parse are both represented as `None` by the connection
/// and parser layers so that polling loops can simply retry. The variants
/// below are the conditions that actually terminate a simulator. Each
/// simulator is its own blast radius; none of these ever crash the
/// orchestrator or sibling players.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The server endpoint could not be reached.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The server closed the connection mid-session. Reconnection is not
    /// attempted; a dropped connection ends that player's simulation.
    #[error("server closed the connection")]
    ConnectionClosed,

    /// Transport failure while draining or sending.
    #[error("connection i/o failed: {0}")]
    Io(#[from] io::Error),

    /// The bounded readiness poll ran out of attempts before the server
    /// produced a parsable turn.
    #[error("no parsable game state after {attempts} polling attempts")]
    ProtocolTimeout { attempts: u32 },

    /// No table could be discovered, even after creating one.
    #[error("no table available to join")]
    NoTable,

    /// A command that must succeed was answered with an ERROR line.
    /// Speculative move submissions never produce this variant; their
    /// rejections are expected and suppressed.
    #[error("server rejected '{command}': {reply}")]
    Rejected { command: String, reply: String },
}
