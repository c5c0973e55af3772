use std::fmt;

/// Represents a single request understood by the card-game server.
///
/// Variants mirror the server's line protocol one to one. `Display` renders
/// the exact wire line without the trailing newline; the connection layer
/// appends it when sending.
///
/// # Example
///
/// ```
/// let put = Command::GamePut { card: "ab".to_owned(), slot: Some(2) };
/// assert_eq!(put.to_string(), "game put ab 2");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Introduces this session under a display name.
    PlayerName(String),
    /// Free-text status of this player. Diagnostic only.
    PlayerState,
    /// Names of all players the server currently knows about. Diagnostic only.
    PlayerList,
    /// Lists open tables, one handle-led line per table.
    TableList,
    /// Opens a new table under a label.
    TableNew(String),
    /// Joins the table behind a handle captured from a `TableList` reply.
    TableJoin(String),
    /// Starts the game. Only valid for the table's initiating player.
    GameStart,
    /// Queries the game state. Answers `cards ...` once the game is running.
    GameState,
    /// Plays a card, optionally into a specific slot. Without a slot the
    /// server decides whether the bare form is acceptable.
    GamePut { card: String, slot: Option<u8> },
    /// Ends this session.
    Quit,
    /// Asks the server to shut down entirely.
    Shutdown,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PlayerName(name) => write!(f, "player name {name}"),
            Command::PlayerState => write!(f, "player state"),
            Command::PlayerList => write!(f, "player list"),
            Command::TableList => write!(f, "table list"),
            Command::TableNew(label) => write!(f, "table new {label}"),
            Command::TableJoin(handle) => write!(f, "table join {handle}"),
            Command::GameStart => write!(f, "game start"),
            Command::GameState => write!(f, "game state"),
            Command::GamePut { card, slot: None } => write!(f, "game put {card}"),
            Command::GamePut {
                card,
                slot: Some(slot),
            } => write!(f, "game put {card} {slot}"),
            Command::Quit => write!(f, "quit"),
            Command::Shutdown => write!(f, "shutdown"),
        }
    }
}

// ******************************************************************************************
// ************************************* UNIT TESTS *****************************************
// ******************************************************************************************
