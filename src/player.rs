use std::time::Duration;

use anyhow::Context;
use rand::Rng;
use text_colorizer::Colorize;
use tokio::time::sleep;

use crate::connection::{self, LineConnection};
use crate::error::HarnessError;
use crate::parser::{self, TURN_CARD_COUNT};
use crate::protocol::Command;
use crate::roster::PlayerIdentity;

/// Number of turns in a scripted game. One card of the snapshot is played
/// per turn.
pub const GAME_TURNS: usize = TURN_CARD_COUNT;

/// Number of slots tried for every card. The server never advertises which
/// slot a card is valid in, so the simulator enumerates all of them.
pub const SLOT_COUNT: u8 = 5;

/// Pacing policy for one harness run.
///
/// Grace periods stagger the players so the starter has a table up before
/// the joiners look for one; the poll fields bound the readiness loop that
/// waits for the game to begin. Defaults are tuned for a real server; tests
/// construct much faster variants.
#[derive(Debug, Clone)]
pub struct Timing {
    /// How long a single request waits for its reply.
    pub read_timeout: Duration,
    /// Pause between launching consecutive players, so table discovery
    /// happens in roster order.
    pub spawn_stagger: Duration,
    /// Quiet period the starter grants the joiners before `game start`.
    pub start_grace: Duration,
    /// Per-ordinal quiet period for joiners after joining, scaled by their
    /// position to spread the polling load.
    pub join_grace: Duration,
    /// Upper bound on `game state` polls before giving up. The bound keeps
    /// a stalled server from livelocking the whole run.
    pub poll_attempts: u32,
    /// Base delay between polls. Grows linearly with the attempt number.
    pub poll_backoff: Duration,
    /// Ceiling for the poll delay.
    pub poll_backoff_cap: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            read_timeout: connection::READ_TIMEOUT,
            spawn_stagger: Duration::from_millis(250),
            start_grace: Duration::from_secs(2),
            join_grace: Duration::from_secs(1),
            poll_attempts: 50,
            poll_backoff: Duration::from_millis(100),
            poll_backoff_cap: Duration::from_secs(1),
        }
    }
}

/// Drives one simulated player from `player name` all the way to `quit`.
pub struct PlayerSimulator {
    identity: PlayerIdentity,
    connection: LineConnection,
    timing: Timing,
}

impl PlayerSimulator {
    /// Connects to the server and returns a fully formed simulator, ready
    /// to be handed to the runtime. Connecting here rather than inside
    /// `run` keeps the worker's state complete before it is ever scheduled.
    pub async fn connect(
        address: &str,
        identity: PlayerIdentity,
        timing: Timing,
    ) -> Result<Self, HarnessError> {
        let connection =
            LineConnection::open(address, identity.name(), timing.read_timeout).await?;
        Ok(Self {
            identity,
            connection,
            timing,
        })
    }

    /// Runs the whole lifecycle. The connection is released on every exit
    /// path, error or not.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let outcome = self.simulate().await;
        self.connection.close().await;
        outcome.with_context(|| format!("player '{}' aborted", self.identity.name()))
    }

    async fn simulate(&mut self) -> anyhow::Result<()> {
        self.expect_ok(Command::PlayerName(self.identity.name().to_owned()))
            .await?;

        let table = self.find_table().await?;
        self.expect_ok(Command::TableJoin(table)).await?;
        self.report(Command::PlayerState).await?;
        self.report(Command::PlayerList).await?;

        if self.identity.is_starter() {
            // Give the joiners time to arrive before starting.
            sleep(self.timing.start_grace).await;
            self.expect_ok(Command::GameStart).await?;
        } else {
            sleep(self.timing.join_grace * self.identity.ordinal() as u32).await;
        }

        // One card per turn, in snapshot order.
        let snapshot = self.await_first_turn().await?;
        for card in &snapshot {
            self.play_turn(card).await?;
            self.report(Command::GameState).await?;
        }

        self.report(Command::PlayerState).await?;
        if self.identity.is_starter() {
            // Ends the session; the server may hang up instead of
            // answering, which is fine.
            let _ = self.connection.request(&Command::Quit).await;
        }

        Ok(())
    }

    /// Discovers a table to join, creating one if the listing is empty. The
    /// server does not echo the handle on creation, so a fresh table only
    /// becomes visible through a second listing.
    async fn find_table(&mut self) -> Result<String, HarnessError> {
        if let Some(handle) = self.list_tables().await? {
            return Ok(handle);
        }

        self.expect_ok(Command::TableNew(self.identity.table_label()))
            .await?;
        self.list_tables().await?.ok_or(HarnessError::NoTable)
    }

    async fn list_tables(&mut self) -> Result<Option<String>, HarnessError> {
        let reply = self.connection.request(&Command::TableList).await?;
        Ok(reply
            .as_deref()
            .and_then(parser::extract_table_handle)
            .map(str::to_owned))
    }

    /// Waits for the game to produce the first turn snapshot.
    ///
    /// Until every seat is taken and the starter has begun the game, the
    /// server answers `game state` with a status line or not at all. This
    /// polls with a growing, jittered delay and gives up after a bounded
    /// number of attempts rather than spinning forever.
    async fn await_first_turn(&mut self) -> Result<[String; TURN_CARD_COUNT], HarnessError> {
        for attempt in 0..self.timing.poll_attempts {
            if let Some(reply) = self.connection.request(&Command::GameState).await? {
                if let Some(cards) = parser::extract_turn_cards(&reply) {
                    return Ok(cards);
                }
            }
            sleep(self.poll_delay(attempt)).await;
        }

        Err(HarnessError::ProtocolTimeout {
            attempts: self.timing.poll_attempts,
        })
    }

    /// Linear backoff with a little jitter so several pollers do not hit
    /// the server in lockstep.
    fn poll_delay(&self, attempt: u32) -> Duration {
        let base = self
            .timing
            .poll_backoff
            .saturating_mul(attempt + 1)
            .min(self.timing.poll_backoff_cap);
        let jitter_ms = rand::thread_rng().gen_range(0..=(base.as_millis() / 4).max(1) as u64);
        base + Duration::from_millis(jitter_ms)
    }

    /// Plays one card by exhaustive trial.
    ///
    /// The valid slot for a card is decided by server-side rules the client
    /// cannot see, so it submits the bare put first and then every slot in
    /// increasing order. The server accepts exactly one of the attempts and
    /// rejects the rest; which one succeeded is deliberately not detected
    /// here.
    async fn play_turn(&mut self, card: &str) -> Result<(), HarnessError> {
        self.submit_quiet(Command::GamePut {
            card: card.to_owned(),
            slot: None,
        })
        .await?;

        for slot in 0..SLOT_COUNT {
            self.submit_quiet(Command::GamePut {
                card: card.to_owned(),
                slot: Some(slot),
            })
            .await?;
        }

        Ok(())
    }

    /// Sends a command whose failure would invalidate the whole simulation.
    /// Silence counts as success; only an explicit ERROR reply is fatal.
    async fn expect_ok(&mut self, command: Command) -> Result<(), HarnessError> {
        if let Some(text) = self.connection.request(&command).await? {
            if parser::is_error(&text) {
                return Err(HarnessError::Rejected {
                    command: command.to_string(),
                    reply: text.trim_end().to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Sends the speculative flavor of a command. Rejections are expected
    /// here and only traced, never surfaced.
    async fn submit_quiet(&mut self, command: Command) -> Result<(), HarnessError> {
        match self.connection.request(&command).await? {
            Some(text) if parser::is_error(&text) => {
                log::debug!(
                    "[{}] rejected as expected: {command} -> {}",
                    self.identity.name(),
                    text.trim_end()
                );
            }
            Some(text) => {
                log::debug!("[{}] accepted: {command} -> {}", self.identity.name(), text.trim_end());
            }
            None => {
                log::debug!("[{}] no reply to {command}", self.identity.name());
            }
        }
        Ok(())
    }

    /// Polls a diagnostic command once and prints whatever came back.
    async fn report(&mut self, command: Command) -> Result<(), HarnessError> {
        match self.connection.request(&command).await? {
            Some(text) => {
                println!(
                    "{} {}",
                    format!("[{}]", self.identity.name()).bold(),
                    text.trim_end()
                );
            }
            None => log::debug!("[{}] no reply to diagnostic '{command}'", self.identity.name()),
        }
        Ok(())
    }
}

// ******************************************************************************************
// ************************************* UNIT TESTS *****************************************
// ******************************************************************************************
