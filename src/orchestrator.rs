use text_colorizer::Colorize;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::connection::LineConnection;
use crate::player::{PlayerSimulator, Timing};
use crate::protocol::Command;
use crate::roster::Roster;

/// Runs a full multi-player session against one server.
///
/// Every player gets its own task and its own connection; nothing is shared
/// between them. The orchestrator launches the players in roster order,
/// waits for all of them at a single join barrier, and then tells the
/// server to shut down. One player failing is reported and does not disturb
/// the rest.
pub struct Orchestrator {
    address: String,
    roster: Roster,
    timing: Timing,
}

/// How a run went, per player.
#[derive(Debug, Default, PartialEq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
}

impl Orchestrator {
    pub fn new(address: &str, roster: Roster, timing: Timing) -> Self {
        Self {
            address: address.to_owned(),
            roster,
            timing,
        }
    }

    /// Plays one full scripted game and shuts the server down afterwards.
    pub async fn run(&self) -> RunSummary {
        println!(
            "{} {} {}",
            "[+] Simulating".bold(),
            self.roster.len(),
            format!("players against {}", self.address).bold()
        );

        let mut summary = RunSummary::default();
        let mut handles: Vec<(String, JoinHandle<anyhow::Result<()>>)> = Vec::new();

        for identity in self.roster.players() {
            if identity.ordinal() > 0 {
                sleep(self.timing.spawn_stagger).await;
            }

            let name = identity.name().to_owned();
            // The simulator is fully constructed, connection included,
            // before the task that runs it ever exists.
            match PlayerSimulator::connect(&self.address, identity.clone(), self.timing.clone())
                .await
            {
                Ok(simulator) => handles.push((name, tokio::spawn(simulator.run()))),
                Err(e) => {
                    summary.failed += 1;
                    eprintln!("{}", format!("[!] Player '{name}' failed to connect: {e}").red().bold());
                }
            }
        }

        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(())) => {
                    summary.completed += 1;
                    println!("{}", format!("[+] Player '{name}' finished").bold());
                }
                Ok(Err(e)) => {
                    summary.failed += 1;
                    eprintln!("{}", format!("[!] Player '{name}' failed: {e:#}").red().bold());
                }
                Err(e) => {
                    summary.failed += 1;
                    eprintln!("{}", format!("[!] Player '{name}' task panicked: {e}").red().bold());
                }
            }
        }

        self.shutdown_server().await;
        summary
    }

    /// Tells the server to shut down over a dedicated short-lived
    /// connection. The server usually hangs up instead of answering, so
    /// only a failure to reach it at all is reported.
    async fn shutdown_server(&self) {
        match LineConnection::open(&self.address, "orchestrator", self.timing.read_timeout).await {
            Ok(mut connection) => {
                let _ = connection.request(&Command::Shutdown).await;
                connection.close().await;
                println!("{}", "[+] Shutdown command delivered".bold());
            }
            Err(e) => {
                eprintln!("{}", format!("[!] Unable to deliver shutdown: {e}").red().bold());
            }
        }
    }
}

// ******************************************************************************************
// ************************************* UNIT TESTS *****************************************
// ******************************************************************************************
