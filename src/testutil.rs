//! In-process mock of the card-game server, for exercising simulators
//! against scripted behavior without a real server.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// Scripted behavior knobs for a mock run.
#[derive(Debug, Clone)]
pub struct MockBehavior {
    /// The one slot for which `game put <card> <slot>` succeeds. Every
    /// other slot, and the bare put, draws an ERROR reply.
    pub valid_slot: u8,
    /// A player name the mock refuses to register, to simulate one player
    /// failing while its siblings keep going.
    pub reject_name: Option<String>,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            valid_slot: 0,
            reject_name: None,
        }
    }
}

/// Everything the mock observed across all sessions.
#[derive(Debug, Default)]
pub struct MockState {
    pub names: Vec<String>,
    pub tables: Vec<String>,
    pub joins: usize,
    pub started: bool,
    pub put_attempts: usize,
    pub accepted_puts: usize,
    pub shutdown: bool,
}

pub struct MockServer {
    pub address: String,
    pub state: Arc<Mutex<MockState>>,
}

impl MockServer {
    /// Binds to an ephemeral port and serves sessions until the test ends.
    pub async fn spawn(behavior: MockBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
        let address = listener.local_addr().expect("mock server address").to_string();
        let state = Arc::new(Mutex::new(MockState::default()));

        let shared = state.clone();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(run_session(socket, shared.clone(), behavior.clone()));
            }
        });

        Self { address, state }
    }
}

enum Reply {
    Text(String),
    Silent,
    Hangup,
}

async fn run_session(socket: TcpStream, state: Arc<Mutex<MockState>>, behavior: MockBehavior) {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        match respond(&line, &state, &behavior).await {
            Reply::Text(text) => {
                if writer.write_all(text.as_bytes()).await.is_err() {
                    break;
                }
            }
            Reply::Silent => {}
            Reply::Hangup => break,
        }
    }
}

async fn respond(line: &str, state: &Arc<Mutex<MockState>>, behavior: &MockBehavior) -> Reply {
    let mut state = state.lock().await;
    let mut words = line.split_whitespace();

    match (words.next(), words.next()) {
        (Some("player"), Some("name")) => {
            let name = words.next().unwrap_or("anonymous").to_owned();
            if behavior.reject_name.as_deref() == Some(name.as_str()) {
                return Reply::Text("ERROR name refused\n".to_owned());
            }
            let greeting = format!("welcome {name}\n");
            state.names.push(name);
            Reply::Text(greeting)
        }
        (Some("player"), Some("state")) => Reply::Text("idle at table\n".to_owned()),
        (Some("player"), Some("list")) => {
            if state.names.is_empty() {
                Reply::Silent
            } else {
                Reply::Text(state.names.iter().map(|n| format!("\t{n}\n")).collect())
            }
        }
        (Some("table"), Some("list")) => {
            // A server with no open tables has nothing to say.
            if state.tables.is_empty() {
                Reply::Silent
            } else {
                Reply::Text(state.tables.iter().map(|h| format!("{h}\tOpen\n")).collect())
            }
        }
        (Some("table"), Some("new")) => {
            let handle = format!("{:04x}", 0x7f3a + state.tables.len());
            state.tables.push(handle);
            Reply::Text("table created\n".to_owned())
        }
        (Some("table"), Some("join")) => {
            let handle = words.next().unwrap_or_default();
            if state.tables.iter().any(|h| h == handle) {
                state.joins += 1;
                Reply::Text("joined\n".to_owned())
            } else {
                Reply::Text("ERROR no such table\n".to_owned())
            }
        }
        (Some("game"), Some("start")) => {
            state.started = true;
            Reply::Text("game started\n".to_owned())
        }
        (Some("game"), Some("state")) => {
            if state.started {
                Reply::Text("cards ab cd ef gh ij\n".to_owned())
            } else {
                Reply::Text("waiting for players\n".to_owned())
            }
        }
        (Some("game"), Some("put")) => {
            state.put_attempts += 1;
            let _card = words.next();
            match words.next() {
                Some(slot) if slot == behavior.valid_slot.to_string() => {
                    state.accepted_puts += 1;
                    Reply::Text("card placed\n".to_owned())
                }
                Some(_) => Reply::Text("ERROR wrong slot\n".to_owned()),
                None => Reply::Text("ERROR slot required\n".to_owned()),
            }
        }
        (Some("quit"), _) => Reply::Hangup,
        (Some("shutdown"), _) => {
            state.shutdown = true;
            Reply::Hangup
        }
        _ => Reply::Text("ERROR unknown command\n".to_owned()),
    }
}
