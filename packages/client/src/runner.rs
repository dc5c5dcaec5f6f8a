//! Client execution logic with reconnection support.

use std::time::Duration;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use super::{
    error::ClientError,
    session::{build_chat_url, run_client_session},
};

/// How the client retries after losing the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Fixed wait between attempts
    pub delay: Duration,
    /// Reconnects allowed after each established session; `None` retries forever
    pub max_attempts: Option<u32>,
}

/// What the runner does once a session attempt is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextStep {
    Finish,
    /// Sleep, then make reconnect number `n` since the last established session
    Reconnect(u32),
    /// `n` reconnects were made without getting a session back
    GiveUp(u32),
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(3),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Whether another reconnect is allowed after `reconnects` have been made
    pub fn allows(&self, reconnects: u32) -> bool {
        self.max_attempts.is_none_or(|max| reconnects < max)
    }

    /// `reconnects` counts attempts made since the last established session.
    /// A lost session resets it, so the first retry after a drop is number 1.
    fn next_step(&self, reconnects: u32, outcome: &Result<(), ClientError>) -> NextStep {
        let made = match outcome {
            Ok(()) => return NextStep::Finish,
            Err(ClientError::ConnectionLost) => 0,
            Err(_) => reconnects,
        };

        if self.allows(made) {
            NextStep::Reconnect(made.saturating_add(1))
        } else {
            NextStep::GiveUp(made)
        }
    }
}

/// Run the chat client with reconnection logic
pub async fn run_client(
    url: &str,
    username: &str,
    policy: ReconnectPolicy,
) -> Result<(), ClientError> {
    let url = build_chat_url(url, username)?;
    let mut input_rx = spawn_readline(username.to_string());
    let mut reconnects = 0;

    loop {
        tracing::info!("Connecting to {} as '{}'", url, username);

        let outcome = run_client_session(&url, username, &mut input_rx).await;
        if let Err(e) = &outcome {
            tracing::warn!("{}", e);
        }

        match policy.next_step(reconnects, &outcome) {
            NextStep::Finish => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            NextStep::GiveUp(made) => return Err(ClientError::ReconnectAttemptsExhausted(made)),
            NextStep::Reconnect(attempt) => {
                reconnects = attempt;
                tracing::info!(
                    "Reconnecting in {} seconds (attempt {})...",
                    policy.delay.as_secs(),
                    attempt
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

/// Read stdin lines on a dedicated thread (rustyline is blocking).
///
/// The thread outlives individual sessions so reconnects share one prompt.
fn spawn_readline(username: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", username);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim_end();
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    tracing::info!("Input closed");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
