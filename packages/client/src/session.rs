//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use url::Url;

use crate::{error::ClientError, formatter::MessageFormatter, ui::redisplay_prompt};

/// Build the chat endpoint URL carrying the username query parameter
pub fn build_chat_url(base: &str, username: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(base).map_err(|e| ClientError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(ClientError::InvalidUrl {
            url: base.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    url.query_pairs_mut().append_pair("username", username);
    Ok(url)
}

/// Run one WebSocket session until the user quits or the connection drops
///
/// Lines arriving on `input_rx` are sent verbatim as chat text.
///
/// # Returns
///
/// * `Ok(())` - the input stream ended (the user quit)
/// * `Err(ClientError)` - the connection could not be made or was lost
pub async fn run_client_session(
    url: &Url,
    username: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url.as_str())
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to chat server!");
    println!(
        "\nYou are '{}'. Type messages and press Enter to send. Press Ctrl+D to exit.\n",
        username
    );

    let (mut write, mut read) = ws_stream.split();

    // Spawn a task to handle incoming frames
    let me = username.to_string();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    print!("{}", MessageFormatter::format_frame(text.as_str(), &me));
                    redisplay_prompt(&me);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            line = input_rx.recv() => match line {
                Some(line) => {
                    if let Err(e) = write.send(Message::Text(line.into())).await {
                        tracing::warn!("Failed to send message: {}", e);
                        read_task.abort();
                        return Err(ClientError::ConnectionLost);
                    }
                }
                None => {
                    // stdin closed
                    let _ = write.send(Message::Close(None)).await;
                    read_task.abort();
                    return Ok(());
                }
            },
            _ = &mut read_task => return Err(ClientError::ConnectionLost),
        }
    }
}
