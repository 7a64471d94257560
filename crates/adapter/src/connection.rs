//! Connection task - one WebSocket link to the game server, kept alive.
//!
//! Runs as a tokio task and talks to the game loop only through channels:
//!
//! | Channel | Direction | Payload |
//! |---------|-----------|---------|
//! | `out_rx` | game loop → task | accepted [`Command`]s, FIFO |
//! | `snapshot_tx` | task → game loop | parsed [`GameState`] frames |
//! | `status_tx` | task → game loop | current [`ConnectionState`] |
//!
//! A normal close from the server ends the task. Any other loss of the link
//! moves to `Reconnecting`, waits a fixed delay and tries again with the same
//! URL, forever. Commands that arrive while not connected are dropped.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::protocol;
use crate::types::{Command, GameState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Link status as seen by the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// How one connected stretch ended.
#[derive(Debug)]
enum LinkEnd {
    /// The client side went away; stop for good.
    Shutdown,
    /// Server closed with code 1000.
    ClosedNormally,
    /// Anything else; worth retrying.
    Dropped(String),
}

/// Drive the connection until shutdown or a normal close.
///
/// Returns when `out_rx` or `snapshot_tx` is closed, or when the server closes
/// the socket normally. The final status is always `Disconnected`.
pub async fn run_connection(
    url: Url,
    reconnect_delay: Duration,
    mut out_rx: mpsc::UnboundedReceiver<Command>,
    snapshot_tx: mpsc::UnboundedSender<GameState>,
    status_tx: watch::Sender<ConnectionState>,
) {
    let mut first_attempt = true;

    loop {
        if first_attempt {
            status_tx.send_replace(ConnectionState::Connecting);
            first_attempt = false;
        }
        debug!(%url, "connecting");

        match connect_async(url.as_str()).await {
            Ok((ws, _response)) => {
                // Nothing accepted before this point may reach the new link.
                while out_rx.try_recv().is_ok() {}
                info!(%url, "connected");
                status_tx.send_replace(ConnectionState::Connected);

                match pump(ws, &mut out_rx, &snapshot_tx).await {
                    LinkEnd::Shutdown => {
                        debug!("connection task shutting down");
                        break;
                    }
                    LinkEnd::ClosedNormally => {
                        info!("server closed the connection");
                        break;
                    }
                    LinkEnd::Dropped(reason) => {
                        warn!(%reason, "connection lost");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "connect failed");
            }
        }

        status_tx.send_replace(ConnectionState::Reconnecting);
        if !wait_for_retry(reconnect_delay, &mut out_rx).await {
            break;
        }
        debug!(delay_ms = reconnect_delay.as_millis() as u64, "retrying");
    }

    status_tx.send_replace(ConnectionState::Disconnected);
}

/// Sleep out the reconnect delay, discarding commands.
///
/// Returns false if the command channel closed meanwhile.
async fn wait_for_retry(
    delay: Duration,
    out_rx: &mut mpsc::UnboundedReceiver<Command>,
) -> bool {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            cmd = out_rx.recv() => match cmd {
                Some(cmd) => debug!(seq = cmd.sequence_number, "dropping command while disconnected"),
                None => return false,
            },
        }
    }
}

async fn pump(
    ws: WsStream,
    out_rx: &mut mpsc::UnboundedReceiver<Command>,
    snapshot_tx: &mpsc::UnboundedSender<GameState>,
) -> LinkEnd {
    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            cmd = out_rx.recv() => match cmd {
                Some(cmd) => match protocol::encode_command(&cmd) {
                    Ok(json) => {
                        if let Err(e) = write.send(Message::Text(json.into())).await {
                            return LinkEnd::Dropped(format!("send failed: {e}"));
                        }
                        debug!(command = cmd.command.as_str(), seq = cmd.sequence_number, "sent");
                    }
                    Err(e) => error!(error = %e, "failed to encode command"),
                },
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    return LinkEnd::Shutdown;
                }
            },

            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => match protocol::decode_snapshot(text.as_str()) {
                    Ok(state) => {
                        if snapshot_tx.send(state).is_err() {
                            let _ = write.send(Message::Close(None)).await;
                            return LinkEnd::Shutdown;
                        }
                    }
                    Err(e) => warn!(error = %e, "ignoring malformed frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    return match frame {
                        Some(f) if f.code == CloseCode::Normal => LinkEnd::ClosedNormally,
                        Some(f) => LinkEnd::Dropped(format!("closed with code {}", u16::from(f.code))),
                        None => LinkEnd::Dropped("closed without status".to_string()),
                    };
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return LinkEnd::Dropped(format!("read failed: {e}")),
                None => return LinkEnd::Dropped("stream ended".to_string()),
            },
        }
    }
}
