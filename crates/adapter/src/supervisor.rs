//! Supervisor - synchronous handle over the async connection.
//!
//! Bridges the sync game loop with the connection task. The supervisor owns
//! the tokio runtime, the active [`Session`] and the channel ends; the game
//! loop calls [`Supervisor::submit`] on input and [`Supervisor::poll`] once
//! per frame.

use std::time::Instant;

use duel_tetris_core::{Rejection, Session};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::connection::{run_connection, ConnectionState};
use crate::error::ClientError;
use crate::lobby;
use crate::protocol::JoinResponse;
use crate::types::{Command, CommandKind, GameState};

/// Everything that exists only while a room is joined.
struct ActiveGame {
    session: Session,
    task: JoinHandle<()>,
    out_tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: mpsc::UnboundedReceiver<GameState>,
    status_rx: watch::Receiver<ConnectionState>,
}

/// Running client instance.
pub struct Supervisor {
    config: ClientConfig,
    runtime: Runtime,
    game: Option<ActiveGame>,
}

impl Supervisor {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let runtime = Runtime::new()?;
        Ok(Self {
            config,
            runtime,
            game: None,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn create_room(&self) -> Result<String, ClientError> {
        Ok(self.runtime.block_on(lobby::create_room(&self.config))?)
    }

    pub fn join_room(&self, room_id: &str) -> Result<JoinResponse, ClientError> {
        Ok(self
            .runtime
            .block_on(lobby::join_room(&self.config, room_id))?)
    }

    /// Open the room connection for `player_id`, replacing any previous one.
    pub fn connect(&mut self, room_id: &str, player_id: &str) -> Result<(), ClientError> {
        let room_id = room_id.trim();
        let player_id = player_id.trim();
        if room_id.is_empty() || player_id.is_empty() {
            return Err(ClientError::MissingIdentity);
        }

        self.shutdown();

        let url = self.config.ws_url(room_id, player_id)?;
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionState::Disconnected);

        let task = self.runtime.spawn(run_connection(
            url,
            self.config.reconnect_delay,
            out_rx,
            snapshot_tx,
            status_tx,
        ));

        info!(%room_id, %player_id, "joining room");
        self.game = Some(ActiveGame {
            session: Session::new(player_id, self.config.session_config()),
            task,
            out_tx,
            snapshot_rx,
            status_rx,
        });
        Ok(())
    }

    /// Gate and predict `kind`; on acceptance the command is queued for
    /// sending.
    pub fn submit(&mut self, kind: CommandKind, now: Instant) -> Result<Command, Rejection> {
        let Some(game) = self.game.as_mut() else {
            return Err(Rejection::NotStarted);
        };
        let connected = game.status_rx.borrow().is_connected();
        let command = game.session.submit(kind, now, connected)?;
        self.send_command(command);
        Ok(command)
    }

    /// Queue `command` for the server. Only while connected; otherwise it is
    /// dropped, never held for a later link. Returns whether it was queued.
    pub fn send_command(&self, command: Command) -> bool {
        let Some(game) = self.game.as_ref() else {
            return false;
        };
        if !game.status_rx.borrow().is_connected() {
            debug!(seq = command.sequence_number, "not connected, command dropped");
            return false;
        }
        if game.out_tx.send(command).is_err() {
            warn!(seq = command.sequence_number, "connection task gone, command dropped");
            return false;
        }
        true
    }

    /// Fold in every snapshot received since the last call and run the idle
    /// timer. Returns true if the displayed state may have changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(game) = self.game.as_mut() else {
            return false;
        };

        let mut changed = false;
        while let Ok(snapshot) = game.snapshot_rx.try_recv() {
            // Rejections are logged by the session.
            if game.session.on_snapshot(snapshot).is_ok() {
                changed = true;
            }
        }
        if game.session.expire_if_idle(now) {
            changed = true;
        }
        changed
    }

    pub fn session(&self) -> Option<&Session> {
        self.game.as_ref().map(|g| &g.session)
    }

    pub fn state(&self) -> Option<&GameState> {
        self.session().and_then(Session::state)
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.game
            .as_ref()
            .map_or(ConnectionState::Disconnected, |g| *g.status_rx.borrow())
    }

    pub fn pending_len(&self) -> usize {
        self.session().map_or(0, |s| s.pending().len())
    }

    /// Cancel the connection task and forget the session.
    pub fn shutdown(&mut self) {
        if let Some(mut game) = self.game.take() {
            game.task.abort();
            game.session.clear();
            debug!("connection closed");
        }
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_requires_both_ids() {
        let mut sup = Supervisor::new(ClientConfig::default()).unwrap();
        assert!(matches!(
            sup.connect("", "p1"),
            Err(ClientError::MissingIdentity)
        ));
        assert!(matches!(
            sup.connect("room", "  "),
            Err(ClientError::MissingIdentity)
        ));
        assert_eq!(sup.connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn submit_without_room_is_not_started() {
        let mut sup = Supervisor::new(ClientConfig::default()).unwrap();
        assert_eq!(
            sup.submit(CommandKind::MoveLeft, Instant::now()),
            Err(Rejection::NotStarted)
        );
        assert!(!sup.poll(Instant::now()));
        assert!(sup.state().is_none());
        assert_eq!(sup.pending_len(), 0);
        assert!(!sup.send_command(Command::new(CommandKind::Rotate, 1)));
    }
}
