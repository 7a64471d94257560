//! Session - all mutable prediction state for one player in one room.
//!
//! The session is owned by whoever drives the connection and is only ever
//! touched from one thread: input goes through [`Session::submit`], server
//! snapshots through [`Session::on_snapshot`], timers through
//! [`Session::expire_if_idle`].

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::gate::{CommandGate, Rejection};
use crate::ledger::{PendingMove, PredictionLedger};
use crate::reconcile::reconcile;
use crate::sim;
use crate::types::{Command, CommandKind, GameState, StateError, COMMAND_COOLDOWN_MS, PENDING_IDLE_MS};

/// Timing knobs for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub cooldown: Duration,
    pub idle_expiry: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(COMMAND_COOLDOWN_MS),
            idle_expiry: Duration::from_millis(PENDING_IDLE_MS),
        }
    }
}

/// Prediction and reconciliation state for the local player.
#[derive(Debug, Clone)]
pub struct Session {
    player_id: String,
    config: SessionConfig,
    gate: CommandGate,
    ledger: PredictionLedger,
    /// Last validated snapshot, exactly as the server sent it.
    authoritative: Option<GameState>,
    /// What the view should show: snapshot plus replayed predictions.
    displayed: Option<GameState>,
    last_server_sequence: u64,
}

impl Session {
    pub fn new(player_id: impl Into<String>, config: SessionConfig) -> Self {
        Self {
            player_id: player_id.into(),
            config,
            gate: CommandGate::new(config.cooldown),
            ledger: PredictionLedger::new(),
            authoritative: None,
            displayed: None,
            last_server_sequence: 0,
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn state(&self) -> Option<&GameState> {
        self.displayed.as_ref()
    }

    pub fn authoritative(&self) -> Option<&GameState> {
        self.authoritative.as_ref()
    }

    pub fn pending(&self) -> &PredictionLedger {
        &self.ledger
    }

    pub fn last_server_sequence(&self) -> u64 {
        self.last_server_sequence
    }

    pub fn is_local_turn(&self) -> bool {
        self.displayed
            .as_ref()
            .is_some_and(|s| s.is_turn_of(&self.player_id))
    }

    /// Gate, predict and record one command.
    ///
    /// On success the predicted state is displayed immediately and the
    /// returned command must be sent to the server.
    pub fn submit(
        &mut self,
        kind: CommandKind,
        now: Instant,
        connected: bool,
    ) -> Result<Command, Rejection> {
        let Some(current) = self.displayed.as_ref() else {
            return Err(Rejection::NotStarted);
        };

        let command = self
            .gate
            .evaluate(kind, now, current, &self.player_id, connected)?;
        let predicted = sim::apply_move(current, kind);

        self.ledger
            .record(PendingMove::new(command, now, predicted.clone()));
        self.displayed = Some(predicted);

        debug!(
            command = kind.as_str(),
            seq = command.sequence_number,
            pending = self.ledger.len(),
            "predicted"
        );
        Ok(command)
    }

    /// Fold an authoritative snapshot into the session.
    ///
    /// An invalid snapshot leaves the displayed state untouched.
    pub fn on_snapshot(&mut self, snapshot: GameState) -> Result<&GameState, StateError> {
        let server_sequence = snapshot.sequence_number;
        let authoritative = snapshot.clone();

        match reconcile(&mut self.ledger, snapshot, &self.player_id) {
            Ok(state) => {
                if let Some(seq) = server_sequence {
                    self.last_server_sequence = seq;
                }
                self.authoritative = Some(authoritative);
                Ok(&*self.displayed.insert(state))
            }
            Err(e) => {
                warn!(error = %e, "discarding invalid snapshot");
                Err(e)
            }
        }
    }

    /// Drop stale predictions after a pause in input.
    ///
    /// Numbering restarts from the last sequence number the server reported,
    /// and the display falls back to the last authoritative snapshot.
    pub fn expire_if_idle(&mut self, now: Instant) -> bool {
        if !self.ledger.expire_if_idle(now, self.config.idle_expiry) {
            return false;
        }
        self.gate.reset_sequence(self.last_server_sequence);
        if let Some(auth) = self.authoritative.as_ref() {
            self.displayed = Some(auth.clone());
        }
        debug!(
            seq = self.last_server_sequence,
            "pending predictions expired"
        );
        true
    }

    /// Forget everything; used on teardown.
    pub fn clear(&mut self) {
        self.ledger.clear();
        self.gate.clear_cooldowns();
        self.authoritative = None;
        self.displayed = None;
    }
}
