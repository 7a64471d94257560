//! Command gate - decides per keystroke whether a command may be sent.
//!
//! Checks, in order: transport connected, local player owns the turn,
//! per-kind cooldown elapsed, move legal on the current predicted state.
//! A rejection has no side effects.

use std::time::{Duration, Instant};

use crate::sim;
use crate::types::{Command, CommandKind, GameState, COMMAND_COOLDOWN_MS};

/// Why a command was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No open transport.
    Disconnected,
    /// No state received from the server yet.
    NotStarted,
    /// `players[currentPlayer]` is someone else.
    NotYourTurn,
    /// Same kind accepted less than the cooldown ago.
    CoolingDown,
    /// Out of bounds, colliding, no active piece, or game over.
    IllegalMove,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Disconnected => "disconnected",
            Rejection::NotStarted => "not_started",
            Rejection::NotYourTurn => "not_your_turn",
            Rejection::CoolingDown => "cooling_down",
            Rejection::IllegalMove => "illegal_move",
        }
    }
}

/// Per-kind throttle plus the client-local sequence counter.
#[derive(Debug, Clone)]
pub struct CommandGate {
    cooldown: Duration,
    last_accepted: [Option<Instant>; 4],
    sequence: u64,
}

impl CommandGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: [None; 4],
            sequence: 0,
        }
    }

    /// Last sequence number handed out.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Restart numbering so the next accepted command gets `last + 1`.
    pub fn reset_sequence(&mut self, last: u64) {
        self.sequence = last;
    }

    /// Forget cooldown timestamps.
    pub fn clear_cooldowns(&mut self) {
        self.last_accepted = [None; 4];
    }

    /// Evaluate `kind` for `local_player` against `state`.
    ///
    /// On acceptance the sequence counter advances and the cooldown for this
    /// kind restarts at `now`.
    pub fn evaluate(
        &mut self,
        kind: CommandKind,
        now: Instant,
        state: &GameState,
        local_player: &str,
        connected: bool,
    ) -> Result<Command, Rejection> {
        if !connected {
            return Err(Rejection::Disconnected);
        }
        if !state.is_turn_of(local_player) {
            return Err(Rejection::NotYourTurn);
        }
        if let Some(last) = self.last_accepted[kind.index()] {
            if now.saturating_duration_since(last) < self.cooldown {
                return Err(Rejection::CoolingDown);
            }
        }
        if sim::candidate(state, kind).is_none() {
            return Err(Rejection::IllegalMove);
        }

        self.last_accepted[kind.index()] = Some(now);
        self.sequence += 1;
        Ok(Command::new(kind, self.sequence))
    }
}

impl Default for CommandGate {
    fn default() -> Self {
        Self::new(Duration::from_millis(COMMAND_COOLDOWN_MS))
    }
}
