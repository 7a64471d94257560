//! Prediction ledger - commands sent but not yet reflected by the server.
//!
//! Fixed capacity, no heap growth: when full, the oldest half is discarded
//! before the new entry is appended.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;

use crate::types::{Command, GameState, MAX_PENDING_MOVES};

/// An accepted command together with the state it was predicted to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub command: Command,
    pub timestamp: Instant,
    pub predicted_state: GameState,
}

impl PendingMove {
    pub fn new(command: Command, timestamp: Instant, predicted_state: GameState) -> Self {
        Self {
            command,
            timestamp,
            predicted_state,
        }
    }

    pub fn sequence_number(&self) -> u64 {
        self.command.sequence_number
    }
}

/// Ordered, bounded record of in-flight commands.
#[derive(Debug, Clone, Default)]
pub struct PredictionLedger {
    moves: ArrayVec<PendingMove, MAX_PENDING_MOVES>,
    last_activity: Option<Instant>,
}

impl PredictionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pending move, trimming the oldest half first if full.
    pub fn record(&mut self, pending: PendingMove) {
        if self.moves.is_full() {
            let drop = self.moves.len() / 2;
            self.moves.drain(..drop);
            tracing::debug!(dropped = drop, "prediction ledger full, trimmed oldest half");
        }
        self.last_activity = Some(pending.timestamp);
        self.moves.push(pending);
    }

    /// Clear everything if nothing was recorded for longer than `idle`.
    ///
    /// Returns true when the expiry fired. It fires once per idle period.
    pub fn expire_if_idle(&mut self, now: Instant, idle: Duration) -> bool {
        let Some(last) = self.last_activity else {
            return false;
        };
        if now.saturating_duration_since(last) <= idle {
            return false;
        }
        self.moves.clear();
        self.last_activity = None;
        true
    }

    /// Drop every entry the server has already processed.
    pub fn acknowledged_up_to(&mut self, server_sequence: u64) {
        self.moves.retain(|m| m.sequence_number() > server_sequence);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingMove> {
        self.moves.iter()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
        self.last_activity = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommandKind;

    fn pending(seq: u64, at: Instant) -> PendingMove {
        PendingMove::new(
            Command::new(CommandKind::MoveLeft, seq),
            at,
            GameState::new(vec!["p".to_string()]),
        )
    }

    fn sequences(ledger: &PredictionLedger) -> Vec<u64> {
        ledger.iter().map(PendingMove::sequence_number).collect()
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut ledger = PredictionLedger::new();
        let t0 = Instant::now();
        for seq in 1..=100 {
            ledger.record(pending(seq, t0));
            assert!(ledger.len() <= MAX_PENDING_MOVES);
        }
    }

    #[test]
    fn overflow_drops_oldest_half() {
        let mut ledger = PredictionLedger::new();
        let t0 = Instant::now();
        for seq in 1..=MAX_PENDING_MOVES as u64 {
            ledger.record(pending(seq, t0));
        }
        assert_eq!(ledger.len(), MAX_PENDING_MOVES);

        ledger.record(pending(11, t0));
        assert_eq!(sequences(&ledger), vec![6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn acknowledged_up_to_keeps_only_newer() {
        let mut ledger = PredictionLedger::new();
        let t0 = Instant::now();
        for seq in 1..=5 {
            ledger.record(pending(seq, t0));
        }
        ledger.acknowledged_up_to(3);
        assert_eq!(sequences(&ledger), vec![4, 5]);

        ledger.acknowledged_up_to(10);
        assert!(ledger.is_empty());
    }

    #[test]
    fn idle_expiry_clears_once() {
        let mut ledger = PredictionLedger::new();
        let t0 = Instant::now();
        let idle = Duration::from_secs(3);
        ledger.record(pending(1, t0));
        ledger.record(pending(2, t0 + Duration::from_millis(500)));

        assert!(!ledger.expire_if_idle(t0 + Duration::from_millis(3500), idle));
        assert_eq!(ledger.len(), 2);

        assert!(ledger.expire_if_idle(t0 + Duration::from_millis(3501), idle));
        assert!(ledger.is_empty());
        assert!(!ledger.expire_if_idle(t0 + Duration::from_secs(10), idle));
    }

    #[test]
    fn empty_ledger_never_expires() {
        let mut ledger = PredictionLedger::new();
        assert!(!ledger.expire_if_idle(Instant::now(), Duration::ZERO));
    }
}
