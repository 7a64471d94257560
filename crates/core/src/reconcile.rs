//! Reconciliation - merge an authoritative snapshot with pending predictions.
//!
//! The result is either the snapshot itself or the snapshot plus a replay of
//! the local player's unacknowledged commands, in ledger order. Never an older
//! prediction.

use crate::ledger::PredictionLedger;
use crate::sim;
use crate::types::{GameState, StateError};

/// Produce the state to display for `snapshot`.
///
/// An invalid snapshot is returned as an error and the ledger is left alone;
/// callers keep their previous state.
pub fn reconcile(
    ledger: &mut PredictionLedger,
    snapshot: GameState,
    local_player: &str,
) -> Result<GameState, StateError> {
    snapshot.validate()?;

    let Some(server_sequence) = snapshot.sequence_number else {
        return Ok(snapshot);
    };

    ledger.acknowledged_up_to(server_sequence);

    if ledger.is_empty() || !snapshot.is_turn_of(local_player) {
        return Ok(snapshot);
    }

    tracing::trace!(
        server_sequence,
        pending = ledger.len(),
        "replaying unacknowledged moves"
    );
    let replayed = ledger
        .iter()
        .fold(snapshot, |state, pending| {
            sim::apply_move(&state, pending.command.command)
        });
    Ok(replayed)
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::ledger::PendingMove;
    use crate::types::{Command, CommandKind, Piece, PieceKind};

    fn snapshot(seq: Option<u64>, x: i32) -> GameState {
        let mut s = GameState::new(vec!["me".to_string(), "them".to_string()])
            .with_piece(Piece::new(PieceKind::O.shape(), x, 6, "#0DC2FF"));
        s.sequence_number = seq;
        s
    }

    fn record(ledger: &mut PredictionLedger, kind: CommandKind, seq: u64) {
        ledger.record(PendingMove::new(
            Command::new(kind, seq),
            Instant::now(),
            GameState::new(vec!["me".to_string()]),
        ));
    }

    #[test]
    fn empty_ledger_returns_snapshot_unchanged() {
        let mut ledger = PredictionLedger::new();
        let snap = snapshot(Some(4), 5);
        assert_eq!(reconcile(&mut ledger, snap.clone(), "me").unwrap(), snap);
    }

    #[test]
    fn snapshot_without_sequence_is_taken_as_is() {
        let mut ledger = PredictionLedger::new();
        record(&mut ledger, CommandKind::MoveLeft, 1);
        let snap = snapshot(None, 5);
        assert_eq!(reconcile(&mut ledger, snap.clone(), "me").unwrap(), snap);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn replay_matches_direct_application() {
        let mut ledger = PredictionLedger::new();
        let kinds = [
            CommandKind::MoveLeft,
            CommandKind::SoftDrop,
            CommandKind::Rotate,
            CommandKind::MoveLeft,
        ];
        // seq 1..=2 acknowledged, 3..=6 pending.
        record(&mut ledger, CommandKind::MoveRight, 1);
        record(&mut ledger, CommandKind::MoveRight, 2);
        for (i, kind) in kinds.iter().enumerate() {
            record(&mut ledger, *kind, 3 + i as u64);
        }

        let snap = snapshot(Some(2), 5);
        let expected = kinds
            .iter()
            .fold(snap.clone(), |s, k| sim::apply_move(&s, *k));

        let got = reconcile(&mut ledger, snap, "me").unwrap();
        assert_eq!(got, expected);
        assert_eq!(ledger.len(), kinds.len());
        assert_eq!(got.current_piece.unwrap().x, 3);
    }

    #[test]
    fn never_replays_on_another_players_turn() {
        let mut ledger = PredictionLedger::new();
        record(&mut ledger, CommandKind::MoveLeft, 5);
        record(&mut ledger, CommandKind::MoveLeft, 6);

        let mut snap = snapshot(Some(4), 5);
        snap.current_player = 1;
        let got = reconcile(&mut ledger, snap.clone(), "me").unwrap();
        assert_eq!(got, snap);
    }

    #[test]
    fn invalid_snapshot_is_rejected_and_ledger_untouched() {
        let mut ledger = PredictionLedger::new();
        record(&mut ledger, CommandKind::MoveLeft, 1);

        let mut snap = snapshot(Some(1), 5);
        snap.current_player = 7;
        assert!(reconcile(&mut ledger, snap, "me").is_err());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn confirmed_move_empties_ledger() {
        let mut ledger = PredictionLedger::new();
        record(&mut ledger, CommandKind::MoveLeft, 1);

        let snap = snapshot(Some(1), 4);
        let got = reconcile(&mut ledger, snap.clone(), "me").unwrap();
        assert!(ledger.is_empty());
        assert_eq!(got, snap);
    }
}
