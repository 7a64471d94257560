use std::time::{Duration, Instant};

use duel_tetris::core::{apply_move, reconcile, PredictionLedger, Rejection, Session, SessionConfig};
use duel_tetris::types::{CommandKind, GameState, Piece, PieceKind, StateError};

fn snapshot(seq: Option<u64>, piece: Piece) -> GameState {
    let mut state = GameState::new(vec!["p1".into(), "p2".into()]).with_piece(piece);
    state.sequence_number = seq;
    state
}

fn snapshot_for_me(piece: Piece) -> GameState {
    let mut state = GameState::new(vec!["me".into()]).with_piece(piece);
    state.sequence_number = Some(0);
    state
}

fn x_of(session: &Session) -> i32 {
    session.state().unwrap().current_piece.as_ref().unwrap().x
}

#[test]
fn left_move_predicted_then_confirmed() {
    let mut session = Session::new("p1", SessionConfig::default());
    session
        .on_snapshot(snapshot(Some(0), Piece::new(PieceKind::I.shape(), 5, 10, "#0DC2FF")))
        .unwrap();

    let cmd = session
        .submit(CommandKind::MoveLeft, Instant::now(), true)
        .unwrap();
    assert_eq!(cmd.sequence_number, 1);
    assert_eq!(x_of(&session), 4);

    let confirmed = snapshot(Some(1), Piece::new(PieceKind::I.shape(), 4, 10, "#0DC2FF"));
    session.on_snapshot(confirmed.clone()).unwrap();
    assert!(session.pending().is_empty());
    assert_eq!(session.state(), Some(&confirmed));
}

#[test]
fn blocked_left_move_is_not_sent() {
    let mut session = Session::new("p1", SessionConfig::default());
    let start = snapshot(Some(0), Piece::new(PieceKind::L.shape(), 0, 10, "#FF8E0D"));
    session.on_snapshot(start.clone()).unwrap();

    assert_eq!(
        session.submit(CommandKind::MoveLeft, Instant::now(), true),
        Err(Rejection::IllegalMove)
    );
    assert!(session.pending().is_empty());
    assert_eq!(session.state(), Some(&start));
}

#[test]
fn sequence_numbers_strictly_increase() {
    let mut session = Session::new("p1", SessionConfig::default());
    session
        .on_snapshot(snapshot(Some(0), Piece::new(PieceKind::O.shape(), 4, 4, "#FFE138")))
        .unwrap();

    let t0 = Instant::now();
    let kinds = [
        CommandKind::MoveLeft,
        CommandKind::MoveRight,
        CommandKind::SoftDrop,
        CommandKind::Rotate,
    ];
    let mut last = 0;
    for step in 0..12u64 {
        let now = t0 + Duration::from_millis(120 * step);
        let kind = kinds[(step as usize) % kinds.len()];
        if let Ok(cmd) = session.submit(kind, now, true) {
            assert!(cmd.sequence_number > last);
            last = cmd.sequence_number;
        }
    }
    assert!(last >= 10);
}

#[test]
fn rapid_repeat_is_throttled() {
    let mut session = Session::new("p1", SessionConfig::default());
    session
        .on_snapshot(snapshot(Some(0), Piece::new(PieceKind::O.shape(), 4, 4, "#FFE138")))
        .unwrap();

    let t0 = Instant::now();
    let accepted = (0..10)
        .filter(|i| {
            session
                .submit(CommandKind::SoftDrop, t0 + Duration::from_millis(10 * i), true)
                .is_ok()
        })
        .count();
    assert_eq!(accepted, 1);
}

#[test]
fn reconcile_twice_gives_same_state() {
    let mut ledger = PredictionLedger::new();
    let snap = snapshot(Some(9), Piece::new(PieceKind::S.shape(), 3, 7, "#0DFF72"));

    let once = reconcile(&mut ledger, snap.clone(), "p1").unwrap();
    let twice = reconcile(&mut ledger, once.clone(), "p1").unwrap();
    assert_eq!(once, twice);
}

#[test]
fn prediction_never_moves_other_players_piece() {
    let mut session = Session::new("p1", SessionConfig::default());
    let mut theirs = snapshot(Some(0), Piece::new(PieceKind::T.shape(), 4, 8, "#F538FF"));
    theirs.current_player = 1;
    session.on_snapshot(theirs.clone()).unwrap();

    for kind in CommandKind::ALL {
        assert_eq!(
            session.submit(kind, Instant::now(), true),
            Err(Rejection::NotYourTurn)
        );
    }
    assert_eq!(session.state(), Some(&theirs));
    assert_eq!(apply_move(&theirs, CommandKind::MoveLeft).current_piece.unwrap().x, 3);
}

#[test]
fn disconnected_session_sends_nothing() {
    let mut session = Session::new("p1", SessionConfig::default());
    session
        .on_snapshot(snapshot(Some(0), Piece::new(PieceKind::J.shape(), 4, 8, "#3877FF")))
        .unwrap();
    assert_eq!(
        session.submit(CommandKind::Rotate, Instant::now(), false),
        Err(Rejection::Disconnected)
    );
    assert!(session.pending().is_empty());
}

#[test]
fn snapshot_with_piece_at_integer_edge_is_rejected() {
    let mut session = Session::new("me", SessionConfig::default());
    session
        .on_snapshot(snapshot_for_me(Piece::new(PieceKind::O.shape(), 4, 6, "#FFE138")))
        .unwrap();

    let frame = r##"{"board":{"Width":10,"Height":20,"Cells":[]},
        "currentPiece":{"Shape":[[true]],"X":2147483647,"Y":0,"Color":"#FFFFFF"},
        "players":["me"],"currentPlayer":0,"sequenceNumber":1,"score":0,"level":1,"gameOver":false}"##;
    let hostile: GameState = serde_json::from_str(frame).unwrap();
    assert_eq!(
        session.on_snapshot(hostile),
        Err(StateError::PieceOutOfRange { x: i32::MAX, y: 0 })
    );
    assert_eq!(x_of(&session), 4);

    let t0 = Instant::now();
    assert!(session.submit(CommandKind::MoveRight, t0, true).is_ok());
    assert_eq!(x_of(&session), 5);
}

#[test]
fn moves_at_integer_edge_are_illegal_not_fatal() {
    let mut state = GameState::new(vec!["me".into()])
        .with_piece(Piece::new(vec![vec![true]], i32::MAX, 0, "#FFFFFF"));
    state.sequence_number = Some(0);
    for kind in CommandKind::ALL {
        assert_eq!(apply_move(&state, kind), state);
    }
    let mut ledger = PredictionLedger::new();
    assert!(reconcile(&mut ledger, state, "me").is_err());
}
