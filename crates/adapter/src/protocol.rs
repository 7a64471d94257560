//! Wire codec for the game server.
//!
//! Text frames carry JSON in both directions:
//!
//! ```text
//! client -> server: {"command":"left","sequenceNumber":7}
//! server -> client: {"board":{"Width":10,"Height":20,"Cells":[[""...]...]},
//!                    "currentPiece":{"Shape":[[true,...]],"X":3,"Y":0,"Color":"#FF0D72"},
//!                    "score":0,"level":1,"currentPlayer":0,"players":["a","b"],
//!                    "sequenceNumber":7,...}
//! ```
//!
//! Lobby responses are plain text (`/create-room`) or a small JSON object
//! (`/join-room`).

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::types::{Command, GameState};

/// Body of a successful `/join-room` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "playerID")]
    pub player_id: String,
}

pub fn encode_command(command: &Command) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(command)?)
}

/// Parse one inbound frame.
///
/// Only the shape is checked here. Semantic validation happens when the
/// snapshot is reconciled, so a rejected state never replaces a good one.
pub fn decode_snapshot(text: &str) -> Result<GameState, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

pub fn decode_join_response(body: &[u8]) -> Result<JoinResponse, ProtocolError> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommandKind;

    const SERVER_FRAME: &str = r##"{
        "board": {"Width": 2, "Height": 1, "Cells": [["",""],["",""],["",""],["",""],["#FF0D72",""]]},
        "currentPiece": {"Shape": [[true]], "X": 1, "Y": 0, "Color": "#0DC2FF"},
        "nextPiece": {"Shape": [[true,true]], "X": 3, "Y": 0, "Color": "#0DFF72"},
        "score": 40,
        "gameOver": false,
        "piecesPlaced": 3,
        "level": 1,
        "currentPlayer": 1,
        "sequenceNumber": 12,
        "players": ["alice", "bob"]
    }"##;

    #[test]
    fn encodes_commands_as_server_expects() {
        let json = encode_command(&Command::new(CommandKind::SoftDrop, 3)).unwrap();
        assert_eq!(json, r#"{"command":"down","sequenceNumber":3}"#);
    }

    #[test]
    fn decodes_full_server_frame() {
        let state = decode_snapshot(SERVER_FRAME).unwrap();
        assert_eq!(state.sequence_number, Some(12));
        assert_eq!(state.active_player(), Some("bob"));
        assert_eq!(state.pieces_placed, 3);
        assert_eq!(state.board.get(0, 4), Some("#FF0D72"));
        assert_eq!(state.current_piece.as_ref().unwrap().color, "#0DC2FF");
        assert!(state.next_piece.is_some());
        assert!(state.validate().is_ok());
    }

    #[test]
    fn missing_sequence_number_is_none() {
        let frame = SERVER_FRAME.replace(r#""sequenceNumber": 12,"#, "");
        let state = decode_snapshot(&frame).unwrap();
        assert_eq!(state.sequence_number, None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_snapshot("not json").is_err());
        assert!(decode_snapshot(r#"{"board": 5}"#).is_err());
    }

    #[test]
    fn decodes_join_response() {
        let resp = decode_join_response(br#"{"message":"Joined room","playerID":"p-42"}"#).unwrap();
        assert_eq!(resp.player_id, "p-42");
        assert_eq!(resp.message, "Joined room");
    }
}
