//! Error types for the network side of the client.

/// Wire encoding and decoding failures.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Room bootstrap failures.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    #[error("invalid lobby url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid request uri: {0}")]
    Uri(#[from] hyper::http::uri::InvalidUri),
    #[error("request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),
    #[error("reading response body: {0}")]
    Body(#[from] hyper::Error),
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("server returned an empty room id")]
    EmptyRoomId,
}

/// Errors surfaced to whoever drives the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("both a room id and a player id are required")]
    MissingIdentity,
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("invalid server address: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}
