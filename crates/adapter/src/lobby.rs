//! Lobby calls - create a room, join a room.
//!
//! Both are single HTTP GETs against the game server; they run before the
//! WebSocket is opened and are not retried.

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, info};
use url::Url;

use crate::config::ClientConfig;
use crate::error::LobbyError;
use crate::protocol::{self, JoinResponse};

/// `GET /create-room`; the body is the new room id.
pub async fn create_room(config: &ClientConfig) -> Result<String, LobbyError> {
    let url = config.http_url("/create-room", &[])?;
    let body = get(url).await?;
    let room_id = String::from_utf8_lossy(&body).trim().to_string();
    if room_id.is_empty() {
        return Err(LobbyError::EmptyRoomId);
    }
    info!(%room_id, "room created");
    Ok(room_id)
}

/// `GET /join-room?roomID=..`; returns the player id the server assigned.
pub async fn join_room(config: &ClientConfig, room_id: &str) -> Result<JoinResponse, LobbyError> {
    let url = config.http_url("/join-room", &[("roomID", room_id)])?;
    let body = get(url).await?;
    let joined = protocol::decode_join_response(&body)?;
    info!(%room_id, player_id = %joined.player_id, "joined room");
    Ok(joined)
}

async fn get(url: Url) -> Result<Bytes, LobbyError> {
    let client: Client<HttpConnector, Empty<Bytes>> =
        Client::builder(TokioExecutor::new()).build_http();
    let uri: hyper::Uri = url.as_str().parse()?;

    debug!(%url, "lobby request");
    let response = client.get(uri).await?;
    let status = response.status();
    let body = response.into_body().collect().await?.to_bytes();

    if !status.is_success() {
        return Err(LobbyError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).trim().to_string(),
        });
    }
    Ok(body)
}
