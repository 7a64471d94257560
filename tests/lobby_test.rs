use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::timeout;

use duel_tetris::adapter::lobby::{create_room, join_room};
use duel_tetris::adapter::{ClientConfig, LobbyError};

/// Serve exactly one HTTP response and report the request line.
async fn one_shot_http(status: &'static str, body: &'static str) -> (ClientConfig, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let mut len = 0;
        while !buf[..len].windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf[len..]).await.unwrap();
            if n == 0 {
                break;
            }
            len += n;
        }
        let request = String::from_utf8_lossy(&buf[..len]).to_string();
        let request_line = request.lines().next().unwrap_or_default().to_string();
        let _ = tx.send(request_line);

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
    });

    (ClientConfig::default().with_server(&addr.to_string()), rx)
}

#[tokio::test]
async fn create_room_returns_plain_text_id() {
    let (config, request) = one_shot_http("200 OK", "a1b2c3\n").await;

    let room = timeout(Duration::from_secs(5), create_room(&config))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(room, "a1b2c3");
    assert_eq!(request.await.unwrap(), "GET /create-room HTTP/1.1");
}

#[tokio::test]
async fn join_room_returns_assigned_player_id() {
    let (config, request) =
        one_shot_http("200 OK", r#"{"message":"Joined room successfully","playerID":"p-7"}"#).await;

    let joined = timeout(Duration::from_secs(5), join_room(&config, "a1b2c3"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(joined.player_id, "p-7");
    assert_eq!(
        request.await.unwrap(),
        "GET /join-room?roomID=a1b2c3 HTTP/1.1"
    );
}

#[tokio::test]
async fn missing_room_is_a_status_error() {
    let (config, _request) = one_shot_http("404 Not Found", "Room not found").await;

    let err = join_room(&config, "nope").await.unwrap_err();
    match err {
        LobbyError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Room not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_room_id_is_rejected() {
    let (config, _request) = one_shot_http("200 OK", "  ").await;
    assert!(matches!(
        create_room(&config).await,
        Err(LobbyError::EmptyRoomId)
    ));
}
