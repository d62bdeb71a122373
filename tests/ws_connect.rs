mod support;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite;

fn ws_url(base_url: &str, room_id: &str) -> String {
    let host = base_url.strip_prefix("http://").expect("http base url");
    format!("ws://{host}/ws?room_id={room_id}")
}

#[tokio::test]
async fn unknown_room_rejects_the_upgrade() {
    let base_url = support::ensure_server();
    let url = ws_url(base_url, "does-not-exist");

    let err = tokio_tungstenite::connect_async(url)
        .await
        .expect_err("handshake should fail");
    match err {
        tungstenite::Error::Http(response) => {
            assert_eq!(response.status(), tungstenite::http::StatusCode::NOT_FOUND);
        }
        other => panic!("expected http rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_join_payload_closes_the_socket() {
    let base_url = support::ensure_server();
    let room_id = support::create_test_room(base_url).await;

    let (mut socket, _response) = tokio_tungstenite::connect_async(ws_url(base_url, &room_id))
        .await
        .expect("handshake should succeed for an existing room");

    socket
        .send(tungstenite::Message::Text("not json".into()))
        .await
        .expect("send should succeed");

    // The server must close the connection instead of granting a session.
    loop {
        match socket.next().await {
            Some(Ok(tungstenite::Message::Close(_))) | Some(Err(_)) | None => break,
            Some(Ok(_)) => {}
        }
    }
}

#[tokio::test]
async fn pre_join_commands_close_the_socket() {
    let base_url = support::ensure_server();
    let room_id = support::create_test_room(base_url).await;

    let (mut socket, _response) = tokio_tungstenite::connect_async(ws_url(base_url, &room_id))
        .await
        .expect("handshake should succeed for an existing room");

    // Well-formed, but the handshake requires Join first.
    let msg = serde_json::json!({ "type": "Stop" }).to_string();
    socket
        .send(tungstenite::Message::Text(msg.into()))
        .await
        .expect("send should succeed");

    loop {
        match socket.next().await {
            Some(Ok(tungstenite::Message::Close(_))) | Some(Err(_)) | None => break,
            Some(Ok(_)) => {}
        }
    }
}
