mod support;

#[tokio::test]
async fn room_creation_returns_created() {
    let base_url = support::ensure_server();
    let room_id = support::create_test_room(base_url).await;
    assert!(!room_id.is_empty());
}

#[tokio::test]
async fn duplicate_room_id_conflicts() {
    let base_url = support::ensure_server();
    let room_id = support::create_test_room(base_url).await;

    let client = reqwest::Client::new();
    let payload = serde_json::json!({
        "room_id": room_id,
        "roster": [{ "user_id": 9, "name": "late", "team": "dire" }]
    });
    let res = client
        .post(format!("{base_url}/rooms"))
        .json(&payload)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_team_is_rejected() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();
    let payload = serde_json::json!({
        "room_id": format!("test-{}", uuid::Uuid::new_v4()),
        "roster": [{ "user_id": 1, "name": "p", "team": "chaos" }]
    });
    let res = client
        .post(format!("{base_url}/rooms"))
        .json(&payload)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn all_bot_roster_is_rejected() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();
    let payload = serde_json::json!({
        "room_id": format!("test-{}", uuid::Uuid::new_v4()),
        "roster": [{ "user_id": 1, "name": "bot", "team": "radiant", "is_bot": true }]
    });
    let res = client
        .post(format!("{base_url}/rooms"))
        .json(&payload)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
}
