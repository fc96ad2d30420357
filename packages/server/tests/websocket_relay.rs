//! WebSocket relay integration tests.
//!
//! Drives a real server with several clients and checks join/leave
//! notifications, sender exclusion and malformed-input handling.

mod fixtures;
use fixtures::{TEST_SERVER_ID, TestClient, TestServer};
use serde_json::json;

#[tokio::test]
async fn test_relay_reaches_other_members_only() {
    // テスト項目: ドメインイベントは送信者以外のメンバーにだけ届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut c1 = TestClient::connect(&server).await;
    let mut c2 = TestClient::connect(&server).await;
    c1.join("abc").await;
    c2.join("abc").await;
    c1.expect_event("client-joined").await;

    // when (操作):
    c1.emit(
        "ritual-step",
        json!({"sessionId": "abc", "step": "Breathe", "stepNumber": 1, "totalSteps": 3}),
    )
    .await;

    // then (期待する結果):
    let msg = c2.expect_event("ritual-step").await;
    assert_eq!(msg["data"]["sessionId"], "abc");
    assert_eq!(msg["data"]["step"], "Breathe");
    assert_eq!(msg["data"]["stepNumber"], 1);
    assert_eq!(msg["data"]["totalSteps"], 3);
    assert!(msg["data"]["timestamp"].is_string());

    // 送信者には何も返らない（次に届くのは pong）
    c1.sync().await;
}

#[tokio::test]
async fn test_every_domain_event_is_relayed() {
    // テスト項目: 6 種類のドメインイベントがすべてそのまま中継される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut phone = TestClient::connect(&server).await;
    let mut display = TestClient::connect(&server).await;
    display.join("pair").await;
    phone.join("pair").await;
    display.expect_event("client-joined").await;

    let events = [
        ("phone-connected", json!({"sessionId": "pair"})),
        ("ritual-step", json!({"sessionId": "pair", "step": "Stretch", "stepNumber": 2, "totalSteps": 3})),
        ("timer-selected", json!({"sessionId": "pair", "timer": "pomodoro", "timerName": "Pomodoro (25 min)"})),
        ("ritual-complete", json!({"sessionId": "pair", "timer": "pomodoro"})),
        ("focus-session-start", json!({"sessionId": "pair", "duration": 1_500_000})),
        ("focus-session-end", json!({"sessionId": "pair"})),
    ];

    for (event, data) in events {
        // when (操作):
        phone.emit(event, data.clone()).await;

        // then (期待する結果):
        let msg = display.expect_event(event).await;
        for (key, value) in data.as_object().unwrap() {
            assert_eq!(&msg["data"][key], value);
        }
    }
    phone.sync().await;
}

#[tokio::test]
async fn test_alone_in_session_no_delivery() {
    // テスト項目: 自分しかいないセッションへの送信は何も起こさない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut c1 = TestClient::connect(&server).await;
    c1.join("abc").await;

    // when (操作):
    c1.emit("timer-selected", json!({"sessionId": "abc", "timer": "short"}))
        .await;

    // then (期待する結果):
    c1.sync().await;
}

#[tokio::test]
async fn test_join_notifies_existing_members() {
    // テスト項目: 参加すると既存メンバーに client-joined が届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut c1 = TestClient::connect(&server).await;
    let mut c2 = TestClient::connect(&server).await;
    c1.join("abc").await;

    // when (操作):
    c2.join("abc").await;

    // then (期待する結果):
    let msg = c1.expect_event("client-joined").await;
    assert_eq!(msg["data"]["sessionId"], "abc");
    assert!(msg["data"]["clientId"].is_string());
    assert!(msg["data"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_rejoin_same_session_notifies_again() {
    // テスト項目: 同じセッションへの再参加でも client-joined が再通知される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut c1 = TestClient::connect(&server).await;
    let mut c2 = TestClient::connect(&server).await;
    c1.join("abc").await;
    c2.join("abc").await;
    let first = c1.expect_event("client-joined").await;

    // when (操作):
    c2.join("abc").await;

    // then (期待する結果):
    let second = c1.expect_event("client-joined").await;
    assert_eq!(first["data"]["clientId"], second["data"]["clientId"]);
    let body = server.health().await;
    assert_eq!(body["activeSessions"], 1);
}

#[tokio::test]
async fn test_switch_session_prunes_previous() {
    // テスト項目: 別セッションへ移ると旧セッションは空になり削除される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut c1 = TestClient::connect(&server).await;
    c1.join("abc").await;

    // when (操作):
    c1.join("xyz").await;

    // then (期待する結果):
    let sessions: serde_json::Value = reqwest::get(format!("{}/api/sessions", server.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["id"], "xyz");
    assert_eq!(sessions[0]["members"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_events_follow_the_new_session_after_switch() {
    // テスト項目: 移動後は旧セッションのメンバーに中継されない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut mover = TestClient::connect(&server).await;
    let mut old_peer = TestClient::connect(&server).await;
    let mut new_peer = TestClient::connect(&server).await;
    old_peer.join("abc").await;
    new_peer.join("xyz").await;
    mover.join("abc").await;
    old_peer.expect_event("client-joined").await;
    mover.join("xyz").await;
    new_peer.expect_event("client-joined").await;

    // when (操作):
    mover
        .emit("ritual-step", json!({"sessionId": "abc", "step": "stale"}))
        .await;
    mover
        .emit("ritual-step", json!({"sessionId": "xyz", "step": "fresh"}))
        .await;
    mover.sync().await;

    // then (期待する結果):
    let msg = new_peer.expect_event("ritual-step").await;
    assert_eq!(msg["data"]["step"], "fresh");
    old_peer.sync().await;
}

#[tokio::test]
async fn test_disconnect_notifies_remaining_members() {
    // テスト項目: 切断すると残りメンバーに client-left が届き、メンバーから外れる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut c1 = TestClient::connect(&server).await;
    let mut c2 = TestClient::connect(&server).await;
    c2.join("abc").await;
    c1.join("abc").await;
    let joined = c2.expect_event("client-joined").await;
    let c1_id = joined["data"]["clientId"].clone();

    // when (操作):
    c1.close().await;

    // then (期待する結果):
    let left = c2.expect_event("client-left").await;
    assert_eq!(left["data"]["clientId"], c1_id);
    assert_eq!(left["data"]["sessionId"], "abc");
    assert!(left["data"]["timestamp"].is_string());

    let detail: serde_json::Value =
        reqwest::get(format!("{}/api/sessions/abc", server.base_url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    let members = detail["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_ne!(members[0]["clientId"], c1_id);
}

#[tokio::test]
async fn test_last_member_disconnect_removes_session() {
    // テスト項目: 最後のメンバーが切断するとセッション数が減る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut keeper = TestClient::connect(&server).await;
    let mut c1 = TestClient::connect(&server).await;
    keeper.join("other").await;
    c1.join("abc").await;
    server.wait_for_active_sessions(2).await;

    // when (操作):
    c1.close().await;

    // then (期待する結果):
    let health = server.wait_for_active_sessions(1).await;
    assert_eq!(health["connections"], 1);
    let response = reqwest::get(format!("{}/api/sessions/abc", server.base_url()))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_unjoined_disconnect_is_silent() {
    // テスト項目: 未参加のまま切断しても誰にも通知されない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut member = TestClient::connect(&server).await;
    member.join("abc").await;
    let mut drifter = TestClient::connect(&server).await;
    drifter.sync().await;

    // when (操作):
    drifter.close().await;

    // then (期待する結果):
    let health = server.wait_for_connections(1).await;
    assert_eq!(health["activeSessions"], 1);
    member.sync().await;
}

#[tokio::test]
async fn test_join_racing_abrupt_disconnect_leaves_no_session() {
    // テスト項目: join 直後に接続が切れても、レジストリにセッションが残らない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut clients = Vec::new();
    for _ in 0..50 {
        clients.push(TestClient::connect(&server).await);
    }
    server.wait_for_connections(50).await;

    // when (操作): join を送った直後に close フレームなしで切断する
    for (i, mut client) in clients.into_iter().enumerate() {
        let session_id = if i % 2 == 0 {
            "shared".to_string()
        } else {
            format!("solo-{i}")
        };
        client.emit("join-session", json!(session_id)).await;
        drop(client);
    }

    // then (期待する結果):
    let health = server.wait_for_connections(0).await;
    assert_eq!(health["activeSessions"], 0);
    let sessions: serde_json::Value = reqwest::get(format!("{}/api/sessions", server.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(sessions.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_input_is_dropped_and_connection_survives() {
    // テスト項目: 不正な入力は破棄され、接続は維持され、他メンバーにも影響しない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut c1 = TestClient::connect(&server).await;
    let mut c2 = TestClient::connect(&server).await;
    c2.join("abc").await;
    c1.join("abc").await;
    c2.expect_event("client-joined").await;

    // when (操作):
    c1.send_raw("not json").await;
    c1.send_raw(r#"{"data": {"sessionId": "abc"}}"#).await;
    c1.emit("unknown-event", json!({"sessionId": "abc"})).await;
    c1.emit("ritual-step", json!("abc")).await;
    c1.emit("ritual-step", json!({"step": "no session"})).await;
    c1.emit("join-session", json!("")).await;
    c1.emit("join-session", json!(42)).await;

    // then (期待する結果):
    c1.sync().await;
    c2.sync().await;
    c1.emit("ritual-complete", json!({"sessionId": "abc"})).await;
    c2.expect_event("ritual-complete").await;
}

#[tokio::test]
async fn test_event_for_foreign_session_is_not_delivered() {
    // テスト項目: 参加していないセッション宛てのイベントは配信されない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut c1 = TestClient::connect(&server).await;
    let mut c2 = TestClient::connect(&server).await;
    c1.join("abc").await;
    c2.join("xyz").await;

    // when (操作):
    c1.emit("phone-connected", json!({"sessionId": "xyz"})).await;
    c1.sync().await;

    // then (期待する結果):
    c2.sync().await;
}

#[tokio::test]
async fn test_ping_replies_to_sender_only() {
    // テスト項目: ping には送信者にだけ timestamp と serverId を返す
    // given (前提条件):
    let server = TestServer::start().await;
    let mut c1 = TestClient::connect(&server).await;
    let mut c2 = TestClient::connect(&server).await;
    c1.join("abc").await;
    c2.join("abc").await;
    c1.expect_event("client-joined").await;

    // when (操作):
    let pong = c1.ping().await;

    // then (期待する結果):
    assert_eq!(pong["data"]["serverId"], TEST_SERVER_ID);
    let timestamp = pong["data"]["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert!(timestamp.ends_with('Z'));
    c2.sync().await;
}
