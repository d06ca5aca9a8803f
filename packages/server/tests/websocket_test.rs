//! Integration tests for the WebSocket surface (presence, rooms, fanout, acks).

mod common;

use std::time::Duration;

use common::TestServer;
use serde_json::{Value, json};

const QUIET: Duration = Duration::from_millis(300);

/// Open (or fetch) the 1:1 chat between `requester` and `other` over HTTP
async fn open_direct_chat(server: &TestServer, requester: &str, other: &str) -> String {
    let response = reqwest::Client::new()
        .post(server.http_url("/api/chat/access"))
        .bearer_auth(server.token(requester))
        .json(&json!({"userId": other}))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_direct_message_reaches_room_and_receiver_with_same_id() {
    // テスト項目: 1:1 メッセージが Room 経路と受信者への直接経路の両方で同じ ID で届き、非メンバーには届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let chat_id = open_direct_chat(&server, "alice", "bob").await;
    let mut alice = server.connect("alice").await;
    let mut bob = server.connect("bob").await;
    let mut carol = server.connect("carol").await;
    bob.join(&chat_id, 1).await;

    // when (操作):
    alice
        .send(json!({
            "event": "send_message",
            "data": {"chatId": chat_id, "content": "hello", "clientId": "tmp-1"},
            "ack": 2
        }))
        .await;
    let ack = alice.recv_ack(2).await;

    // then (期待する結果):
    assert_eq!(ack["ok"], true);
    assert_eq!(ack["clientId"], "tmp-1");
    let message_id = ack["messageId"].as_str().unwrap().to_string();

    let first = bob.recv_event("message").await;
    let second = bob.recv_event("message").await;
    assert_eq!(first["id"], message_id.as_str());
    assert_eq!(second["id"], message_id.as_str());
    assert_eq!(first["content"], "hello");
    assert_eq!(first["sender"]["name"], "Alice");
    assert_eq!(first["receiver"], "bob");
    assert_eq!(first["clientId"], "tmp-1");

    carol.assert_no_event("message", QUIET).await;
}

#[tokio::test]
async fn test_anonymous_send_is_rejected_without_fanout() {
    // テスト項目: 匿名接続からの送信は not_authenticated で拒否され、Room には何も届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let chat_id = open_direct_chat(&server, "alice", "bob").await;
    let mut bob = server.connect("bob").await;
    bob.join(&chat_id, 1).await;
    let mut anonymous = server.connect_anonymous().await;

    // when (操作):
    anonymous
        .send(json!({
            "event": "send_message",
            "data": {"chatId": chat_id, "content": "spoofed"},
            "ack": 7
        }))
        .await;
    let ack = anonymous.recv_ack(7).await;

    // then (期待する結果):
    assert_eq!(ack["ok"], false);
    assert_eq!(ack["error"], "not_authenticated");
    bob.assert_no_event("message", QUIET).await;
}

#[tokio::test]
async fn test_presence_is_broadcast_on_connect_and_disconnect() {
    // テスト項目: 接続・切断のたびにオンラインユーザー一覧が配信され、匿名接続は含まれない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice").await;
    let _anonymous = server.connect_anonymous().await;

    // when (操作):
    let bob = server.connect("bob").await;
    let with_bob = loop {
        let users = alice.recv_event("getOnlineUsers").await;
        if users.as_array().unwrap().len() == 2 {
            break users;
        }
    };
    bob.close().await;
    let without_bob = alice.recv_event("getOnlineUsers").await;

    // then (期待する結果):
    assert_eq!(with_bob, json!(["alice", "bob"]));
    assert_eq!(without_bob, json!(["alice"]));
}

#[tokio::test]
async fn test_second_connection_of_same_user_keeps_presence() {
    // テスト項目: 同じユーザーの接続が 1 本残っている間はオンラインのまま
    // given (前提条件):
    let server = TestServer::start().await;
    let mut carol = server.connect("carol").await;
    let first = server.connect("alice").await;
    let _second = server.connect("alice").await;

    // when (操作):
    first.close().await;

    // then (期待する結果):
    // 1 本目・2 本目の接続時の一覧を読み飛ばし、切断後の一覧を確認する
    carol.recv_event("getOnlineUsers").await;
    carol.recv_event("getOnlineUsers").await;
    let after_close = carol.recv_event("getOnlineUsers").await;
    assert_eq!(after_close, json!(["alice", "carol"]));
}

#[tokio::test]
async fn test_typing_is_relayed_to_others_in_room() {
    // テスト項目: 入力中シグナルは同じ Room の他の接続にのみ中継される
    // given (前提条件):
    let server = TestServer::start().await;
    let chat_id = open_direct_chat(&server, "alice", "bob").await;
    let mut alice = server.connect("alice").await;
    let mut bob = server.connect("bob").await;
    alice.join(&chat_id, 1).await;
    bob.join(&chat_id, 1).await;

    // when (操作):
    alice
        .send(json!({"event": "typing", "data": {"chatId": chat_id, "isTyping": true}}))
        .await;

    // then (期待する結果):
    let typing = bob.recv_event("typing").await;
    assert_eq!(
        typing,
        json!({"chatId": chat_id, "userId": "alice", "isTyping": true})
    );
    alice.assert_no_event("typing", QUIET).await;
}

#[tokio::test]
async fn test_mark_read_signal_and_idempotence() {
    // テスト項目: 既読化のシグナルが Room の他の接続に届き、繰り返しても問題ない
    // given (前提条件):
    let server = TestServer::start().await;
    let chat_id = open_direct_chat(&server, "alice", "bob").await;
    let mut alice = server.connect("alice").await;
    let mut bob = server.connect("bob").await;
    alice.join(&chat_id, 1).await;
    bob.join(&chat_id, 1).await;
    alice
        .send(json!({
            "event": "send_message",
            "data": {"chatId": chat_id, "content": "read me"},
            "ack": 2
        }))
        .await;
    alice.recv_ack(2).await;

    // when (操作):
    for ack in [3, 4] {
        bob.send(json!({"event": "mark_read", "data": {"chatId": chat_id}, "ack": ack}))
            .await;
        assert_eq!(bob.recv_ack(ack).await["ok"], true);
    }

    // then (期待する結果):
    let signal = alice.recv_event("messages_read").await;
    assert_eq!(signal["chatId"], chat_id.as_str());
    assert_eq!(signal["by"], "bob");

    let history: Value = reqwest::Client::new()
        .get(server.http_url(&format!("/api/message/{chat_id}")))
        .bearer_auth(server.token("bob"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history[0]["readBy"], json!(["alice", "bob"]));
}

#[tokio::test]
async fn test_invalid_and_unknown_frames() {
    // テスト項目: 不正なペイロードは invalid_payload で ack され、未知のイベントは ack なしで破棄される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice").await;

    // when (操作):
    alice
        .send(json!({"event": "send_message", "data": "oops", "ack": 1}))
        .await;
    let invalid = alice.recv_ack(1).await;
    alice
        .send(json!({"event": "does_not_exist", "data": {}, "ack": 2}))
        .await;
    alice
        .send(json!({"event": "join_room", "data": {}, "ack": 3}))
        .await;
    let next = alice.recv_event("ack").await;

    // then (期待する結果):
    assert_eq!(invalid["ok"], false);
    assert_eq!(invalid["error"], "invalid_payload");
    // ack 2 は返らず、次に届くのは roomId のない join への ack
    assert_eq!(next["id"], 3);
    assert_eq!(next["ok"], false);
    assert_eq!(next["error"], "roomId required");
}

#[tokio::test]
async fn test_delete_message_notifies_room() {
    // テスト項目: 送信者による削除が Room に通知され、他人の削除は拒否される
    // given (前提条件):
    let server = TestServer::start().await;
    let chat_id = open_direct_chat(&server, "alice", "bob").await;
    let mut alice = server.connect("alice").await;
    let mut bob = server.connect("bob").await;
    bob.join(&chat_id, 1).await;
    alice
        .send(json!({
            "event": "send_message",
            "data": {"chatId": chat_id, "content": "oops"},
            "ack": 2
        }))
        .await;
    let message_id = alice.recv_ack(2).await["messageId"]
        .as_str()
        .unwrap()
        .to_string();

    // when (操作):
    bob.send(json!({"event": "delete_message", "data": {"messageId": message_id}, "ack": 3}))
        .await;
    let by_bob = bob.recv_ack(3).await;
    alice
        .send(json!({"event": "delete_message", "data": {"messageId": message_id}, "ack": 4}))
        .await;
    let by_alice = alice.recv_ack(4).await;

    // then (期待する結果):
    assert_eq!(by_bob["error"], "not_allowed");
    assert_eq!(by_alice["ok"], true);
    let deleted = bob.recv_event("message_deleted").await;
    assert_eq!(
        deleted,
        json!({"messageId": message_id, "chatId": chat_id})
    );
}
