//! HTTP Client Contract Tests
//!
//! These tests run [`HttpClient`] against a mock backend and check:
//! - Paths, methods and bodies of each request
//! - Bearer token handling
//! - Error body parsing and fallback texts
//! - The full send-and-wait flow over real HTTP

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tween::conversation::{send_text, ConversationEvent, Timeline};
use tween::models::UiKind;
use tween::{
    auth, ClientError, HttpClient, NewChat, PollPolicy, Session, Status, TokioSleeper, TweenApi,
    UploadFile,
};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, session: Arc<Session>) -> HttpClient {
    let config = tween::config::ApiConfig {
        base_url: server.uri(),
        request_timeout_secs: 5,
    };
    HttpClient::new(&config, session).unwrap()
}

fn chat_json(id: i64, name: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "imageUrl": "http://cdn/p.png",
        "audioUrl": "http://cdn/v.wav",
        "voiceId": null,
        "status": status,
        "createdAt": "2024-05-01T10:00:00Z",
        "updatedAt": "2024-05-01T10:00:00Z"
    })
}

fn message_json(id: i64, chat: i64, status: &str, video: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "chatId": chat,
        "text": "Hello",
        "audioUrl": null,
        "videoUrl": video,
        "status": status,
        "createdAt": "2024-05-01T10:01:00Z",
        "updatedAt": "2024-05-01T10:01:30Z"
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Auth
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sign_in_posts_credentials_and_stores_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/sign-in"))
        .and(body_partial_json(json!({"login": "anna", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Welcome back",
            "user": {"id": 1, "login": "anna"},
            "token": "jwt-abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(Session::in_memory());
    let api = client(&server, session.clone());

    let response = auth::sign_in(&api, &session, "anna", "secret1").await.unwrap();
    assert_eq!(response.message.as_deref(), Some("Welcome back"));
    assert_eq!(session.token().as_deref(), Some("jwt-abc"));
}

#[tokio::test]
async fn test_sign_up_conflict_surfaces_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/sign-up"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "User already exists"})),
        )
        .mount(&server)
        .await;

    let session = Arc::new(Session::in_memory());
    let api = client(&server, session.clone());

    let err = auth::sign_up(&api, &session, "anna", "secret1", "secret1")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.to_string(), "User already exists");
}

#[tokio::test]
async fn test_sign_in_without_reason_uses_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/sign-in"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let session = Arc::new(Session::in_memory());
    let api = client(&server, session.clone());

    let err = auth::sign_in(&api, &session, "anna", "secret1").await.unwrap_err();
    assert_eq!(err.to_string(), auth::SIGN_IN_FAILED);
}

#[tokio::test]
async fn test_logout_clears_session_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = Arc::new(Session::in_memory());
    session.set("jwt-abc").unwrap();
    let api = client(&server, session.clone());

    assert!(auth::logout(&api, &session).await.is_err());
    assert!(!session.is_authenticated());
}

// ────────────────────────────────────────────────────────────────────────────
// Chats
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat"))
        .and(header("authorization", "Bearer jwt-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            chat_json(1, "Grandma", "completed"),
            chat_json(2, "Dad", "processing")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(Session::in_memory());
    session.set("jwt-abc").unwrap();
    let api = client(&server, session);

    let chats = api.list_chats().await.unwrap();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[1].status, Status::Processing);
}

#[tokio::test]
async fn test_unauthorized_is_detectable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Unauthorized"})))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(Session::in_memory()));

    let err = api.list_chats().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Unauthorized");
}

#[tokio::test]
async fn test_create_chat_sends_multipart_form() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_string_contains("name=\"name\""))
        .and(body_string_contains("Grandma"))
        .and(body_string_contains("filename=\"photo.png\""))
        .and(body_string_contains("filename=\"voice.wav\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(chat_json(100, "Grandma", "processing")))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(Session::in_memory()));

    let chat = api
        .create_chat(NewChat {
            name: "Grandma".to_string(),
            description: Some("   ".to_string()),
            image: UploadFile::new("photo.png", "image/png", b"PNG".to_vec()),
            audio: UploadFile::new("voice.wav", "audio/wav", b"RIFF".to_vec()),
        })
        .await
        .unwrap();
    assert_eq!(chat.id, 100);
    assert_eq!(chat.status, Status::Processing);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"image\""));
    assert!(body.contains("name=\"audio\""));
    // blank descriptions are left out
    assert!(!body.contains("name=\"description\""));
}

#[tokio::test]
async fn test_delete_missing_chat_uses_status_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/chat/9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(Session::in_memory()));

    let err = api.delete_chat(9).await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status 404");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat/3/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(Session::in_memory()));

    let err = api.chat_status(3).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

// ────────────────────────────────────────────────────────────────────────────
// Messages
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_text_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/42/message"))
        .and(body_partial_json(json!({"text": "Hello"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(message_json(7, 42, "processing", None)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/chat/42/message/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_json(7, 42, "processing", None)))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/chat/42/message/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_json(
            7,
            42,
            "completed",
            Some("http://x/video.mp4"),
        )))
        .mount(&server)
        .await;

    let mut chat = chat_json(42, "Tween", "completed");
    chat["messages"] = json!([message_json(7, 42, "completed", Some("http://x/video.mp4"))]);
    Mock::given(method("GET"))
        .and(path("/chat/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(Session::in_memory()));
    let policy = PollPolicy::every(Duration::from_millis(10)).max_attempts(5);

    let mut timeline = Timeline::default();
    let mut notices = Vec::new();
    let outcome = send_text(&api, &TokioSleeper, &policy, 42, "Hello", |event| {
        if let ConversationEvent::Notify(notice) = &event {
            notices.push(notice.text.clone());
        }
        timeline.apply(&event);
    })
    .await
    .unwrap();

    assert_eq!(outcome.message.id, 7);
    assert_eq!(outcome.reply.unwrap().status, Status::Completed);
    assert!(notices.is_empty());

    let bubbles = timeline.messages();
    assert_eq!(bubbles.len(), 2);
    assert_eq!(bubbles[0].id, "user-7");
    assert_eq!(bubbles[1].kind, UiKind::Video);
    assert_eq!(bubbles[1].content, "http://x/video.mp4");
}

// ────────────────────────────────────────────────────────────────────────────
// Voice
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_audio_uses_file_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/upload"))
        .and(body_string_contains("name=\"file\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 11})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(Session::in_memory()));

    let upload = api
        .upload_audio(UploadFile::new("recording.wav", "audio/wav", b"RIFF".to_vec()))
        .await
        .unwrap();
    assert_eq!(upload.id, 11);
}

#[tokio::test]
async fn test_voice_responses_encode_voice_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/audio/chat-responses"))
        .and(query_param("voiceId", "voice 1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "question": "How are you?", "audioUrl": "http://cdn/r1.mp3"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(Session::in_memory()));

    let responses = api.voice_responses("voice 1").await.unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].question, "How are you?");
}

#[tokio::test]
async fn test_voice_responses_non_array_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/audio/chat-responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(Session::in_memory()));

    let responses = api.voice_responses("voice-1").await.unwrap();
    assert!(responses.is_empty());
}

#[tokio::test]
async fn test_voice_responses_empty_body_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/audio/chat-responses"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(Session::in_memory()));

    let responses = api.voice_responses("voice-1").await.unwrap();
    assert!(responses.is_empty());
}
