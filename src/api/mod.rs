//! Backend API contract
//!
//! [`TweenApi`] is the seam between the client flows and the transport. The
//! native build implements it with `reqwest` ([`http::HttpClient`]); the
//! browser build implements it with `gloo-net`. Both share the endpoint paths
//! in [`routes`] and the error-body parsing below.

pub mod routes;

#[cfg(feature = "native")]
pub mod http;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{ClientError, ClientResult};
use crate::models::{
    AudioUpload, AuthResponse, Chat, ChatId, ChatWithMessages, ClonedAudio, Credentials, Message,
    MessageId, NewChat, VoiceResponse,
};
use crate::platform::{MaybeSend, MaybeSync};

/// Every backend call the client makes
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait TweenApi: MaybeSend + MaybeSync {
    /// Platform file handle used for multipart uploads
    type Upload: MaybeSend + 'static;

    async fn sign_in(&self, credentials: &Credentials) -> ClientResult<AuthResponse>;

    async fn sign_up(&self, credentials: &Credentials) -> ClientResult<AuthResponse>;

    async fn logout(&self) -> ClientResult<()>;

    async fn list_chats(&self) -> ClientResult<Vec<Chat>>;

    /// `POST /chat` as multipart: name, description (when non-empty), image, audio
    async fn create_chat(&self, chat: NewChat<Self::Upload>) -> ClientResult<Chat>;

    async fn delete_chat(&self, id: ChatId) -> ClientResult<()>;

    async fn get_chat(&self, id: ChatId) -> ClientResult<ChatWithMessages>;

    async fn chat_status(&self, id: ChatId) -> ClientResult<Chat>;

    async fn send_message(&self, chat: ChatId, text: &str) -> ClientResult<Message>;

    async fn get_message(&self, chat: ChatId, message: MessageId) -> ClientResult<Message>;

    /// `POST /audio/upload` with the sample in the `file` field
    async fn upload_audio(&self, file: Self::Upload) -> ClientResult<AudioUpload>;

    async fn audio_status(&self, id: i64) -> ClientResult<ClonedAudio>;

    async fn voice_responses(&self, voice_id: &str) -> ClientResult<Vec<VoiceResponse>>;
}

/// File name used when a recorded sample has no name of its own
pub const DEFAULT_RECORDING_NAME: &str = "recording.wav";

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Build an error from a non-2xx response, preferring the server's
/// `message`, then its `error`, then `fallback`
pub fn error_from_body(status: u16, body: &str, fallback: &str) -> ClientError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());

    ClientError::Http { status, message }
}

/// Generic fallback text for endpoints without a friendlier one
pub fn status_fallback(status: u16) -> String {
    format!("Request failed with status {}", status)
}

/// Voice responses are listed only when the body is a JSON array; an empty
/// body means none yet
pub fn parse_voice_responses(body: &str) -> ClientResult<Vec<VoiceResponse>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(Vec::new())
    }
}

/// Keep the description only when the user typed one
pub fn description_field(description: &Option<String>) -> Option<&str> {
    description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_prefers_message_then_error() {
        let err = error_from_body(400, r#"{"message":"Bad login","error":"x"}"#, "fallback");
        assert_eq!(err.to_string(), "Bad login");

        let err = error_from_body(401, r#"{"error":"Unauthorized"}"#, "fallback");
        assert_eq!(err.to_string(), "Unauthorized");
        assert!(err.is_unauthorized());

        let err = error_from_body(500, "<html>oops</html>", "Sign in failed");
        assert_eq!(err.to_string(), "Sign in failed");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_voice_responses_need_an_array() {
        let list = parse_voice_responses(
            r#"[{"id":1,"question":"How are you?","audioUrl":"http://x/1.mp3"}]"#,
        )
        .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].question, "How are you?");

        assert!(parse_voice_responses(r#"{"status":"pending"}"#)
            .unwrap()
            .is_empty());
        assert!(parse_voice_responses("").unwrap().is_empty());
        assert!(parse_voice_responses(" \n").unwrap().is_empty());
        assert!(parse_voice_responses("not json").is_err());
    }

    #[test]
    fn test_blank_description_is_dropped() {
        assert_eq!(description_field(&Some("  ".to_string())), None);
        assert_eq!(description_field(&None), None);
        assert_eq!(description_field(&Some(" kind ".to_string())), Some("kind"));
    }
}
