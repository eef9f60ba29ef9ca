//! Wire and view models
//!
//! Server payloads use camelCase JSON. [`UiMessage`] is the render-only
//! projection the chat view works with; it is never sent to the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ChatId = i64;
pub type MessageId = i64;

/// Text shown on the placeholder bubble while a reply video renders
pub const LOADING_TEXT: &str = "Generating video reply...";

/// Nominal length of a generated reply video, in seconds
pub const AI_VIDEO_DURATION_SECS: u32 = 15;

/// Anything with a status that eventually stops changing
pub trait Lifecycle {
    fn is_terminal(&self) -> bool;
}

/// Processing state shared by chats and messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Completed,
    Error,
    #[serde(other)]
    Processing,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Processing => "processing",
            Status::Completed => "completed",
            Status::Error => "error",
        }
    }

    /// User-facing explanation of a chat in this state
    pub fn chat_banner(self) -> &'static str {
        match self {
            Status::Processing => "Voice cloning in progress. Please wait...",
            Status::Completed => "Chat is ready! You can send messages now.",
            Status::Error => "Voice cloning failed. Try creating the chat again.",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persona conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub voice_id: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lifecycle for Chat {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl Chat {
    /// Merge a partial update into this chat
    pub fn apply(&mut self, patch: &ChatPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(voice_id) = &patch.voice_id {
            self.voice_id = Some(voice_id.clone());
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
    }
}

/// Local partial update for a chat
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatPatch {
    pub status: Option<Status>,
    pub voice_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ChatPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Patch carrying what a chat status poll learns about a chat
    pub fn from_status_report(chat: &Chat) -> Self {
        match chat.status {
            Status::Completed => Self {
                status: Some(Status::Completed),
                voice_id: chat.voice_id.clone(),
                ..Default::default()
            },
            other => Self::status(other),
        }
    }
}

/// A chat together with its persisted messages (`GET /chat/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatWithMessages {
    #[serde(flatten)]
    pub chat: Chat,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// A user message and the state of its generated reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub text: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lifecycle for Message {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl Message {
    /// Reply video URL, only once generation has completed
    pub fn reply_video(&self) -> Option<&str> {
        match self.status {
            Status::Completed => self.video_url.as_deref().filter(|url| !url.is_empty()),
            _ => None,
        }
    }
}

/// Body of `POST /chat/{id}/message`
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage<'a> {
    pub text: &'a str,
}

/// Fields for `POST /chat`; `U` is the platform's file handle
#[derive(Debug, Clone)]
pub struct NewChat<U> {
    pub name: String,
    pub description: Option<String>,
    pub image: U,
    pub audio: U,
}

/// Bubble kind in the chat view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiKind {
    Text,
    Voice,
    Video,
    Loading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// Render-only chat bubble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiMessage {
    pub id: String,
    pub kind: UiKind,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub duration_secs: Option<u32>,
}

impl UiMessage {
    pub fn user_text(message_id: MessageId, text: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: format!("user-{}", message_id),
            kind: UiKind::Text,
            sender: Sender::User,
            content: text.to_string(),
            timestamp,
            duration_secs: None,
        }
    }

    /// Optimistic bubble shown before the server assigned an id
    pub fn pending_user_text(text: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: format!("user-local-{}", timestamp.timestamp_millis()),
            kind: UiKind::Text,
            sender: Sender::User,
            content: text.to_string(),
            timestamp,
            duration_secs: None,
        }
    }

    pub fn loading(message_id: MessageId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Self::loading_id(message_id),
            kind: UiKind::Loading,
            sender: Sender::Ai,
            content: LOADING_TEXT.to_string(),
            timestamp,
            duration_secs: None,
        }
    }

    pub fn ai_video(message_id: MessageId, url: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: format!("ai-{}", message_id),
            kind: UiKind::Video,
            sender: Sender::Ai,
            content: url.to_string(),
            timestamp,
            duration_secs: Some(AI_VIDEO_DURATION_SECS),
        }
    }

    pub fn loading_id(message_id: MessageId) -> String {
        format!("loading-{}", message_id)
    }
}

/// Sign-in / sign-up request body
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Auth endpoint response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub token: Option<String>,
}

/// `POST /audio/upload` response
#[derive(Debug, Clone, Deserialize)]
pub struct AudioUpload {
    pub id: i64,
}

/// Voice clone job state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloneStatus {
    Completed,
    Failed,
    #[serde(other)]
    Pending,
}

/// `GET /audio/status/{id}` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClonedAudio {
    pub id: i64,
    pub original_url: String,
    #[serde(default)]
    pub cloned_url: Option<String>,
    pub voice_id: String,
    pub status: CloneStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lifecycle for ClonedAudio {
    fn is_terminal(&self) -> bool {
        !matches!(self.status, CloneStatus::Pending)
    }
}

/// A pre-generated reply in a cloned voice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceResponse {
    pub id: i64,
    pub question: String,
    pub audio_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_deserializes_camel_case() {
        let chat: Chat = serde_json::from_str(
            r#"{"id":7,"name":"Grandma","description":null,"imageUrl":"http://x/p.png",
                "audioUrl":"http://x/v.wav","voiceId":"v-1","status":"processing",
                "createdAt":"2024-05-01T10:00:00Z","updatedAt":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(chat.id, 7);
        assert_eq!(chat.image_url.as_deref(), Some("http://x/p.png"));
        assert_eq!(chat.status, Status::Processing);
        assert!(!chat.is_terminal());
    }

    #[test]
    fn test_unknown_status_is_processing() {
        let status: Status = serde_json::from_str(r#""queued""#).unwrap();
        assert_eq!(status, Status::Processing);
        let status: Status = serde_json::from_str(r#""error""#).unwrap();
        assert_eq!(status, Status::Error);
        assert_eq!(serde_json::to_string(&Status::Processing).unwrap(), r#""processing""#);
        let clone: CloneStatus = serde_json::from_str(r#""processing""#).unwrap();
        assert_eq!(clone, CloneStatus::Pending);
    }

    #[test]
    fn test_chat_with_messages_flattens_chat() {
        let data: ChatWithMessages = serde_json::from_str(
            r#"{"id":42,"name":"Tween","status":"completed","voiceId":"v",
                "createdAt":"2024-05-01T10:00:00Z","updatedAt":"2024-05-01T10:00:00Z",
                "messages":[{"id":1,"chatId":42,"text":"Hi","status":"completed",
                "videoUrl":"http://x/1.mp4",
                "createdAt":"2024-05-01T10:01:00Z","updatedAt":"2024-05-01T10:02:00Z"}]}"#,
        )
        .unwrap();
        assert_eq!(data.chat.id, 42);
        assert_eq!(data.messages.len(), 1);
        assert_eq!(data.messages[0].reply_video(), Some("http://x/1.mp4"));
    }

    #[test]
    fn test_reply_video_requires_completion() {
        let mut message: Message = serde_json::from_str(
            r#"{"id":1,"chatId":42,"text":"Hi","status":"processing","videoUrl":"http://x/1.mp4",
                "createdAt":"2024-05-01T10:01:00Z","updatedAt":"2024-05-01T10:02:00Z"}"#,
        )
        .unwrap();
        assert_eq!(message.reply_video(), None);

        message.status = Status::Completed;
        message.video_url = Some(String::new());
        assert_eq!(message.reply_video(), None);
    }

    #[test]
    fn test_status_patch_keeps_voice_only_on_completion() {
        let mut chat: Chat = serde_json::from_str(
            r#"{"id":3,"name":"A","status":"completed","voiceId":"voice-9",
                "createdAt":"2024-05-01T10:00:00Z","updatedAt":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        let patch = ChatPatch::from_status_report(&chat);
        assert_eq!(patch.voice_id.as_deref(), Some("voice-9"));

        chat.status = Status::Error;
        let patch = ChatPatch::from_status_report(&chat);
        assert_eq!(patch, ChatPatch::status(Status::Error));
    }

    #[test]
    fn test_ui_message_ids() {
        let now = Utc::now();
        assert_eq!(UiMessage::user_text(5, "Hi", now).id, "user-5");
        assert_eq!(UiMessage::loading(5, now).id, "loading-5");
        let video = UiMessage::ai_video(5, "http://x/v.mp4", now);
        assert_eq!(video.id, "ai-5");
        assert_eq!(video.duration_secs, Some(AI_VIDEO_DURATION_SECS));
    }
}
