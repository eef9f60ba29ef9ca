//! Scripted in-memory backend for unit tests

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicI64, Ordering};
use std::sync::Mutex;

use super::TweenApi;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    AudioUpload, AuthResponse, Chat, ChatId, ChatWithMessages, CloneStatus, ClonedAudio,
    Credentials, Message, MessageId, NewChat, Status, VoiceResponse,
};

pub fn chat_with(id: ChatId, name: &str, status: Status) -> Chat {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    Chat {
        id,
        name: name.to_string(),
        description: None,
        image_url: None,
        audio_url: None,
        voice_id: None,
        status,
        created_at: at,
        updated_at: at,
    }
}

pub fn message_with(id: MessageId, chat_id: ChatId, status: Status, video: Option<&str>) -> Message {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 1, 0).unwrap();
    Message {
        id,
        chat_id,
        text: format!("message {}", id),
        audio_url: None,
        video_url: video.map(str::to_string),
        status,
        created_at: at,
        updated_at: at,
    }
}

pub fn clone_with(id: i64, status: CloneStatus) -> ClonedAudio {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    ClonedAudio {
        id,
        original_url: "http://x/original.wav".to_string(),
        cloned_url: None,
        voice_id: "voice-1".to_string(),
        status,
        created_at: at,
        updated_at: at,
    }
}

fn http(status: u16, message: &str) -> ClientError {
    ClientError::Http {
        status,
        message: message.to_string(),
    }
}

/// Upload handle in tests is just the file name
pub type FakeUpload = String;

#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<String>>,

    pub auth_response: Mutex<AuthResponse>,
    pub auth_failure: Mutex<Option<(u16, String)>>,
    pub logout_fails: AtomicBool,

    pub chats: Mutex<Vec<Chat>>,
    pub list_fails: AtomicBool,
    pub created: Mutex<Vec<NewChat<FakeUpload>>>,
    pub create_status: Mutex<Option<Status>>,
    pub deleted: Mutex<Vec<ChatId>>,
    pub delete_fails: AtomicBool,
    pub details: Mutex<HashMap<ChatId, ChatWithMessages>>,
    pub chat_statuses: Mutex<VecDeque<Chat>>,

    pub sent: Mutex<Vec<(ChatId, String)>>,
    pub send_fails: AtomicBool,
    next_message_id: AtomicI64,
    message_queue: Mutex<VecDeque<Message>>,
    pub message_lookup: Mutex<HashMap<MessageId, Message>>,
    message_fetches: AtomicU32,

    pub uploads: Mutex<Vec<FakeUpload>>,
    pub audio_statuses: Mutex<VecDeque<ClonedAudio>>,
    pub responses: Mutex<Vec<VoiceResponse>>,
}

impl FakeApi {
    pub fn new() -> Self {
        let api = Self::default();
        api.next_message_id.store(1, Ordering::SeqCst);
        api
    }

    pub fn with_next_message_id(self, id: MessageId) -> Self {
        self.next_message_id.store(id, Ordering::SeqCst);
        self
    }

    /// Next `get_message` answer, regardless of id
    pub fn queue_message_status(&self, message: Message) {
        self.message_queue.lock().unwrap().push_back(message);
    }

    pub fn queue_chat_status(&self, chat: Chat) {
        self.chat_statuses.lock().unwrap().push_back(chat);
    }

    pub fn message_fetches(&self) -> u32 {
        self.message_fetches.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn auth(&self, call: &str, credentials: &Credentials) -> ClientResult<AuthResponse> {
        self.record(format!("{} {}", call, credentials.login));
        if let Some((status, message)) = self.auth_failure.lock().unwrap().clone() {
            return Err(http(status, &message));
        }
        Ok(self.auth_response.lock().unwrap().clone())
    }
}

#[async_trait]
impl TweenApi for FakeApi {
    type Upload = FakeUpload;

    async fn sign_in(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        self.auth("sign-in", credentials)
    }

    async fn sign_up(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        self.auth("sign-up", credentials)
    }

    async fn logout(&self) -> ClientResult<()> {
        self.record("logout");
        if self.logout_fails.load(Ordering::SeqCst) {
            return Err(ClientError::Network("offline".into()));
        }
        Ok(())
    }

    async fn list_chats(&self) -> ClientResult<Vec<Chat>> {
        self.record("list");
        if self.list_fails.load(Ordering::SeqCst) {
            return Err(http(500, "Failed to load chats"));
        }
        Ok(self.chats.lock().unwrap().clone())
    }

    async fn create_chat(&self, chat: NewChat<FakeUpload>) -> ClientResult<Chat> {
        self.record(format!("create {}", chat.name));
        let mut created = chat_with(100, &chat.name, Status::Processing);
        if let Some(status) = *self.create_status.lock().unwrap() {
            created.status = status;
        }
        created.description = chat.description.clone();
        self.created.lock().unwrap().push(chat);
        Ok(created)
    }

    async fn delete_chat(&self, id: ChatId) -> ClientResult<()> {
        self.record(format!("delete {}", id));
        if self.delete_fails.load(Ordering::SeqCst) {
            return Err(http(500, "Failed to delete chat"));
        }
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }

    async fn get_chat(&self, id: ChatId) -> ClientResult<ChatWithMessages> {
        self.record(format!("get {}", id));
        self.details
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| http(404, "Chat not found"))
    }

    async fn chat_status(&self, id: ChatId) -> ClientResult<Chat> {
        self.record(format!("status {}", id));
        self.chat_statuses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ClientError::Network("unreachable".into()))
    }

    async fn send_message(&self, chat: ChatId, text: &str) -> ClientResult<Message> {
        self.record(format!("send {}", chat));
        if self.send_fails.load(Ordering::SeqCst) {
            return Err(http(500, "Internal Server Error"));
        }
        self.sent.lock().unwrap().push((chat, text.to_string()));
        let id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        let mut message = message_with(id, chat, Status::Processing, None);
        message.text = text.to_string();
        Ok(message)
    }

    async fn get_message(&self, _chat: ChatId, message: MessageId) -> ClientResult<Message> {
        self.message_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(queued) = self.message_queue.lock().unwrap().pop_front() {
            return Ok(queued);
        }
        self.message_lookup
            .lock()
            .unwrap()
            .get(&message)
            .cloned()
            .ok_or_else(|| ClientError::Network("unreachable".into()))
    }

    async fn upload_audio(&self, file: FakeUpload) -> ClientResult<AudioUpload> {
        self.record(format!("upload {}", file));
        self.uploads.lock().unwrap().push(file);
        Ok(AudioUpload { id: 11 })
    }

    async fn audio_status(&self, id: i64) -> ClientResult<ClonedAudio> {
        self.record(format!("audio-status {}", id));
        self.audio_statuses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ClientError::Network("unreachable".into()))
    }

    async fn voice_responses(&self, voice_id: &str) -> ClientResult<Vec<VoiceResponse>> {
        self.record(format!("responses {}", voice_id));
        Ok(self.responses.lock().unwrap().clone())
    }
}
