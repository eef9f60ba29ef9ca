//! Backend endpoint paths

use crate::models::{ChatId, MessageId};

pub const SIGN_IN: &str = "/auth/sign-in";
pub const SIGN_UP: &str = "/auth/sign-up";
pub const LOGOUT: &str = "/auth/logout";
pub const CHATS: &str = "/chat";
pub const AUDIO_UPLOAD: &str = "/audio/upload";

pub fn chat(id: ChatId) -> String {
    format!("/chat/{}", id)
}

pub fn chat_status(id: ChatId) -> String {
    format!("/chat/{}/status", id)
}

pub fn chat_messages(id: ChatId) -> String {
    format!("/chat/{}/message", id)
}

pub fn message(chat: ChatId, message: MessageId) -> String {
    format!("/chat/{}/message/{}", chat, message)
}

pub fn audio_status(id: i64) -> String {
    format!("/audio/status/{}", id)
}

pub fn voice_responses(voice_id: &str) -> String {
    format!(
        "/audio/chat-responses?voiceId={}",
        urlencoding::encode(voice_id)
    )
}
