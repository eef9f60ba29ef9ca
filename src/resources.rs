//! Resource stores
//!
//! In-memory collections behind the sidebar and chat view. Each store keeps
//! `loading` / `error` alongside its data; fetches replace the whole
//! collection, local mutators adjust it without a round trip.
//!
//! The browser keeps a [`ChatStore`] inside a signal and mutates it through
//! these methods; the CLI drives it directly.

use chrono::{DateTime, Utc};

use crate::api::TweenApi;
use crate::error::ClientResult;
use crate::models::{Chat, ChatId, ChatPatch, Message, Status, UiMessage};

/// Title shown for a chat whose setup has not finished
pub const DRAFT_TITLE: &str = "New chat";

/// A sidebar chat that exists only locally until setup completes
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Key of a sidebar entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Draft(String),
    Chat(ChatId),
}

impl EntryKey {
    /// Stable string form for DOM keys and selection state
    pub fn as_key(&self) -> String {
        match self {
            EntryKey::Draft(id) => id.clone(),
            EntryKey::Chat(id) => id.to_string(),
        }
    }
}

/// One row in the sidebar
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarEntry {
    pub key: EntryKey,
    pub title: String,
    pub preview: Option<String>,
    pub time_label: String,
    pub setup_complete: bool,
    pub processing: bool,
}

/// Server chats plus local drafts
#[derive(Debug, Clone, Default)]
pub struct ChatStore {
    chats: Vec<Chat>,
    drafts: Vec<Draft>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn drafts(&self) -> &[Draft] {
        &self.drafts
    }

    pub fn get(&self, id: ChatId) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == id)
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Replace the collection with a fetch result, or keep it and record the error
    pub fn finish_fetch(&mut self, result: ClientResult<Vec<Chat>>) {
        self.loading = false;
        match result {
            Ok(chats) => {
                tracing::debug!(count = chats.len(), "Chats loaded");
                self.chats = chats;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load chats");
                self.error = Some(e.to_string());
            }
        }
    }

    pub async fn refresh<A: TweenApi + ?Sized>(&mut self, api: &A) {
        self.begin_fetch();
        let result = api.list_chats().await;
        self.finish_fetch(result);
    }

    /// New chats go to the top
    pub fn add(&mut self, chat: Chat) {
        self.chats.retain(|c| c.id != chat.id);
        self.chats.insert(0, chat);
    }

    pub fn remove(&mut self, id: ChatId) -> Option<Chat> {
        let index = self.chats.iter().position(|c| c.id == id)?;
        Some(self.chats.remove(index))
    }

    /// Merge a patch into the chat with `id`; false if it is not loaded
    pub fn update(&mut self, id: ChatId, patch: &ChatPatch) -> bool {
        match self.chats.iter_mut().find(|c| c.id == id) {
            Some(chat) => {
                chat.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Apply the outcome of a `DELETE /chat/{id}`; only success removes the chat
    pub fn settle_delete(&mut self, id: ChatId, result: &ClientResult<()>) -> bool {
        match result {
            Ok(()) => self.remove(id).is_some(),
            Err(e) => {
                tracing::warn!(chat_id = id, error = %e, "Chat was not deleted");
                false
            }
        }
    }

    pub async fn delete<A: TweenApi + ?Sized>(&mut self, api: &A, id: ChatId) -> ClientResult<()> {
        let result = api.delete_chat(id).await;
        self.settle_delete(id, &result);
        result
    }

    /// Start a local draft and return its id
    pub fn add_draft(&mut self, now: DateTime<Utc>) -> String {
        let mut id = format!("draft-{}", now.timestamp_millis());
        while self.drafts.iter().any(|d| d.id == id) {
            id.push('+');
        }
        self.drafts.insert(
            0,
            Draft {
                id: id.clone(),
                created_at: now,
            },
        );
        id
    }

    pub fn remove_draft(&mut self, id: &str) -> bool {
        let before = self.drafts.len();
        self.drafts.retain(|d| d.id != id);
        self.drafts.len() != before
    }

    /// Swap a draft for the chat the server created from it
    pub fn complete_draft(&mut self, draft_id: &str, chat: Chat) {
        self.remove_draft(draft_id);
        self.add(chat);
    }

    /// Drafts first, then server chats, as the sidebar shows them
    pub fn sidebar(&self, now: DateTime<Utc>) -> Vec<SidebarEntry> {
        let drafts = self.drafts.iter().map(|d| SidebarEntry {
            key: EntryKey::Draft(d.id.clone()),
            title: DRAFT_TITLE.to_string(),
            preview: None,
            time_label: relative_time(d.created_at, now),
            setup_complete: false,
            processing: false,
        });

        let chats = self.chats.iter().map(|c| SidebarEntry {
            key: EntryKey::Chat(c.id),
            title: c.name.clone(),
            preview: c.description.clone().filter(|d| !d.is_empty()),
            time_label: relative_time(c.updated_at, now),
            setup_complete: true,
            processing: c.status == Status::Processing,
        });

        drafts.chain(chats).collect()
    }
}

/// "5 min ago", "3 h ago", "2 d ago"
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let minutes = elapsed.num_minutes().max(0);
    let hours = elapsed.num_hours().max(0);
    let days = elapsed.num_days().max(0);

    if minutes < 60 {
        format!("{} min ago", minutes)
    } else if hours < 24 {
        format!("{} h ago", hours)
    } else {
        format!("{} d ago", days)
    }
}

/// Project one persisted message into bubbles, given its current status
///
/// A failed status lookup (`None`) leaves just the user's bubble.
pub fn project_message(message: &Message, latest: Option<&Message>, now: DateTime<Utc>) -> Vec<UiMessage> {
    let mut bubbles = vec![UiMessage::user_text(message.id, &message.text, message.created_at)];

    if let Some(latest) = latest {
        if let Some(url) = latest.reply_video() {
            bubbles.push(UiMessage::ai_video(message.id, url, latest.updated_at));
        } else if latest.status == Status::Processing {
            bubbles.push(UiMessage::loading(message.id, now));
        }
    }

    bubbles
}

/// Fetch a chat and build its bubble timeline, checking each message's
/// reply in order
pub async fn load_timeline<A: TweenApi + ?Sized>(
    api: &A,
    chat_id: ChatId,
) -> ClientResult<Vec<UiMessage>> {
    let chat = api.get_chat(chat_id).await?;
    let mut timeline = Vec::with_capacity(chat.messages.len() * 2);

    for message in &chat.messages {
        let latest = match api.get_message(chat_id, message.id).await {
            Ok(latest) => Some(latest),
            Err(e) => {
                tracing::debug!(chat_id, message_id = message.id, error = %e, "Message status unavailable");
                None
            }
        };
        timeline.extend(project_message(message, latest.as_ref(), Utc::now()));
    }

    tracing::debug!(chat_id, bubbles = timeline.len(), "Timeline loaded");
    Ok(timeline)
}

/// Bubble timeline for the open chat
#[derive(Debug, Clone, Default)]
pub struct TimelineStore {
    pub chat_id: Option<ChatId>,
    pub loading: bool,
    pub error: Option<String>,
}

impl TimelineStore {
    pub fn begin_fetch(&mut self, chat_id: ChatId) {
        self.chat_id = Some(chat_id);
        self.loading = true;
        self.error = None;
    }

    /// Record the fetch outcome, returning the bubbles to show on success
    pub fn finish_fetch(&mut self, result: ClientResult<Vec<UiMessage>>) -> Option<Vec<UiMessage>> {
        self.loading = false;
        match result {
            Ok(messages) => Some(messages),
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }
}
