//! Message send flow
//!
//! Sending text runs optimistically: the user's bubble shows at once, a
//! loading bubble stands in for the reply while the backend renders it, and
//! the authoritative timeline is fetched once the reply settles. The flow
//! reports progress as [`ConversationEvent`]s so the browser view and the CLI
//! can render the same sequence.

use chrono::Utc;

use crate::api::TweenApi;
use crate::error::{ClientResult, ValidationError};
use crate::models::{ChatId, Message, Status, UiMessage};
use crate::notify::Notice;
use crate::poll::{wait_for_message_complete, PollPolicy, Sleeper};
use crate::resources::load_timeline;

/// One visible change to the chat view
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEvent {
    Append(UiMessage),
    Remove(String),
    Replace(Vec<UiMessage>),
    Notify(Notice),
}

/// Bubbles currently on screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    messages: Vec<UiMessage>,
}

impl Timeline {
    pub fn new(messages: Vec<UiMessage>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[UiMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: UiMessage) {
        self.messages.push(message);
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        self.messages.len() != before
    }

    pub fn replace(&mut self, messages: Vec<UiMessage>) {
        self.messages = messages;
    }

    /// Apply an event; notifications don't touch the bubbles
    pub fn apply(&mut self, event: &ConversationEvent) {
        match event {
            ConversationEvent::Append(message) => self.push(message.clone()),
            ConversationEvent::Remove(id) => {
                self.remove(id);
            }
            ConversationEvent::Replace(messages) => self.replace(messages.clone()),
            ConversationEvent::Notify(_) => {}
        }
    }
}

/// What happened to a sent message
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub message: Message,
    /// Terminal snapshot of the reply, `None` if polling gave up
    pub reply: Option<Message>,
}

/// Send `text` to `chat_id` and follow its reply to the end
///
/// A failed POST emits an error notice and returns the error; nothing is
/// retried. Every other failure is reported through events and the flow still
/// completes.
pub async fn send_text<A, S, E>(
    api: &A,
    sleeper: &S,
    policy: &PollPolicy,
    chat_id: ChatId,
    text: &str,
    mut emit: E,
) -> ClientResult<SendOutcome>
where
    A: TweenApi + ?Sized,
    S: Sleeper + ?Sized,
    E: FnMut(ConversationEvent),
{
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::Required("Message").into());
    }

    emit(ConversationEvent::Append(UiMessage::pending_user_text(
        text,
        Utc::now(),
    )));

    let message = match api.send_message(chat_id, text).await {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(chat_id, error = %e, "Failed to send message");
            emit(ConversationEvent::Notify(Notice::error(format!(
                "Failed to send message: {}",
                e
            ))));
            return Err(e);
        }
    };
    tracing::info!(chat_id, message_id = message.id, "Message sent");

    let loading_id = UiMessage::loading_id(message.id);
    emit(ConversationEvent::Append(UiMessage::loading(
        message.id,
        Utc::now(),
    )));

    let reply = wait_for_message_complete(api, sleeper, policy, chat_id, message.id, |m| {
        tracing::debug!(message_id = m.id, status = %m.status, "Reply status");
    })
    .await;

    emit(ConversationEvent::Remove(loading_id));

    match &reply {
        Some(done) => match (done.status, done.reply_video()) {
            (Status::Completed, Some(url)) => {
                emit(ConversationEvent::Append(UiMessage::ai_video(
                    message.id,
                    url,
                    done.updated_at,
                )));
            }
            (Status::Error, _) => {
                emit(ConversationEvent::Notify(Notice::error(
                    "The reply could not be generated",
                )));
            }
            _ => {
                tracing::info!(message_id = message.id, "Reply completed without a video");
            }
        },
        None => {
            emit(ConversationEvent::Notify(Notice::error(
                "The reply is taking too long. It will appear once it is ready.",
            )));
        }
    }

    match load_timeline(api, chat_id).await {
        Ok(timeline) => emit(ConversationEvent::Replace(timeline)),
        Err(e) => tracing::warn!(chat_id, error = %e, "Could not refresh messages"),
    }

    Ok(SendOutcome { message, reply })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{chat_with, message_with, FakeApi};
    use crate::error::ClientError;
    use crate::models::{ChatWithMessages, Sender, UiKind};
    use crate::poll::testing::RecordingSleeper;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn policy() -> PollPolicy {
        PollPolicy::every(Duration::from_secs(3)).max_attempts(60)
    }

    fn seed_chat(api: &FakeApi, messages: Vec<Message>) {
        api.details.lock().unwrap().insert(
            42,
            ChatWithMessages {
                chat: chat_with(42, "Tween", Status::Completed),
                messages,
            },
        );
    }

    #[tokio::test]
    async fn test_hello_gets_a_video_reply() {
        let api = FakeApi::new().with_next_message_id(7);
        api.queue_message_status(message_with(7, 42, Status::Processing, None));
        api.queue_message_status(message_with(
            7,
            42,
            Status::Completed,
            Some("http://x/video.mp4"),
        ));
        let mut persisted = message_with(7, 42, Status::Completed, Some("http://x/video.mp4"));
        persisted.text = "Hello".into();
        seed_chat(&api, vec![persisted.clone()]);
        api.message_lookup.lock().unwrap().insert(7, persisted);

        let sleeper = RecordingSleeper::default();
        let mut timeline = Timeline::default();
        let mut snapshots = Vec::new();

        let outcome = send_text(&api, &sleeper, &policy(), 42, "Hello", |event| {
            timeline.apply(&event);
            snapshots.push(timeline.messages().to_vec());
        })
        .await
        .unwrap();

        assert_eq!(*api.sent.lock().unwrap(), vec![(42, "Hello".to_string())]);
        assert_eq!(outcome.message.id, 7);
        assert_eq!(outcome.reply.unwrap().status, Status::Completed);

        // user bubble
        assert_eq!(snapshots[0].len(), 1);
        assert_eq!(snapshots[0][0].content, "Hello");
        assert_eq!(snapshots[0][0].sender, Sender::User);
        // loading bubble
        assert_eq!(snapshots[1][1].id, "loading-7");
        assert_eq!(snapshots[1][1].kind, UiKind::Loading);
        // loading replaced by the video
        assert!(snapshots[2].iter().all(|m| m.kind != UiKind::Loading));
        let video = snapshots[3].last().unwrap();
        assert_eq!(video.id, "ai-7");
        assert_eq!(video.kind, UiKind::Video);
        assert_eq!(video.content, "http://x/video.mp4");

        // authoritative refresh
        let ids: Vec<_> = timeline.messages().iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids, vec!["user-7", "ai-7"]);
        assert_eq!(sleeper.count(), 1);
    }

    #[tokio::test]
    async fn test_failed_post_notifies_and_stops() {
        let api = FakeApi::new();
        api.send_fails.store(true, Ordering::SeqCst);

        let sleeper = RecordingSleeper::default();
        let mut events = Vec::new();
        let result = send_text(&api, &sleeper, &policy(), 42, "Hello", |e| events.push(e)).await;

        assert!(matches!(result, Err(ClientError::Http { status: 500, .. })));
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ConversationEvent::Append(_)));
        match &events[1] {
            ConversationEvent::Notify(notice) => {
                assert!(notice.is_error());
                assert_eq!(notice.ttl, Duration::from_secs(5));
                assert_eq!(notice.text, "Failed to send message: Internal Server Error");
            }
            other => panic!("Expected notice, got {:?}", other),
        }
        assert_eq!(api.message_fetches(), 0);
    }

    #[tokio::test]
    async fn test_reply_error_notifies() {
        let api = FakeApi::new();
        api.queue_message_status(message_with(1, 42, Status::Error, None));
        seed_chat(&api, Vec::new());

        let sleeper = RecordingSleeper::default();
        let mut events = Vec::new();
        let outcome = send_text(&api, &sleeper, &policy(), 42, "Hi", |e| events.push(e))
            .await
            .unwrap();

        assert_eq!(outcome.reply.unwrap().status, Status::Error);
        assert!(events
            .iter()
            .any(|e| matches!(e, ConversationEvent::Remove(id) if id == "loading-1")));
        assert!(events.iter().any(|e| matches!(e, ConversationEvent::Notify(n) if n.is_error())));
        assert!(!events.iter().any(|e| matches!(
            e,
            ConversationEvent::Append(m) if m.kind == UiKind::Video
        )));
    }

    #[tokio::test]
    async fn test_timeout_removes_loading_bubble() {
        let api = FakeApi::new();
        seed_chat(&api, Vec::new());

        let sleeper = RecordingSleeper::default();
        let mut timeline = Timeline::default();
        let outcome = send_text(&api, &sleeper, &policy(), 42, "Hi", |e| timeline.apply(&e))
            .await
            .unwrap();

        assert!(outcome.reply.is_none());
        assert_eq!(api.message_fetches(), 60);
        // refreshed from an empty server timeline
        assert!(timeline.is_empty());
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let api = FakeApi::new();
        let sleeper = RecordingSleeper::default();
        let mut events = Vec::new();

        let result = send_text(&api, &sleeper, &policy(), 42, "   ", |e| events.push(e)).await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert!(events.is_empty());
        assert!(api.sent.lock().unwrap().is_empty());
    }
}
