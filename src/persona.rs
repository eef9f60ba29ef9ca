//! Persona setup
//!
//! A new chat needs a name, a photo and a voice sample before the backend
//! can build its avatar. [`PersonaSetup`] walks the user through those steps;
//! [`create_persona`] submits the result and [`await_persona_ready`] follows
//! the voice clone until the chat is usable.

use crate::api::TweenApi;
use crate::error::{ClientResult, ValidationError};
use crate::models::{Chat, ChatId, ChatPatch, NewChat};
use crate::poll::{watch_chat_status, PollPolicy, Sleeper};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SetupStep {
    Settings = 1,
    Photo = 2,
    Voice = 3,
    Done = 4,
}

impl SetupStep {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn title(self) -> &'static str {
        match self {
            SetupStep::Settings => "Chat settings",
            SetupStep::Photo => "Photo",
            SetupStep::Voice => "Voice",
            SetupStep::Done => "Done",
        }
    }

    fn next(self) -> Self {
        match self {
            SetupStep::Settings => SetupStep::Photo,
            SetupStep::Photo => SetupStep::Voice,
            SetupStep::Voice | SetupStep::Done => SetupStep::Done,
        }
    }

    fn prev(self) -> Self {
        match self {
            SetupStep::Settings | SetupStep::Photo => SetupStep::Settings,
            SetupStep::Voice => SetupStep::Photo,
            SetupStep::Done => SetupStep::Voice,
        }
    }

    pub const ALL: [SetupStep; 4] = [
        SetupStep::Settings,
        SetupStep::Photo,
        SetupStep::Voice,
        SetupStep::Done,
    ];
}

/// Wizard state; `U` is the platform's file handle
#[derive(Debug, Clone)]
pub struct PersonaSetup<U> {
    step: SetupStep,
    pub name: String,
    pub description: String,
    pub photo: Option<U>,
    pub voice: Option<U>,
}

impl<U> Default for PersonaSetup<U> {
    fn default() -> Self {
        Self {
            step: SetupStep::Settings,
            name: String::new(),
            description: String::new(),
            photo: None,
            voice: None,
        }
    }
}

impl<U> PersonaSetup<U> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> SetupStep {
        self.step
    }

    pub fn is_step_complete(&self) -> bool {
        match self.step {
            SetupStep::Settings => !self.name.trim().is_empty(),
            SetupStep::Photo => self.photo.is_some(),
            SetupStep::Voice => self.voice.is_some(),
            SetupStep::Done => true,
        }
    }

    /// Advance if the current step is complete
    pub fn next(&mut self) -> bool {
        if self.step == SetupStep::Done || !self.is_step_complete() {
            return false;
        }
        self.step = self.step.next();
        true
    }

    pub fn back(&mut self) -> bool {
        if self.step == SetupStep::Settings {
            return false;
        }
        self.step = self.step.prev();
        true
    }

    /// Everything the backend needs, or the first missing piece
    pub fn finish(self) -> Result<NewChat<U>, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::Required("Name"));
        }
        let image = self.photo.ok_or(ValidationError::Required("Photo"))?;
        let audio = self.voice.ok_or(ValidationError::Required("Voice sample"))?;
        let description = Some(self.description.trim().to_string()).filter(|d| !d.is_empty());

        Ok(NewChat {
            name,
            description,
            image,
            audio,
        })
    }
}

/// Submit a finished persona as a new chat
pub async fn create_persona<A: TweenApi + ?Sized>(
    api: &A,
    chat: NewChat<A::Upload>,
) -> ClientResult<Chat> {
    let name = chat.name.clone();
    let created = api.create_chat(chat).await?;
    tracing::info!(chat_id = created.id, name = %name, status = %created.status, "Chat created");
    Ok(created)
}

/// Poll a chat until it leaves `processing`, returning the patch to apply
///
/// `completed` carries the new voice id; `error` carries only the status.
pub async fn await_persona_ready<A, S>(
    api: &A,
    sleeper: &S,
    policy: &PollPolicy,
    chat_id: ChatId,
) -> ClientResult<ChatPatch>
where
    A: TweenApi + ?Sized,
    S: Sleeper + ?Sized,
{
    let chat = watch_chat_status(api, sleeper, policy, chat_id, |_| {})
        .await
        .into_result()?;
    tracing::info!(chat_id, status = %chat.status, "Chat finished processing");
    Ok(ChatPatch::from_status_report(&chat))
}
