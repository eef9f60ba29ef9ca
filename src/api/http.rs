//! Backend REST client
//!
//! `reqwest` implementation of [`TweenApi`] for native builds. Every request
//! carries the session's bearer token when one is set.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::{description_field, error_from_body, parse_voice_responses, routes, status_fallback, TweenApi};
use crate::auth::{LOGOUT_FAILED, SIGN_IN_FAILED, SIGN_UP_FAILED};
use crate::config::ApiConfig;
use crate::error::ClientResult;
use crate::models::{
    AudioUpload, AuthResponse, Chat, ChatId, ChatWithMessages, ClonedAudio, Credentials, Message,
    MessageId, NewChat, SendMessage, VoiceResponse,
};
use crate::session::Session;

/// A file ready to go into a multipart form
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its type from the extension
    pub fn from_path(path: &Path) -> ClientResult<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| super::DEFAULT_RECORDING_NAME.to_string());
        let mime_type = guess_mime(path);
        Ok(Self {
            file_name,
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    fn into_part(self) -> ClientResult<Part> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime_type)?)
    }
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("webm") => "audio/webm",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

/// Native backend client
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl HttpClient {
    pub fn new(config: &ApiConfig, session: Arc<Session>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base().to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, fallback: Option<&str>) -> ClientResult<Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let fallback = fallback
            .map(str::to_string)
            .unwrap_or_else(|| status_fallback(status.as_u16()));
        let err = error_from_body(status.as_u16(), &body, &fallback);
        tracing::debug!(status = status.as_u16(), error = %err, "Request failed");
        Err(err)
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: Option<&str>,
    ) -> ClientResult<T> {
        let response = self.send(request, fallback).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TweenApi for HttpClient {
    type Upload = UploadFile;

    async fn sign_in(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        let request = self.client.post(self.url(routes::SIGN_IN)).json(credentials);
        self.json(request, Some(SIGN_IN_FAILED)).await
    }

    async fn sign_up(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        let request = self.client.post(self.url(routes::SIGN_UP)).json(credentials);
        self.json(request, Some(SIGN_UP_FAILED)).await
    }

    async fn logout(&self) -> ClientResult<()> {
        let request = self.client.post(self.url(routes::LOGOUT));
        self.send(request, Some(LOGOUT_FAILED)).await?;
        Ok(())
    }

    async fn list_chats(&self) -> ClientResult<Vec<Chat>> {
        self.json(self.client.get(self.url(routes::CHATS)), None).await
    }

    async fn create_chat(&self, chat: NewChat<UploadFile>) -> ClientResult<Chat> {
        let mut form = Form::new().text("name", chat.name.clone());
        if let Some(description) = description_field(&chat.description) {
            form = form.text("description", description.to_string());
        }
        let form = form
            .part("image", chat.image.into_part()?)
            .part("audio", chat.audio.into_part()?);

        let request = self.client.post(self.url(routes::CHATS)).multipart(form);
        self.json(request, None).await
    }

    async fn delete_chat(&self, id: ChatId) -> ClientResult<()> {
        self.send(self.client.delete(self.url(&routes::chat(id))), None)
            .await?;
        Ok(())
    }

    async fn get_chat(&self, id: ChatId) -> ClientResult<ChatWithMessages> {
        self.json(self.client.get(self.url(&routes::chat(id))), None)
            .await
    }

    async fn chat_status(&self, id: ChatId) -> ClientResult<Chat> {
        self.json(self.client.get(self.url(&routes::chat_status(id))), None)
            .await
    }

    async fn send_message(&self, chat: ChatId, text: &str) -> ClientResult<Message> {
        let request = self
            .client
            .post(self.url(&routes::chat_messages(chat)))
            .json(&SendMessage { text });
        self.json(request, None).await
    }

    async fn get_message(&self, chat: ChatId, message: MessageId) -> ClientResult<Message> {
        self.json(self.client.get(self.url(&routes::message(chat, message))), None)
            .await
    }

    async fn upload_audio(&self, file: UploadFile) -> ClientResult<AudioUpload> {
        let form = Form::new().part("file", file.into_part()?);
        let request = self
            .client
            .post(self.url(routes::AUDIO_UPLOAD))
            .multipart(form);
        self.json(request, None).await
    }

    async fn audio_status(&self, id: i64) -> ClientResult<ClonedAudio> {
        self.json(self.client.get(self.url(&routes::audio_status(id))), None)
            .await
    }

    async fn voice_responses(&self, voice_id: &str) -> ClientResult<Vec<VoiceResponse>> {
        let request = self
            .client
            .get(self.url(&routes::voice_responses(voice_id)))
            .header(reqwest::header::ACCEPT, "application/json");
        let response = self.send(request, None).await?;
        parse_voice_responses(&response.text().await?)
    }
}
