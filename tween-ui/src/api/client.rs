//! HTTP API Client
//!
//! `gloo-net` implementation of the backend contract. Requests carry the
//! session's bearer token and send cookies (`credentials: include`).

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsValue;
use web_sys::{Blob, File, FormData, RequestCredentials};

use tween::api::{
    description_field, error_from_body, parse_voice_responses, routes, status_fallback,
    DEFAULT_RECORDING_NAME,
};
use tween::auth::{LOGOUT_FAILED, SIGN_IN_FAILED, SIGN_UP_FAILED};
use tween::config::DEFAULT_API_BASE_URL;
use tween::models::{
    AudioUpload, AuthResponse, Chat, ChatId, ChatWithMessages, ClonedAudio, Credentials, Message,
    MessageId, NewChat, SendMessage, VoiceResponse,
};
use tween::{ClientError, ClientResult, Session, Sleeper, TweenApi};

/// Local storage key holding an API URL override
pub const API_URL_KEY: &str = "tween_api_url";

/// Get the API base URL from local storage, the build environment or the default
pub fn get_api_base() -> String {
    let stored = web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(API_URL_KEY).ok().flatten());

    resolve_api_base(stored.as_deref(), option_env!("TWEEN_API_BASE_URL"))
}

/// Set the API base URL in local storage
pub fn set_api_base(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            let _ = storage.set_item(API_URL_KEY, url);
        }
    }
}

fn resolve_api_base(stored: Option<&str>, build_time: Option<&str>) -> String {
    let url = stored
        .filter(|u| !u.trim().is_empty())
        .or(build_time.filter(|u| !u.trim().is_empty()))
        .unwrap_or(DEFAULT_API_BASE_URL);
    // Normalize: remove trailing slash
    url.trim().trim_end_matches('/').to_string()
}

/// A browser file or recorded blob bound for a multipart form
#[derive(Debug, Clone)]
pub struct WebUpload {
    pub blob: Blob,
    pub file_name: String,
}

impl WebUpload {
    pub fn from_file(file: File) -> Self {
        let file_name = file.name();
        Self {
            blob: file.into(),
            file_name,
        }
    }

    /// A microphone recording, named like the backend expects
    pub fn recording(blob: Blob) -> Self {
        Self {
            blob,
            file_name: DEFAULT_RECORDING_NAME.to_string(),
        }
    }

    /// Object URL for previewing the file; revoke it when done
    pub fn preview_url(&self) -> Option<String> {
        web_sys::Url::create_object_url_with_blob(&self.blob).ok()
    }

    fn append_to(&self, form: &FormData, field: &str) -> ClientResult<()> {
        form.append_with_blob_and_filename(field, &self.blob, &self.file_name)
            .map_err(|e| js_error("Could not attach file", e))
    }
}

fn network_error(e: gloo_net::Error) -> ClientError {
    match e {
        gloo_net::Error::SerdeError(e) => ClientError::Decode(e.to_string()),
        other => ClientError::Network(other.to_string()),
    }
}

fn js_error(context: &str, value: JsValue) -> ClientError {
    ClientError::Network(format!("{}: {:?}", context, value))
}

/// Browser backend client
#[derive(Debug, Clone)]
pub struct WebApi {
    base_url: String,
    session: Rc<Session>,
}

impl WebApi {
    pub fn new(base_url: String, session: Rc<Session>) -> Self {
        Self { base_url, session }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn prepare(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.credentials(RequestCredentials::Include);
        match self.session.bearer() {
            Some(bearer) => builder.header("Authorization", &bearer),
            None => builder,
        }
    }

    fn get(&self, path: &str) -> ClientResult<Request> {
        self.prepare(Request::get(&self.url(path)))
            .build()
            .map_err(network_error)
    }

    fn post_json<T: serde::Serialize>(&self, path: &str, body: &T) -> ClientResult<Request> {
        self.prepare(Request::post(&self.url(path)))
            .json(body)
            .map_err(network_error)
    }

    fn post_form(&self, path: &str, form: FormData) -> ClientResult<Request> {
        // The browser sets the multipart boundary itself
        self.prepare(Request::post(&self.url(path)))
            .body(form)
            .map_err(network_error)
    }

    async fn send(&self, request: Request, fallback: Option<&str>) -> ClientResult<Response> {
        let response = request.send().await.map_err(network_error)?;
        if response.ok() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let fallback = fallback
            .map(str::to_string)
            .unwrap_or_else(|| status_fallback(status));
        let err = error_from_body(status, &body, &fallback);
        web_sys::console::warn_1(&format!("Request failed ({}): {}", status, err).into());
        Err(err)
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: Request,
        fallback: Option<&str>,
    ) -> ClientResult<T> {
        let response = self.send(request, fallback).await?;
        let body = response.text().await.map_err(network_error)?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait(?Send)]
impl TweenApi for WebApi {
    type Upload = WebUpload;

    async fn sign_in(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        let request = self.post_json(routes::SIGN_IN, credentials)?;
        self.json(request, Some(SIGN_IN_FAILED)).await
    }

    async fn sign_up(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        let request = self.post_json(routes::SIGN_UP, credentials)?;
        self.json(request, Some(SIGN_UP_FAILED)).await
    }

    async fn logout(&self) -> ClientResult<()> {
        let request = self
            .prepare(Request::post(&self.url(routes::LOGOUT)))
            .build()
            .map_err(network_error)?;
        self.send(request, Some(LOGOUT_FAILED)).await?;
        Ok(())
    }

    async fn list_chats(&self) -> ClientResult<Vec<Chat>> {
        self.json(self.get(routes::CHATS)?, None).await
    }

    async fn create_chat(&self, chat: NewChat<WebUpload>) -> ClientResult<Chat> {
        let form = FormData::new().map_err(|e| js_error("Could not build form", e))?;
        form.append_with_str("name", &chat.name)
            .map_err(|e| js_error("Could not build form", e))?;
        if let Some(description) = description_field(&chat.description) {
            form.append_with_str("description", description)
                .map_err(|e| js_error("Could not build form", e))?;
        }
        chat.image.append_to(&form, "image")?;
        chat.audio.append_to(&form, "audio")?;

        let request = self.post_form(routes::CHATS, form)?;
        self.json(request, None).await
    }

    async fn delete_chat(&self, id: ChatId) -> ClientResult<()> {
        let request = self
            .prepare(Request::delete(&self.url(&routes::chat(id))))
            .build()
            .map_err(network_error)?;
        self.send(request, None).await?;
        Ok(())
    }

    async fn get_chat(&self, id: ChatId) -> ClientResult<ChatWithMessages> {
        self.json(self.get(&routes::chat(id))?, None).await
    }

    async fn chat_status(&self, id: ChatId) -> ClientResult<Chat> {
        self.json(self.get(&routes::chat_status(id))?, None).await
    }

    async fn send_message(&self, chat: ChatId, text: &str) -> ClientResult<Message> {
        let request = self.post_json(&routes::chat_messages(chat), &SendMessage { text })?;
        self.json(request, None).await
    }

    async fn get_message(&self, chat: ChatId, message: MessageId) -> ClientResult<Message> {
        self.json(self.get(&routes::message(chat, message))?, None)
            .await
    }

    async fn upload_audio(&self, file: WebUpload) -> ClientResult<AudioUpload> {
        let form = FormData::new().map_err(|e| js_error("Could not build form", e))?;
        file.append_to(&form, "file")?;

        let request = self.post_form(routes::AUDIO_UPLOAD, form)?;
        self.json(request, None).await
    }

    async fn audio_status(&self, id: i64) -> ClientResult<ClonedAudio> {
        self.json(self.get(&routes::audio_status(id))?, None).await
    }

    async fn voice_responses(&self, voice_id: &str) -> ClientResult<Vec<VoiceResponse>> {
        let response = self
            .send(self.get(&routes::voice_responses(voice_id))?, None)
            .await?;
        let body = response.text().await.map_err(network_error)?;
        parse_voice_responses(&body)
    }
}

/// Poll delays on browser timers
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooSleeper;

#[async_trait(?Send)]
impl Sleeper for GlooSleeper {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
