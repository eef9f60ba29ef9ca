//! Global Application State
//!
//! Reactive state management using Leptos signals.

use leptos::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tween::models::{ChatId, Status};
use tween::notify::{Notice, NoticeLevel};
use tween::persona::await_persona_ready;
use tween::poll::{cancellable, flatten_cancelled};
use tween::resources::{ChatStore, EntryKey};
use tween::{ClientError, Config, PollHandle, Session, TweenApi};

use super::session::LocalTokenStore;
use crate::api::{get_api_base, GlooSleeper, WebApi};

/// Global application state provided to all components
#[derive(Clone)]
pub struct GlobalState {
    /// Backend client bound to the session
    pub api: Rc<WebApi>,
    /// Auth token holder shared with the client
    pub session: Rc<Session>,
    /// Polling and recording settings
    pub config: Rc<Config>,
    /// Whether a token is present
    pub authenticated: RwSignal<bool>,
    /// Server chats and local drafts
    pub chats: RwSignal<ChatStore>,
    /// Sidebar selection
    pub selected: RwSignal<Option<EntryKey>>,
    /// Chat readiness polls that outlive the setup dialog
    pub chat_polls: Rc<RefCell<HashMap<ChatId, PollHandle>>>,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let session = Rc::new(Session::new(LocalTokenStore));
    let authenticated = match session.init() {
        Ok(present) => present,
        Err(e) => {
            web_sys::console::error_1(&format!("Failed to read saved session: {}", e).into());
            false
        }
    };

    let api = Rc::new(WebApi::new(get_api_base(), session.clone()));

    let state = GlobalState {
        api,
        session,
        config: Rc::new(Config::default()),
        authenticated: create_rw_signal(authenticated),
        chats: create_rw_signal(ChatStore::new()),
        selected: create_rw_signal(None),
        chat_polls: Rc::new(RefCell::new(HashMap::new())),
        error: create_rw_signal(None),
        success: create_rw_signal(None),
    };

    provide_context(state);
}

impl GlobalState {
    /// Reload the chat list from the server
    pub fn refresh_chats(&self) {
        let state = self.clone();
        spawn_local(async move {
            state.chats.update(|store| store.begin_fetch());
            let result = state.api.list_chats().await;
            if let Err(e) = &result {
                if e.is_unauthorized() {
                    state.end_session();
                }
            }
            state.chats.update(|store| store.finish_fetch(result));

            // Chats still cloning a voice after a reload
            let pending: Vec<ChatId> = state.chats.with_untracked(|store| {
                store
                    .chats()
                    .iter()
                    .filter(|chat| chat.status == Status::Processing)
                    .map(|chat| chat.id)
                    .collect()
            });
            for chat_id in pending {
                if !state.chat_polls.borrow().contains_key(&chat_id) {
                    state.watch_chat_ready(chat_id);
                }
            }
        });
    }

    /// Poll a processing chat until voice cloning settles, then patch it in
    /// the store and tell the user
    pub fn watch_chat_ready(&self, chat_id: ChatId) {
        let policy = self.config.polling.chat_policy();
        let api = Rc::clone(&self.api);
        let (task, handle) = cancellable(async move {
            await_persona_ready(&*api, &GlooSleeper, &policy, chat_id).await
        });
        self.track_chat_poll(chat_id, handle);

        let state = self.clone();
        spawn_local(async move {
            let result = flatten_cancelled(task.await);
            if matches!(result, Err(ClientError::Cancelled)) {
                return;
            }
            state.chat_polls.borrow_mut().remove(&chat_id);

            match result {
                Ok(patch) => {
                    state.chats.update(|store| {
                        store.update(chat_id, &patch);
                    });
                    match patch.status {
                        Some(Status::Error) => state.show_error(Status::Error.chat_banner()),
                        Some(status) => state.show_success(status.chat_banner()),
                        None => {}
                    }
                }
                Err(e) => {
                    web_sys::console::warn_1(&format!("Chat {} readiness: {}", chat_id, e).into());
                    state.show_error(&format!("Could not check chat status: {}", e));
                }
            }
        });
    }

    /// Keep a readiness poll alive until it finishes or the chat goes away
    pub fn track_chat_poll(&self, chat_id: ChatId, handle: PollHandle) {
        if let Some(previous) = self.chat_polls.borrow_mut().insert(chat_id, handle) {
            previous.cancel();
        }
    }

    pub fn stop_chat_poll(&self, chat_id: ChatId) {
        if let Some(handle) = self.chat_polls.borrow_mut().remove(&chat_id) {
            handle.cancel();
        }
    }

    /// Drop local auth state after logout or an expired token
    pub fn end_session(&self) {
        if let Err(e) = self.session.clear() {
            web_sys::console::warn_1(&format!("Failed to clear session: {}", e).into());
        }
        for (_, handle) in self.chat_polls.borrow_mut().drain() {
            handle.cancel();
        }
        self.chats.set(ChatStore::new());
        self.selected.set(None);
        self.authenticated.set(false);
    }

    /// Show a notice for its own lifetime
    pub fn notify(&self, notice: &Notice) {
        let signal = match notice.level {
            NoticeLevel::Success => self.success,
            NoticeLevel::Error => self.error,
        };
        signal.set(Some(notice.text.clone()));

        let text = notice.text.clone();
        gloo_timers::callback::Timeout::new(notice.ttl.as_millis() as u32, move || {
            // A newer notice keeps its own timer
            if signal.get_untracked().as_deref() == Some(text.as_str()) {
                signal.set(None);
            }
        })
        .forget();
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.notify(&Notice::success(message));
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.notify(&Notice::error(message));
    }

    /// Clear error message
    pub fn clear_error(&self) {
        self.error.set(None);
    }
}
