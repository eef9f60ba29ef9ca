//! # Tween
//!
//! Client core for Digital Tween: chat with generated avatar personas that
//! answer in video, in a cloned voice.
//!
//! The crate holds everything that does not depend on a screen. The same code
//! drives the Leptos browser app (`tween-ui`, built with
//! `default-features = false`) and the `tween-cli` binary.
//!
//! ## Modules
//!
//! - [`api`]: backend contract ([`TweenApi`]) and the native `reqwest` client
//! - [`auth`]: form validation, sign-in, sign-up and logout
//! - [`session`]: bearer token storage
//! - [`resources`]: chat list, drafts and message timelines
//! - [`conversation`]: optimistic send and reply tracking
//! - [`persona`]: the chat setup wizard and readiness polling
//! - [`voice`]: voice sample upload and clone tracking
//! - [`poll`]: fixed-interval status polling with cancellation
//! - [`audio`]: recording clock, waveform geometry and capture seams
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tween::{conversation, Config, HttpClient, Session, TokioSleeper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let session = Arc::new(Session::in_memory());
//!     let api = HttpClient::new(&config.api, session.clone())?;
//!
//!     tween::auth::sign_in(&api, &session, "anna", "secret1").await?;
//!
//!     let outcome = conversation::send_text(
//!         &api,
//!         &TokioSleeper,
//!         &config.polling.message_policy(),
//!         42,
//!         "Hello",
//!         |event| println!("{:?}", event),
//!     )
//!     .await?;
//!
//!     println!("Reply: {:?}", outcome.reply.and_then(|m| m.video_url));
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod audio;
pub mod auth;
pub mod config;
pub mod conversation;
pub mod error;
#[cfg(feature = "native")]
pub mod logging;
pub mod models;
pub mod notify;
pub mod persona;
pub mod platform;
pub mod poll;
pub mod resources;
pub mod session;
pub mod voice;

// Re-export top-level types for convenience
pub use api::TweenApi;

#[cfg(feature = "native")]
pub use api::http::{HttpClient, UploadFile};

pub use config::{Config, ConfigError, LoggingConfig, PollingConfig, RecordingConfig};

pub use error::{ClientError, ClientResult, ValidationError};

pub use models::{
    AudioUpload, AuthResponse, Chat, ChatId, ChatPatch, ChatWithMessages, CloneStatus,
    ClonedAudio, Credentials, Message, MessageId, NewChat, Sender, Status, UiKind, UiMessage,
    VoiceResponse,
};

pub use notify::{Notice, NoticeLevel};

pub use poll::{PollHandle, PollOutcome, PollPolicy, Sleeper};

#[cfg(feature = "native")]
pub use poll::TokioSleeper;

pub use resources::{ChatStore, SidebarEntry, TimelineStore};

pub use session::{MemoryTokenStore, Session, TokenStore};

#[cfg(feature = "native")]
pub use session::FileTokenStore;

pub use conversation::{ConversationEvent, SendOutcome, Timeline};

pub use persona::{PersonaSetup, SetupStep};

pub use voice::VoiceClone;
