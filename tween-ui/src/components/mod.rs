//! UI Components
//!
//! Reusable Leptos components for the chat client.

pub mod auth_forms;
pub mod chat_interface;
pub mod input_field;
pub mod loading;
pub mod message_bubble;
pub mod setup_modal;
pub mod sidebar;
pub mod toast;
pub mod voice_recorder;

pub use auth_forms::{SignInForm, SignUpForm};
pub use chat_interface::ChatInterface;
pub use setup_modal::SetupModal;
pub use sidebar::Sidebar;
pub use toast::Toast;
