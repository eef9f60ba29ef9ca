//! Pages
//!
//! Top-level page components for each route.

pub mod auth;
pub mod main_page;

pub use auth::AuthPage;
pub use main_page::MainPage;
