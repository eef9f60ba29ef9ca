//! Backend access for the browser

pub mod client;

pub use client::{get_api_base, set_api_base, GlooSleeper, WebApi, WebUpload};
