//! Browser media capabilities

pub mod microphone;
pub mod speech;

pub use microphone::{BrowserCapture, WebMicrophone};
pub use speech::BrowserSpeech;
