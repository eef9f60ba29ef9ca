//! Digital Tween
//!
//! Browser client for chatting with generated avatar personas, built with
//! Leptos (WASM).
//!
//! # Features
//!
//! - Sign in / sign up with a token kept in local storage
//! - Persona setup: name, photo and a recorded or uploaded voice sample
//! - Text chat answered with generated video replies
//! - Live waveform while recording, dictation in the composer
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. Flows, models and polling come from the `tween` core crate;
//! this crate supplies the browser transport, storage and media.

use leptos::*;

mod api;
mod app;
mod components;
mod media;
mod pages;
mod state;

#[cfg(test)]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
