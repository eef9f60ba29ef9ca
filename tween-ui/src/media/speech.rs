//! Browser Speech Recognition
//!
//! Chrome and Safari only expose the prefixed `webkitSpeechRecognition`, and
//! neither is in `web-sys`, so the API is reached through `Reflect`.

use js_sys::{Array, Function, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use tween::audio::{CaptureError, SpeechSettings, SpeechToText, TranscriptCallback};

const CONSTRUCTORS: [&str; 2] = ["SpeechRecognition", "webkitSpeechRecognition"];

/// Speech-to-text through the browser's recognition service
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSpeech;

fn constructor() -> Option<Function> {
    let window = web_sys::window()?;
    CONSTRUCTORS.iter().find_map(|name| {
        Reflect::get(&window, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
    })
}

fn recognition_error(e: JsValue) -> CaptureError {
    CaptureError::Device(format!("{:?}", e))
}

/// `event.results[0][0].transcript`
fn transcript(event: &JsValue) -> Option<String> {
    let results = Reflect::get(event, &JsValue::from_str("results")).ok()?;
    let first = Reflect::get_u32(&results, 0).ok()?;
    let alternative = Reflect::get_u32(&first, 0).ok()?;
    Reflect::get(&alternative, &JsValue::from_str("transcript"))
        .ok()?
        .as_string()
}

impl SpeechToText for BrowserSpeech {
    fn is_supported(&self) -> bool {
        constructor().is_some()
    }

    fn listen(
        &self,
        settings: &SpeechSettings,
        on_transcript: TranscriptCallback,
    ) -> Result<(), CaptureError> {
        let ctor = constructor().ok_or(CaptureError::Unsupported("Speech recognition"))?;
        let recognition = Reflect::construct(&ctor, &Array::new()).map_err(recognition_error)?;

        let options = [
            ("lang", JsValue::from_str(&settings.lang)),
            ("continuous", JsValue::from_bool(settings.continuous)),
            ("interimResults", JsValue::from_bool(settings.interim_results)),
        ];
        for (key, value) in options {
            Reflect::set(&recognition, &JsValue::from_str(key), &value).map_err(recognition_error)?;
        }

        // Fires once: with the transcript, or empty when recognition ends without one
        let callback = Rc::new(RefCell::new(Some(on_transcript)));
        let callback_for_end = Rc::clone(&callback);
        let on_result = Closure::wrap(Box::new(move |event: JsValue| {
            let Some(text) = transcript(&event) else {
                return;
            };
            if let Some(callback) = callback.borrow_mut().take() {
                callback(text);
            }
        }) as Box<dyn FnMut(JsValue)>);

        let on_end = Closure::wrap(Box::new(move |_: JsValue| {
            if let Some(callback) = callback_for_end.borrow_mut().take() {
                callback(String::new());
            }
        }) as Box<dyn FnMut(JsValue)>);

        let on_error = Closure::wrap(Box::new(move |event: JsValue| {
            let reason = Reflect::get(&event, &JsValue::from_str("error"))
                .ok()
                .and_then(|e| e.as_string())
                .unwrap_or_else(|| "unknown".to_string());
            web_sys::console::warn_1(&format!("Speech recognition error: {}", reason).into());
        }) as Box<dyn FnMut(JsValue)>);

        Reflect::set(&recognition, &JsValue::from_str("onresult"), on_result.as_ref())
            .map_err(recognition_error)?;
        Reflect::set(&recognition, &JsValue::from_str("onerror"), on_error.as_ref())
            .map_err(recognition_error)?;
        Reflect::set(&recognition, &JsValue::from_str("onend"), on_end.as_ref())
            .map_err(recognition_error)?;
        on_result.forget();
        on_error.forget();
        on_end.forget();

        let start: Function = Reflect::get(&recognition, &JsValue::from_str("start"))
            .map_err(recognition_error)?
            .dyn_into()
            .map_err(recognition_error)?;
        start.call0(&recognition).map_err(|e| {
            let message = format!("{:?}", e);
            if message.contains("NotAllowed") {
                CaptureError::PermissionDenied(message)
            } else {
                CaptureError::Device(message)
            }
        })?;

        Ok(())
    }
}
