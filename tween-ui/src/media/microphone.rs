//! Browser Microphone
//!
//! `getUserMedia` stream feeding an `AnalyserNode` for the waveform and a
//! `MediaRecorder` for the clip. The recorder hands its data over only after
//! its stop event, so the finished clip goes to the callback given to
//! [`WebMicrophone::new`].

use async_trait::async_trait;
use js_sys::{Array, Object, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AnalyserNode, AudioContext, Blob, BlobEvent, BlobPropertyBag, MediaRecorder, MediaStream,
    MediaStreamConstraints, MediaStreamTrack, MediaStreamTrackState,
};

use tween::audio::{ActiveCapture, CaptureError, CaptureSettings, MicrophoneProvider};

/// Receives the finished recording
pub type ClipCallback = Rc<dyn Fn(Blob)>;

/// Microphone provider backed by the Web Audio and MediaRecorder APIs
#[derive(Clone)]
pub struct WebMicrophone {
    on_clip: ClipCallback,
}

impl WebMicrophone {
    pub fn new(on_clip: impl Fn(Blob) + 'static) -> Self {
        Self {
            on_clip: Rc::new(on_clip),
        }
    }
}

fn set(target: &JsValue, key: &str, value: JsValue) -> Result<(), CaptureError> {
    Reflect::set(target, &JsValue::from_str(key), &value)
        .map(|_| ())
        .map_err(device_error)
}

fn device_error(e: JsValue) -> CaptureError {
    CaptureError::Device(describe(&e))
}

fn permission_error(e: JsValue) -> CaptureError {
    CaptureError::PermissionDenied(describe(&e))
}

fn describe(e: &JsValue) -> String {
    e.dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| e.as_string())
        .unwrap_or_else(|| format!("{:?}", e))
}

fn constraints(settings: &CaptureSettings) -> Result<MediaStreamConstraints, CaptureError> {
    let audio = Object::new();
    set(&audio, "echoCancellation", settings.echo_cancellation.into())?;
    set(&audio, "noiseSuppression", settings.noise_suppression.into())?;
    set(&audio, "autoGainControl", settings.auto_gain_control.into())?;

    let constraints = Object::new();
    set(&constraints, "audio", audio.into())?;
    Ok(constraints.unchecked_into())
}

/// Join recorded chunks into one blob of the configured type
fn assemble_clip(chunks: &mut Vec<Blob>, mime_type: &str) -> Result<Blob, JsValue> {
    let parts = Array::new();
    for chunk in chunks.drain(..) {
        parts.push(&chunk);
    }
    let options: BlobPropertyBag = Object::new().unchecked_into();
    Reflect::set(&options, &JsValue::from_str("type"), &JsValue::from_str(mime_type))?;
    Blob::new_with_blob_sequence_and_options(&parts, &options)
}

#[async_trait(?Send)]
impl MicrophoneProvider for WebMicrophone {
    type Capture = BrowserCapture;

    async fn open(&self, settings: &CaptureSettings) -> Result<BrowserCapture, CaptureError> {
        let window = web_sys::window().ok_or(CaptureError::Unsupported("Microphone"))?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|_| CaptureError::Unsupported("Microphone"))?;

        let promise = devices
            .get_user_media_with_constraints(&constraints(settings)?)
            .map_err(permission_error)?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(permission_error)?
            .unchecked_into();

        let context = AudioContext::new().map_err(device_error)?;
        let source = context
            .create_media_stream_source(&stream)
            .map_err(device_error)?;
        let analyser = context.create_analyser().map_err(device_error)?;
        analyser.set_fft_size(settings.fft_size);
        analyser.set_smoothing_time_constant(settings.smoothing);
        analyser.set_min_decibels(settings.min_decibels);
        analyser.set_max_decibels(settings.max_decibels);
        source
            .connect_with_audio_node(&analyser)
            .map_err(device_error)?;

        let recorder = MediaRecorder::new_with_media_stream(&stream).map_err(device_error)?;
        let chunks: Rc<RefCell<Vec<Blob>>> = Rc::new(RefCell::new(Vec::new()));

        let chunks_for_data = Rc::clone(&chunks);
        let on_data = Closure::wrap(Box::new(move |event: BlobEvent| {
            if let Some(data) = event.data() {
                if data.size() > 0.0 {
                    chunks_for_data.borrow_mut().push(data);
                }
            }
        }) as Box<dyn FnMut(BlobEvent)>);
        recorder.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));
        on_data.forget();

        let on_clip = Rc::clone(&self.on_clip);
        let mime_type = settings.mime_type.clone();
        let on_stop = Closure::wrap(Box::new(move |_: JsValue| {
            match assemble_clip(&mut chunks.borrow_mut(), &mime_type) {
                Ok(blob) => on_clip(blob),
                Err(e) => web_sys::console::error_1(
                    &format!("Failed to assemble recording: {}", describe(&e)).into(),
                ),
            }
        }) as Box<dyn FnMut(JsValue)>);
        recorder.set_onstop(Some(on_stop.as_ref().unchecked_ref()));
        on_stop.forget();

        recorder.start().map_err(device_error)?;
        web_sys::console::log_1(&"Microphone capture started".into());

        Ok(BrowserCapture {
            stream,
            context,
            analyser,
            recorder,
            stopped: false,
        })
    }
}

/// A live microphone stream with its analyser and recorder
pub struct BrowserCapture {
    stream: MediaStream,
    context: AudioContext,
    analyser: AnalyserNode,
    recorder: MediaRecorder,
    stopped: bool,
}

impl BrowserCapture {
    fn tracks(&self) -> impl Iterator<Item = MediaStreamTrack> {
        self.stream
            .get_tracks()
            .iter()
            .map(|track| track.unchecked_into::<MediaStreamTrack>())
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl ActiveCapture for BrowserCapture {
    fn sample(&mut self, buffer: &mut Vec<u8>) -> bool {
        if self.stopped {
            return false;
        }
        buffer.resize(self.analyser.frequency_bin_count() as usize, 128);
        self.analyser.get_byte_time_domain_data(buffer);
        true
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        // Fires the recorder's stop event, which delivers the clip
        if let Err(e) = self.recorder.stop() {
            web_sys::console::warn_1(&format!("Recorder stop failed: {}", describe(&e)).into());
        }
        for track in self.tracks() {
            track.stop();
        }
        let _ = self.context.close();
        web_sys::console::log_1(&"Microphone capture stopped".into());
    }

    fn live_tracks(&self) -> usize {
        self.tracks()
            .filter(|track| track.ready_state() == MediaStreamTrackState::Live)
            .count()
    }
}

impl Drop for BrowserCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
