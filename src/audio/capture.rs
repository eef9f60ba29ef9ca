//! Microphone capture
//!
//! [`MicrophoneProvider`] opens a live capture (stream, analyser, recorder);
//! [`VoiceRecorder`] drives it: sampling frames for the waveform, ticking the
//! recording ceiling and releasing every device on stop. The finished clip is
//! delivered by the provider's own completion callback, because browsers
//! only hand over recorder data after the stop event fires.

use async_trait::async_trait;
use thiserror::Error;

use super::recording::{RecordingClock, Tick};
use super::waveform::{compute_frame, WaveFrame};
use crate::config::RecordingConfig;

/// Microphone and speech failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("{0} is not supported in this environment")]
    Unsupported(&'static str),

    #[error("Audio device error: {0}")]
    Device(String),
}

/// Constraints and analyser settings for one capture
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSettings {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
    pub fft_size: u32,
    pub smoothing: f64,
    pub min_decibels: f64,
    pub max_decibels: f64,
    pub mime_type: String,
}

impl From<&RecordingConfig> for CaptureSettings {
    fn from(config: &RecordingConfig) -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
            fft_size: config.fft_size,
            smoothing: config.smoothing,
            min_decibels: config.min_decibels,
            max_decibels: config.max_decibels,
            mime_type: config.mime_type.clone(),
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self::from(&RecordingConfig::default())
    }
}

/// A running microphone capture
pub trait ActiveCapture {
    /// Copy the current time-domain samples into `buffer`; false when the
    /// analyser is gone
    fn sample(&mut self, buffer: &mut Vec<u8>) -> bool;

    /// Finalise the recording and release the stream and audio graph.
    /// Calling it twice is harmless.
    fn stop(&mut self);

    /// Media tracks still holding the device
    fn live_tracks(&self) -> usize;
}

/// Source of microphone captures
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MicrophoneProvider {
    type Capture: ActiveCapture;

    async fn open(&self, settings: &CaptureSettings) -> Result<Self::Capture, CaptureError>;
}

/// Open a capture, reporting failure as `None` after logging it
pub async fn start_capture<P>(provider: &P, settings: &CaptureSettings) -> Option<P::Capture>
where
    P: MicrophoneProvider + ?Sized,
{
    match provider.open(settings).await {
        Ok(capture) => Some(capture),
        Err(e) => {
            tracing::warn!(error = %e, "Could not start microphone capture");
            None
        }
    }
}

/// Recording in progress plus its ceiling
pub struct VoiceRecorder<C: ActiveCapture> {
    capture: Option<C>,
    clock: RecordingClock,
    samples: Vec<u8>,
}

impl<C: ActiveCapture> VoiceRecorder<C> {
    pub fn new(max_seconds: u32) -> Self {
        Self {
            capture: None,
            clock: RecordingClock::new(max_seconds),
            samples: Vec::new(),
        }
    }

    /// Take ownership of a freshly opened capture and restart the clock
    pub fn begin(&mut self, capture: C) {
        self.stop();
        self.clock.reset();
        self.capture = Some(capture);
    }

    pub fn is_recording(&self) -> bool {
        self.capture.is_some()
    }

    /// Advance the clock by one second; returns true if this tick stopped
    /// the recording
    pub fn tick_second(&mut self) -> bool {
        if !self.is_recording() {
            return false;
        }
        match self.clock.tick() {
            Tick::Running => false,
            Tick::LimitReached => {
                tracing::info!(seconds = self.clock.elapsed(), "Recording limit reached");
                self.stop();
                true
            }
        }
    }

    /// Stop and release the capture; false if nothing was recording
    pub fn stop(&mut self) -> bool {
        match self.capture.take() {
            Some(mut capture) => {
                capture.stop();
                true
            }
            None => false,
        }
    }

    /// Waveform for the current animation frame, if recording
    pub fn frame(&mut self, width: f64, height: f64) -> Option<WaveFrame> {
        let capture = self.capture.as_mut()?;
        if !capture.sample(&mut self.samples) {
            return None;
        }
        Some(compute_frame(&self.samples, width, height))
    }

    pub fn elapsed(&self) -> u32 {
        self.clock.elapsed()
    }

    pub fn clock_label(&self) -> String {
        self.clock.label()
    }
}

impl<C: ActiveCapture> Drop for VoiceRecorder<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Capture type for environments without a microphone
#[derive(Debug)]
pub enum NoCapture {}

impl ActiveCapture for NoCapture {
    fn sample(&mut self, _buffer: &mut Vec<u8>) -> bool {
        match *self {}
    }

    fn stop(&mut self) {
        match *self {}
    }

    fn live_tracks(&self) -> usize {
        match *self {}
    }
}

/// Provider that always reports the microphone as unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedMicrophone;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MicrophoneProvider for UnsupportedMicrophone {
    type Capture = NoCapture;

    async fn open(&self, _settings: &CaptureSettings) -> Result<NoCapture, CaptureError> {
        Err(CaptureError::Unsupported("Microphone capture"))
    }
}
