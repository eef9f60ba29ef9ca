//! Voice sample capture and visualisation
//!
//! - [`waveform`]: bar geometry for the live recording canvas
//! - [`recording`]: the recording ceiling and its `m:ss` clock
//! - [`capture`]: microphone capability and the recorder state machine
//! - [`speech`]: dictation capability for the chat input

pub mod capture;
pub mod recording;
pub mod speech;
pub mod waveform;

pub use capture::{
    start_capture, ActiveCapture, CaptureError, CaptureSettings, MicrophoneProvider, NoCapture,
    UnsupportedMicrophone, VoiceRecorder,
};
pub use recording::{format_clock, RecordingClock, Tick};
pub use speech::{SpeechSettings, SpeechToText, TranscriptCallback, UnsupportedSpeech};
pub use waveform::{compute_frame, Bar, WaveFrame};
