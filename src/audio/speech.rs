//! Speech-to-text capability
//!
//! The chat input can dictate one utterance at a time. Browsers expose this
//! under different names or not at all, so the view talks to a
//! [`SpeechToText`] and falls back to [`UnsupportedSpeech`].

use super::capture::CaptureError;

/// Recognition options for a single utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSettings {
    pub lang: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl SpeechSettings {
    pub fn single_utterance(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
            continuous: false,
            interim_results: false,
        }
    }
}

/// Callback receiving the final transcript
pub type TranscriptCallback = Box<dyn FnOnce(String)>;

pub trait SpeechToText {
    fn is_supported(&self) -> bool;

    /// Start listening; `on_transcript` fires once with the recognised text,
    /// or an empty string if recognition ended without a result
    fn listen(
        &self,
        settings: &SpeechSettings,
        on_transcript: TranscriptCallback,
    ) -> Result<(), CaptureError>;
}

/// Speech provider for environments without recognition
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedSpeech;

impl SpeechToText for UnsupportedSpeech {
    fn is_supported(&self) -> bool {
        false
    }

    fn listen(
        &self,
        _settings: &SpeechSettings,
        _on_transcript: TranscriptCallback,
    ) -> Result<(), CaptureError> {
        Err(CaptureError::Unsupported("Speech recognition"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_speech_reports_error() {
        let speech = UnsupportedSpeech;
        assert!(!speech.is_supported());

        let err = speech
            .listen(&SpeechSettings::single_utterance("ru-RU"), Box::new(|_| {}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Speech recognition is not supported in this environment"
        );
    }
}
