//! Voice cloning
//!
//! Upload a voice sample, follow the clone job until it completes, then list
//! the replies the backend pre-generated in that voice.

use crate::api::TweenApi;
use crate::config::PollingConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{CloneStatus, ClonedAudio, VoiceResponse};
use crate::poll::{poll_until, PollPolicy, Sleeper};

/// A finished clone and its ready-made replies
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceClone {
    pub audio: ClonedAudio,
    pub responses: Vec<VoiceResponse>,
}

pub async fn upload_voice_sample<A: TweenApi + ?Sized>(
    api: &A,
    file: A::Upload,
) -> ClientResult<i64> {
    let upload = api.upload_audio(file).await?;
    tracing::info!(upload_id = upload.id, "Voice sample uploaded");
    Ok(upload.id)
}

/// Poll a clone job; `failed` becomes [`ClientError::VoiceCloneFailed`]
pub async fn wait_for_voice_clone<A, S, U>(
    api: &A,
    sleeper: &S,
    policy: &PollPolicy,
    id: i64,
    on_update: U,
) -> ClientResult<ClonedAudio>
where
    A: TweenApi + ?Sized,
    S: Sleeper + ?Sized,
    U: FnMut(&ClonedAudio),
{
    let audio = poll_until(policy, sleeper, || api.audio_status(id), on_update)
        .await
        .into_result()?;

    match audio.status {
        CloneStatus::Completed => Ok(audio),
        CloneStatus::Failed | CloneStatus::Pending => {
            tracing::warn!(upload_id = id, "Voice cloning failed");
            Err(ClientError::VoiceCloneFailed)
        }
    }
}

pub async fn voice_responses<A: TweenApi + ?Sized>(
    api: &A,
    voice_id: &str,
) -> ClientResult<Vec<VoiceResponse>> {
    let responses = api.voice_responses(voice_id).await?;
    if responses.is_empty() {
        tracing::info!(voice_id, "No voice responses available yet");
    } else {
        tracing::info!(voice_id, count = responses.len(), "Voice responses loaded");
    }
    Ok(responses)
}

/// Upload, wait for the clone, give the backend time to render replies,
/// then list them
pub async fn clone_voice<A, S>(
    api: &A,
    sleeper: &S,
    polling: &PollingConfig,
    file: A::Upload,
) -> ClientResult<VoiceClone>
where
    A: TweenApi + ?Sized,
    S: Sleeper + ?Sized,
{
    let id = upload_voice_sample(api, file).await?;
    let audio = wait_for_voice_clone(api, sleeper, &polling.voice_policy(), id, |a| {
        tracing::debug!(upload_id = a.id, status = ?a.status, "Clone status");
    })
    .await?;

    tracing::info!(
        voice_id = %audio.voice_id,
        delay_ms = polling.voice_responses_delay_ms,
        "Waiting for voice responses to be generated"
    );
    sleeper.sleep(polling.voice_responses_delay()).await;

    let responses = voice_responses(api, &audio.voice_id).await?;
    Ok(VoiceClone { audio, responses })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{clone_with, FakeApi};
    use crate::poll::testing::RecordingSleeper;
    use std::time::Duration;

    #[tokio::test]
    async fn test_clone_voice_waits_then_lists_responses() {
        let api = FakeApi::new();
        api.audio_statuses
            .lock()
            .unwrap()
            .extend([clone_with(11, CloneStatus::Pending), clone_with(11, CloneStatus::Completed)]);
        api.responses.lock().unwrap().push(VoiceResponse {
            id: 1,
            question: "How are you?".into(),
            audio_url: "http://x/r1.mp3".into(),
        });

        let sleeper = RecordingSleeper::default();
        let clone = clone_voice(&api, &sleeper, &PollingConfig::default(), "recording.wav".into())
            .await
            .unwrap();

        assert_eq!(clone.audio.voice_id, "voice-1");
        assert_eq!(clone.responses.len(), 1);
        assert_eq!(
            *sleeper.sleeps.lock().unwrap(),
            vec![Duration::from_secs(2), Duration::from_secs(25)]
        );
        assert_eq!(
            api.calls(),
            vec![
                "upload recording.wav",
                "audio-status 11",
                "audio-status 11",
                "responses voice-1"
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_clone_is_an_error() {
        let api = FakeApi::new();
        api.audio_statuses
            .lock()
            .unwrap()
            .push_back(clone_with(11, CloneStatus::Failed));

        let sleeper = RecordingSleeper::default();
        let err = clone_voice(&api, &sleeper, &PollingConfig::default(), "a.wav".into())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::VoiceCloneFailed));
        assert!(!api.calls().iter().any(|c| c.starts_with("responses")));
    }
}
