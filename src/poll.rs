//! Status Polling
//!
//! Reply videos, chat readiness and voice clones are all produced
//! asynchronously by the backend. [`poll_until`] fetches a snapshot on a fixed
//! schedule until it reaches a terminal state or the attempt cap runs out.
//!
//! Failed fetches are logged and retried on the same schedule; they count
//! toward the cap. Time comes from a [`Sleeper`] so the browser can use
//! `gloo-timers`, the CLI can use tokio, and tests can run instantly.
//!
//! Loops started on behalf of a view are wrapped with [`cancellable`] and torn
//! down through the returned [`PollHandle`].

use async_trait::async_trait;
use futures_util::future::{AbortHandle, Abortable, Aborted};
use std::future::Future;
use std::time::Duration;

use crate::api::TweenApi;
use crate::error::{ClientError, ClientResult};
use crate::models::{Chat, ChatId, Lifecycle, Message, MessageId};
use crate::platform::{MaybeSend, MaybeSync};

/// Source of delays between polls
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Sleeper: MaybeSend + MaybeSync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[cfg(feature = "native")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[cfg(feature = "native")]
#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Schedule for one polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Total fetches allowed; `None` polls until terminal
    pub max_attempts: Option<u32>,
    /// Delay before the first fetch
    pub initial_delay: Duration,
}

impl PollPolicy {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            initial_delay: Duration::ZERO,
        }
    }

    pub fn max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }
}

/// How a polling loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    /// The last snapshot reached a terminal state
    Terminal(T),
    /// The cap ran out first
    TimedOut { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            PollOutcome::Terminal(value) => Some(value),
            PollOutcome::TimedOut { .. } => None,
        }
    }

    pub fn into_result(self) -> ClientResult<T> {
        match self {
            PollOutcome::Terminal(value) => Ok(value),
            PollOutcome::TimedOut { attempts } => Err(ClientError::PollTimeout { attempts }),
        }
    }
}

/// Fetch until `T` is terminal or the policy's cap is hit
///
/// `on_update` sees every successfully fetched snapshot, including the
/// terminal one. No sleep follows the final attempt.
pub async fn poll_until<T, F, Fut, U>(
    policy: &PollPolicy,
    sleeper: &(impl Sleeper + ?Sized),
    mut fetch: F,
    mut on_update: U,
) -> PollOutcome<T>
where
    T: Lifecycle,
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
    U: FnMut(&T),
{
    if !policy.initial_delay.is_zero() {
        sleeper.sleep(policy.initial_delay).await;
    }

    let mut attempts = 0u32;
    loop {
        attempts += 1;

        match fetch().await {
            Ok(snapshot) => {
                on_update(&snapshot);
                if snapshot.is_terminal() {
                    tracing::debug!(attempts, "Poll reached terminal state");
                    return PollOutcome::Terminal(snapshot);
                }
            }
            Err(e) => {
                tracing::warn!(attempt = attempts, error = %e, "Status check failed, retrying");
            }
        }

        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                tracing::info!(attempts, "Poll gave up before a terminal state");
                return PollOutcome::TimedOut { attempts };
            }
        }

        sleeper.sleep(policy.interval).await;
    }
}

/// Wait for a message's reply video to finish rendering
///
/// Returns the terminal message (`completed` or `error`), or `None` once the
/// policy's attempts are spent.
pub async fn wait_for_message_complete<A, S, U>(
    api: &A,
    sleeper: &S,
    policy: &PollPolicy,
    chat_id: ChatId,
    message_id: MessageId,
    on_update: U,
) -> Option<Message>
where
    A: TweenApi + ?Sized,
    S: Sleeper + ?Sized,
    U: FnMut(&Message),
{
    tracing::debug!(chat_id, message_id, "Waiting for reply");
    poll_until(
        policy,
        sleeper,
        || api.get_message(chat_id, message_id),
        on_update,
    )
    .await
    .into_option()
}

/// Follow a freshly created chat until its voice is ready or failed
pub async fn watch_chat_status<A, S, U>(
    api: &A,
    sleeper: &S,
    policy: &PollPolicy,
    chat_id: ChatId,
    on_update: U,
) -> PollOutcome<Chat>
where
    A: TweenApi + ?Sized,
    S: Sleeper + ?Sized,
    U: FnMut(&Chat),
{
    tracing::debug!(chat_id, "Watching chat status");
    poll_until(policy, sleeper, || api.chat_status(chat_id), on_update).await
}

/// Owner's side of a cancellable poll; dropping it stops the loop
#[derive(Debug)]
pub struct PollHandle {
    abort: AbortHandle,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.abort.is_aborted()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Wrap a poll so its owner can stop it at the next suspension point
pub fn cancellable<F: Future>(future: F) -> (Abortable<F>, PollHandle) {
    let (abort, registration) = AbortHandle::new_pair();
    (Abortable::new(future, registration), PollHandle { abort })
}

/// Map an aborted poll to [`ClientError::Cancelled`]
pub fn flatten_cancelled<T>(result: Result<T, Aborted>) -> ClientResult<T> {
    result.map_err(|_| ClientError::Cancelled)
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSleeper;
    use super::*;
    use crate::api::fake::{message_with, FakeApi};
    use crate::models::Status;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Job(bool);

    impl Lifecycle for Job {
        fn is_terminal(&self) -> bool {
            self.0
        }
    }

    fn message_policy() -> PollPolicy {
        PollPolicy::every(Duration::from_secs(3)).max_attempts(60)
    }

    #[tokio::test]
    async fn test_gives_up_after_exactly_max_attempts() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);

        let outcome = poll_until(
            &message_policy(),
            &sleeper,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(Job(false)) }
            },
            |_| {},
        )
        .await;

        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 60 });
        assert_eq!(calls.load(Ordering::SeqCst), 60);
        // No sleep after the last attempt
        assert_eq!(sleeper.count(), 59);
        assert_eq!(sleeper.total(), Duration::from_secs(177));
    }

    #[tokio::test]
    async fn test_failures_are_retried_and_counted() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);
        let mut seen = 0;

        let outcome = poll_until(
            &message_policy(),
            &sleeper,
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    match n {
                        0 | 1 => Err(ClientError::Network("connection reset".into())),
                        2 => Ok(Job(false)),
                        _ => Ok(Job(true)),
                    }
                }
            },
            |_| seen += 1,
        )
        .await;

        assert_eq!(outcome, PollOutcome::Terminal(Job(true)));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(seen, 2);
    }

    #[tokio::test]
    async fn test_all_failures_time_out() {
        let sleeper = RecordingSleeper::default();
        let outcome: PollOutcome<Job> = poll_until(
            &message_policy(),
            &sleeper,
            || async { Err(ClientError::Timeout) },
            |_| {},
        )
        .await;

        assert_eq!(outcome.into_option(), None);
    }

    #[tokio::test]
    async fn test_initial_delay_precedes_first_fetch() {
        let sleeper = RecordingSleeper::default();
        let policy = PollPolicy::every(Duration::from_secs(2)).initial_delay(Duration::from_secs(2));

        let outcome = poll_until(&policy, &sleeper, || async { Ok(Job(true)) }, |_| {}).await;

        assert_eq!(outcome, PollOutcome::Terminal(Job(true)));
        assert_eq!(*sleeper.sleeps.lock().unwrap(), vec![Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn test_wait_for_message_complete_returns_terminal_snapshot() {
        let api = FakeApi::new();
        api.queue_message_status(message_with(9, 42, Status::Processing, None));
        api.queue_message_status(message_with(9, 42, Status::Processing, None));
        api.queue_message_status(message_with(
            9,
            42,
            Status::Completed,
            Some("http://x/video.mp4"),
        ));

        let sleeper = RecordingSleeper::default();
        let mut updates = Vec::new();
        let message = wait_for_message_complete(&api, &sleeper, &message_policy(), 42, 9, |m| {
            updates.push(m.status)
        })
        .await
        .unwrap();

        assert_eq!(message.status, Status::Completed);
        assert_eq!(message.video_url.as_deref(), Some("http://x/video.mp4"));
        assert_eq!(
            updates,
            vec![Status::Processing, Status::Processing, Status::Completed]
        );
        assert_eq!(sleeper.count(), 2);
    }

    #[tokio::test]
    async fn test_wait_for_message_complete_error_is_terminal() {
        let api = FakeApi::new();
        api.queue_message_status(message_with(9, 42, Status::Error, None));

        let sleeper = RecordingSleeper::default();
        let message = wait_for_message_complete(&api, &sleeper, &message_policy(), 42, 9, |_| {})
            .await
            .unwrap();

        assert_eq!(message.status, Status::Error);
        assert_eq!(sleeper.count(), 0);
    }

    #[tokio::test]
    async fn test_wait_for_message_complete_none_after_sixty_polls() {
        let api = FakeApi::new();
        let sleeper = RecordingSleeper::default();

        // Nothing queued: every fetch fails
        let result =
            wait_for_message_complete(&api, &sleeper, &message_policy(), 42, 9, |_| {}).await;

        assert!(result.is_none());
        assert_eq!(api.message_fetches(), 60);
    }

    #[tokio::test]
    async fn test_cancelled_poll_stops() {
        let (future, handle) = cancellable(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            1
        });
        handle.cancel();
        assert!(handle.is_cancelled());

        let result = flatten_cancelled(future.await);
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels() {
        let (future, handle) = cancellable(async { 7 });
        drop(handle);
        assert!(future.await.is_err());
    }
}
