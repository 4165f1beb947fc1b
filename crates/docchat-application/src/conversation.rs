//! Conversation client: post a message, run the assistant, wait, fetch the reply.
//!
//! A turn moves through [`ConversationPhase`] in order. Any failure ends the
//! turn immediately with an error; there is no retry.

use std::sync::Arc;
use std::time::Duration;

use docchat_core::config::ChatSettings;
use docchat_core::remote::{AssistantsApi, Run, ThreadMessage};
use docchat_core::session::Role;
use docchat_core::{DocchatError, Result};
use futures::stream::{self, BoxStream, StreamExt};
use tokio_util::sync::CancellationToken;

/// Fragments of a completed reply, yielded one at a time.
pub type FragmentStream = BoxStream<'static, String>;

/// Progress of a single conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConversationPhase {
    Idle,
    MessagePosted,
    RunQueued,
    RunInProgress,
    RunCompleted,
    ResultFetched,
}

/// How long to wait for a run to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Delay between two status checks.
    pub interval: Duration,
    /// Number of status checks before giving up. `None` never gives up.
    pub max_attempts: Option<u32>,
}

impl WaitPolicy {
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    pub fn bounded(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
        }
    }

    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self {
            interval: settings.poll_interval(),
            max_attempts: settings.max_poll_attempts,
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::unbounded(Duration::from_secs(1))
    }
}

pub struct ConversationClient {
    api: Arc<dyn AssistantsApi>,
    policy: WaitPolicy,
}

impl ConversationClient {
    pub fn new(api: Arc<dyn AssistantsApi>, policy: WaitPolicy) -> Self {
        Self { api, policy }
    }

    /// Runs one turn and returns the first text fragment of the reply.
    pub async fn ask(
        &self,
        thread_id: &str,
        assistant_id: &str,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let reply = self
            .run_turn(thread_id, assistant_id, content, cancel)
            .await
            .inspect_err(|err| tracing::error!("Message processing error: {}", err))?;

        reply.content.into_iter().next().ok_or_else(|| {
            let err = DocchatError::EmptyResponse(format!("message '{}' has no text", reply.id));
            tracing::error!("Message processing error: {}", err);
            err
        })
    }

    /// Runs one turn and yields every text fragment of the reply.
    ///
    /// The reply is complete before the first fragment is yielded.
    pub async fn ask_streaming(
        &self,
        thread_id: &str,
        assistant_id: &str,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<FragmentStream> {
        let reply = self
            .run_turn(thread_id, assistant_id, content, cancel)
            .await
            .inspect_err(|err| tracing::error!("Message processing error: {}", err))?;

        Ok(stream::iter(reply.content).boxed())
    }

    /// Polls the run until it completes, fails, times out or is cancelled.
    ///
    /// Cancellation also interrupts a status read that is still in flight.
    pub async fn wait_for_run(
        &self,
        thread_id: &str,
        run_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Run> {
        let mut attempts = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(DocchatError::Cancelled);
            }

            let run = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DocchatError::Cancelled),
                run = self.api.retrieve_run(thread_id, run_id) => run?,
            };
            attempts += 1;

            if run.status.is_completed() {
                return Ok(run);
            }
            if run.status.is_terminal() {
                return Err(DocchatError::RunFailed {
                    run_id: run.id,
                    status: run.status,
                });
            }
            if self.policy.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(DocchatError::Timeout { attempts });
            }

            tracing::trace!("Run {} is {} (check {})", run_id, run.status, attempts);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DocchatError::Cancelled),
                _ = tokio::time::sleep(self.policy.interval) => {}
            }
        }
    }

    async fn run_turn(
        &self,
        thread_id: &str,
        assistant_id: &str,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<ThreadMessage> {
        let mut phase = ConversationPhase::Idle;

        self.api.create_message(thread_id, Role::User, content).await?;
        advance(&mut phase, ConversationPhase::MessagePosted);

        let run = self.api.create_run(thread_id, assistant_id).await?;
        advance(&mut phase, ConversationPhase::RunQueued);

        advance(&mut phase, ConversationPhase::RunInProgress);
        self.wait_for_run(thread_id, &run.id, cancel).await?;
        advance(&mut phase, ConversationPhase::RunCompleted);

        let latest = self
            .api
            .list_messages(thread_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DocchatError::EmptyResponse("thread has no messages".into()))?;
        advance(&mut phase, ConversationPhase::ResultFetched);

        Ok(latest)
    }
}

fn advance(phase: &mut ConversationPhase, next: ConversationPhase) {
    tracing::debug!("Conversation phase {} -> {}", phase, next);
    *phase = next;
}
