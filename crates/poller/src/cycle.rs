//! Poll cycle: fetch → compare → notify → sleep.
//!
//! All mutable state lives in [`PollState`], which is moved into each cycle
//! and handed back out. Cycles run strictly one after another.

use std::time::Duration;

use homework_common::error::AppError;
use homework_common::types::{FetchOutcome, HomeworkStatus};
use homework_engine::detector::{self, NotifyOutcome};
use homework_engine::message;
use homework_notifier::Messenger;

use crate::poller::StatusSource;

/// Loop phases, used in log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Polling,
    Notifying,
    Skipping,
    Sleeping,
}

/// Why a cycle did not notify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The fetched status equals the stored one.
    Unchanged,
    /// The API returned no homework records.
    NoUpdates,
    /// The fetch failed; see the log.
    FetchFailed,
}

/// Result of a single cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Notified { delivered: bool },
    Skipped(SkipReason),
}

impl CycleOutcome {
    pub fn phase(&self) -> Phase {
        match self {
            CycleOutcome::Notified { .. } => Phase::Notifying,
            CycleOutcome::Skipped(_) => Phase::Skipping,
        }
    }
}

/// State threaded from one cycle into the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    /// Last status we notified about.
    pub last_status: Option<HomeworkStatus>,
    /// `from_date` cursor for the next request.
    pub since: i64,
    /// Text of the last failure forwarded to the chat.
    pub last_reported_error: Option<String>,
}

impl PollState {
    pub fn new(since: i64) -> Self {
        Self {
            last_status: None,
            since,
            last_reported_error: None,
        }
    }
}

/// The main loop, generic over where statuses come from and where messages go.
pub struct PollLoop<S, M> {
    source: S,
    messenger: M,
    poll_interval: Duration,
    report_errors_to_chat: bool,
}

impl<S: StatusSource, M: Messenger> PollLoop<S, M> {
    pub fn new(source: S, messenger: M, poll_interval: Duration) -> Self {
        Self {
            source,
            messenger,
            poll_interval,
            report_errors_to_chat: false,
        }
    }

    /// Also forward fetch failures to the chat, once per distinct failure.
    pub fn with_error_reports(mut self, enabled: bool) -> Self {
        self.report_errors_to_chat = enabled;
        self
    }

    /// Run cycles forever, sleeping `poll_interval` after each one.
    pub async fn run(&self, mut state: PollState) {
        tracing::info!(
            phase = ?Phase::Idle,
            since = state.since,
            poll_interval_secs = self.poll_interval.as_secs(),
            "Poll loop started"
        );

        loop {
            let (next, outcome) = self.run_cycle(state).await;
            state = next;

            tracing::debug!(
                phase = ?Phase::Sleeping,
                after = ?outcome.phase(),
                "Sleeping until next poll"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Run cycles until `shutdown` completes, then return to idle.
    ///
    /// A cycle in flight when `shutdown` fires is dropped; nothing is persisted
    /// so there is nothing to clean up.
    pub async fn run_until<F>(&self, state: PollState, shutdown: F)
    where
        F: std::future::Future<Output = ()>,
    {
        tokio::select! {
            _ = self.run(state) => {}
            _ = shutdown => {
                tracing::info!(phase = ?Phase::Idle, "Poll loop stopped");
            }
        }
    }

    /// Run one fetch/compare/notify step. Never fails; errors are logged.
    pub async fn run_cycle(&self, mut state: PollState) -> (PollState, CycleOutcome) {
        tracing::debug!(phase = ?Phase::Polling, since = state.since, "Polling review API");

        let outcome = match self.source.fetch_status(state.since).await {
            Ok(fetched) => {
                state.last_reported_error = None;
                if let Some(current_date) = fetched.current_date() {
                    state.since = current_date;
                }

                match fetched {
                    FetchOutcome::NoChange { .. } => {
                        tracing::debug!("No homework updates");
                        CycleOutcome::Skipped(SkipReason::NoUpdates)
                    }
                    FetchOutcome::Update { update, .. } => {
                        match detector::maybe_notify(&self.messenger, &update, state.last_status)
                            .await
                        {
                            NotifyOutcome::Skipped => CycleOutcome::Skipped(SkipReason::Unchanged),
                            notified @ NotifyOutcome::Notified { delivered, .. } => {
                                state.last_status = notified.next_status(state.last_status);
                                CycleOutcome::Notified { delivered }
                            }
                        }
                    }
                }
            }
            Err(e) => {
                self.handle_failure(&mut state, e).await;
                CycleOutcome::Skipped(SkipReason::FetchFailed)
            }
        };

        (state, outcome)
    }

    async fn handle_failure(&self, state: &mut PollState, error: AppError) {
        if error.is_parse_failure() {
            tracing::error!(error = %error, "Malformed review API response");
        } else {
            tracing::error!(error = %error, "Failed to fetch homework status");
        }

        if !self.report_errors_to_chat {
            return;
        }

        let text = message::failure(&error);
        if state.last_reported_error.as_deref() == Some(text.as_str()) {
            tracing::debug!("Failure already reported to chat");
            return;
        }

        match self.messenger.send_message(&text).await {
            Ok(()) => state.last_reported_error = Some(text),
            Err(e) => tracing::warn!(error = %e, "Failed to report failure to chat"),
        }
    }
}
