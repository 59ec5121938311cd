//! Change detector — notifies only when the homework status moves.
//!
//! The last known status is owned by the caller and handed in on every call;
//! the detector keeps no state of its own.

use homework_common::types::{HomeworkStatus, StatusUpdate};
use homework_notifier::Messenger;

use crate::message;

/// What `maybe_notify` did with a fetched status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The status changed. `status` is the new value to store; `delivered`
    /// is false when the send failed.
    Notified {
        status: HomeworkStatus,
        delivered: bool,
    },
    /// The status matches the last known one.
    Skipped,
}

impl NotifyOutcome {
    /// The status the caller should remember after this outcome.
    pub fn next_status(&self, last: Option<HomeworkStatus>) -> Option<HomeworkStatus> {
        match self {
            NotifyOutcome::Notified { status, .. } => Some(*status),
            NotifyOutcome::Skipped => last,
        }
    }
}

/// Send a notification if `update.status` differs from `last_status`.
///
/// A failed send is logged and still reported as `Notified`, so the stored
/// status advances and the same change is not announced twice.
pub async fn maybe_notify<M: Messenger>(
    messenger: &M,
    update: &StatusUpdate,
    last_status: Option<HomeworkStatus>,
) -> NotifyOutcome {
    if last_status == Some(update.status) {
        tracing::debug!(status = %update.status, "Status unchanged, skipping notification");
        return NotifyOutcome::Skipped;
    }

    let text = message::status_changed(update);
    let delivered = match messenger.send_message(&text).await {
        Ok(()) => {
            tracing::info!(
                homework = %update.homework_name,
                from = ?last_status.map(|s| s.to_string()),
                to = %update.status,
                "Status change notified"
            );
            true
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                homework = %update.homework_name,
                to = %update.status,
                "Failed to send status change notification"
            );
            false
        }
    };

    NotifyOutcome::Notified {
        status: update.status,
        delivered,
    }
}
