//! Notification delivery.
//!
//! The poll loop only talks to a [`Messenger`]; [`telegram::TelegramNotifier`]
//! is the production implementation backed by the Telegram Bot API.

pub mod telegram;

use homework_common::error::AppError;

/// Something that can deliver a text message to the configured recipient.
#[allow(async_fn_in_trait)]
pub trait Messenger {
    /// Deliver `text`. Failures are reported as `AppError::Send`.
    async fn send_message(&self, text: &str) -> Result<(), AppError>;
}
