//! Human-readable notification text.

use homework_common::error::AppError;
use homework_common::types::StatusUpdate;

/// Telegram rejects `sendMessage` text longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

const COMMENT_PREFIX: &str = "\nReviewer comment: ";

/// Translate a status update into the message sent to the chat.
///
/// The reviewer comment is shortened first so the verdict line always fits.
pub fn status_changed(update: &StatusUpdate) -> String {
    let mut text = truncate_chars(
        &format!(
            "Homework \"{}\" review status changed. {}",
            update.homework_name,
            update.status.verdict()
        ),
        MAX_MESSAGE_CHARS,
    );

    if let Some(comment) = &update.reviewer_comment {
        let room = MAX_MESSAGE_CHARS
            .saturating_sub(text.chars().count())
            .saturating_sub(COMMENT_PREFIX.chars().count());
        if room > 1 {
            text.push_str(COMMENT_PREFIX);
            text.push_str(&truncate_chars(comment, room));
        }
    }

    text
}

/// Message used when loop failures are forwarded to the chat.
pub fn failure(error: &AppError) -> String {
    truncate_chars(&format!("Program failure: {error}"), MAX_MESSAGE_CHARS)
}

/// Cut `text` to at most `max` chars, marking the cut with an ellipsis.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
