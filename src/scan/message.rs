//! Notification message formatting.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::datetime::{format_in_timezone, minutes_since, POSTED_FORMAT};
use crate::source::FeedItem;

/// Discord's maximum message length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Marker line opening every notification.
pub const MARKER: &str = "🎁 **Giveaway Found!**";

const ELLIPSIS: char = '…';

/// Format the notification for a matched item.
///
/// An over-long title is shortened so the link and time lines always fit.
pub fn format_notification(item: &FeedItem, now: DateTime<Utc>, tz: Tz) -> String {
    let render = |title: &str| {
        format!(
            "{MARKER}\n\
             **Title:** {}\n\
             **Link:** {}\n\
             **Posted:** {}\n\
             **Time Ago:** {} minutes ago",
            title,
            item.url,
            format_in_timezone(&item.created_at, tz, POSTED_FORMAT),
            minutes_since(&item.created_at, &now),
        )
    };

    let budget = MAX_MESSAGE_LENGTH.saturating_sub(render("").chars().count());
    let title = shorten(&item.title, budget);
    truncate_chars(render(&title), MAX_MESSAGE_LENGTH)
}

/// Shorten to at most `max` characters, ending with an ellipsis when cut.
fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    if max > 0 {
        out.push(ELLIPSIS);
    }
    out
}

/// Truncate to at most `max` characters, on a char boundary.
fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}
