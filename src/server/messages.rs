//! User-facing chat texts and caption handling.

use crate::telegram::PhotoSize;

/// Instagram caption limit, in characters.
pub const MAX_CAPTION_CHARS: usize = 2200;

pub const FALLBACK_CAPTION: &str = "Posted via Telegram bridge.";

pub const ONBOARDING_TEXT: &str = "👋 Ready to post to Instagram!\n\n\
Send me a photo with an optional caption and I will publish it to Instagram instantly.\n\n\
Only standard photo posts are supported right now.";

pub const PHOTO_REQUIRED_TEXT: &str =
    "Please send a photo message. Videos and albums are not supported in this version.";

pub const PUBLISH_FAILED_TEXT: &str = "❌ Something went wrong while publishing to Instagram.\n\
Please verify your tokens and try again.";

/// Caption for the post: trimmed input, a fixed fallback when empty, and an ellipsis
/// when over the limit.
pub fn derive_caption(input: Option<&str>) -> String {
    let trimmed = input.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return FALLBACK_CAPTION.to_string();
    }

    if trimmed.chars().count() > MAX_CAPTION_CHARS {
        let mut caption: String = trimmed.chars().take(MAX_CAPTION_CHARS - 1).collect();
        caption.push('…');
        caption
    } else {
        trimmed.to_string()
    }
}

pub fn confirmation_text(photo: &PhotoSize, permalink: Option<&str>) -> String {
    let mut text = format!(
        "✅ Posted to Instagram!\n\nPhoto size: {}x{}",
        photo.width, photo.height
    );
    if let Some(link) = permalink {
        text.push_str("\n\n🔗 ");
        text.push_str(link);
    }
    text
}
