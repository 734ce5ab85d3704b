use serde::Deserialize;

// Telegram Update structure (partial). Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: i64,
    pub message: Option<Message>,
    pub edited_message: Option<Message>,
}

impl Update {
    /// The message carried by this update, preferring a new message over an edit.
    pub fn into_message(self) -> Option<Message> {
        self.message.or(self.edited_message)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message_id: i64,
    #[serde(default)]
    pub date: i64,
    pub chat: Chat,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub photo: Option<Vec<PhotoSize>>,
}

impl Message {
    pub fn is_start_command(&self) -> bool {
        self.text
            .as_deref()
            .is_some_and(|text| text.starts_with("/start"))
    }

    /// Photo variants, or `None` when the message carries no photo.
    pub fn photos(&self) -> Option<&[PhotoSize]> {
        self.photo.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub username: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: String,
    pub width: u32,
    pub height: u32,
    pub file_size: Option<u64>,
}

impl PhotoSize {
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Envelope shared by every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct File {
    pub file_id: Option<String>,
    pub file_path: Option<String>,
}

/// Pick the variant with the largest pixel count.
///
/// Scans left to right and only replaces the current best on a strictly larger
/// count, so the first of several equally large variants wins.
pub fn select_highest_resolution(photos: &[PhotoSize]) -> Option<&PhotoSize> {
    let (first, rest) = photos.split_first()?;
    Some(rest.iter().fold(first, |largest, current| {
        if current.pixels() > largest.pixels() {
            current
        } else {
            largest
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(file_id: &str, width: u32, height: u32) -> PhotoSize {
        PhotoSize {
            file_id: file_id.to_string(),
            file_unique_id: format!("u-{}", file_id),
            width,
            height,
            file_size: None,
        }
    }

    #[test]
    fn test_select_highest_resolution_tie_keeps_first() {
        let photos = vec![photo("a", 100, 100), photo("b", 50, 50), photo("c", 100, 100)];
        let selected = select_highest_resolution(&photos).unwrap();
        assert_eq!(selected.file_id, "a");
    }

    #[test]
    fn test_select_highest_resolution_uses_area_not_width() {
        let photos = vec![photo("wide", 320, 90), photo("square", 200, 200), photo("thumb", 90, 90)];
        let selected = select_highest_resolution(&photos).unwrap();
        assert_eq!(selected.file_id, "square");
    }

    #[test]
    fn test_select_highest_resolution_empty() {
        assert!(select_highest_resolution(&[]).is_none());
    }

    #[test]
    fn test_update_prefers_message_over_edit() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 1,
                "message": {"message_id": 1, "date": 0, "chat": {"id": 10, "type": "private"}, "text": "new"},
                "edited_message": {"message_id": 2, "date": 0, "chat": {"id": 20, "type": "private"}, "text": "edit"}
            }"#,
        )
        .unwrap();

        let message = update.into_message().unwrap();
        assert_eq!(message.chat.id, 10);
    }

    #[test]
    fn test_update_falls_back_to_edited_message() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 5, "edited_message": {"message_id": 2, "date": 0, "chat": {"id": 20, "type": "group", "title": "Team"}, "caption": "c"}}"#,
        )
        .unwrap();

        let message = update.into_message().unwrap();
        assert_eq!(message.chat.id, 20);
        assert_eq!(message.chat.kind.as_deref(), Some("group"));
        assert_eq!(message.caption.as_deref(), Some("c"));
    }

    #[test]
    fn test_update_without_message_kinds() {
        let update: Update =
            serde_json::from_str(r#"{"update_id": 7, "callback_query": {"id": "x"}}"#).unwrap();
        assert!(update.into_message().is_none());
    }

    #[test]
    fn test_empty_photo_list_counts_as_no_photo() {
        let message: Message =
            serde_json::from_str(r#"{"chat": {"id": 1}, "photo": []}"#).unwrap();
        assert!(message.photos().is_none());
    }

    #[test]
    fn test_start_command_detection() {
        let message: Message =
            serde_json::from_str(r#"{"chat": {"id": 1}, "text": "/start@relay_bot"}"#).unwrap();
        assert!(message.is_start_command());

        let message: Message =
            serde_json::from_str(r#"{"chat": {"id": 1}, "text": "hello /start"}"#).unwrap();
        assert!(!message.is_start_command());
    }
}
