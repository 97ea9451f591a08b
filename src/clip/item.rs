use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single recorded clipboard text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: Uuid,
    pub text: String,
    pub is_pinned: bool,
    pub date_added: DateTime<Utc>,
}

impl Clip {
    pub fn new(text: String, is_pinned: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            is_pinned,
            date_added: Utc::now(),
        }
    }

    pub fn with_date(text: String, is_pinned: bool, date_added: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            is_pinned,
            date_added,
        }
    }

    pub fn toggle_pin(&mut self) {
        self.is_pinned = !self.is_pinned;
    }

    pub fn matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.text.to_lowercase().contains(needle_lower)
    }

    /// Short id used by the CLI and the status bar.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new() {
        let clip = Clip::new("hello".to_string(), false);
        assert_eq!(clip.text, "hello");
        assert!(!clip.is_pinned);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Clip::new("a".to_string(), false);
        let b = Clip::new("a".to_string(), false);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_toggle_pin() {
        let mut clip = Clip::new("text".to_string(), false);
        clip.toggle_pin();
        assert!(clip.is_pinned);
        clip.toggle_pin();
        assert!(!clip.is_pinned);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let clip = Clip::new("Hello World".to_string(), false);
        assert!(clip.matches("world"));
        assert!(clip.matches("lo w"));
        assert!(clip.matches(""));
        assert!(!clip.matches("xyz"));
    }

    #[test]
    fn test_serialized_field_names() {
        let date = Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap();
        let clip = Clip::with_date("pinned".to_string(), true, date);
        let json = serde_json::to_value(&clip).unwrap();

        assert_eq!(json["text"], "pinned");
        assert_eq!(json["isPinned"], true);
        assert_eq!(json["dateAdded"], "2026-02-02T10:00:00Z");
        assert!(json["id"].is_string());
    }

    #[test]
    fn test_short_id() {
        let clip = Clip::new("x".to_string(), false);
        assert_eq!(clip.short_id().len(), 8);
        assert!(clip.id.simple().to_string().starts_with(&clip.short_id()));
    }
}
