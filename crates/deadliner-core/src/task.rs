//! Task records as seen by the reminder core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of owner references that point at a Telegram chat.
pub const TELEGRAM_OWNER_PREFIX: &str = "tg_";

/// A task category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A task with a deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    /// Owner reference, e.g. `tg_123456`.
    pub owner: String,
    pub category: Option<Category>,
    pub created_at: DateTime<Utc>,
    /// When a reminder went out for the current deadline.
    pub reminder_sent_at: Option<DateTime<Utc>>,
}

impl Task {
    /// The owner's messaging identity (Telegram chat id), if the owner
    /// reference is present and well-formed.
    pub fn chat_id(&self) -> Option<i64> {
        parse_owner(&self.owner)
    }

    /// Category name, if the task is categorized.
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

/// Fields for a new task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub owner: String,
    pub category_id: Option<i64>,
}

/// Partial update of a task. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    /// `Some(None)` removes the category.
    pub category_id: Option<Option<i64>>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.category_id.is_none()
    }
}

/// Build the owner reference for a Telegram chat.
pub fn owner_for_chat(chat_id: i64) -> String {
    format!("{TELEGRAM_OWNER_PREFIX}{chat_id}")
}

/// Parse an owner reference of the form `tg_<chat id>`.
///
/// Returns `None` for empty, foreign, or non-numeric references.
pub fn parse_owner(owner: &str) -> Option<i64> {
    owner
        .trim()
        .strip_prefix(TELEGRAM_OWNER_PREFIX)
        .and_then(|id| id.parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(owner: &str) -> Task {
        let at = Utc.with_ymd_and_hms(2026, 10, 15, 18, 0, 0).unwrap();
        Task {
            id: "t1".to_string(),
            name: "Finish report".to_string(),
            description: String::new(),
            deadline: at,
            owner: owner.to_string(),
            category: None,
            created_at: at,
            reminder_sent_at: None,
        }
    }

    #[test]
    fn test_owner_round_trip() {
        assert_eq!(owner_for_chat(42), "tg_42");
        assert_eq!(parse_owner("tg_42"), Some(42));
        assert_eq!(parse_owner(" tg_-100123 "), Some(-100123));
    }

    #[test]
    fn test_malformed_owner_has_no_chat_id() {
        assert_eq!(sample("").chat_id(), None);
        assert_eq!(sample("admin").chat_id(), None);
        assert_eq!(sample("tg_").chat_id(), None);
        assert_eq!(sample("tg_abc").chat_id(), None);
        assert_eq!(sample("tg_7").chat_id(), Some(7));
    }

    #[test]
    fn test_task_changes_is_empty() {
        assert!(TaskChanges::default().is_empty());
        let changes = TaskChanges {
            category_id: Some(None),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
