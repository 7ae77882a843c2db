//! Category lookup and creation.

use super::{format_ts, parse_ts, Store};
use chrono::Utc;
use deadliner_core::{error::DeadlinerError, task::Category};

/// Inputs that mean "no category".
const SKIP_KEYWORDS: &[&str] = &[
    "-",
    "\u{2014}",
    "skip",
    "none",
    "null",
    "\u{043f}\u{0440}\u{043e}\u{043f}\u{0443}\u{0441}\u{0442}\u{0438}\u{0442}\u{044c}",
    "\u{043d}\u{0435}\u{0442}",
    "\u{0431}\u{0435}\u{0437} \u{043a}\u{0430}\u{0442}\u{0435}\u{0433}\u{043e}\u{0440}\u{0438}\u{0438}",
];

/// Whether a category input should be treated as "no category".
pub fn is_skip_keyword(name: &str) -> bool {
    let normalized = name.trim().to_lowercase();
    normalized.is_empty() || SKIP_KEYWORDS.contains(&normalized.as_str())
}

impl Store {
    /// Find a category by exact name, creating it if missing.
    ///
    /// Returns `None` for empty input and skip keywords.
    pub async fn find_or_create_category(
        &self,
        name: &str,
    ) -> Result<Option<Category>, DeadlinerError> {
        if is_skip_keyword(name) {
            return Ok(None);
        }
        let name = name.trim();

        sqlx::query("INSERT OR IGNORE INTO categories (name, created_at) VALUES (?, ?)")
            .bind(name)
            .bind(format_ts(Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(|e| DeadlinerError::Store(format!("create category failed: {e}")))?;

        let (id, name, created_at): (i64, String, String) =
            sqlx::query_as("SELECT id, name, created_at FROM categories WHERE name = ?")
                .bind(name)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DeadlinerError::Store(format!("get category failed: {e}")))?;

        Ok(Some(Category {
            id,
            name,
            created_at: parse_ts(&created_at)?,
        }))
    }

    /// All categories, alphabetically.
    pub async fn list_categories(&self) -> Result<Vec<Category>, DeadlinerError> {
        let rows: Vec<(i64, String, String)> =
            sqlx::query_as("SELECT id, name, created_at FROM categories ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DeadlinerError::Store(format!("list categories failed: {e}")))?;

        rows.into_iter()
            .map(|(id, name, created_at)| {
                Ok(Category {
                    id,
                    name,
                    created_at: parse_ts(&created_at)?,
                })
            })
            .collect()
    }
}
