//! Internationalization: localized strings for reminders and task listings.
//!
//! Uses a simple `t(key, lang)` function for static strings and
//! format helpers for strings with interpolation.
//! Supported languages: English (fallback), Russian.

mod format;

#[cfg(test)]
mod tests;

pub use format::*;

/// Return a localized static string for `key` in the given `lang`.
/// Falls back to English for unsupported languages, `???` for unknown keys.
pub fn t(key: &str, lang: &str) -> &'static str {
    match key {
        "reminder_title" => match lang {
            "Russian" => "Напоминание о задаче",
            _ => "Task reminder",
        },
        "deadline_label" => match lang {
            "Russian" => "Срок выполнения",
            _ => "Due",
        },
        "category_label" => match lang {
            "Russian" => "Категория",
            _ => "Category",
        },
        "empty_description" => match lang {
            "Russian" => "Без описания",
            _ => "No description",
        },
        "empty_category" => match lang {
            "Russian" => "Не указана",
            _ => "Not set",
        },
        "no_tasks" => match lang {
            "Russian" => "У вас пока нет задач.",
            _ => "You have no tasks yet.",
        },
        "reminder_sent" => match lang {
            "Russian" => "напоминание отправлено",
            _ => "reminder sent",
        },
        _ => "???",
    }
}
