//! Format helpers for strings with interpolation.

use super::t;
use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use deadliner_core::task::Task;

const RUSSIAN_MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Render a timestamp as `H:MM, D <month> YYYY` in `tz`,
/// e.g. `9:05, 16 октября 2025`.
pub fn readable_datetime(lang: &str, at: DateTime<Utc>, tz: Tz) -> String {
    let local = at.with_timezone(&tz);
    let month_idx = local.month0() as usize;
    let month = match lang {
        "Russian" => RUSSIAN_MONTHS_GENITIVE[month_idx],
        _ => ENGLISH_MONTHS[month_idx],
    };
    format!(
        "{}:{:02}, {} {} {}",
        local.hour(),
        local.minute(),
        local.day(),
        month,
        local.year()
    )
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The reminder notification for a task whose deadline has arrived.
pub fn reminder_message(lang: &str, task: &Task, tz: Tz) -> String {
    let description = if task.description.trim().is_empty() {
        t("empty_description", lang).to_string()
    } else {
        escape_html(&task.description)
    };
    let category = task
        .category_name()
        .map(escape_html)
        .unwrap_or_else(|| t("empty_category", lang).to_string());

    format!(
        "\u{23f0} <b>{title}</b>\n\n\
         \u{1f4cc} <b>{name}</b>\n\
         \u{1f4c3} {description}\n\
         \u{1f525} {deadline_label}: <b>{deadline}</b>\n\
         \u{1f516} {category_label}: {category}",
        title = t("reminder_title", lang),
        name = escape_html(&task.name),
        deadline_label = t("deadline_label", lang),
        deadline = readable_datetime(lang, task.deadline, tz),
        category_label = t("category_label", lang),
    )
}

/// One line of a task listing (plain text, for the terminal).
pub fn task_line(lang: &str, task: &Task, tz: Tz) -> String {
    let mut line = format!(
        "{}  {}  [{}]",
        task.id,
        task.name,
        readable_datetime(lang, task.deadline, tz)
    );
    if let Some(category) = task.category_name() {
        line.push_str(&format!("  #{category}"));
    }
    if task.reminder_sent_at.is_some() {
        line.push_str(&format!("  ({})", t("reminder_sent", lang)));
    }
    line
}
