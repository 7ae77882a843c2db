use super::*;
use chrono::{TimeZone, Utc};
use deadliner_core::task::{Category, Task};

fn task(description: &str, category: Option<&str>) -> Task {
    let deadline = Utc.with_ymd_and_hms(2025, 10, 16, 6, 5, 0).unwrap();
    Task {
        id: "abc".to_string(),
        name: "Buy milk".to_string(),
        description: description.to_string(),
        deadline,
        owner: "tg_1".to_string(),
        category: category.map(|name| Category {
            id: 1,
            name: name.to_string(),
            created_at: deadline,
        }),
        created_at: deadline,
        reminder_sent_at: None,
    }
}

#[test]
fn test_all_keys_have_english_fallback() {
    let keys = [
        "reminder_title",
        "deadline_label",
        "category_label",
        "empty_description",
        "empty_category",
        "no_tasks",
        "reminder_sent",
    ];
    for key in keys {
        assert_ne!(t(key, "English"), "???", "missing English for {key}");
        assert_ne!(t(key, "Russian"), "???", "missing Russian for {key}");
        assert_eq!(t(key, "Klingon"), t(key, "English"));
    }
    assert_eq!(t("no_such_key", "English"), "???");
}

#[test]
fn test_readable_datetime_russian_in_timezone() {
    let at = Utc.with_ymd_and_hms(2025, 10, 16, 6, 5, 0).unwrap();
    // Moscow is UTC+3 all year.
    assert_eq!(
        readable_datetime("Russian", at, chrono_tz::Europe::Moscow),
        "9:05, 16 октября 2025"
    );
}

#[test]
fn test_readable_datetime_crosses_date_line() {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 3, 30, 0).unwrap();
    // Adak is UTC-10 in winter: still New Year's Eve.
    assert_eq!(
        readable_datetime("English", at, chrono_tz::America::Adak),
        "17:30, 31 December 2024"
    );
}

#[test]
fn test_reminder_message_placeholders() {
    let text = reminder_message("Russian", &task("", None), chrono_tz::UTC);
    assert!(text.contains("<b>Напоминание о задаче</b>"));
    assert!(text.contains("<b>Buy milk</b>"));
    assert!(text.contains("Без описания"));
    assert!(text.contains("Категория: Не указана"));
    assert!(text.contains("Срок выполнения: <b>6:05, 16 октября 2025</b>"));
}

#[test]
fn test_reminder_message_with_fields() {
    let text = reminder_message(
        "English",
        &task("Not less than 3.2% & fresh", Some("Shopping")),
        chrono_tz::UTC,
    );
    assert!(text.contains("Task reminder"));
    assert!(text.contains("Not less than 3.2% &amp; fresh"));
    assert!(text.contains("Category: Shopping"));
    assert!(text.contains("Due: <b>6:05, 16 October 2025</b>"));
}

#[test]
fn test_escape_html() {
    assert_eq!(escape_html("<a & b>"), "&lt;a &amp; b&gt;");
}

#[test]
fn test_task_line() {
    let mut item = task("", Some("Work"));
    item.reminder_sent_at = Some(item.deadline);
    let line = task_line("English", &item, chrono_tz::UTC);
    assert_eq!(
        line,
        "abc  Buy milk  [6:05, 16 October 2025]  #Work  (reminder sent)"
    );
}
