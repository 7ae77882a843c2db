mod i18n;
mod reminders;
#[cfg(test)]
mod testing;
mod tracker;

use anyhow::{bail, Context as _};
use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use deadliner_channels::{LogNotifier, TelegramNotifier};
use deadliner_core::{
    config::{self, shellexpand, Config},
    traits::{Clock, Notifier, SystemClock},
};
use deadliner_store::Store;
use reminders::{ReminderDispatcher, ReminderScheduler, ReminderWorker};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracker::{ReminderReport, TaskDraft, TaskEdit, TaskTracker, Tracked};

/// Upper bound for configured tolerance and retention windows (~100 years).
const MAX_WINDOW_HOURS: u64 = 24 * 365 * 100;

#[derive(Parser)]
#[command(
    name = "deadliner",
    version,
    about = "Deadline tracker with restart-safe reminders"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reminder worker until interrupted.
    Start,
    /// Create a task.
    Add {
        /// Telegram chat that owns the task.
        #[arg(long)]
        chat_id: i64,
        #[arg(long)]
        name: String,
        /// "YYYY-MM-DD HH:MM" in the configured timezone, or RFC 3339.
        #[arg(long)]
        deadline: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Change fields of a task.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// A skip keyword such as "-" removes the category.
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a task.
    Delete { id: String },
    /// List a chat's tasks by deadline.
    List {
        #[arg(long)]
        chat_id: i64,
    },
    /// Show store and queue health.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _log_guard = init_logging(&cfg)?;
    let tz = cfg.reminders.tz()?;
    let lang = cfg.reminders.language.as_str();

    let store = Store::new(&cfg.store).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scheduler = ReminderScheduler::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        clock.clone(),
    );

    match cli.command {
        Commands::Start => {
            if !cfg.reminders.enabled {
                bail!("Reminders are disabled. Set [reminders] enabled = true in config.toml.");
            }
            let notifier = build_notifier(&cfg)?;
            let dispatcher = ReminderDispatcher::new(
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                notifier.clone(),
                clock.clone(),
            )
            .with_locale(tz, lang)
            .with_tolerance(chrono::Duration::seconds(
                cfg.reminders.fire_tolerance_secs.min(MAX_WINDOW_HOURS * 3600) as i64,
            ))
            .with_clear_handle_on_failure(cfg.reminders.clear_handle_on_failure);
            let worker = ReminderWorker::new(
                store.clone(),
                Arc::new(dispatcher),
                clock,
                std::time::Duration::from_secs(cfg.reminders.poll_interval_secs.max(1)),
                cfg.reminders.batch_size,
            )
            .with_requeue_interrupted(cfg.reminders.requeue_interrupted)
            .with_job_retention(chrono::Duration::hours(
                cfg.reminders.job_retention_hours.min(MAX_WINDOW_HOURS) as i64,
            ));

            info!(
                "Deadliner starting (notifier: {}, timezone: {tz})",
                notifier.name()
            );
            let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
            let handle = tokio::spawn(worker.run(shutdown_rx));

            tokio::signal::ctrl_c().await?;
            info!("Received shutdown signal");
            let _ = shutdown_tx.send(true);
            handle.await?;
            store.pool().close().await;
        }
        Commands::Add {
            chat_id,
            name,
            deadline,
            description,
            category,
        } => {
            let tracker = TaskTracker::new(store, scheduler, clock);
            let tracked = tracker
                .create_task(TaskDraft {
                    chat_id,
                    name,
                    description,
                    deadline: parse_deadline(&deadline, tz)?,
                    category,
                })
                .await?;
            println!("Created task {}", tracked.value.id);
            println!("{}", i18n::task_line(lang, &tracked.value, tz));
            print_report(&tracked);
        }
        Commands::Edit {
            id,
            name,
            deadline,
            description,
            category,
        } => {
            let deadline = deadline
                .as_deref()
                .map(|d| parse_deadline(d, tz))
                .transpose()?;
            let tracker = TaskTracker::new(store, scheduler, clock);
            let tracked = tracker
                .update_task(
                    &id,
                    TaskEdit {
                        name,
                        description,
                        deadline,
                        category,
                    },
                )
                .await?;
            println!("{}", i18n::task_line(lang, &tracked.value, tz));
            print_report(&tracked);
        }
        Commands::Delete { id } => {
            let tracker = TaskTracker::new(store, scheduler, clock);
            let tracked = tracker.delete_task(&id).await?;
            if tracked.value {
                println!("Deleted task {id}");
            } else {
                println!("No task {id}");
            }
            print_report(&tracked);
        }
        Commands::List { chat_id } => {
            let tracker = TaskTracker::new(store, scheduler, clock);
            let tasks = tracker.list_tasks(chat_id).await?;
            if tasks.is_empty() {
                println!("{}", i18n::t("no_tasks", lang));
            }
            for task in &tasks {
                println!("{}", i18n::task_line(lang, task, tz));
            }
        }
        Commands::Status => {
            println!("Deadliner status\n");
            println!("Config: {}", cli.config);
            println!("Database: {}", cfg.store.db_path);
            println!("  size: {} bytes", store.db_size().await?);
            println!("  pending reminders: {}", store.count_pending_jobs().await?);
            println!("  tracked handles: {}", store.count_handles().await?);
            println!();
            println!("Timezone: {tz}");
            println!("Language: {lang}");
            println!(
                "Reminders: {}",
                if cfg.reminders.enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!(
                "  telegram: {}",
                if cfg.telegram.enabled && !cfg.telegram.bot_token.is_empty() {
                    "configured"
                } else if cfg.telegram.enabled {
                    "enabled but missing bot_token"
                } else {
                    "disabled (reminders go to the log)"
                }
            );
        }
    }

    Ok(())
}

/// Log to stderr and to a daily-rolling file under `{data_dir}/logs`.
///
/// `RUST_LOG` overrides the configured level. The returned guard flushes the
/// file writer when dropped.
fn init_logging(cfg: &Config) -> anyhow::Result<WorkerGuard> {
    let log_dir = Path::new(&shellexpand(&cfg.deadliner.data_dir)).join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "deadliner.log"));
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.deadliner.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();
    Ok(guard)
}

/// Telegram when enabled, otherwise reminders are only logged.
fn build_notifier(cfg: &Config) -> anyhow::Result<Arc<dyn Notifier>> {
    if !cfg.telegram.enabled {
        return Ok(Arc::new(LogNotifier));
    }
    if cfg.telegram.bot_token.is_empty() {
        bail!(
            "Telegram is enabled but bot_token is empty. \
             Set it in config.toml or the {} env var.",
            config::TELEGRAM_TOKEN_ENV
        );
    }
    Ok(Arc::new(TelegramNotifier::new(&cfg.telegram)))
}

/// Parse a deadline given as local wall time in `tz` or as RFC 3339.
///
/// Ambiguous wall times (DST fall-back) resolve to the earlier instant.
fn parse_deadline(input: &str, tz: Tz) -> anyhow::Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        // Deadlines are stored with whole-second precision.
        if at.nanosecond() != 0 {
            bail!("deadline '{input}' has fractional seconds; use whole seconds");
        }
        return Ok(at.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M")
        .with_context(|| format!("invalid deadline '{input}', expected YYYY-MM-DD HH:MM"))?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(at) => Ok(at.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => bail!("deadline '{input}' does not exist in {tz}"),
    }
}

fn print_report<T>(tracked: &Tracked<T>) {
    match &tracked.reminder {
        ReminderReport::Ok(_) => println!("{}", tracked.reminder),
        ReminderReport::Warning(_) => eprintln!("{}", tracked.reminder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deadline_local_wall_time() {
        let at = parse_deadline("2026-10-15 18:00", chrono_tz::Europe::Moscow).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2026, 10, 15, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_deadline_rfc3339() {
        let at = parse_deadline("2026-10-15T18:00:00Z", chrono_tz::America::Adak).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2026, 10, 15, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_deadline_rejects_fractional_seconds() {
        let err = parse_deadline("2026-10-15T18:00:00.900Z", chrono_tz::UTC).unwrap_err();
        assert!(err.to_string().contains("fractional seconds"), "{err}");
        // Zero fraction is the same instant as whole seconds.
        let at = parse_deadline("2026-10-15T18:00:00.000Z", chrono_tz::UTC).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2026, 10, 15, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_deadline_dst_edges() {
        let tz = chrono_tz::America::New_York;
        // Spring-forward gap.
        assert!(parse_deadline("2026-03-08 02:30", tz).is_err());
        // Fall-back overlap takes the earlier (EDT) instant.
        let at = parse_deadline("2026-11-01 01:30", tz).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_deadline_rejects_garbage() {
        assert!(parse_deadline("tomorrow", chrono_tz::UTC).is_err());
        assert!(parse_deadline("15.10.2026 18:00", chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "deadliner",
            "add",
            "--chat-id",
            "42",
            "--name",
            "Report",
            "--deadline",
            "2026-10-15 18:00",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                chat_id,
                description,
                category,
                ..
            } => {
                assert_eq!(chat_id, 42);
                assert!(description.is_empty());
                assert!(category.is_none());
            }
            _ => panic!("expected add"),
        }
        assert_eq!(cli.config, "config.toml");
    }
}
