//! `notebell` command-line host.
//!
//! # Responsibility
//! - Drive note and reminder use cases from a terminal.
//! - Act as the notification shell: `deliver` prints reminders that came due.

use anyhow::{bail, Context};
use chrono::{Local, Utc};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::{info, warn};
use notebell_core::db::migrations::schema_version;
use notebell_core::db::{open_db, Connection};
use notebell_core::{
    classify, init_logging, CoreConfig, Note, NoteDraft, NoteService, PermissionStatus, Priority,
    ReminderOutcome, SqliteKeyValueStore, SqliteNotificationPlatform,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "notebell")]
#[command(about = "Notes with due-date reminders")]
#[command(version)]
struct Cli {
    /// Config file (JSON); defaults to the platform config dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file; overrides config and NOTEBELL_DB_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a note
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        content: String,
        #[arg(short, long, value_enum, default_value_t = PriorityArg::Medium)]
        priority: PriorityArg,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// Reminder time, HH:MM (needs --due)
        #[arg(long)]
        at: Option<String>,
    },
    /// Edit a note; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short, long, value_enum)]
        priority: Option<PriorityArg>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        at: Option<String>,
        /// Drop due date and reminder time
        #[arg(long, conflicts_with_all = ["due", "at"])]
        clear_reminder: bool,
    },
    /// List notes, pending first
    List {
        /// Case-insensitive title/content filter
        #[arg(short, long, default_value = "")]
        query: String,
        /// Group by priority instead of completion
        #[arg(long)]
        by_priority: bool,
    },
    /// Show one note
    Show { id: String },
    /// Flip the completion flag
    Toggle { id: String },
    /// Mark complete and cancel the reminder
    Done { id: String },
    /// Delete a note
    Delete { id: String },
    /// Cancel a note's reminder and clear its due date
    CancelReminder { id: String },
    /// Overdue, today and upcoming notes
    Reminders,
    /// Delete every note
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Inspect or change notification permission
    Permissions {
        #[arg(value_enum, default_value_t = PermissionAction::Check)]
        action: PermissionAction,
    },
    /// Print and remove notifications that are due
    Deliver,
    /// Show or change reminder settings
    Settings {
        #[arg(long, action = ArgAction::Set)]
        enabled: Option<bool>,
        #[arg(long, action = ArgAction::Set)]
        sound: Option<bool>,
        #[arg(long, action = ArgAction::Set)]
        vibration: Option<bool>,
    },
    /// Print version and resolved paths
    Info,
}

#[derive(Clone, Copy, ValueEnum)]
enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PermissionAction {
    Check,
    Request,
    Grant,
    Revoke,
}

type CliService<'conn> = NoteService<SqliteKeyValueStore<'conn>, SqliteNotificationPlatform<'conn>>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CoreConfig::load(cli.config.as_deref()).context("failed to load config")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Err(err) = init_logging(&config.log_level, &config.log_dir.to_string_lossy()) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    let mut service = NoteService::new(
        SqliteKeyValueStore::new(&conn),
        SqliteNotificationPlatform::new(&conn, config.notifications.permission_policy),
    );
    info!("event=cli_command module=cli status=start");
    run(&mut service, &config, &conn, cli.command)
}

fn run(
    service: &mut CliService<'_>,
    config: &CoreConfig,
    conn: &Connection,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Add {
            title,
            content,
            priority,
            due,
            at,
        } => {
            let saved = service.create_note(NoteDraft {
                title,
                content,
                priority: priority.into(),
                due_date: due,
                reminder_time: at,
            })?;
            println!("created {}", saved.note.id);
            print_reminder(saved.reminder);
        }
        Commands::Edit {
            id,
            title,
            content,
            priority,
            due,
            at,
            clear_reminder,
        } => {
            let Some(current) = service.get_note(&id) else {
                bail!("note `{id}` not found");
            };
            let (due_date, reminder_time) = if clear_reminder {
                (None, None)
            } else {
                (due.or(current.due_date), at.or(current.reminder_time))
            };
            let saved = service.update_note(
                &id,
                NoteDraft {
                    title: title.unwrap_or(current.title),
                    content: content.unwrap_or(current.content),
                    priority: priority.map(Priority::from).unwrap_or(current.priority),
                    due_date,
                    reminder_time,
                },
            )?;
            println!("updated {}", saved.note.id);
            print_reminder(saved.reminder);
        }
        Commands::List { query, by_priority } => {
            if by_priority {
                let groups = service.priority_groups(&query);
                print_section("high", &groups.high);
                print_section("medium", &groups.medium);
                print_section("low", &groups.low);
            } else {
                let sections = service.note_sections(&query);
                print_section("pending", &sections.pending);
                print_section("completed", &sections.completed);
            }
        }
        Commands::Show { id } => {
            let Some(note) = service.get_note(&id) else {
                bail!("note `{id}` not found");
            };
            print_note(&note);
            if !note.content.is_empty() {
                println!("    {}", note.content);
            }
            println!("    created {}", note.created_at);
        }
        Commands::Toggle { id } => {
            let note = service.toggle_completion(&id)?;
            println!("{} completed={}", note.id, note.completed);
        }
        Commands::Done { id } => {
            let note = service.mark_complete(&id)?;
            println!("{} completed", note.id);
        }
        Commands::Delete { id } => {
            let note = service.delete_note(&id)?;
            println!("deleted {}", note.id);
        }
        Commands::CancelReminder { id } => {
            let note = service.cancel_reminder(&id)?;
            println!("reminder cancelled for {}", note.id);
        }
        Commands::Reminders => {
            let buckets = service.reminder_buckets(Local::now().naive_local());
            print_section("overdue", &buckets.overdue);
            print_section("today", &buckets.today);
            print_section("upcoming", &buckets.upcoming);
            let scheduled = service.notifications().scheduled_notifications();
            println!("scheduled notifications ({})", scheduled.len());
            for request in scheduled {
                println!("  {} at {} ms", request.identifier, request.trigger_at_ms);
            }
        }
        Commands::Clear { yes } => {
            if !yes {
                bail!("refusing to delete all notes without --yes");
            }
            service.clear_all_notes()?;
            println!("all notes deleted");
        }
        Commands::Permissions { action } => {
            let notifications = service.notifications();
            match action {
                PermissionAction::Check => {}
                PermissionAction::Request => {
                    notifications.request_permissions();
                }
                PermissionAction::Grant => notifications
                    .platform()
                    .set_permission(PermissionStatus::Granted)?,
                PermissionAction::Revoke => notifications
                    .platform()
                    .set_permission(PermissionStatus::Denied)?,
            }
            println!("granted={}", notifications.check_permissions());
        }
        Commands::Deliver => {
            let due = service
                .notifications()
                .platform()
                .take_due(Utc::now().timestamp_millis())?;
            if due.is_empty() {
                println!("nothing due");
            }
            for request in due {
                println!("[{}] {}", request.identifier, request.content.title);
                if !request.content.body.is_empty() {
                    println!("    {}", request.content.body);
                }
            }
        }
        Commands::Settings {
            enabled,
            sound,
            vibration,
        } => {
            let mut settings = service.settings();
            if enabled.is_some() || sound.is_some() || vibration.is_some() {
                settings.enabled = enabled.unwrap_or(settings.enabled);
                settings.sound_enabled = sound.unwrap_or(settings.sound_enabled);
                settings.vibration_enabled = vibration.unwrap_or(settings.vibration_enabled);
                service.update_settings(settings)?;
            }
            println!(
                "enabled={} sound={} vibration={}",
                settings.enabled, settings.sound_enabled, settings.vibration_enabled
            );
        }
        Commands::Info => {
            println!("notebell_core version={}", notebell_core::core_version());
            println!("db_path={}", config.db_path.display());
            println!("schema_version={}", schema_version(conn)?);
            println!("log_dir={}", config.log_dir.display());
            println!("log_level={}", config.log_level);
        }
    }
    Ok(())
}

fn print_reminder(outcome: ReminderOutcome) {
    match outcome {
        ReminderOutcome::NotRequested => {}
        ReminderOutcome::Disabled => println!("reminders are disabled in settings"),
        ReminderOutcome::Scheduled { trigger_at_ms } => {
            println!("reminder scheduled at {trigger_at_ms} ms")
        }
        ReminderOutcome::PermissionDenied => {
            warn!("event=cli_reminder module=cli status=permission_denied");
            println!("notification permission denied; note saved without reminder")
        }
        ReminderOutcome::Cancelled => println!("reminder cancelled"),
    }
}

fn print_section(label: &str, notes: &[Note]) {
    println!("{label} ({})", notes.len());
    for note in notes {
        print_note(note);
    }
}

fn print_note(note: &Note) {
    let mark = if note.completed { "x" } else { " " };
    let due = match (&note.due_date, &note.reminder_time) {
        (Some(date), Some(time)) => format!(" due {date} {time}"),
        (Some(date), None) => format!(" due {date}"),
        _ => String::new(),
    };
    let status = classify(note, Local::now().naive_local())
        .map(|status| format!(" ({})", status.as_str()))
        .unwrap_or_default();
    println!(
        "  [{mark}] {} {} !{}{due}{status}",
        note.id,
        note.title,
        note.priority.as_str()
    );
}
