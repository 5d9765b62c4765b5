use chrono::{Local, NaiveDate, NaiveDateTime};
use notebell_core::db::open_db_in_memory;
use notebell_core::{
    trigger_epoch_ms, KeyValueStore, NoteDraft, NoteService, NoteServiceError,
    NoteValidationError, NotificationPlatform, PermissionPolicy, PermissionStatus, Priority,
    ReminderOutcome, ReminderSettings, SqliteKeyValueStore, SqliteNotificationPlatform, NOTES_KEY,
};
use rusqlite::Connection;

type Service<'conn> = NoteService<SqliteKeyValueStore<'conn>, SqliteNotificationPlatform<'conn>>;

fn service(conn: &Connection, policy: PermissionPolicy) -> Service<'_> {
    NoteService::new(
        SqliteKeyValueStore::new(conn),
        SqliteNotificationPlatform::new(conn, policy),
    )
}

fn draft(title: &str, due_date: Option<&str>, reminder_time: Option<&str>) -> NoteDraft {
    NoteDraft {
        title: title.to_string(),
        content: format!("{title} details"),
        priority: Priority::Medium,
        due_date: due_date.map(str::to_string),
        reminder_time: reminder_time.map(str::to_string),
    }
}

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

#[test]
fn create_note_trims_input_and_assigns_identity() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);

    let saved = service
        .create_note(NoteDraft {
            title: "  Buy milk  ".to_string(),
            content: " 2 liters ".to_string(),
            ..NoteDraft::default()
        })
        .unwrap();

    assert_eq!(saved.note.title, "Buy milk");
    assert_eq!(saved.note.content, "2 liters");
    assert!(!saved.note.completed);
    assert!(!saved.note.id.is_empty());
    assert!(!saved.note.created_at.is_empty());
    assert_eq!(saved.reminder, ReminderOutcome::NotRequested);
    assert_eq!(service.list_notes(), vec![saved.note]);
}

#[test]
fn create_note_rejects_blank_title_without_saving() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);

    let err = service.create_note(NoteDraft::new("   ")).unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::Validation(NoteValidationError::EmptyTitle)
    ));
    assert!(service.list_notes().is_empty());
}

#[test]
fn create_note_with_reminder_schedules_one_notification_keyed_by_id() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);

    let saved = service
        .create_note(draft("Dentist", Some("2030-06-01"), Some("14:30")))
        .unwrap();
    let expected = trigger_epoch_ms("2030-06-01", Some("14:30"), &Local).unwrap();
    assert_eq!(
        saved.reminder,
        ReminderOutcome::Scheduled {
            trigger_at_ms: expected
        }
    );

    let pending = service.notifications().scheduled_notifications();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].identifier, saved.note.id);
    assert_eq!(pending[0].content.title, "Reminder: Dentist");
    assert_eq!(pending[0].trigger_at_ms, expected);
}

#[test]
fn due_date_without_time_is_saved_but_not_scheduled() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);

    let saved = service
        .create_note(draft("Taxes", Some("2030-04-15"), None))
        .unwrap();
    assert_eq!(saved.reminder, ReminderOutcome::NotRequested);
    assert!(service.notifications().scheduled_notifications().is_empty());
}

#[test]
fn denied_permission_still_saves_note_without_reminder() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::Deny);

    let saved = service
        .create_note(draft("Dentist", Some("2030-06-01"), Some("14:30")))
        .unwrap();

    assert_eq!(saved.reminder, ReminderOutcome::PermissionDenied);
    assert_eq!(service.list_notes().len(), 1);
    assert!(service.notifications().scheduled_notifications().is_empty());
    assert_eq!(
        service
            .notifications()
            .platform()
            .permission_status()
            .unwrap(),
        PermissionStatus::Denied
    );
}

#[test]
fn disabled_reminders_skip_scheduling() {
    let conn = open_db_in_memory().unwrap();
    let mut service = service(&conn, PermissionPolicy::AutoGrant);
    service
        .update_settings(ReminderSettings {
            enabled: false,
            ..ReminderSettings::default()
        })
        .unwrap();

    let saved = service
        .create_note(draft("Dentist", Some("2030-06-01"), Some("14:30")))
        .unwrap();
    assert_eq!(saved.reminder, ReminderOutcome::Disabled);
    assert!(service.notifications().scheduled_notifications().is_empty());
}

#[test]
fn sound_setting_flows_into_scheduled_payload() {
    let conn = open_db_in_memory().unwrap();
    let mut service = service(&conn, PermissionPolicy::AutoGrant);
    service
        .update_settings(ReminderSettings {
            sound_enabled: false,
            ..ReminderSettings::default()
        })
        .unwrap();

    service
        .create_note(draft("Quiet", Some("2030-06-01"), Some("07:00")))
        .unwrap();
    let pending = service.notifications().scheduled_notifications();
    assert!(!pending[0].content.sound);
    assert!(pending[0].content.vibrate);
}

#[test]
fn update_note_replaces_by_id_keeps_identity_and_reopens() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);
    let first = service.create_note(draft("first", None, None)).unwrap().note;
    let second = service.create_note(draft("second", None, None)).unwrap().note;
    service.toggle_completion(&first.id).unwrap();

    let mut edit = draft("first edited", None, None);
    edit.priority = Priority::High;
    let updated = service.update_note(&first.id, edit).unwrap().note;

    assert_eq!(updated.id, first.id);
    assert_eq!(updated.created_at, first.created_at);
    assert!(!updated.completed);
    assert_eq!(updated.priority, Priority::High);
    assert_eq!(service.list_notes(), vec![updated, second]);
}

#[test]
fn editing_completed_note_reopens_and_reschedules_it() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);
    let note = service
        .create_note(draft("Dentist", Some("2030-06-01"), Some("14:30")))
        .unwrap()
        .note;
    service.mark_complete(&note.id).unwrap();
    assert!(service.notifications().scheduled_notifications().is_empty());

    let saved = service
        .update_note(&note.id, draft("Dentist", Some("2030-06-01"), Some("14:30")))
        .unwrap();

    assert!(!saved.note.completed);
    assert!(matches!(saved.reminder, ReminderOutcome::Scheduled { .. }));
    assert!(service.notifications().scheduled_for(&note.id).is_some());
}

#[test]
fn failed_update_save_keeps_previous_notification() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);
    let note = service
        .create_note(draft("Dentist", Some("2030-06-01"), Some("14:30")))
        .unwrap()
        .note;
    let before = service.notifications().scheduled_notifications();

    // A stored entry with a blank title makes every later save fail validation.
    let mut blank = note.clone();
    blank.id = "blank".to_string();
    blank.title = "   ".to_string();
    blank.due_date = None;
    blank.reminder_time = None;
    let blob = serde_json::to_string(&vec![note.clone(), blank]).unwrap();
    SqliteKeyValueStore::new(&conn)
        .set_item(NOTES_KEY, &blob)
        .unwrap();

    let moved = service.update_note(&note.id, draft("Dentist", Some("2031-01-01"), Some("09:00")));
    assert!(matches!(
        moved,
        Err(NoteServiceError::Validation(NoteValidationError::EmptyTitle))
    ));
    let dropped = service.update_note(&note.id, draft("Dentist", None, None));
    assert!(dropped.is_err());

    assert_eq!(
        service.get_note(&note.id).unwrap().due_date.as_deref(),
        Some("2030-06-01")
    );
    assert_eq!(service.notifications().scheduled_notifications(), before);
}

#[test]
fn update_note_reschedules_and_cancels_reminders() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);
    let note = service
        .create_note(draft("Dentist", Some("2030-06-01"), Some("14:30")))
        .unwrap()
        .note;

    service
        .update_note(&note.id, draft("Dentist", Some("2030-06-02"), Some("09:00")))
        .unwrap();
    let pending = service.notifications().scheduled_notifications();
    assert_eq!(pending.len(), 1);
    assert_eq!(
        pending[0].trigger_at_ms,
        trigger_epoch_ms("2030-06-02", Some("09:00"), &Local).unwrap()
    );

    let cleared = service
        .update_note(&note.id, draft("Dentist", None, None))
        .unwrap();
    assert_eq!(cleared.reminder, ReminderOutcome::Cancelled);
    assert!(service.notifications().scheduled_notifications().is_empty());
}

#[test]
fn toggle_completion_flips_only_the_target() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);
    let a = service.create_note(draft("a", None, None)).unwrap().note;
    let b = service.create_note(draft("b", None, None)).unwrap().note;

    let toggled = service.toggle_completion(&a.id).unwrap();
    assert!(toggled.completed);
    let notes = service.list_notes();
    assert!(notes[0].completed);
    assert_eq!(notes[1], b);

    assert!(!service.toggle_completion(&a.id).unwrap().completed);
}

#[test]
fn delete_removes_exactly_one_entry_and_its_notification() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);
    let a = service.create_note(draft("a", None, None)).unwrap().note;
    let b = service
        .create_note(draft("b", Some("2030-01-01"), Some("08:00")))
        .unwrap()
        .note;
    let c = service.create_note(draft("c", None, None)).unwrap().note;

    let removed = service.delete_note(&b.id).unwrap();
    assert_eq!(removed.id, b.id);
    assert_eq!(service.list_notes(), vec![a, c]);
    assert!(service.notifications().scheduled_notifications().is_empty());
}

#[test]
fn mutations_on_unknown_id_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);
    service.create_note(draft("a", None, None)).unwrap();

    for result in [
        service.delete_note("missing").map(|_| ()),
        service.toggle_completion("missing").map(|_| ()),
        service.cancel_reminder("missing").map(|_| ()),
        service.mark_complete("missing").map(|_| ()),
        service.update_note("missing", draft("x", None, None)).map(|_| ()),
    ] {
        assert!(matches!(result, Err(NoteServiceError::NoteNotFound(_))));
    }
    assert_eq!(service.list_notes().len(), 1);
}

#[test]
fn cancel_reminder_clears_due_fields_and_notification() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);
    let note = service
        .create_note(draft("Dentist", Some("2030-06-01"), Some("14:30")))
        .unwrap()
        .note;

    let cleared = service.cancel_reminder(&note.id).unwrap();
    assert_eq!(cleared.due_date, None);
    assert_eq!(cleared.reminder_time, None);
    assert_eq!(service.get_note(&note.id), Some(cleared));
    assert!(service.notifications().scheduled_notifications().is_empty());
}

#[test]
fn mark_complete_sets_flag_and_cancels_notification() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);
    let note = service
        .create_note(draft("Dentist", Some("2030-06-01"), Some("14:30")))
        .unwrap()
        .note;

    let done = service.mark_complete(&note.id).unwrap();
    assert!(done.completed);
    assert!(done.due_date.is_some());
    assert!(service.notifications().scheduled_notifications().is_empty());
}

#[test]
fn clear_all_notes_drops_list_and_notifications() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);
    service
        .create_note(draft("a", Some("2030-06-01"), Some("14:30")))
        .unwrap();
    service
        .create_note(draft("b", Some("2030-06-02"), Some("14:30")))
        .unwrap();

    service.clear_all_notes().unwrap();
    assert!(service.list_notes().is_empty());
    assert!(service.notifications().scheduled_notifications().is_empty());
}

#[test]
fn corrupt_blob_blocks_mutations_but_reads_fail_soft() {
    let conn = open_db_in_memory().unwrap();
    SqliteKeyValueStore::new(&conn)
        .set_item(NOTES_KEY, "[{broken")
        .unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);

    assert!(service.list_notes().is_empty());
    let err = service.create_note(draft("a", None, None)).unwrap_err();
    assert!(matches!(err, NoteServiceError::Storage(_)));
    assert_eq!(
        SqliteKeyValueStore::new(&conn)
            .get_item(NOTES_KEY)
            .unwrap()
            .as_deref(),
        Some("[{broken")
    );
}

#[test]
fn invalid_reminder_time_is_rejected_before_scheduling() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);

    let err = service
        .create_note(draft("bad", Some("2030-06-01"), Some("7pm")))
        .unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::Validation(NoteValidationError::InvalidReminderTime(_))
    ));
    assert!(service.notifications().scheduled_notifications().is_empty());
}

#[test]
fn search_sections_and_buckets_reflect_stored_list() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, PermissionPolicy::AutoGrant);
    let milk = service
        .create_note(draft("Buy milk", Some("2024-01-01"), None))
        .unwrap()
        .note;
    let call = service
        .create_note(draft("Call bank", Some("2024-01-02"), None))
        .unwrap()
        .note;
    let trip = service
        .create_note(draft("Trip", Some("2024-02-10"), None))
        .unwrap()
        .note;
    let done = service.create_note(draft("Old milk", None, None)).unwrap().note;
    service.toggle_completion(&done.id).unwrap();

    let hits = service.search_notes("MILK");
    assert_eq!(hits.len(), 2);

    let sections = service.note_sections("milk");
    assert_eq!(sections.pending, vec![milk.clone()]);
    assert_eq!(sections.completed.len(), 1);

    let buckets = service.reminder_buckets(at(2024, 1, 2));
    assert_eq!(buckets.overdue, vec![milk]);
    assert_eq!(buckets.today, vec![call]);
    assert_eq!(buckets.upcoming, vec![trip]);
}
