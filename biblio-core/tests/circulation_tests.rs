//! Integration tests for biblio-core services
//!
//! Every test runs against real files in a temporary data directory. Only
//! email delivery is replaced, by a notifier that records what it was asked
//! to send.
//!
//! Run with: cargo test --test circulation_tests -- --nocapture

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use tempfile::TempDir;

use biblio_core::config::Config;
use biblio_core::ports::Notifier;
use biblio_core::services::CopyFilter;
use biblio_core::{BookTemplate, CopyState, CopyStatus, Error, Identity, LibraryContext};

// ============================================================================
// Test Helpers
// ============================================================================

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(to, _, _)| to.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, to_address: &str, subject: &str, body: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((to_address.to_string(), subject.to_string(), body.to_string()));
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn open_with(dir: &Path, require_registered_users: bool, notifier: Arc<RecordingNotifier>) -> LibraryContext {
    let config = Config {
        require_registered_users,
        ..Config::default()
    };
    LibraryContext::with_config(dir, config, notifier).expect("Failed to open library")
}

/// Context that accepts any non-empty user id
fn open_lenient(dir: &Path) -> LibraryContext {
    open_with(dir, false, Arc::new(RecordingNotifier::default()))
}

fn add_dune(ctx: &LibraryContext, count: usize) -> Vec<String> {
    ctx.catalog_service
        .add_copies(&BookTemplate::new("Dune", "Frank Herbert", "111"), count)
        .unwrap()
        .into_value()
        .into_iter()
        .map(|c| c.id)
        .collect()
}

// ============================================================================
// Circulation Scenarios
// ============================================================================

#[test]
fn test_full_circulation_scenario() {
    // Default settings: no settings.json, any non-empty user id accepted
    let temp_dir = TempDir::new().unwrap();
    let ctx = LibraryContext::new(temp_dir.path()).unwrap();

    let ids = add_dune(&ctx, 2);
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    let (a, b) = (&ids[0], &ids[1]);

    let loan = ctx
        .circulation_service
        .borrow(a, "u1", date(2024, 1, 1))
        .unwrap();
    assert!(loan.is_persisted());
    assert_eq!(loan.value.due_on, date(2024, 1, 15));

    let second = ctx.circulation_service.borrow(a, "u2", date(2024, 1, 2));
    assert!(matches!(second, Err(Error::InvalidState(_))));

    ctx.circulation_service.reserve(b, "u2").unwrap();
    assert_eq!(ctx.catalog_service.get(b).unwrap().reserved_by(), Some("u2"));

    let receipt = ctx
        .circulation_service
        .return_copy(a, date(2024, 1, 20))
        .unwrap()
        .into_value();
    assert_eq!(receipt.overdue_days, 5);
    assert_eq!(receipt.penalty, Decimal::new(500, 0));
    assert_eq!(receipt.borrower, "u1");

    let copy_a = ctx.catalog_service.get(a).unwrap();
    assert_eq!(copy_a.state, CopyState::Available);

    let status = ctx.status_service.get_status(date(2024, 1, 20));
    assert_eq!(status.total_copies, 2);
    assert_eq!(status.available, 1);
    assert_eq!(status.reserved, 1);
    assert_eq!(status.borrowed, 0);
    assert_eq!(status.titles.len(), 1);
    assert_eq!(status.titles[0].copies, 2);
}

#[test]
fn test_penalty_starts_the_day_after_due_date() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());
    let ids = add_dune(&ctx, 2);
    let start = date(2024, 3, 1);

    ctx.circulation_service.borrow(&ids[0], "u1", start).unwrap();
    ctx.circulation_service.borrow(&ids[1], "u1", start).unwrap();

    let on_time = ctx
        .circulation_service
        .return_copy(&ids[0], start + Days::new(14))
        .unwrap()
        .into_value();
    assert_eq!(on_time.penalty, Decimal::ZERO);

    let late = ctx
        .circulation_service
        .return_copy(&ids[1], start + Days::new(15))
        .unwrap()
        .into_value();
    assert_eq!(late.penalty, Decimal::ONE_HUNDRED);
}

#[test]
fn test_return_before_borrow_date_has_no_penalty() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());
    let ids = add_dune(&ctx, 1);

    ctx.circulation_service.borrow(&ids[0], "u1", date(2024, 5, 10)).unwrap();
    let receipt = ctx
        .circulation_service
        .return_copy(&ids[0], date(2024, 5, 1))
        .unwrap()
        .into_value();
    assert_eq!(receipt.overdue_days, 0);
    assert_eq!(receipt.penalty, Decimal::ZERO);
}

#[test]
fn test_reserved_copy_cannot_be_borrowed_until_cancelled() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());
    let ids = add_dune(&ctx, 1);
    let id = &ids[0];

    ctx.circulation_service.reserve(id, "u1").unwrap();
    assert!(matches!(
        ctx.circulation_service.borrow(id, "u1", date(2024, 1, 1)),
        Err(Error::InvalidState(_))
    ));
    assert!(matches!(
        ctx.circulation_service.reserve(id, "u2"),
        Err(Error::InvalidState(_))
    ));
    assert!(matches!(
        ctx.circulation_service.return_copy(id, date(2024, 1, 1)),
        Err(Error::InvalidState(_))
    ));

    ctx.circulation_service.cancel_reservation(id).unwrap();
    assert!(matches!(
        ctx.circulation_service.cancel_reservation(id),
        Err(Error::InvalidState(_))
    ));
    ctx.circulation_service.borrow(id, "u2", date(2024, 1, 1)).unwrap();
}

#[test]
fn test_unknown_copy_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());

    assert!(matches!(
        ctx.circulation_service.borrow("nope", "u1", date(2024, 1, 1)),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        ctx.circulation_service.return_copy("nope", date(2024, 1, 1)),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(ctx.catalog_service.remove_copy("nope"), Err(Error::NotFound(_))));
}

#[test]
fn test_registered_users_required_when_configured() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_with(temp_dir.path(), true, Arc::new(RecordingNotifier::default()));
    let ids = add_dune(&ctx, 1);

    assert!(matches!(
        ctx.circulation_service.borrow(&ids[0], "ghost", date(2024, 1, 1)),
        Err(Error::NotFound(_))
    ));
    assert_eq!(ctx.catalog_service.get(&ids[0]).unwrap().status(), CopyStatus::Available);

    let user = ctx
        .member_service
        .register(&Identity::new("Ada", "555", "ada@example.com"))
        .unwrap()
        .into_value();
    ctx.circulation_service.borrow(&ids[0], &user.id, date(2024, 1, 1)).unwrap();
    assert_eq!(ctx.circulation_service.copies_for_user(&user.id).len(), 1);
}

#[test]
fn test_no_copy_is_ever_borrowed_and_reserved() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());
    let ids = add_dune(&ctx, 3);
    let day = date(2024, 2, 1);

    // interleave operations, ignoring the expected refusals
    for (step, id) in ids.iter().cycle().take(24).enumerate() {
        let _ = match step % 4 {
            0 => ctx.circulation_service.borrow(id, "u1", day).map(|_| ()),
            1 => ctx.circulation_service.reserve(id, "u2").map(|_| ()),
            2 => ctx.circulation_service.return_copy(id, day).map(|_| ()),
            _ => ctx.circulation_service.cancel_reservation(id).map(|_| ()),
        };
    }

    // the on-disk flags agree with the in-memory state
    let contents = fs::read_to_string(temp_dir.path().join("books.txt")).unwrap();
    for line in contents.lines() {
        let fields: Vec<&str> = line.split('|').collect();
        assert_eq!(fields.len(), 10);
        assert!(!(fields[4] == "1" && fields[8] == "1"), "line {} is borrowed and reserved", line);
    }
}

// ============================================================================
// Catalog and Members
// ============================================================================

#[test]
fn test_only_available_copies_can_be_removed() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());
    let ids = add_dune(&ctx, 2);

    ctx.circulation_service.borrow(&ids[0], "u1", date(2024, 1, 1)).unwrap();
    assert!(matches!(
        ctx.catalog_service.remove_copy(&ids[0]),
        Err(Error::InvalidState(_))
    ));

    ctx.catalog_service.remove_copy(&ids[1]).unwrap();
    let remaining = ctx.catalog_service.list(&CopyFilter::default());
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, ids[0]);
}

#[test]
fn test_adding_zero_copies_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());
    assert!(matches!(
        ctx.catalog_service
            .add_copies(&BookTemplate::new("Dune", "Frank Herbert", "111"), 0),
        Err(Error::Validation(_))
    ));
    assert!(!temp_dir.path().join("books.txt").exists());
}

#[test]
fn test_list_filters() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());
    let dune = add_dune(&ctx, 2);
    ctx.catalog_service
        .add_copies(&BookTemplate::new("Emma", "Jane Austen", "222"), 1)
        .unwrap();
    ctx.circulation_service.borrow(&dune[0], "u1", date(2024, 1, 1)).unwrap();

    let by_isbn = ctx.catalog_service.list(&CopyFilter {
        isbn: Some("111".to_string()),
        ..CopyFilter::default()
    });
    assert_eq!(by_isbn.len(), 2);

    let available = ctx.catalog_service.list(&CopyFilter {
        status: Some(CopyStatus::Available),
        ..CopyFilter::default()
    });
    assert_eq!(available.len(), 2);

    let overdue = ctx.catalog_service.list(&CopyFilter {
        overdue_as_of: Some(date(2024, 1, 16)),
        ..CopyFilter::default()
    });
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, dune[0]);
}

#[test]
fn test_duplicate_registration_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());
    let ada = Identity::new("Ada", "555", "ada@example.com");

    ctx.member_service.register(&ada).unwrap();
    assert!(matches!(
        ctx.member_service.register(&ada),
        Err(Error::DuplicateEntry(_))
    ));
    assert_eq!(ctx.member_service.list().len(), 1);

    // same name, different phone is a different person
    ctx.member_service
        .register(&Identity::new("Ada", "556", "ada@example.com"))
        .unwrap();
    assert_eq!(ctx.member_service.list().len(), 2);
}

#[test]
fn test_login_or_register_reuses_account() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());
    let ada = Identity::new("Ada", "555", "ada@example.com");

    let first = ctx.member_service.login_or_register(&ada).unwrap().into_value();
    assert!(first.created);
    let second = ctx.member_service.login_or_register(&ada).unwrap().into_value();
    assert!(!second.created);
    assert_eq!(first.user.id, second.user.id);
}

#[test]
fn test_lookup_with_blank_name_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());
    ctx.member_service
        .register(&Identity::new("Ada", "555", "ada@example.com"))
        .unwrap();

    for name in ["", "   "] {
        let lookup = ctx
            .member_service
            .find_by_identity(&Identity::new(name, "555", "ada@example.com"));
        assert!(matches!(lookup, Err(Error::NotFound(_))));
    }

    // The welcome flow still refuses to create such an account
    assert!(matches!(
        ctx.member_service.login_or_register(&Identity::new(" ", "555", "")),
        Err(Error::Validation(_))
    ));
    assert_eq!(ctx.member_service.list().len(), 1);
}

#[test]
fn test_delimiter_in_input_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());

    assert!(matches!(
        ctx.member_service.register(&Identity::new("Ada|Lovelace", "555", "")),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        ctx.catalog_service
            .add_copies(&BookTemplate::new("Dune\nMessiah", "Frank Herbert", "111"), 1),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_user_ids_that_break_the_file_format_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    {
        let ctx = open_lenient(temp_dir.path());
        let ids = add_dune(&ctx, 2);

        assert!(matches!(
            ctx.circulation_service.borrow(&ids[0], "u|1", date(2024, 1, 1)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            ctx.circulation_service.reserve(&ids[1], "u2\nx"),
            Err(Error::Validation(_))
        ));
    }

    let ctx = open_lenient(temp_dir.path());
    assert!(ctx.load_warnings().iter().all(|w| !w.starts_with("Skipped")));
    let copies = ctx.catalog_service.list(&CopyFilter::default());
    assert_eq!(copies.len(), 2);
    assert!(copies.iter().all(|c| c.state == CopyState::Available));
}

#[test]
fn test_user_id_is_stored_trimmed() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());
    let ids = add_dune(&ctx, 1);

    let loan = ctx
        .circulation_service
        .borrow(&ids[0], "  u1 ", date(2024, 1, 1))
        .unwrap()
        .into_value();
    assert_eq!(loan.borrower, "u1");
}

// ============================================================================
// Notifications
// ============================================================================

#[test]
fn test_notify_skips_users_without_email() {
    let temp_dir = TempDir::new().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let ctx = open_with(temp_dir.path(), true, Arc::clone(&notifier));

    ctx.member_service
        .register(&Identity::new("Ada", "555", "ada@example.com"))
        .unwrap();
    ctx.member_service.register(&Identity::new("Bob", "777", "")).unwrap();

    let report = ctx.notify_service.notify_all("New arrivals", "Dune is in");
    assert_eq!(report.sent, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(notifier.recipients(), vec!["ada@example.com".to_string()]);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_state_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let (borrowed, reserved, user_id) = {
        let ctx = open_lenient(temp_dir.path());
        let ids = add_dune(&ctx, 3);
        let user = ctx
            .member_service
            .register(&Identity::new("Ada", "555", "ada@example.com"))
            .unwrap()
            .into_value();
        ctx.circulation_service.borrow(&ids[0], &user.id, date(2024, 1, 1)).unwrap();
        ctx.circulation_service.reserve(&ids[1], &user.id).unwrap();
        (ids[0].clone(), ids[1].clone(), user.id)
    };

    let ctx = open_lenient(temp_dir.path());
    let copy = ctx.catalog_service.get(&borrowed).unwrap();
    let loan = copy.loan().unwrap();
    assert_eq!(loan.borrower, user_id);
    assert_eq!(loan.due_on, date(2024, 1, 15));
    assert_eq!(ctx.catalog_service.get(&reserved).unwrap().reserved_by(), Some(user_id.as_str()));
    assert_eq!(ctx.member_service.list().len(), 1);
    assert_eq!(ctx.catalog_service.list(&CopyFilter::default()).len(), 3);
}

#[test]
fn test_rewriting_loaded_files_is_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    {
        let ctx = open_lenient(temp_dir.path());
        let ids = add_dune(&ctx, 3);
        ctx.member_service
            .register(&Identity::new("Ada", "555", "ada@example.com"))
            .unwrap();
        ctx.circulation_service.borrow(&ids[0], "u1", date(2024, 1, 1)).unwrap();
        ctx.circulation_service.reserve(&ids[2], "u2").unwrap();
    }
    let books_before = fs::read(temp_dir.path().join("books.txt")).unwrap();
    let users_before = fs::read(temp_dir.path().join("users.txt")).unwrap();

    let ctx = open_lenient(temp_dir.path());
    ctx.repository.update_books(|_, _| Ok(())).unwrap();
    ctx.repository.update_users(|_| Ok(())).unwrap();

    assert_eq!(fs::read(temp_dir.path().join("books.txt")).unwrap(), books_before);
    assert_eq!(fs::read(temp_dir.path().join("users.txt")).unwrap(), users_before);
}

#[test]
fn test_invalid_lines_are_skipped_and_reported() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("books.txt"),
        "c1|Dune|Frank Herbert|111|0||||0|\nc2|broken\nc3|Emma|Jane Austen|222|1|u1|2024-01-01|2024-01-15|1|u2\n",
    )
    .unwrap();

    let ctx = open_lenient(temp_dir.path());
    let copies = ctx.catalog_service.list(&CopyFilter::default());
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].id, "c1");
    assert!(ctx.load_warnings().iter().any(|w| w.contains(":2:")));
    assert!(ctx.load_warnings().iter().any(|w| w.contains(":3:")));

    let report = ctx.doctor_service.run_checks(date(2024, 1, 1));
    assert_eq!(report.summary.errors, 0);
    assert!(report.summary.warnings >= 1);
}

#[test]
fn test_failed_operation_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_lenient(temp_dir.path());
    let ids = add_dune(&ctx, 1);
    ctx.circulation_service.borrow(&ids[0], "u1", date(2024, 1, 1)).unwrap();
    let before = fs::read(temp_dir.path().join("books.txt")).unwrap();

    assert!(ctx.circulation_service.reserve(&ids[0], "u2").is_err());
    assert!(ctx.catalog_service.remove_copy(&ids[0]).is_err());

    assert_eq!(fs::read(temp_dir.path().join("books.txt")).unwrap(), before);
}

// ============================================================================
// Single Instance
// ============================================================================

#[test]
fn test_second_context_on_same_directory_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let first = open_lenient(temp_dir.path());

    let second = LibraryContext::with_config(
        temp_dir.path(),
        Config::default(),
        Arc::new(RecordingNotifier::default()),
    );
    let err = second.err().expect("second context should be refused");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Locked(_))));

    drop(first);
    assert!(LibraryContext::with_config(
        temp_dir.path(),
        Config::default(),
        Arc::new(RecordingNotifier::default()),
    )
    .is_ok());
}
