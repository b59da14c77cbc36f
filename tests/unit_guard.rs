// Unit tests for the submission guard's pure pieces.
//
// Tests sanitize output, validate_form_data error lists (exact order), and
// the rate limiter's window arithmetic driven by a manual clock.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use contact_guard::clock::{Clock, ManualClock};
use contact_guard::security::rate_limit::{RateLimiter, SubmissionLedger};
use contact_guard::security::sanitize::sanitize;
use contact_guard::security::validate::{is_valid_email, validate_form_data, FormRecord};

fn record(name: &str, email: &str, subject: &str, message: &str) -> FormRecord {
    FormRecord {
        name: name.to_string(),
        email: email.to_string(),
        subject: subject.to_string(),
        message: message.to_string(),
    }
}

// ============================================================
// sanitize
// ============================================================

#[test]
fn sanitize_strips_script_keeps_text() {
    assert_eq!(sanitize("<script>alert(1)</script>hello"), "hello");
}

#[test]
fn sanitize_empty_is_empty() {
    assert_eq!(sanitize(""), "");
}

#[test]
fn sanitize_is_stable_on_plain_text() {
    for text in ["hello", "Ünïcödé ✓ text", "email me at a@b.com", "1 < 2 > 0"] {
        let once = sanitize(text);
        assert_eq!(once, text);
        assert_eq!(sanitize(&once), once);
    }
}

#[test]
fn sanitize_is_stable_on_its_own_output() {
    let inputs = [
        "<div onclick=\"x()\">click <em>me</em></div>",
        "<scr<script>ipt>alert(1)</script>",
        "<!-- a --><p>b</p><style>c</style>",
    ];
    for input in inputs {
        let once = sanitize(input);
        assert_eq!(sanitize(&once), once, "not stable for {input:?}");
        assert!(!once.contains("<script"), "script survived in {once:?}");
    }
}

// ============================================================
// is_valid_email
// ============================================================

#[test]
fn email_examples() {
    assert!(is_valid_email("a@b.com"));
    assert!(!is_valid_email("not-an-email"));
    assert!(!is_valid_email("a@b"));
    assert!(is_valid_email("a@b.c"));
}

#[test]
fn email_rejects_whitespace_and_missing_parts() {
    assert!(!is_valid_email(" a@b.com"));
    assert!(!is_valid_email("a@b.com "));
    assert!(!is_valid_email("@b.com"));
    assert!(!is_valid_email("a@.com"));
    assert!(!is_valid_email("a@b."));
    assert!(!is_valid_email("a\u{A0}b@c.com"));
    assert!(!is_valid_email("a@b.com\u{2003}"));
    assert!(!is_valid_email("a\u{3000}@b.com"));
    assert!(!is_valid_email("a@b\u{2028}.com"));
}

#[test]
fn nbsp_padded_email_fails_format_check() {
    // trim() already strips the NBSP, so only the format check can catch it.
    let result = validate_form_data(&record("Ada", "\u{A0}a@b.co", "", "hi"));
    assert!(!result.is_valid);
    assert_eq!(result.errors, vec!["Please enter a valid email address"]);
}

// ============================================================
// validate_form_data — golden error lists
// ============================================================

#[test]
fn all_empty_reports_three_required_errors() {
    let result = validate_form_data(&record("", "", "", ""));
    assert!(!result.is_valid);
    assert_eq!(
        result.errors,
        vec!["Name is required", "Email is required", "Message is required"]
    );
}

#[test]
fn whitespace_only_counts_as_blank() {
    let result = validate_form_data(&record("   ", "a@b.com", "", "\n\t"));
    assert_eq!(result.errors, vec!["Name is required", "Message is required"]);
}

#[test]
fn long_name_reports_only_length_error() {
    let result = validate_form_data(&record(&"X".repeat(101), "a@b.com", "", "hi"));
    assert!(!result.is_valid);
    assert_eq!(result.errors, vec!["Name must be less than 100 characters"]);
}

#[test]
fn name_at_limit_is_valid() {
    let result = validate_form_data(&record(&"X".repeat(100), "a@b.com", "", "hi"));
    assert!(result.is_valid);
    assert!(result.errors.is_empty());
}

#[test]
fn long_subject_with_otherwise_valid_data() {
    let result = validate_form_data(&record("Ada", "a@b.com", &"s".repeat(201), "hi"));
    assert_eq!(result.errors, vec!["Subject must be less than 200 characters"]);

    let ok = validate_form_data(&record("Ada", "a@b.com", &"s".repeat(200), "hi"));
    assert!(ok.is_valid);
}

#[test]
fn bad_email_reports_format_error() {
    let result = validate_form_data(&record("Ada", "not-an-email", "", "hi"));
    assert_eq!(result.errors, vec!["Please enter a valid email address"]);
}

#[test]
fn every_error_in_fixed_order() {
    // Whitespace-only email is blank (required) and non-empty (format).
    let result = validate_form_data(&record(
        &" ".repeat(101),
        " ",
        &"s".repeat(201),
        &" ".repeat(1001),
    ));
    assert_eq!(
        result.errors,
        vec![
            "Name is required",
            "Email is required",
            "Message is required",
            "Please enter a valid email address",
            "Name must be less than 100 characters",
            "Subject must be less than 200 characters",
            "Message must be less than 1000 characters",
        ]
    );
}

#[test]
fn long_message_alongside_bad_email() {
    let result = validate_form_data(&record("Ada", "ada@", "", &"m".repeat(1001)));
    assert_eq!(
        result.errors,
        vec![
            "Please enter a valid email address",
            "Message must be less than 1000 characters",
        ]
    );
}

// ============================================================
// RateLimiter — window arithmetic
// ============================================================

fn limiter_at_noon() -> (RateLimiter, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap());
    let limiter = RateLimiter::new(Arc::new(SubmissionLedger::new()), Arc::new(clock.clone()));
    (limiter, clock)
}

#[test]
fn three_allowed_fourth_rejected_then_recovers() {
    let (limiter, clock) = limiter_at_noon();

    for _ in 0..3 {
        assert!(limiter.check_rate_limit("x@y.com"));
        clock.advance(Duration::minutes(10));
    }
    assert!(!limiter.check_rate_limit("x@y.com"));

    // The last of the three stamps was taken at 12:20.
    clock.set(Utc.with_ymd_and_hms(2026, 6, 1, 13, 20, 1).unwrap());
    assert!(limiter.check_rate_limit("x@y.com"));
}

#[test]
fn partial_expiry_frees_one_slot() {
    let (limiter, clock) = limiter_at_noon();

    assert!(limiter.check_rate_limit("x@y.com")); // 12:00
    clock.advance(Duration::minutes(30));
    assert!(limiter.check_rate_limit("x@y.com")); // 12:30
    assert!(limiter.check_rate_limit("x@y.com")); // 12:30

    clock.advance(Duration::minutes(31)); // 13:01, 12:00 has expired
    assert!(limiter.check_rate_limit("x@y.com"));
    assert!(!limiter.check_rate_limit("x@y.com"));
    assert_eq!(limiter.ledger().timestamps("x@y.com").len(), 3);
}

#[test]
fn identifiers_are_independent() {
    let (limiter, _clock) = limiter_at_noon();
    for _ in 0..3 {
        assert!(limiter.check_rate_limit("x@y.com"));
    }
    assert!(!limiter.check_rate_limit("x@y.com"));

    // A different address gets its own budget, even one differing only by case.
    assert!(limiter.check_rate_limit("X@y.com"));
    assert!(limiter.check_rate_limit("z@y.com"));
    assert_eq!(limiter.ledger().len(), 3);
}

#[test]
fn stale_entries_linger_until_next_check() {
    let (limiter, clock) = limiter_at_noon();
    assert!(limiter.check_rate_limit("x@y.com"));
    assert!(limiter.check_rate_limit("x@y.com"));

    clock.advance(Duration::hours(2));
    // No sweep: both old stamps are still there.
    assert_eq!(limiter.ledger().timestamps("x@y.com").len(), 2);

    assert!(limiter.check_rate_limit("x@y.com"));
    let stamps = limiter.ledger().timestamps("x@y.com");
    assert_eq!(stamps, vec![clock.now_millis()]);
}

#[test]
fn separate_ledgers_are_isolated() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap());
    let a = RateLimiter::new(Arc::new(SubmissionLedger::new()), Arc::new(clock.clone()));
    let b = RateLimiter::new(Arc::new(SubmissionLedger::new()), Arc::new(clock.clone()));

    for _ in 0..3 {
        assert!(a.check_rate_limit("x@y.com"));
    }
    assert!(!a.check_rate_limit("x@y.com"));
    assert!(b.check_rate_limit("x@y.com"));
}

#[test]
fn shared_ledger_is_shared_budget() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap());
    let ledger = Arc::new(SubmissionLedger::new());
    let a = RateLimiter::new(ledger.clone(), Arc::new(clock.clone()));
    let b = RateLimiter::new(ledger.clone(), Arc::new(clock));

    assert!(a.check_rate_limit("x@y.com"));
    assert!(b.check_rate_limit("x@y.com"));
    assert!(a.check_rate_limit("x@y.com"));
    assert!(!b.check_rate_limit("x@y.com"));
    assert_eq!(ledger.timestamps("x@y.com").len(), 3);
}
