// Contact form orchestration.
//
// ContactForm owns the form record and drives a submission through the
// guard: validate -> rate limit -> re-sanitize -> relay send -> log outcome.
// Every failure mode is recovered here and reported as a SubmitOutcome; none
// of them escapes as an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::json;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::relay::traits::{EmailRelay, RelayPayload};
use crate::security::events::{details, SecurityEventKind, SecurityLogger};
use crate::security::rate_limit::RateLimiter;
use crate::security::sanitize::sanitize;
use crate::security::validate::{validate_form_data, FormRecord, ValidationResult};

/// How long the success indicator stays up after a send.
pub fn success_display() -> Duration {
    Duration::seconds(3)
}

/// User-facing text for a rate-limited submission.
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";
/// User-facing text for a successful submission.
pub const SENT_MESSAGE: &str = "Message sent successfully! I'll get back to you soon.";
/// User-facing text when a send is already in flight.
pub const IN_PROGRESS_MESSAGE: &str = "Your message is already being sent.";

/// One of the form's input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Subject,
    Message,
}

/// What happened to a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing else ran.
    Invalid(ValidationResult),
    /// The submitter's email is over its budget; nothing was sent.
    RateLimited,
    /// The relay accepted the message and the form was cleared.
    Sent,
    /// The relay failed. `error` is the transport's own description.
    Failed { error: String },
    /// Another submit on this form is still waiting on the relay.
    InProgress,
}

impl SubmitOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SubmitOutcome::Sent)
    }
}

/// Holds the loading flag for the duration of one submit.
struct SendingGuard<'a>(&'a AtomicBool);

impl<'a> SendingGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A single contact form instance and its submission pipeline.
pub struct ContactForm {
    record: Mutex<FormRecord>,
    sending: AtomicBool,
    success_until: Mutex<Option<DateTime<Utc>>>,
    limiter: RateLimiter,
    logger: SecurityLogger,
    relay: Arc<dyn EmailRelay>,
    clock: Arc<dyn Clock>,
    to_email: String,
}

impl ContactForm {
    pub fn new(
        relay: Arc<dyn EmailRelay>,
        limiter: RateLimiter,
        logger: SecurityLogger,
        clock: Arc<dyn Clock>,
        to_email: impl Into<String>,
    ) -> Self {
        Self {
            record: Mutex::new(FormRecord::default()),
            sending: AtomicBool::new(false),
            success_until: Mutex::new(None),
            limiter,
            logger,
            relay,
            clock,
            to_email: to_email.into(),
        }
    }

    /// Replace one field with the sanitized form of `value`.
    pub fn update_field(&self, field: FormField, value: &str) {
        let clean = sanitize(value);
        let mut record = lock(&self.record);
        match field {
            FormField::Name => record.name = clean,
            FormField::Email => record.email = clean,
            FormField::Subject => record.subject = clean,
            FormField::Message => record.message = clean,
        }
    }

    /// Current contents of the form.
    pub fn record(&self) -> FormRecord {
        lock(&self.record).clone()
    }

    /// True while a relay send is pending.
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// True for three seconds after a successful send.
    pub fn is_success_visible(&self) -> bool {
        lock(&self.success_until).is_some_and(|until| self.clock.now() < until)
    }

    /// The rate limiter guarding this form.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run the submission pipeline on the current record.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(_sending) = SendingGuard::claim(&self.sending) else {
            return SubmitOutcome::InProgress;
        };

        let record = self.record();

        let validation = validate_form_data(&record);
        if !validation.is_valid {
            return SubmitOutcome::Invalid(validation);
        }

        if !self.limiter.check_rate_limit(&record.email) {
            warn!("Contact form submission rate limited");
            self.logger.log(
                SecurityEventKind::RateLimitExceeded,
                details([("email", json!(record.email))]),
            );
            return SubmitOutcome::RateLimited;
        }

        // The record is already sanitized on input; run it again in case
        // anything slipped in between intake and send.
        let payload = RelayPayload {
            from_name: sanitize(&record.name),
            from_email: sanitize(&record.email),
            subject: sanitize(&record.subject),
            message: sanitize(&record.message),
            to_email: self.to_email.clone(),
        };

        match self.relay.send(&payload).await {
            Ok(()) => {
                let now = self.clock.now();
                *lock(&self.record) = FormRecord::default();
                *lock(&self.success_until) = Some(now + success_display());

                info!("Contact message sent");
                self.logger.log(
                    SecurityEventKind::EmailSent,
                    details([
                        ("from", json!(payload.from_email)),
                        (
                            "timestamp",
                            json!(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
                        ),
                    ]),
                );
                SubmitOutcome::Sent
            }
            Err(e) => {
                let error = format!("{e:#}");
                warn!(error = %error, "Contact message send failed");
                self.logger.log(
                    SecurityEventKind::EmailSendFailed,
                    details([("from", json!(payload.from_email)), ("error", json!(error))]),
                );
                SubmitOutcome::Failed { error }
            }
        }
    }

    /// The text to show the user for `outcome`.
    pub fn user_message(&self, outcome: &SubmitOutcome) -> String {
        match outcome {
            SubmitOutcome::Invalid(result) => result.joined("\n"),
            SubmitOutcome::RateLimited => RATE_LIMITED_MESSAGE.to_string(),
            SubmitOutcome::Sent => SENT_MESSAGE.to_string(),
            SubmitOutcome::Failed { .. } => format!(
                "Failed to send message. Please try again or contact me directly at {}.",
                self.to_email
            ),
            SubmitOutcome::InProgress => IN_PROGRESS_MESSAGE.to_string(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
