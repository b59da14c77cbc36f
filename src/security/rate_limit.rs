// Per-identifier submission rate limiting.
//
// Each identifier (the submitter's email address) may submit at most
// `max_submissions` times per `window`. Timestamps live in a
// `SubmissionLedger` that the caller owns and injects, so each form (or
// each test) can have its own isolated history.
//
// Eviction is lazy: stale timestamps are filtered out inside every check,
// never on a timer. The key is whatever the user typed into the email field,
// so changing the address resets the budget. That is a known property of
// client-side limiting, not something this module tries to fix.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Duration;
use tracing::debug;

use crate::clock::Clock;

/// Submissions allowed per identifier per window.
pub const MAX_SUBMISSIONS_PER_WINDOW: usize = 3;

/// Length of the rate-limit window.
pub fn default_window() -> Duration {
    Duration::hours(1)
}

/// In-memory map from identifier to submission timestamps (ms since epoch).
///
/// Starts empty and is never persisted; dropping it is the equivalent of a
/// page reload.
#[derive(Debug, Default)]
pub struct SubmissionLedger {
    entries: Mutex<HashMap<String, Vec<i64>>>,
}

impl SubmissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded timestamps for `identifier`, oldest first. Includes stale
    /// entries that no check has filtered out yet.
    pub fn timestamps(&self, identifier: &str) -> Vec<i64> {
        self.lock().get(identifier).cloned().unwrap_or_default()
    }

    /// Number of identifiers with recorded history.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<i64>>> {
        // Every write is a single insert, so a poisoned map is still whole.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Fixed-count, lazily evicted rate limiter over a shared ledger.
pub struct RateLimiter {
    ledger: Arc<SubmissionLedger>,
    clock: Arc<dyn Clock>,
    max_submissions: usize,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter allowing 3 submissions per hour per identifier.
    pub fn new(ledger: Arc<SubmissionLedger>, clock: Arc<dyn Clock>) -> Self {
        Self::with_limits(ledger, clock, MAX_SUBMISSIONS_PER_WINDOW, default_window())
    }

    /// Create a limiter with a custom budget and window.
    pub fn with_limits(
        ledger: Arc<SubmissionLedger>,
        clock: Arc<dyn Clock>,
        max_submissions: usize,
        window: Duration,
    ) -> Self {
        Self {
            ledger,
            clock,
            max_submissions,
            window,
        }
    }

    /// The ledger this limiter writes to.
    pub fn ledger(&self) -> &Arc<SubmissionLedger> {
        &self.ledger
    }

    /// Record a submission attempt for `identifier` if it is within budget.
    ///
    /// Returns `false` when the identifier already has `max_submissions`
    /// timestamps strictly newer than `now - window`. A rejected attempt
    /// leaves the ledger exactly as it was.
    pub fn check_rate_limit(&self, identifier: &str) -> bool {
        let now = self.clock.now_millis();
        let cutoff = now - self.window.num_milliseconds();

        let mut entries = self.ledger.lock();
        let mut recent = entries
            .get(identifier)
            .map(|stamps| stamps.iter().copied().filter(|&t| t > cutoff).collect::<Vec<_>>())
            .unwrap_or_default();

        if recent.len() >= self.max_submissions {
            debug!(
                recent = recent.len(),
                max = self.max_submissions,
                "Rate limit reached"
            );
            return false;
        }

        recent.push(now);
        entries.insert(identifier.to_string(), recent);
        true
    }
}
