// Submission guard — everything that stands between raw form input and the
// outbound relay call.
//
// sanitize: strip markup from free text
// validate: required fields, email shape, length limits
// rate_limit: per-email submission budget over an injected ledger
// events: structured security event logging through an injected sink

pub mod events;
pub mod rate_limit;
pub mod sanitize;
pub mod validate;

pub use events::{EventSink, MemorySink, SecurityEvent, SecurityEventKind, SecurityLogger, TracingSink};
pub use rate_limit::{RateLimiter, SubmissionLedger};
pub use sanitize::sanitize;
pub use validate::{is_valid_email, validate_form_data, FormRecord, ValidationResult};
