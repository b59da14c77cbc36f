// contact-guard: the submission pipeline behind a portfolio contact form
//
// This is the library root. The security module holds the guard itself
// (sanitize, validate, rate limit, log); form wires it to an email relay.

pub mod clock;
pub mod config;
pub mod form;
pub mod relay;
pub mod security;
