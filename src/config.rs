use std::env;

use anyhow::Result;

/// Public key the site ships with when `EMAILJS_PUBLIC_KEY` is unset.
pub const DEFAULT_PUBLIC_KEY: &str = "hJ4kUq0vX2pWmN7rT";
/// Service id used when `EMAILJS_SERVICE_ID` is unset.
pub const DEFAULT_SERVICE_ID: &str = "service_portfolio";
/// Template id used when `EMAILJS_TEMPLATE_ID` is unset.
pub const DEFAULT_TEMPLATE_ID: &str = "template_contact";
/// Where contact messages are delivered.
pub const DEFAULT_TO_EMAIL: &str = "hello@portfolio.dev";
/// EmailJS REST send endpoint.
pub const DEFAULT_API_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Relay configuration loaded from environment variables.
///
/// The three relay identifiers are public by nature (they ship in the page),
/// so embedded defaults are fine. The .env file is loaded by the binary at
/// startup via dotenvy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// EmailJS public key (EMAILJS_PUBLIC_KEY)
    pub public_key: String,
    /// EmailJS service id (EMAILJS_SERVICE_ID)
    pub service_id: String,
    /// EmailJS template id (EMAILJS_TEMPLATE_ID)
    pub template_id: String,
    /// Destination address for every contact message
    pub to_email: String,
    /// Relay endpoint; only overridden programmatically
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            public_key: DEFAULT_PUBLIC_KEY.to_string(),
            service_id: DEFAULT_SERVICE_ID.to_string(),
            template_id: DEFAULT_TEMPLATE_ID.to_string(),
            to_email: DEFAULT_TO_EMAIL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// embedded defaults for anything unset.
    pub fn load() -> Result<Self> {
        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Build a config from an arbitrary key lookup. `load` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            public_key: lookup("EMAILJS_PUBLIC_KEY").unwrap_or(defaults.public_key),
            service_id: lookup("EMAILJS_SERVICE_ID").unwrap_or(defaults.service_id),
            template_id: lookup("EMAILJS_TEMPLATE_ID").unwrap_or(defaults.template_id),
            to_email: defaults.to_email,
            api_url: defaults.api_url,
        }
    }

    /// Check that every relay identifier is non-empty.
    /// Call this before sending anything through the relay.
    pub fn require_relay(&self) -> Result<()> {
        for (var, value) in [
            ("EMAILJS_PUBLIC_KEY", &self.public_key),
            ("EMAILJS_SERVICE_ID", &self.service_id),
            ("EMAILJS_TEMPLATE_ID", &self.template_id),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!(
                    "{var} is set but empty. Unset it to use the built-in default,\n\
                     or put the real value in your .env file."
                );
            }
        }
        Ok(())
    }
}
