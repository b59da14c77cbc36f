use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use contact_guard::clock::{Clock, SystemClock};
use contact_guard::config::Config;
use contact_guard::form::{ContactForm, FormField, SubmitOutcome};
use contact_guard::relay::emailjs::EmailJsRelay;
use contact_guard::security::events::{SecurityLogger, TracingSink, DEFAULT_USER_AGENT};
use contact_guard::security::rate_limit::{RateLimiter, SubmissionLedger};
use contact_guard::security::sanitize::sanitize;
use contact_guard::security::validate::{validate_form_data, FormRecord};

/// contact-guard: sanitize, validate and send portfolio contact messages.
#[derive(Parser)]
#[command(name = "contact-guard", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Strip markup from a piece of text
    Sanitize {
        /// The text to sanitize
        text: String,
    },

    /// Check a message against the form's validation rules
    Validate(MessageArgs),

    /// Validate, rate-limit and send a message through EmailJS
    Send {
        #[command(flatten)]
        message: MessageArgs,

        /// Override the destination address
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Args)]
struct MessageArgs {
    /// Sender name
    #[arg(long, default_value = "")]
    name: String,

    /// Sender email address
    #[arg(long, default_value = "")]
    email: String,

    /// Subject line (optional)
    #[arg(long, default_value = "")]
    subject: String,

    /// Message body
    #[arg(long, default_value = "")]
    message: String,
}

impl MessageArgs {
    fn to_record(&self) -> FormRecord {
        FormRecord {
            name: sanitize(&self.name),
            email: sanitize(&self.email),
            subject: sanitize(&self.subject),
            message: sanitize(&self.message),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("contact_guard=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sanitize { text } => {
            println!("{}", sanitize(&text));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate(args) => {
            let result = validate_form_data(&args.to_record());
            if result.is_valid {
                println!("{}", "Valid".green().bold());
                Ok(ExitCode::SUCCESS)
            } else {
                println!("{}", "Invalid:".red().bold());
                for error in &result.errors {
                    println!("  - {error}");
                }
                Ok(ExitCode::FAILURE)
            }
        }

        Commands::Send { message, to } => {
            let mut config = Config::load()?;
            config.require_relay()?;
            if let Some(to) = to {
                config.to_email = to;
            }

            info!(
                service_id = %config.service_id,
                template_id = %config.template_id,
                "Sending contact message"
            );

            let clock: Arc<dyn Clock> = Arc::new(SystemClock);
            let relay = Arc::new(EmailJsRelay::from_config(&config)?);
            let limiter = RateLimiter::new(Arc::new(SubmissionLedger::new()), clock.clone());
            let logger = SecurityLogger::new(Arc::new(TracingSink), clock.clone(), DEFAULT_USER_AGENT);
            let form = ContactForm::new(relay, limiter, logger, clock, config.to_email.clone());

            form.update_field(FormField::Name, &message.name);
            form.update_field(FormField::Email, &message.email);
            form.update_field(FormField::Subject, &message.subject);
            form.update_field(FormField::Message, &message.message);

            let outcome = form.submit().await;
            let text = form.user_message(&outcome);
            match outcome {
                SubmitOutcome::Sent => {
                    println!("{}", text.green().bold());
                    Ok(ExitCode::SUCCESS)
                }
                SubmitOutcome::Failed { ref error } => {
                    println!("{}", text.red().bold());
                    println!("{}", error.dimmed());
                    Ok(ExitCode::FAILURE)
                }
                _ => {
                    println!("{}", text.yellow());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
