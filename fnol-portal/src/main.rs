use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use fnol_flow::{FnolPortal, FormSnapshot, OversizeHandler, SessionConfig, SessionEvent};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// First Notice of Loss intake: opens a timed session, serializes a claim
/// snapshot into an email body and prints the resulting mailto: link.
#[derive(Parser, Debug)]
#[command(name = "fnol-portal", version, about)]
struct Args {
    /// Path to the claim snapshot JSON file
    claim: PathBuf,

    /// Claims mailbox the mailto: link targets
    #[arg(long, default_value = "claims@example.com")]
    mailbox: String,

    /// Session time-to-live in seconds
    #[arg(long, default_value_t = 1800)]
    ttl_secs: u64,

    /// Reminder lead time in seconds before expiry
    #[arg(long, default_value_t = 300)]
    remind_secs: u64,

    /// Hold the session open this long before submitting (exercises the
    /// reminder/expiry notifications)
    #[arg(long, default_value_t = 0)]
    linger_secs: u64,
}

/// Initialize structured tracing based on environment variables
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fnol_portal=debug,fnol_flow=debug".into());

    match log_format.as_str() {
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

/// Stand-in for the "email too large" dialog: warns and lets the user know
/// the body has to travel via the clipboard.
struct ClipboardNotice;

#[async_trait]
impl OversizeHandler for ClipboardNotice {
    async fn notify(&self, clipped_body: &str) {
        warn!(
            body_len = clipped_body.len(),
            "email body exceeds the mailto limit; paste the printed body into the email"
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.claim)
        .with_context(|| format!("reading claim snapshot {}", args.claim.display()))?;
    let snapshot: FormSnapshot = serde_json::from_str(&raw).context("parsing claim snapshot")?;

    let config = SessionConfig {
        ttl: Duration::from_secs(args.ttl_secs),
        reminder_lead: Duration::from_secs(args.remind_secs),
    };
    let portal = FnolPortal::new(args.mailbox.clone(), config)?;

    let mut events = portal.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::ReminderDue { key } => {
                    warn!(session = %key, "session expires soon")
                }
                SessionEvent::Expired { key } => {
                    warn!(session = %key, "session expired; restart to file the claim")
                }
            }
        }
    });

    let key = portal.start().await?;
    info!(session = %key, "session started");

    if args.linger_secs > 0 {
        tokio::time::sleep(Duration::from_secs(args.linger_secs)).await;
    }

    let submission = portal.submit(&key, snapshot, &ClipboardNotice).await?;

    println!("Reference: {}", submission.fnol_id);
    println!();
    println!("Mailto link:");
    println!("{}", submission.email_link.url);
    println!();
    if submission.email_link.truncated {
        println!("The body did not fit in the link; paste this into the email:");
        println!();
    }
    println!("{}", submission.email_link.body);

    Ok(())
}
