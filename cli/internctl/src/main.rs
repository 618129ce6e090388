//! internctl: admin and advisor console for the internship tracker
//!
//! Thin veneer over the `intern-api` client. Each subcommand maps onto
//! one backend call; listings print as JSON on stdout so they pipe into
//! `jq`, confirmations and logs go to stderr. The session's token pair
//! persists in the credentials file between runs, so one `login` serves
//! every following command until `logout`.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::Password;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use common::Secret;
use intern_api::{
    AdvisorProfile, CredentialStore, MessageAudience, ReviewDecision, Session, UniversityId,
};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "internctl", about = "Console for the university internship tracker", version)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session
    Login {
        username: String,
        /// Taken from INTERN_PASSWORD or prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create a new advisor account
    Register {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        phone_number: String,
        /// Taken from INTERN_PASSWORD or prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Invalidate the session on the backend and clear it locally
    Logout,
    /// Exchange the stored refresh token for a new access token
    Refresh,
    /// List every student (admin scope)
    Students,
    /// List every advisor (admin scope)
    Advisors,
    /// Assign an advisor to a student (admin scope)
    Assign {
        /// University id, compact or slash-delimited
        id: String,
        /// Backend username of the advisor, sent verbatim
        advisor_username: String,
    },
    /// List students assigned to the signed-in advisor
    MyStudents,
    /// Show one assigned student's full record
    Student {
        /// University id, compact or slash-delimited
        id: String,
    },
    /// Approve a student's pending offer letter
    ApproveOffer { id: String },
    /// Reject a student's pending offer letter
    RejectOffer {
        id: String,
        /// Written feedback for the student; without it the letter is
        /// only marked rejected
        #[arg(long)]
        feedback: Option<String>,
    },
    /// Approve one internship report
    ApproveReport { id: String, report_id: i64 },
    /// Reject one internship report with feedback
    RejectReport {
        id: String,
        report_id: i64,
        #[arg(long)]
        feedback: String,
    },
    /// Send an announcement to students through the messaging bot
    SendMessage {
        /// Message text, at most 4096 characters
        text: String,
        /// Send to every student
        #[arg(long, conflicts_with = "to")]
        broadcast: bool,
        /// University id of a recipient; repeat for several
        #[arg(long = "to", value_name = "ID")]
        to: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = Config::resolve_path(cli.config.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    debug!(
        base_url = %config.base_url,
        credentials = %config.credentials_path.display(),
        "configuration loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .context("building HTTP client")?;
    let store = Arc::new(CredentialStore::load(config.credentials_path.clone()).await);
    let session = Session::new(http, config.base_url.clone(), store);

    run(cli.command, &session).await
}

async fn run(command: Command, session: &Session) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let password = resolve_password(password)?;
            session.login(&username, password.expose()).await?;
            eprintln!("logged in as {username}");
        }
        Command::Register {
            username,
            email,
            first_name,
            last_name,
            phone_number,
            password,
        } => {
            let password = resolve_password(password)?;
            let profile = AdvisorProfile {
                username: username.clone(),
                password: password.expose().clone(),
                email,
                first_name,
                last_name,
                phone_number,
            };
            session.register(&profile).await?;
            eprintln!("registered advisor account {username}; sign in with `internctl login`");
        }
        Command::Logout => {
            let result = session.logout().await;
            eprintln!("local session cleared");
            result.context("backend did not acknowledge the logout")?;
        }
        Command::Refresh => {
            session.refresh().await?;
            eprintln!("session refreshed");
        }
        Command::Students => print_json(&session.list_students().await?)?,
        Command::Advisors => print_json(&session.list_advisors().await?)?,
        Command::Assign {
            id,
            advisor_username,
        } => {
            let receipt = session
                .assign_advisor(&parse_id(&id)?, &advisor_username)
                .await?;
            eprintln!("{}", receipt.message);
        }
        Command::MyStudents => print_json(&session.assigned_students().await?)?,
        Command::Student { id } => print_json(&session.student_detail(&parse_id(&id)?).await?)?,
        Command::ApproveOffer { id } => {
            let receipt = session
                .decide_offer_letter(&parse_id(&id)?, ReviewDecision::Approved)
                .await?;
            eprintln!("{}", receipt.message);
        }
        Command::RejectOffer { id, feedback } => {
            let id = parse_id(&id)?;
            match feedback {
                Some(feedback) => {
                    session.reject_offer_letter(&id, &feedback).await?;
                    eprintln!("offer letter rejected with feedback");
                }
                None => {
                    let receipt = session
                        .decide_offer_letter(&id, ReviewDecision::Rejected)
                        .await?;
                    eprintln!("{}", receipt.message);
                }
            }
        }
        Command::ApproveReport { id, report_id } => {
            session.approve_report(&parse_id(&id)?, report_id).await?;
            eprintln!("report {report_id} approved");
        }
        Command::RejectReport {
            id,
            report_id,
            feedback,
        } => {
            session
                .reject_report(&parse_id(&id)?, report_id, &feedback)
                .await?;
            eprintln!("report {report_id} rejected");
        }
        Command::SendMessage {
            text,
            broadcast,
            to,
        } => {
            let audience = resolve_audience(broadcast, &to)?;
            session.send_message(&text, &audience).await?;
            eprintln!("message sent");
        }
    }
    Ok(())
}

fn parse_id(raw: &str) -> Result<UniversityId> {
    UniversityId::parse(raw).with_context(|| format!("invalid university id {raw:?}"))
}

fn resolve_audience(broadcast: bool, to: &[String]) -> Result<MessageAudience> {
    if broadcast {
        return Ok(MessageAudience::Everyone);
    }
    if to.is_empty() {
        anyhow::bail!("pass --broadcast or at least one --to <ID>");
    }
    let ids = to.iter().map(|raw| parse_id(raw)).collect::<Result<Vec<_>>>()?;
    Ok(MessageAudience::Students(ids))
}

/// CLI flag, then INTERN_PASSWORD, then an interactive prompt that
/// never echoes what is typed.
fn resolve_password(flag: Option<String>) -> Result<Secret<String>> {
    if let Some(p) = flag {
        return Ok(Secret::new(p));
    }
    if let Ok(p) = std::env::var("INTERN_PASSWORD") {
        return Ok(Secret::new(p));
    }
    let typed = Password::new("password:")
        .without_confirmation()
        .prompt()
        .context("reading password from the terminal")?;
    Ok(Secret::new(typed))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
