//! comicshelf operator CLI.
//!
//! Every invocation loads the configuration, opens the key-value store,
//! restores the saved session, runs one command, prints its result as JSON
//! on stdout and saves the session again.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use comicshelf_common::{AppError, AppResult, Config};
use comicshelf_core::{ModerationDecision, Session};
use comicshelf_db::entities::{TicketCategory, TicketPriority, TicketStatus};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::App;

/// Comic site administration from the command line
#[derive(Debug, Parser)]
#[command(name = "comicshelf", version, about = "Comic site administration from the command line")]
struct Cli {
    /// Configuration file; defaults to config/default.toml plus environment overrides
    #[arg(long, short, env = "COMICSHELF_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in with an email or username
    Login { identifier: String, password: String },
    /// Sign out
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// Create an account and sign in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Gallery and moderation
    #[command(subcommand)]
    Comics(ComicsCommand),
    /// Support desk
    #[command(subcommand)]
    Tickets(TicketsCommand),
    /// Site reviews
    #[command(subcommand)]
    Reviews(ReviewsCommand),
    /// Admin dashboard figures
    Stats,
    /// Count a visit
    Visit,
}

#[derive(Debug, Subcommand)]
enum ComicsCommand {
    /// Published comics
    List,
    /// Every comic (admin)
    All,
    /// Comics awaiting moderation (admin)
    Pending,
    /// Your own submissions
    Mine,
    /// One comic
    Show { id: String },
    /// Submit a comic
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Inline-encoded page, e.g. a data URL
        #[arg(long = "image")]
        images: Vec<String>,
        /// Image file to inline as a page
        #[arg(long = "image-file")]
        image_files: Vec<PathBuf>,
    },
    /// Edit a comic's content (owner or admin); status is unchanged
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Replacement page; pages are replaced as a whole
        #[arg(long = "image")]
        images: Vec<String>,
        #[arg(long = "image-file")]
        image_files: Vec<PathBuf>,
    },
    /// Publish or reject a comic (admin)
    Moderate { id: String, decision: Decision },
    /// Delete a comic (owner or admin)
    Delete { id: String },
    /// Authors with the most published comics
    Top {
        #[arg(long, default_value_t = comicshelf_core::DEFAULT_TOP_AUTHORS)]
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Decision {
    Publish,
    Reject,
}

impl From<Decision> for ModerationDecision {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Publish => Self::Publish,
            Decision::Reject => Self::Reject,
        }
    }
}

#[derive(Debug, Subcommand)]
enum TicketsCommand {
    /// Every ticket, optionally filtered (admin)
    List {
        #[arg(long)]
        status: Option<TicketStatus>,
        #[arg(long)]
        priority: Option<TicketPriority>,
        /// Substring of the subject or username
        #[arg(long)]
        query: Option<String>,
    },
    /// Your own tickets
    Mine,
    /// One ticket with its responses (owner or admin)
    Show { id: String },
    /// Open a ticket; signed-out callers must give --name and --email
    Create {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        #[arg(long, default_value = "other")]
        category: TicketCategory,
        #[arg(long, default_value = "medium")]
        priority: TicketPriority,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Change a ticket's status (admin)
    Status { id: String, status: TicketStatus },
    /// Reply to a ticket (owner or admin)
    Respond { id: String, message: String },
    /// Delete a ticket (admin)
    Delete { id: String },
    /// Ticket counts (admin)
    Stats,
}

#[derive(Debug, Subcommand)]
enum ReviewsCommand {
    /// Leave a review
    Add {
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comment: String,
    },
    /// Newest reviews
    Recent {
        #[arg(long, default_value_t = comicshelf_core::DEFAULT_RECENT_REVIEWS)]
        limit: usize,
    },
}

async fn run(cli: Cli) -> AppResult<serde_json::Value> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    let store = comicshelf_db::open_store(&config).await?;
    let app = App::new(store.clone(), &config);
    let mut session = Session::load(&store).await;

    let output = app.execute(&mut session, cli.command).await?;

    if let Err(e) = session.save(&store).await {
        error!(error = %e, "Failed to save session");
    }
    Ok(output)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comicshelf=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{output:#}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(e: &AppError) {
    if e.is_server_error() {
        error!(error = %e, "Command failed");
    }
    let body = serde_json::json!({ "error": e.error_code(), "message": e.to_string() });
    eprintln!("{body:#}");
}
