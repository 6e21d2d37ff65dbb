//! Joins the waitlist from the command line against a running server.
//!
//! ```bash
//! waitlist-join --first-name Ada --email ada@example.com
//! WAITLIST_URL=https://waitlist.example.com waitlist-join -f Ada -e ada@example.com --wait
//! ```

use clap::Parser;
use std::{process::ExitCode, sync::Arc, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use waitlist::config::{resolve_reset_after, resolve_waitlist_url};
use waitlist::{CounterSync, Field, HttpStore, SettledSignal, Settlement, SignupController};

const COUNTER_WAIT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "waitlist-join")]
#[command(version, about = "Join the early-access waitlist")]
struct Cli {
    /// First name to register
    #[arg(short, long)]
    first_name: String,

    /// Email address to register
    #[arg(short, long)]
    email: String,

    /// Waitlist server base URL (defaults to $WAITLIST_URL)
    #[arg(long)]
    url: Option<String>,

    /// Stay until the form would reopen
    #[arg(long)]
    wait: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let url = cli.url.unwrap_or_else(resolve_waitlist_url);
    let store = Arc::new(HttpStore::new(url));

    let settled = SettledSignal::new();
    let counter = Arc::new(CounterSync::new(Arc::clone(&store)));
    let counter_task = Arc::clone(&counter).mount(settled.subscribe());

    let mut form = SignupController::new(Arc::clone(&store), settled.clone())
        .with_reset_after(resolve_reset_after());
    form.update_field(Field::FirstName, cli.first_name);
    form.update_field(Field::Email, cli.email);

    let code = match form.submit().await {
        Some(Settlement::Joined) => {
            println!("Successfully joined the waitlist!");
            ExitCode::SUCCESS
        }
        Some(Settlement::AlreadyJoined) => {
            println!("Successfully joined the waitlist! (already on the list)");
            ExitCode::SUCCESS
        }
        Some(Settlement::Failed { notice }) => {
            eprintln!("{notice}");
            ExitCode::FAILURE
        }
        None => {
            error!("first name and email are both required");
            return ExitCode::from(2);
        }
    };

    if cli.wait {
        form.wait_for_reset().await;
        info!(state = ?form.state(), "form reopened");
    }

    // Once every signal sender is gone the counter task drains the last
    // settled notification and exits, so its final refresh follows the insert.
    drop(form);
    drop(settled);
    if tokio::time::timeout(COUNTER_WAIT, counter_task).await.is_err() {
        warn!("waitlist count unavailable");
    }
    println!("{} people waiting for access.", counter.current());

    code
}
