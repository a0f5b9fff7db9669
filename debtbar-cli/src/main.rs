use anyhow::{bail, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use debtbar_client::HttpLedgerSource;
use debtbar_core::{
    DebtTracker, Direction, KeyValueStore, LedgerEntry, LedgerSource, Loaded, MemoryLedger,
    MemoryStore, RenderSink,
};
use tracing_subscriber::EnvFilter;

mod config;
mod sink;
mod state;

use config::{Config, InitOutcome};
use sink::{TerminalSink, Views};
use state::FileStore;

#[derive(Parser, Debug)]
#[command(name = "debtbar", version, about = "Community debt tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Progress, log and remaining-over-time in one go
    Show {
        /// Show every log entry instead of one page
        #[arg(long)]
        full: bool,
    },

    /// Completion percentage only
    Progress,

    /// Display log, collapsed categories first
    Log {
        #[arg(long)]
        full: bool,

        /// Entries per page (defaults to config)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Running remaining total, one point per entry
    Series {
        /// Emit points as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add one to the debt
    Add,

    /// Pay one off the debt
    Remove,

    /// Ignore the cache and fetch again
    Refresh,

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Offline walk-through against an in-memory ledger
    Demo,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.debtbar/config.toml with defaults
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => match config::init_config()? {
                InitOutcome::Created(p) => println!("Wrote {}", p.display()),
                InitOutcome::AlreadyExists(p) => println!("Config already exists: {}", p.display()),
            },
        },

        Command::Demo => run_demo().await?,

        command => run_tracker(command).await?,
    }

    Ok(())
}

async fn run_tracker(command: Command) -> Result<()> {
    let mut cfg = config::load_config()?;
    if let Command::Log {
        page_size: Some(n), ..
    } = command
    {
        if n == 0 {
            bail!("--page-size must be at least 1");
        }
        cfg.log.page_size = n;
    }

    let source = HttpLedgerSource::new(cfg.ledger.base_url.clone());
    let store = FileStore::open_default()?;
    let mut tracker = DebtTracker::new(source, store, cfg.ttl()?, cfg.tracker_config());
    let now = Utc::now();

    match command {
        Command::Show { full } => {
            let mut out = TerminalSink::new(cfg.unit(), Views::ALL);
            activate(&mut tracker, full, &mut out, now).await;
        }
        Command::Progress => {
            let views = Views {
                progress: true,
                ..Views::NONE
            };
            let mut out = TerminalSink::new(cfg.unit(), views);
            activate(&mut tracker, false, &mut out, now).await;
        }
        Command::Log { full, .. } => {
            let views = Views {
                log: true,
                ..Views::NONE
            };
            let mut out = TerminalSink::new(cfg.unit(), views);
            activate(&mut tracker, full, &mut out, now).await;
        }
        Command::Series { json } => {
            let views = Views {
                series: true,
                ..Views::NONE
            };
            let mut out = TerminalSink::new(cfg.unit(), views).with_series_json(json);
            activate(&mut tracker, false, &mut out, now).await;
        }
        Command::Add => {
            let mut out = TerminalSink::new(cfg.unit(), Views::NONE);
            tracker.contribute(Direction::Add, &mut out).await;
        }
        Command::Remove => {
            let mut out = TerminalSink::new(cfg.unit(), Views::NONE);
            tracker.contribute(Direction::Remove, &mut out).await;
        }
        Command::Refresh => {
            let mut out = TerminalSink::new(cfg.unit(), Views::ALL);
            let loaded = tracker.refresh(now, &mut out).await;
            if loaded == Loaded::Fetched {
                println!("Refreshed.");
            }
        }
        Command::Config { .. } | Command::Demo => bail!("not a tracker command"),
    }

    Ok(())
}

/// Activate with the requested log mode. Failures are already rendered as
/// status; the exit code stays zero.
async fn activate<L, S>(
    tracker: &mut DebtTracker<L, S>,
    full: bool,
    out: &mut impl RenderSink,
    now: chrono::DateTime<Utc>,
) where
    L: LedgerSource,
    S: KeyValueStore,
{
    // nothing is loaded yet, so this only sets the mode
    tracker.set_display_full(full, out);
    tracker.activate(now, out).await;
}

async fn run_demo() -> Result<()> {
    let cfg = Config::default();
    let now = Utc::now();
    let start = now - Duration::days(5);

    let ledger = MemoryLedger::new("203.0.113.7", now);
    let seed = [
        (40, "Initial grind"),
        (-1, "Played Support Game."),
        (-3, "Beat the ranked ladder"),
        (-1, "Played Support Game."),
        (5, "Random Number Gen Bet."),
        (-1, "Played Support Game."),
        (1, "Added by User"),
        (-2, "Cleared weekly challenge"),
    ];
    for (i, (amount, desc)) in seed.iter().enumerate() {
        let at = start + Duration::hours(6 * i as i64);
        ledger.seed(LedgerEntry::new(
            i as i64 + 1,
            *amount,
            *desc,
            at,
            format!("198.51.100.{i}"),
        )?);
    }

    let mut tracker = DebtTracker::new(ledger, MemoryStore::new(), cfg.ttl()?, cfg.tracker_config());
    let mut out = TerminalSink::new(cfg.unit(), Views::ALL);

    println!("# Demo: first activation\n");
    tracker.activate(now, &mut out).await;

    println!("# Demo: paying one off\n");
    tracker.contribute(Direction::Remove, &mut out).await;
    println!();
    tracker.activate(now, &mut out).await;

    println!("# Demo: trying again from the same identity\n");
    tracker.contribute(Direction::Add, &mut out).await;
    tracker.source().set_identity("198.51.100.1");
    tracker.contribute(Direction::Add, &mut out).await;
    tracker.contribute(Direction::Add, &mut out).await;
    println!(
        "\nRequests that reached the store: {}",
        tracker.source().append_count()
    );

    Ok(())
}
