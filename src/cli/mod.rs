use std::{collections::HashMap, env, path::PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tokio::io;
use tracing::level_filters::LevelFilter;

use crate::{
    ledger::{
        balance::calculate_balance,
        parse::{parse_config, parse_entries},
        render::default_document,
    },
    observer::{
        event::NoteEvent,
        start_observer,
        store::{FileLedgerStore, LedgerStore},
        tracker::{LEDGER_FILE_NAME, TimeTrackerObserver},
    },
    utils::{
        clock::SystemClock,
        logging::{CLI_PREFIX, OBSERVE_PREFIX, enable_logging},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Hourbook", version, long_about = None)]
#[command(
    about = "Markdown time ledger that keeps its own balance sheet up to date",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Echo log output to stderr")]
    log: bool,
    #[arg(long = "log-filter", help = "Level filter for the log files")]
    log_filter: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(
        about = "Watch note events as JSON lines on stdin and keep the ledger up to date. Results go to stdout"
    )]
    Observe {
        #[arg(
            long,
            help = "Directory for log files. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
    },
    #[command(about = "Recompute a ledger document in place, as if an update event had arrived for it")]
    Sync {
        #[arg(long, help = "Path to the ledger document")]
        file: PathBuf,
    },
    #[command(about = "Print the balance summary of a ledger document")]
    Summary {
        #[arg(long, help = "Path to the ledger document")]
        file: PathBuf,
    },
    #[command(about = "Create a fresh ledger in the given notes directory")]
    Init {
        #[arg(long, help = "Notes directory the ledger should live in")]
        dir: PathBuf,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = args
        .log_filter
        .or_else(|| args.log.then_some(LevelFilter::TRACE));
    let (prefix, log_root) = match &args.commands {
        Commands::Observe { dir: Some(dir) } => (OBSERVE_PREFIX, dir.clone()),
        Commands::Observe { dir: None } => (OBSERVE_PREFIX, create_application_default_path()?),
        _ => (CLI_PREFIX, create_application_default_path()?),
    };
    enable_logging(prefix, &log_root.join("logs"), logging_level, args.log)?;

    match args.commands {
        Commands::Observe { .. } => start_observer().await,
        Commands::Sync { file } => sync_ledger(file).await,
        Commands::Summary { file } => print_summary(file).await,
        Commands::Init { dir } => init_ledger(dir).await,
    }
}

async fn sync_ledger(file: PathBuf) -> Result<()> {
    let store = FileLedgerStore;
    let Some(content) = store.load(&file).await? else {
        bail!("no ledger document at {}", file.display());
    };

    let title = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    let event = NoteEvent::Updated {
        title,
        content,
        file_path: file.to_string_lossy().to_string(),
        frontmatter: HashMap::new(),
    };

    let tracker = TimeTrackerObserver::new(store, Box::new(SystemClock));
    match tracker.process_event(&event).await? {
        Some(result) => println!("{}", serde_json::to_string(&result)?),
        None => println!("{} is not a ledger document", file.display()),
    }
    Ok(())
}

async fn print_summary(file: PathBuf) -> Result<()> {
    let store = FileLedgerStore;
    let Some(content) = store.load(&file).await? else {
        bail!("no ledger document at {}", file.display());
    };

    let config = parse_config(&content);
    let entries = parse_entries(&content);
    let (_, summary) = calculate_balance(&entries, &config);
    println!("{summary}");
    Ok(())
}

async fn init_ledger(dir: PathBuf) -> Result<()> {
    let path = dir.join(LEDGER_FILE_NAME);
    let store = FileLedgerStore;
    if store.load(&path).await?.is_some() {
        bail!("ledger already exists at {}", path.display());
    }
    store.replace(&path, &default_document()).await?;
    println!("Created {}", path.display());
    Ok(())
}

pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path =
                PathBuf::from(env::var("APPDATA").expect("APPDATA should be present on Windows"));
            path.push("hourbook");
            path
        }
        #[cfg(not(windows))]
        {
            let mut path = env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .expect("Couldn't find neither XDG_STATE_HOME nor HOME");
            path.push("hourbook");
            path
        }
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::{
        ledger::render::default_document,
        observer::{
            store::{FileLedgerStore, LedgerStore},
            tracker::LEDGER_FILE_NAME,
        },
    };

    use super::{init_ledger, print_summary, sync_ledger};

    const RAW_LEDGER: &str = "\
## Time Entries
| Date | Type | Work Times | Break Times | Notes |
|------|------|------------|-------------|--------|
| 2024-03-04 | workday | 09:00-17:00 | 12:00-13:00 | - |";

    #[tokio::test]
    async fn test_init_creates_a_fresh_ledger() -> Result<()> {
        let dir = tempdir()?;
        init_ledger(dir.path().to_path_buf()).await?;

        let store = FileLedgerStore;
        let content = store.load(&dir.path().join(LEDGER_FILE_NAME)).await?;
        assert_eq!(content.as_deref(), Some(default_document().as_str()));

        assert!(init_ledger(dir.path().to_path_buf()).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_sync_settles_a_ledger_in_place() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(LEDGER_FILE_NAME);
        let store = FileLedgerStore;
        store.replace(&path, RAW_LEDGER).await?;

        sync_ledger(path.clone()).await?;
        let settled = store.load(&path).await?.unwrap();
        assert!(settled.contains("### Overall Summary"));
        assert!(settled.contains("| 2024-03-04 | workday | 09:00-17:00 | 12:00-13:00 | - |"));

        sync_ledger(path.clone()).await?;
        assert_eq!(store.load(&path).await?.unwrap(), settled);
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_requires_an_existing_file() -> Result<()> {
        let dir = tempdir()?;
        assert!(print_summary(dir.path().join("missing.md")).await.is_err());
        Ok(())
    }
}
