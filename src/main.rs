//! image-rater - main entry point
//!
//! Opens (or resumes) a rating session for one folder, runs the comparison
//! loop in the terminal, then copies the images into tier folders.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rfd::FileDialog;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_rater::ui::TerminalInput;
use image_rater::{
    run_session, Config, Error, FileOrganizer, FolderLoader, FolderOrganizer, ProgressStore,
    SessionState, Tier,
};

/// Command-line arguments for image-rater
#[derive(Parser, Debug)]
#[command(name = "image-rater")]
#[command(about = "Rank a folder of photos by pairwise comparison")]
#[command(version)]
struct Args {
    /// Folder with the images to rate (a folder picker opens if omitted)
    folder: Option<PathBuf>,

    /// Config file (defaults to <config dir>/image-rater/config.toml)
    #[arg(short, long, env = "IMAGE_RATER_CONFIG")]
    config: Option<PathBuf>,

    /// Ignore saved progress and start over
    #[arg(long)]
    fresh: bool,

    /// Print the tiers without copying files into tier folders
    #[arg(long)]
    no_organize: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_rater=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let Some(folder) = args.folder.or_else(pick_folder) else {
        info!("No folder selected. Exiting.");
        return Ok(());
    };

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    let store = ProgressStore::new(&folder, &config.session.progress_file);
    let mut organizer = FolderOrganizer::new(&folder, &config);

    let stdin = io::stdin();
    let mut terminal = TerminalInput::new(stdin.lock(), io::stdout());

    let mut session = open_session(&folder, &config, &store, args.fresh, &mut terminal)?;
    let end = run_session(&mut session, &mut terminal, &mut organizer)?;

    // Saved on every exit path so an interrupted organize step can be redone
    store.save(&session).context("Failed to save progress")?;

    if !end.is_final() {
        terminal.say(&format!(
            "Progress saved to {} ({}).",
            store.path().display(),
            session.progress()
        ))?;
        return Ok(());
    }

    let assignment = session.assign_tiers();
    for (tier, size) in Tier::ALL.iter().zip(assignment.sizes()) {
        terminal.say(&format!(
            "{}: {} images",
            organizer.tier_dir(*tier).display(),
            size
        ))?;
    }

    if args.no_organize || assignment.is_empty() {
        return Ok(());
    }

    if terminal.confirm("Copy the images into the tier folders?")? {
        let report = organizer
            .organize(session.images(), &assignment)
            .context("Failed to organize images")?;
        store.discard().context("Failed to remove progress file")?;
        terminal.say(&format!(
            "Image rating completed. {} images copied, {} missing.",
            report.copied,
            report.missing.len()
        ))?;
    }

    Ok(())
}

/// Show the native folder picker dialog
fn pick_folder() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Select Image Folder")
        .pick_folder()
}

/// Resume the saved session for `folder`, or ingest the folder from scratch
fn open_session<R: BufRead, W: Write>(
    folder: &Path,
    config: &Config,
    store: &ProgressStore,
    fresh: bool,
    terminal: &mut TerminalInput<R, W>,
) -> Result<SessionState> {
    if !fresh && store.exists() {
        match store.load() {
            Ok(session) => {
                terminal.say(&format!("Progress loaded: {}.", session.progress()))?;
                return Ok(session);
            }
            Err(Error::CorruptProgress(reason)) => {
                warn!(%reason, "saved progress is unusable");
                let question = format!("Saved progress is unusable ({}). Start fresh?", reason);
                if !terminal.confirm(&question)? {
                    bail!("Aborted: {} is corrupt", store.path().display());
                }
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", store.path().display()))
            }
        }
    }

    let report = FolderLoader::from_config(config)
        .load(folder)
        .with_context(|| format!("Failed to scan {}", folder.display()))?;
    terminal.say(&format!(
        "Found {} images ({} skipped).",
        report.imported_count(),
        report.skipped_count()
    ))?;

    Ok(SessionState::new(report.images))
}
