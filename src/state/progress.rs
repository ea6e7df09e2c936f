/// Persisted session progress
///
/// The whole `SessionState` is captured into a `ProgressRecord` and stored as
/// pretty JSON in a well-known file inside the image folder, so relaunching
/// against the same folder picks the session back up. Restoring validates
/// the record against the folder and never papers over inconsistencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::data::{ImageId, ImageSet, ImageStatus};
use super::outcome::ComparisonRecord;
use super::schedule::{PairScheduler, PairSequence};
use super::score::{ScoreBoard, ScoreEntry};
use super::session::SessionState;
use crate::error::{Error, Result};

/// Current record layout
pub const PROGRESS_VERSION: u32 = 1;

/// Default name of the progress file inside the image folder
pub const DEFAULT_PROGRESS_FILE: &str = "rater_progress.json";

/// Per-image part of the record
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub id: ImageId,
    pub status: ImageStatus,
    pub score: u32,
    pub comparisons: u32,
}

/// Scheduler counters
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SchedulerRecord {
    /// Next schedule position to examine
    pub cursor: usize,
    /// Position of the issued-but-undecided pair, if any
    pub outstanding: Option<usize>,
    pub total_pairs: usize,
    pub completed: usize,
}

/// Everything needed to resume a session exactly
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    /// Ingestion order matters: it defines the pair schedule
    pub images: Vec<ImageRecord>,
    pub scheduler: SchedulerRecord,
    #[serde(default)]
    pub history: Vec<ComparisonRecord>,
}

impl ProgressRecord {
    pub fn capture(state: &SessionState) -> Self {
        let images = state
            .images
            .iter()
            .map(|image| {
                let entry = state.scores.get(&image.id);
                ImageRecord {
                    id: image.id.clone(),
                    status: image.status,
                    score: entry.score,
                    comparisons: entry.comparisons,
                }
            })
            .collect();

        ProgressRecord {
            version: PROGRESS_VERSION,
            saved_at: Utc::now(),
            images,
            scheduler: SchedulerRecord {
                cursor: state.scheduler.cursor(),
                outstanding: state.scheduler.outstanding().map(|pair| pair.position),
                total_pairs: state.scheduler.total_count(),
                completed: state.scheduler.completed_count(),
            },
            history: state.history.clone(),
        }
    }

    /// Rebuild the session rooted at `root`.
    ///
    /// `resolves` tells whether an identity still points at a file; every
    /// active image must resolve. Any inconsistency fails with
    /// `CorruptProgress`.
    pub fn restore(self, root: &Path, resolves: impl Fn(&ImageId) -> bool) -> Result<SessionState> {
        if self.version != PROGRESS_VERSION {
            return Err(Error::corrupt(format!(
                "unsupported record version {}",
                self.version
            )));
        }

        let mut images = ImageSet::new(root);
        let mut scores = ScoreBoard::new();
        for (index, record) in self.images.iter().enumerate() {
            if !images.push(record.id.clone()) {
                return Err(Error::corrupt(format!("image {} listed twice", record.id)));
            }
            if record.status == ImageStatus::Active && !resolves(&record.id) {
                return Err(Error::corrupt(format!("image {} no longer exists", record.id)));
            }
            images.set_status(index, record.status);
            scores.set(
                record.id.clone(),
                ScoreEntry {
                    score: record.score,
                    comparisons: record.comparisons,
                },
            );
        }

        check_history(&self.history, &images, &scores)?;

        let sched = &self.scheduler;
        if sched.completed > sched.total_pairs {
            return Err(Error::corrupt(format!(
                "completed count {} exceeds total {}",
                sched.completed, sched.total_pairs
            )));
        }
        if sched.completed != self.history.len() {
            return Err(Error::corrupt(format!(
                "completed count {} but {} comparisons in history",
                sched.completed,
                self.history.len()
            )));
        }

        let scheduler = PairScheduler::restore(&images, sched.cursor, sched.outstanding, sched.completed)?;
        check_decided_positions(&self.history, &images, sched.cursor, sched.outstanding)?;
        if scheduler.total_count() != sched.total_pairs {
            return Err(Error::corrupt(format!(
                "total pair count {} does not match the schedule ({})",
                sched.total_pairs,
                scheduler.total_count()
            )));
        }

        Ok(SessionState::from_parts(images, scores, scheduler, self.history))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::corrupt(format!("unreadable record: {}", e)))
    }
}

/// The history must name known images and add up to the stored tallies
fn check_history(history: &[ComparisonRecord], images: &ImageSet, scores: &ScoreBoard) -> Result<()> {
    let mut replayed: HashMap<&ImageId, ScoreEntry> = HashMap::new();
    for record in history {
        for id in [&record.left, &record.right] {
            if !images.contains(id) {
                return Err(Error::corrupt(format!("history names unknown image {}", id)));
            }
        }
        if record.left == record.right || (record.winner != record.left && record.winner != record.right) {
            return Err(Error::corrupt(format!(
                "malformed comparison {} vs {} won by {}",
                record.left, record.right, record.winner
            )));
        }
        let winner = replayed.entry(&record.winner).or_default();
        winner.score += 1;
        winner.comparisons += 1;
        replayed.entry(record.loser()).or_default().comparisons += 1;
    }

    for image in images.iter() {
        let expected = replayed.get(&image.id).copied().unwrap_or_default();
        if scores.get(&image.id) != expected {
            return Err(Error::corrupt(format!(
                "stored score of {} disagrees with the comparison history",
                image.id
            )));
        }
    }
    Ok(())
}

/// Every history entry must be a distinct pair the cursor has already passed,
/// presented the way the schedule orders it, and not the outstanding one
fn check_decided_positions(
    history: &[ComparisonRecord],
    images: &ImageSet,
    cursor: usize,
    outstanding: Option<usize>,
) -> Result<()> {
    let sequence = PairSequence::new(images.len());
    let passed: HashMap<(usize, usize), usize> = (0..cursor)
        .filter(|&position| Some(position) != outstanding)
        .filter_map(|position| sequence.pair_at(position).map(|pair| (pair, position)))
        .collect();

    if history.len() > passed.len() {
        return Err(Error::corrupt(format!(
            "{} comparisons recorded but only {} pairs precede cursor {}",
            history.len(),
            passed.len(),
            cursor
        )));
    }

    let mut decided = HashSet::new();
    for record in history {
        let key = (images.index_of(&record.left), images.index_of(&record.right));
        let position = match key {
            (Some(left), Some(right)) => passed.get(&(left, right)).copied(),
            _ => None,
        };
        let Some(position) = position else {
            return Err(Error::corrupt(format!(
                "comparison {} vs {} is not a decided pair before cursor {}",
                record.left, record.right, cursor
            )));
        };
        if !decided.insert(position) {
            return Err(Error::corrupt(format!(
                "comparison {} vs {} recorded twice",
                record.left, record.right
            )));
        }
    }
    Ok(())
}

/// File-backed progress for one image folder
pub struct ProgressStore {
    folder: PathBuf,
    path: PathBuf,
}

impl ProgressStore {
    /// Store for `folder`, using `file_name` as the well-known record name
    pub fn new(folder: impl Into<PathBuf>, file_name: &str) -> Self {
        let folder = folder.into();
        let path = folder.join(file_name);
        Self { folder, path }
    }

    /// Get the path to the progress file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a previous session left a record behind
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the record atomically (temp file + rename)
    pub fn save(&self, state: &SessionState) -> Result<()> {
        let record = ProgressRecord::capture(state);
        let json = record.to_json()?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        info!(
            path = %self.path.display(),
            completed = record.scheduler.completed,
            total = record.scheduler.total_pairs,
            "progress saved"
        );
        Ok(())
    }

    /// Load and validate the record against the folder contents
    pub fn load(&self) -> Result<SessionState> {
        let json = fs::read_to_string(&self.path)?;
        let record = ProgressRecord::from_json(&json)?;
        debug!(saved_at = %record.saved_at, images = record.images.len(), "progress record read");

        let folder = self.folder.clone();
        let state = record.restore(&self.folder, |id| folder.join(id.as_str()).is_file())?;
        info!(path = %self.path.display(), progress = %state.progress(), "progress loaded");
        Ok(state)
    }

    /// Remove the record once the session is finished. Returns false if
    /// there was nothing to remove.
    pub fn discard(&self) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)?;
        info!(path = %self.path.display(), "progress discarded");
        Ok(true)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("path", &self.path)
            .finish()
    }
}
