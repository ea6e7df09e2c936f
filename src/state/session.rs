/// Rating session aggregate
///
/// Ties the image set, the scores, the scheduler and the comparison history
/// together behind the pull API the rating loop drives.

use tracing::info;

use super::data::ImageSet;
use super::outcome::{self, ComparisonRecord, Decision, Transition};
use super::schedule::{Pair, PairScheduler, Progress};
use super::score::ScoreBoard;
use crate::error::Result;
use crate::tiers::{self, TierAssignment};

/// The full working state of one folder's rating pass.
///
/// The interactive layer drives it with a pull loop:
/// `next_pair()` → show the pair → `apply_outcome()` → repeat until
/// `next_pair()` fails with `NoPairsAvailable`.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) images: ImageSet,
    pub(crate) scores: ScoreBoard,
    pub(crate) scheduler: PairScheduler,
    pub(crate) history: Vec<ComparisonRecord>,
}

impl SessionState {
    /// Start a fresh session over freshly ingested images
    pub fn new(images: ImageSet) -> Self {
        let scheduler = PairScheduler::new(&images);
        info!(
            images = images.len(),
            pairs = scheduler.total_count(),
            "new rating session"
        );
        Self {
            images,
            scores: ScoreBoard::new(),
            scheduler,
            history: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        images: ImageSet,
        scores: ScoreBoard,
        scheduler: PairScheduler,
        history: Vec<ComparisonRecord>,
    ) -> Self {
        Self {
            images,
            scores,
            scheduler,
            history,
        }
    }

    /// Pair to present next (see `PairScheduler::next`)
    pub fn next_pair(&mut self) -> Result<Pair> {
        self.scheduler.next(&self.images)
    }

    /// Apply the user's decision for the outstanding pair
    pub fn apply_outcome(&mut self, pair: &Pair, decision: Decision) -> Result<Transition> {
        outcome::apply(self, pair, decision)
    }

    pub fn is_exhausted(&self) -> bool {
        self.scheduler.is_exhausted()
    }

    pub fn progress(&self) -> Progress {
        self.scheduler.progress()
    }

    /// Rank the active images into the five tiers
    pub fn assign_tiers(&self) -> TierAssignment {
        tiers::assign(&self.images, &self.scores)
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn scheduler(&self) -> &PairScheduler {
        &self.scheduler
    }

    /// Decided comparisons in the order they happened
    pub fn history(&self) -> &[ComparisonRecord] {
        &self.history
    }
}
