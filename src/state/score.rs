/// Win tallies

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::data::ImageId;

/// Running tally for one image
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreEntry {
    /// Number of comparisons won
    pub score: u32,
    /// Number of decided comparisons the image took part in
    pub comparisons: u32,
}

/// Image identity -> score.
///
/// Win-count scheme: the winner gets +1, the loser keeps its score, and
/// both record one more comparison.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBoard {
    entries: HashMap<ImageId, ScoreEntry>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_outcome(&mut self, winner: &ImageId, loser: &ImageId) {
        let entry = self.entries.entry(winner.clone()).or_default();
        entry.score += 1;
        entry.comparisons += 1;
        self.entries.entry(loser.clone()).or_default().comparisons += 1;
    }

    /// Current (score, comparisons) of an image. Unseen images are (0, 0).
    pub fn get(&self, id: &ImageId) -> ScoreEntry {
        self.entries.get(id).copied().unwrap_or_default()
    }

    pub fn score(&self, id: &ImageId) -> u32 {
        self.get(id).score
    }

    /// Overwrite an entry (progress restore only)
    pub(crate) fn set(&mut self, id: ImageId, entry: ScoreEntry) {
        if entry == ScoreEntry::default() {
            self.entries.remove(&id);
        } else {
            self.entries.insert(id, entry);
        }
    }
}
