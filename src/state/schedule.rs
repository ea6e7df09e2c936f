/// Pair scheduling
///
/// Pairs are enumerated with the round-robin "circle method" over the
/// ingestion indices `0..n`: position `p` always maps to the same pair for a
/// given `n`, so a persisted cursor reproduces the exact remaining sequence.
/// Within one round every image appears at most once, which keeps the user
/// from seeing the same photo over and over.

use std::fmt;

use super::data::{ImageId, ImageSet};
use crate::error::{Error, Result};

/// Fixed all-pairs schedule for `n` images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSequence {
    n: usize,
}

impl PairSequence {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Slots in the circle; odd counts get a phantom "bye" slot
    fn slots(&self) -> usize {
        self.n + self.n % 2
    }

    /// Number of positions, byes included
    pub fn len(&self) -> usize {
        if self.n < 2 {
            return 0;
        }
        let m = self.slots();
        (m / 2) * (m - 1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ingestion indices (left, right) at a position, or None for a bye
    pub fn pair_at(&self, position: usize) -> Option<(usize, usize)> {
        if position >= self.len() {
            return None;
        }
        let m = self.slots();
        let per_round = m / 2;
        let round = position / per_round;
        let k = position % per_round;

        let (a, b) = if k == 0 {
            // The pinned slot alternates sides
            if round % 2 == 0 {
                (round, m - 1)
            } else {
                (m - 1, round)
            }
        } else {
            ((round + k) % (m - 1), (round + m - 1 - k) % (m - 1))
        };

        if a >= self.n || b >= self.n {
            None
        } else {
            Some((a, b))
        }
    }
}

/// One comparison unit as presented: left and right image plus the
/// schedule position it was issued from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub position: usize,
    pub left: ImageId,
    pub right: ImageId,
}

impl Pair {
    pub fn contains(&self, id: &ImageId) -> bool {
        &self.left == id || &self.right == id
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} vs {}", self.position, self.left, self.right)
    }
}

/// Progress counters as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 * 100.0 / self.total as f64
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comparison {} of {}", self.completed, self.total)
    }
}

/// Decides which two active images to present next.
///
/// Counters:
/// - `completed`: pairs that received a win/loss outcome
/// - `outstanding`: the issued pair still waiting for a decision
/// - `remaining`: unreached positions whose two images are both active
///
/// `total_count() = completed + outstanding + remaining`, so a rejection
/// shrinks the total instead of stalling the percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct PairScheduler {
    sequence: PairSequence,
    cursor: usize,
    outstanding: Option<Pair>,
    completed: usize,
    remaining: usize,
}

impl PairScheduler {
    /// Fresh schedule over the whole image set
    pub fn new(images: &ImageSet) -> Self {
        let sequence = PairSequence::new(images.len());
        let remaining = count_live_from(&sequence, images, 0);
        Self {
            sequence,
            cursor: 0,
            outstanding: None,
            completed: 0,
            remaining,
        }
    }

    /// Rebuild a scheduler from persisted counters, validating them against
    /// the image set
    pub fn restore(
        images: &ImageSet,
        cursor: usize,
        outstanding: Option<usize>,
        completed: usize,
    ) -> Result<Self> {
        let sequence = PairSequence::new(images.len());
        if cursor > sequence.len() {
            return Err(Error::corrupt(format!(
                "cursor {} is past the end of the schedule ({} positions)",
                cursor,
                sequence.len()
            )));
        }

        let outstanding = match outstanding {
            None => None,
            Some(position) => {
                if position >= cursor {
                    return Err(Error::corrupt(format!(
                        "outstanding position {} has not been reached (cursor {})",
                        position, cursor
                    )));
                }
                let pair = live_pair(&sequence, images, position).ok_or_else(|| {
                    Error::corrupt(format!(
                        "outstanding position {} is not a pair of active images",
                        position
                    ))
                })?;
                Some(pair)
            }
        };

        let remaining = count_live_from(&sequence, images, cursor);
        Ok(Self {
            sequence,
            cursor,
            outstanding,
            completed,
            remaining,
        })
    }

    /// Next pair to present.
    ///
    /// While a pair is outstanding the same pair is returned again. Fails with
    /// `NoPairsAvailable` once the schedule is exhausted or fewer than two
    /// active images remain.
    pub fn next(&mut self, images: &ImageSet) -> Result<Pair> {
        if let Some(pair) = &self.outstanding {
            return Ok(pair.clone());
        }
        if images.active_count() < 2 {
            return Err(Error::NoPairsAvailable);
        }

        while self.cursor < self.sequence.len() {
            let position = self.cursor;
            self.cursor += 1;
            if let Some(pair) = live_pair(&self.sequence, images, position) {
                self.remaining -= 1;
                self.outstanding = Some(pair.clone());
                return Ok(pair);
            }
        }

        Err(Error::NoPairsAvailable)
    }

    /// Fail with `StalePair` unless `pair` is the outstanding one
    pub fn check_outstanding(&self, pair: &Pair) -> Result<()> {
        match &self.outstanding {
            Some(current) if current == pair => Ok(()),
            Some(current) => Err(Error::StalePair {
                expected: current.to_string(),
                got: pair.to_string(),
            }),
            None => Err(Error::StalePair {
                expected: "no outstanding pair".to_string(),
                got: pair.to_string(),
            }),
        }
    }

    /// Mark the outstanding pair as decided
    pub fn complete(&mut self, pair: &Pair) -> Result<()> {
        self.check_outstanding(pair)?;
        self.outstanding = None;
        self.completed += 1;
        Ok(())
    }

    /// Drop every undecided pair containing the image at `index`.
    ///
    /// The image must already be rejected in `images`; an image that is still
    /// active drops nothing. Returns how many pairs were dropped;
    /// `total_count()` shrinks by exactly that amount, and a repeated call
    /// returns 0.
    pub fn drop_image(&mut self, images: &ImageSet, index: usize) -> usize {
        if images.is_active_at(index) {
            return 0;
        }

        let mut dropped = 0;
        if let Some(pair) = &self.outstanding {
            if images.index_of(&pair.left) == Some(index)
                || images.index_of(&pair.right) == Some(index)
            {
                self.outstanding = None;
                dropped += 1;
            }
        }

        let remaining = count_live_from(&self.sequence, images, self.cursor);
        dropped += self.remaining.saturating_sub(remaining);
        self.remaining = remaining;

        dropped
    }

    pub fn outstanding(&self) -> Option<&Pair> {
        self.outstanding.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn completed_count(&self) -> usize {
        self.completed
    }

    pub fn total_count(&self) -> usize {
        self.completed + usize::from(self.outstanding.is_some()) + self.remaining
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.completed_count(),
            total: self.total_count(),
        }
    }

    /// No unpresented pair remains among the active images
    pub fn is_exhausted(&self) -> bool {
        self.outstanding.is_none() && self.remaining == 0
    }
}

/// Pair at `position` if both of its images are still active
fn live_pair(sequence: &PairSequence, images: &ImageSet, position: usize) -> Option<Pair> {
    let (a, b) = sequence.pair_at(position)?;
    let left = images.get(a).filter(|image| image.is_active())?;
    let right = images.get(b).filter(|image| image.is_active())?;
    Some(Pair {
        position,
        left: left.id.clone(),
        right: right.id.clone(),
    })
}

fn count_live_from(sequence: &PairSequence, images: &ImageSet, cursor: usize) -> usize {
    (cursor..sequence.len())
        .filter_map(|position| sequence.pair_at(position))
        .filter(|&(a, b)| images.is_active_at(a) && images.is_active_at(b))
        .count()
}
