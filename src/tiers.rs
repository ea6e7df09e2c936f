/// Tier assignment
///
/// Ranks the active images by score (ties keep ingestion order) and cuts the
/// ranking into five contiguous 20% tiers, tier 5 being the best.

use std::collections::HashMap;
use std::fmt;
use tracing::info;

use crate::state::data::{ImageId, ImageSet};
use crate::state::score::ScoreBoard;

/// Number of rating tiers
pub const TIER_COUNT: usize = 5;

/// Rating bucket, 5 (best) down to 1 (worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tier(u8);

impl Tier {
    /// Best first
    pub const ALL: [Tier; TIER_COUNT] = [Tier(5), Tier(4), Tier(3), Tier(2), Tier(1)];

    /// Tier from its number; None outside 1..=5
    pub fn new(number: u8) -> Option<Self> {
        (1..=TIER_COUNT as u8).contains(&number).then_some(Tier(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One active image in its final position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedImage {
    pub id: ImageId,
    pub score: u32,
    /// 0 = best
    pub rank: usize,
    pub tier: Tier,
}

/// Identity -> tier mapping produced at the end of a session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierAssignment {
    ranked: Vec<RankedImage>,
    by_id: HashMap<ImageId, usize>,
}

impl TierAssignment {
    pub fn tier_of(&self, id: &ImageId) -> Option<Tier> {
        self.by_id.get(id).map(|&i| self.ranked[i].tier)
    }

    /// Members of a tier, best first
    pub fn members(&self, tier: Tier) -> Vec<&ImageId> {
        self.ranked
            .iter()
            .filter(|image| image.tier == tier)
            .map(|image| &image.id)
            .collect()
    }

    /// Tier sizes, best tier first
    pub fn sizes(&self) -> [usize; TIER_COUNT] {
        let mut sizes = [0; TIER_COUNT];
        for image in &self.ranked {
            sizes[TIER_COUNT - image.tier.number() as usize] += 1;
        }
        sizes
    }

    /// All ranked images, best first
    pub fn ranked(&self) -> &[RankedImage] {
        &self.ranked
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Rank indices where tiers 4, 3, 2 and 1 start, for `n` ranked images.
///
/// `cut_k = min(ceil(n*k/5), upper)` with `upper = max(floor(4n/5), ceil(n/5))`:
/// the top cuts follow the `rank/n < k*20%` percentile rule, and the bottom
/// tier takes whatever the floored last cut leaves.
pub fn cut_points(n: usize) -> [usize; TIER_COUNT - 1] {
    let upper = (4 * n / 5).max(n.div_ceil(5));
    let mut cuts = [0; TIER_COUNT - 1];
    for (k, cut) in cuts.iter_mut().enumerate() {
        *cut = (n * (k + 1)).div_ceil(5).min(upper);
    }
    cuts
}

/// Rank the active images of `images` and bucket them into tiers.
/// Rejected images are left out entirely.
pub fn assign(images: &ImageSet, scores: &ScoreBoard) -> TierAssignment {
    let mut candidates: Vec<(usize, &ImageId, u32)> = images
        .iter()
        .enumerate()
        .filter(|(_, image)| image.is_active())
        .map(|(index, image)| (index, &image.id, scores.score(&image.id)))
        .collect();
    candidates.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

    let cuts = cut_points(candidates.len());
    let mut assignment = TierAssignment::default();
    for (rank, (_, id, score)) in candidates.into_iter().enumerate() {
        let passed = cuts.iter().filter(|&&cut| cut <= rank).count();
        let tier = Tier(TIER_COUNT as u8 - passed as u8);
        assignment.by_id.insert(id.clone(), rank);
        assignment.ranked.push(RankedImage {
            id: id.clone(),
            score,
            rank,
            tier,
        });
    }

    info!(sizes = ?assignment.sizes(), "tiers assigned");
    assignment
}
