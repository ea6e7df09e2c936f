/// Applying user decisions to the session
///
/// Every interaction yields exactly one `Decision`; `apply` handles all of
/// them in one exhaustive match and reports what happened as a `Transition`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use super::data::ImageId;
use super::schedule::Pair;
use super::session::SessionState;
use crate::error::{Error, Result};

/// What the user chose for the pair on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    LeftBetter,
    RightBetter,
    RejectLeft,
    RejectRight,
    SaveAndQuit,
    EndNow,
}

/// One decided comparison, kept in the session history
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRecord {
    pub left: ImageId,
    pub right: ImageId,
    pub winner: ImageId,
}

impl ComparisonRecord {
    pub fn loser(&self) -> &ImageId {
        if self.winner == self.left {
            &self.right
        } else {
            &self.left
        }
    }
}

/// "Image rejected" event, delivered before the next pair is requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedImage {
    pub id: ImageId,
    /// Absolute path of the file, for the mover
    pub path: PathBuf,
    /// Undecided pairs dropped from the schedule
    pub dropped_pairs: usize,
}

/// Result of applying one decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Win/loss recorded, scheduler advanced
    Compared { winner: ImageId, loser: ImageId },
    /// Image rejected; the caller hands the event to the mover
    Rejected(RejectedImage),
    /// Save and Quit: the outstanding pair is kept for the next launch
    Suspend,
    /// End Now: stop comparing and assign tiers from the current scores
    Finish,
}

/// Apply `decision` to the outstanding `pair`.
///
/// Fails with `StalePair` if `pair` is not the pair most recently issued by
/// `SessionState::next_pair`, or if it was already decided.
pub fn apply(session: &mut SessionState, pair: &Pair, decision: Decision) -> Result<Transition> {
    session.scheduler.check_outstanding(pair)?;

    match decision {
        Decision::LeftBetter => record_win(session, pair, pair.left.clone(), pair.right.clone()),
        Decision::RightBetter => record_win(session, pair, pair.right.clone(), pair.left.clone()),
        Decision::RejectLeft => reject(session, pair.left.clone()),
        Decision::RejectRight => reject(session, pair.right.clone()),
        Decision::SaveAndQuit => {
            debug!(pair = %pair, "suspending session");
            Ok(Transition::Suspend)
        }
        Decision::EndNow => {
            info!(
                completed = session.scheduler.completed_count(),
                total = session.scheduler.total_count(),
                "comparisons ended early"
            );
            Ok(Transition::Finish)
        }
    }
}

fn record_win(
    session: &mut SessionState,
    pair: &Pair,
    winner: ImageId,
    loser: ImageId,
) -> Result<Transition> {
    session.scheduler.complete(pair)?;
    session.scores.record_outcome(&winner, &loser);
    session.history.push(ComparisonRecord {
        left: pair.left.clone(),
        right: pair.right.clone(),
        winner: winner.clone(),
    });
    debug!(%winner, %loser, "comparison recorded");
    Ok(Transition::Compared { winner, loser })
}

fn reject(session: &mut SessionState, id: ImageId) -> Result<Transition> {
    let index = session
        .images
        .index_of(&id)
        .ok_or_else(|| Error::UnknownImage(id.to_string()))?;

    // An outstanding pair only ever holds active images
    session.images.reject(&id)?;
    let dropped_pairs = session.scheduler.drop_image(&session.images, index);

    info!(image = %id, dropped_pairs, "image rejected");
    Ok(Transition::Rejected(RejectedImage {
        path: session.images.path_of(&id),
        id,
        dropped_pairs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::ImageSet;

    fn session() -> SessionState {
        SessionState::new(ImageSet::with_images("/photos", ["a.jpg", "b.jpg", "c.jpg", "d.jpg"]))
    }

    #[test]
    fn test_left_better_scores_left() {
        let mut session = session();
        let pair = session.next_pair().unwrap();

        let transition = apply(&mut session, &pair, Decision::LeftBetter).unwrap();

        assert_eq!(
            transition,
            Transition::Compared {
                winner: pair.left.clone(),
                loser: pair.right.clone()
            }
        );
        assert_eq!(session.scores().score(&pair.left), 1);
        assert_eq!(session.scores().get(&pair.right).comparisons, 1);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].loser(), &pair.right);
    }

    #[test]
    fn test_outcome_twice_is_stale() {
        let mut session = session();
        let pair = session.next_pair().unwrap();
        apply(&mut session, &pair, Decision::RightBetter).unwrap();

        let err = apply(&mut session, &pair, Decision::RightBetter).unwrap_err();
        assert!(matches!(err, Error::StalePair { .. }));
        assert_eq!(session.scores().score(&pair.right), 1);
    }

    #[test]
    fn test_reject_emits_event_and_keeps_completed() {
        let mut session = session();
        let pair = session.next_pair().unwrap();
        let total_before = session.progress().total;

        let transition = apply(&mut session, &pair, Decision::RejectRight).unwrap();

        let Transition::Rejected(event) = transition else {
            panic!("expected a rejection, got {:?}", transition);
        };
        assert_eq!(event.id, pair.right);
        assert_eq!(event.path, PathBuf::from("/photos").join(pair.right.as_str()));
        // 3 pairs contain the rejected image, the outstanding one included
        assert_eq!(event.dropped_pairs, 3);
        assert_eq!(session.progress().total, total_before - 3);
        assert_eq!(session.progress().completed, 0);
        assert_eq!(session.images().active_count(), 3);
    }

    #[test]
    fn test_save_and_quit_keeps_pair_outstanding() {
        let mut session = session();
        let pair = session.next_pair().unwrap();

        assert_eq!(apply(&mut session, &pair, Decision::SaveAndQuit).unwrap(), Transition::Suspend);
        assert_eq!(session.next_pair().unwrap(), pair);
    }

    #[test]
    fn test_end_now_finishes() {
        let mut session = session();
        let pair = session.next_pair().unwrap();
        assert_eq!(apply(&mut session, &pair, Decision::EndNow).unwrap(), Transition::Finish);
    }
}
