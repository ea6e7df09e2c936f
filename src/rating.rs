/// The interactive rating loop
///
/// Pulls pairs from the session, asks a `DecisionInput` for each one and
/// forwards rejection events to the `FileOrganizer`. The engine never blocks
/// on its own; the only wait is inside `DecisionInput::decide`.

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::organize::FileOrganizer;
use crate::state::data::ImageSet;
use crate::state::outcome::{Decision, Transition};
use crate::state::schedule::{Pair, Progress};
use crate::state::session::SessionState;

/// Source of user decisions, one per presented pair
pub trait DecisionInput {
    fn decide(&mut self, pair: &Pair, progress: Progress, images: &ImageSet) -> Result<Decision>;
}

/// How the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Every pair was compared (or too few images are left)
    Completed,
    /// The user chose End Now
    EndedEarly,
    /// The user chose Save and Quit
    Suspended,
}

impl SessionEnd {
    /// Whether tiers should be assigned now
    pub fn is_final(self) -> bool {
        !matches!(self, SessionEnd::Suspended)
    }
}

/// Drive `session` until it is exhausted or the user stops
pub fn run_session<I, O>(session: &mut SessionState, input: &mut I, organizer: &mut O) -> Result<SessionEnd>
where
    I: DecisionInput + ?Sized,
    O: FileOrganizer + ?Sized,
{
    loop {
        let pair = match session.next_pair() {
            Ok(pair) => pair,
            Err(Error::NoPairsAvailable) => {
                info!(progress = %session.progress(), "all comparisons complete");
                return Ok(SessionEnd::Completed);
            }
            Err(e) => return Err(e),
        };

        let decision = input.decide(&pair, session.progress(), session.images())?;
        match session.apply_outcome(&pair, decision)? {
            Transition::Compared { .. } => {}
            Transition::Rejected(event) => {
                // The rejection stands even if the file cannot be moved
                if let Err(e) = organizer.move_rejected(&event) {
                    warn!(image = %event.id, error = %e, "could not move rejected image");
                }
            }
            Transition::Suspend => return Ok(SessionEnd::Suspended),
            Transition::Finish => return Ok(SessionEnd::EndedEarly),
        }
    }
}
