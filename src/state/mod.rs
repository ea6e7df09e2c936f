/// State management module
///
/// This module handles the rating session state:
/// - Candidate images and their status (data.rs)
/// - Win counts (score.rs)
/// - Pair scheduling and progress counters (schedule.rs)
/// - Applying user decisions (outcome.rs)
/// - The session aggregate (session.rs)
/// - Saving and resuming progress (progress.rs)

pub mod data;
pub mod outcome;
pub mod progress;
pub mod schedule;
pub mod score;
pub mod session;
