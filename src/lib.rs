//! image-rater: rank a folder of photos by pairwise comparison.
//!
//! The engine presents two images at a time, records which one the user
//! prefers, and when every pair has been compared buckets the images into
//! five rating tiers. Progress is saved next to the images so a session can
//! be resumed exactly where it stopped.

pub mod config;
pub mod error;
pub mod ingest;
pub mod organize;
pub mod rating;
pub mod state;
pub mod tiers;
pub mod ui;

pub use config::Config;
pub use error::{Error, Result};
pub use ingest::FolderLoader;
pub use organize::{FileOrganizer, FolderOrganizer};
pub use rating::{run_session, DecisionInput, SessionEnd};
pub use state::data::{Image, ImageId, ImageSet, ImageStatus};
pub use state::outcome::{Decision, RejectedImage, Transition};
pub use state::progress::{ProgressRecord, ProgressStore};
pub use state::schedule::{Pair, PairScheduler, Progress};
pub use state::score::{ScoreBoard, ScoreEntry};
pub use state::session::SessionState;
pub use tiers::{Tier, TierAssignment};
