/// Image ingestion module
///
/// This module handles:
/// - Scanning the session folder for candidate images
/// - Probing each file so unreadable images are skipped up front

pub mod loader;

pub use loader::{FolderLoader, IngestReport, SkippedImage};
