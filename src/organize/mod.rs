/// File organization module
///
/// This module handles the physical side effects of a session:
/// - Moving rejected images into the `rejected` subfolder as they happen
/// - Copying the final ranking into `rated_<tier>` subfolders

pub mod folders;

pub use folders::{FileOrganizer, FolderOrganizer, OrganizeReport};
