/// Folder-based file organizer
///
/// Rejected images are moved out of the session folder as soon as they are
/// rejected; the final ranking is copied, leaving the originals in place.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::state::data::ImageSet;
use crate::state::outcome::RejectedImage;
use crate::tiers::{Tier, TierAssignment};

/// Summary of the final copy pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizeReport {
    pub copied: usize,
    /// Files that were gone by the time they were copied
    pub missing: Vec<PathBuf>,
}

/// Collaborator that acts on rejections and on the final tier mapping
pub trait FileOrganizer {
    /// Called synchronously with the "image rejected" event, before the next
    /// pair is requested
    fn move_rejected(&mut self, event: &RejectedImage) -> Result<()>;

    /// Place every ranked image according to its tier
    fn organize(&mut self, images: &ImageSet, assignment: &TierAssignment) -> Result<OrganizeReport>;
}

/// Organizer working inside the session folder:
/// `<folder>/rejected/` and `<folder>/rated_5/` … `<folder>/rated_1/`
#[derive(Debug, Clone)]
pub struct FolderOrganizer {
    folder: PathBuf,
    rejected_folder: String,
    tier_prefix: String,
}

impl FolderOrganizer {
    pub fn new(folder: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            folder: folder.into(),
            rejected_folder: config.organize.rejected_folder.clone(),
            tier_prefix: config.organize.tier_folder_prefix.clone(),
        }
    }

    pub fn rejected_dir(&self) -> PathBuf {
        self.folder.join(&self.rejected_folder)
    }

    pub fn tier_dir(&self, tier: Tier) -> PathBuf {
        self.folder.join(format!("{}{}", self.tier_prefix, tier))
    }
}

impl FileOrganizer for FolderOrganizer {
    fn move_rejected(&mut self, event: &RejectedImage) -> Result<()> {
        if !event.path.is_file() {
            warn!(path = %event.path.display(), "rejected image already gone, nothing to move");
            return Ok(());
        }

        let target_dir = self.rejected_dir();
        fs::create_dir_all(&target_dir)?;
        let target = free_target(&target_dir, &event.path);
        if target.file_name() != event.path.file_name() {
            warn!(
                path = %event.path.display(),
                to = %target.display(),
                "rejected folder already holds this name, keeping both"
            );
        }
        fs::rename(&event.path, &target)?;

        info!(from = %event.path.display(), to = %target.display(), "moved rejected image");
        Ok(())
    }

    fn organize(&mut self, images: &ImageSet, assignment: &TierAssignment) -> Result<OrganizeReport> {
        let mut report = OrganizeReport::default();

        for tier in Tier::ALL {
            let dir = self.tier_dir(tier);
            fs::create_dir_all(&dir)?;

            for id in assignment.members(tier) {
                let source = images.path_of(id);
                if !source.is_file() {
                    warn!(path = %source.display(), "file not found, skipping copy");
                    report.missing.push(source);
                    continue;
                }
                fs::copy(&source, dir.join(file_name(&source)))?;
                report.copied += 1;
            }
        }

        info!(copied = report.copied, missing = report.missing.len(), "images copied to tier folders");
        Ok(report)
    }
}

fn file_name(path: &Path) -> &std::ffi::OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

/// `dir/<name>`, or `dir/<stem>_<n>.<ext>` for the first `n` not yet taken
fn free_target(dir: &Path, source: &Path) -> PathBuf {
    let target = dir.join(file_name(source));
    if !target.exists() {
        return target;
    }

    let stem = source.file_stem().unwrap_or_default().to_string_lossy();
    let extension = source.extension().map(|ext| ext.to_string_lossy());
    (1..)
        .map(|n| {
            let name = match &extension {
                Some(ext) => format!("{}_{}.{}", stem, n, ext),
                None => format!("{}_{}", stem, n),
            };
            dir.join(name)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::ImageId;
    use crate::state::score::ScoreBoard;
    use crate::tiers;

    #[test]
    fn test_move_rejected_into_subfolder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        fs::write(&path, b"x").unwrap();
        let mut organizer = FolderOrganizer::new(dir.path(), &Config::default());

        organizer
            .move_rejected(&RejectedImage {
                id: ImageId::new("a.jpg"),
                path: path.clone(),
                dropped_pairs: 2,
            })
            .unwrap();

        assert!(!path.exists());
        assert!(dir.path().join("rejected").join("a.jpg").is_file());
    }

    #[test]
    fn test_move_rejected_keeps_earlier_reject() {
        let dir = tempfile::tempdir().unwrap();
        let rejected = dir.path().join("rejected");
        fs::create_dir(&rejected).unwrap();
        fs::write(rejected.join("a.jpg"), b"earlier run").unwrap();
        fs::write(rejected.join("a_1.jpg"), b"even earlier").unwrap();

        let path = dir.path().join("a.jpg");
        fs::write(&path, b"this run").unwrap();
        let mut organizer = FolderOrganizer::new(dir.path(), &Config::default());
        organizer
            .move_rejected(&RejectedImage {
                id: ImageId::new("a.jpg"),
                path: path.clone(),
                dropped_pairs: 1,
            })
            .unwrap();

        assert!(!path.exists());
        assert_eq!(fs::read(rejected.join("a.jpg")).unwrap(), b"earlier run");
        assert_eq!(fs::read(rejected.join("a_1.jpg")).unwrap(), b"even earlier");
        assert_eq!(fs::read(rejected.join("a_2.jpg")).unwrap(), b"this run");
    }

    #[test]
    fn test_organize_copies_by_tier_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg"];
        for name in &names[..4] {
            fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        let images = ImageSet::with_images(dir.path(), names);
        let mut scores = ScoreBoard::new();
        scores.record_outcome(&"c.jpg".into(), &"a.jpg".into());
        let assignment = tiers::assign(&images, &scores);

        let mut organizer = FolderOrganizer::new(dir.path(), &Config::default());
        let report = organizer.organize(&images, &assignment).unwrap();

        assert_eq!(report.copied, 4);
        assert_eq!(report.missing, vec![dir.path().join("e.jpg")]);
        assert!(dir.path().join("rated_5").join("c.jpg").is_file());
        assert!(dir.path().join("rated_4").join("a.jpg").is_file());
        assert!(dir.path().join("rated_1").is_dir());
        // Originals stay in place
        assert!(dir.path().join("c.jpg").is_file());
    }
}
