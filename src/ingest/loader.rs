/// Folder image loader
///
/// Builds the `ImageSet` for a session. Only the top level of the folder is
/// scanned, so the `rejected` and `rated_*` subfolders this tool creates are
/// never picked up again. Files are visited in file-name order, which fixes
/// the ingestion order for the whole session.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::state::data::{ImageId, ImageSet};

/// A file that looked like an image but could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of an ingestion pass
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub images: ImageSet,
    pub skipped: Vec<SkippedImage>,
}

impl IngestReport {
    pub fn imported_count(&self) -> usize {
        self.images.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Image loader collaborator backed by the file system
#[derive(Debug, Clone)]
pub struct FolderLoader {
    extensions: Vec<String>,
}

impl FolderLoader {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(|e| e.into().to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ingest.extensions.iter().cloned())
    }

    /// Scan `folder` for images
    pub fn load(&self, folder: &Path) -> Result<IngestReport> {
        if !folder.is_dir() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not a folder: {}", folder.display()),
            )));
        }

        info!(folder = %folder.display(), "scanning folder");

        let mut candidates = Vec::new();
        for entry in WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "cannot read folder entry");
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() && self.has_image_extension(path) {
                candidates.push(path.to_path_buf());
            }
        }

        Ok(self.ingest(folder, candidates))
    }

    /// Ingest an explicit list of files, identities relative to `root`
    pub fn load_files(&self, root: &Path, files: &[PathBuf]) -> IngestReport {
        self.ingest(root, files.to_vec())
    }

    fn ingest(&self, root: &Path, candidates: Vec<PathBuf>) -> IngestReport {
        let mut images = ImageSet::new(root);
        let mut skipped = Vec::new();

        for path in candidates {
            let result = identity_of(root, &path).and_then(|id| probe(&path).map(|dims| (id, dims)));
            match result {
                Ok((id, (width, height))) => {
                    debug!(image = %id, width, height, "image ingested");
                    images.push(id);
                }
                Err(Error::InvalidImage { path, reason }) => {
                    warn!(path = %path.display(), %reason, "skipping unreadable image");
                    skipped.push(SkippedImage { path, reason });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping image");
                    skipped.push(SkippedImage {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            imported = images.len(),
            skipped = skipped.len(),
            "ingestion complete"
        );
        IngestReport { images, skipped }
    }

    fn has_image_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.contains(&ext))
    }
}

/// Identity of `path` relative to `root`
fn identity_of(root: &Path, path: &Path) -> Result<ImageId> {
    let relative = path.strip_prefix(root).map_err(|_| Error::InvalidImage {
        path: path.to_path_buf(),
        reason: format!("outside of {}", root.display()),
    })?;
    // A lossy identity would no longer point back at the file
    let name = relative.to_str().ok_or_else(|| Error::InvalidImage {
        path: path.to_path_buf(),
        reason: "file name is not valid UTF-8".to_string(),
    })?;
    Ok(ImageId::new(name))
}

/// Check that the file opens and decodes as an image; returns its dimensions
pub fn probe(path: &Path) -> Result<(u32, u32)> {
    let invalid = |reason: String| Error::InvalidImage {
        path: path.to_path_buf(),
        reason,
    };

    image::ImageReader::open(path)
        .map_err(|e| invalid(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| invalid(e.to_string()))?
        .into_dimensions()
        .map_err(|e| invalid(e.to_string()))
}
