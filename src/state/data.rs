/// Shared data structures for the session state
///
/// These structs represent the candidate images that flow between
/// the loader, the engine and the file organizer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Error, Result};

/// Stable identity of an image: its path relative to the session folder
/// (e.g. "DSC_0001.jpg")
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Whether an image still takes part in comparisons
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Active,
    Rejected,
}

/// Represents a single candidate image
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Identity (relative path)
    pub id: ImageId,
    /// Active until the user rejects it; never goes back
    pub status: ImageStatus,
}

impl Image {
    pub fn is_active(&self) -> bool {
        self.status == ImageStatus::Active
    }
}

/// The fixed collection of candidate images for one folder.
///
/// Ingestion order is preserved: it drives the pair schedule and breaks
/// score ties when tiers are assigned.
#[derive(Debug, Clone)]
pub struct ImageSet {
    root: PathBuf,
    images: Vec<Image>,
    index: HashMap<ImageId, usize>,
}

impl ImageSet {
    /// Create an empty set rooted at the session folder
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build a set from identities in ingestion order. Duplicates are dropped.
    pub fn with_images<I, T>(root: impl Into<PathBuf>, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ImageId>,
    {
        let mut set = Self::new(root);
        for id in ids {
            set.push(id.into());
        }
        set
    }

    /// Append an active image. Returns false if the identity is already present.
    pub fn push(&mut self, id: ImageId) -> bool {
        if self.index.contains_key(&id) {
            warn!(image = %id, "duplicate image identity ignored");
            return false;
        }
        self.index.insert(id.clone(), self.images.len());
        self.images.push(Image {
            id,
            status: ImageStatus::Active,
        });
        true
    }

    /// Folder the identities are relative to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of an image
    pub fn path_of(&self, id: &ImageId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// All images in ingestion order, rejected ones included
    pub fn iter(&self) -> impl Iterator<Item = &Image> {
        self.images.iter()
    }

    /// Image at an ingestion index
    pub fn get(&self, index: usize) -> Option<&Image> {
        self.images.get(index)
    }

    /// Ingestion index of an identity
    pub fn index_of(&self, id: &ImageId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.index.contains_key(id)
    }

    /// Whether the image at `index` is active. Out of range counts as inactive.
    pub fn is_active_at(&self, index: usize) -> bool {
        self.images.get(index).is_some_and(Image::is_active)
    }

    /// Active images in ingestion order
    pub fn active(&self) -> impl Iterator<Item = &Image> {
        self.images.iter().filter(|image| image.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Mark an image rejected (one-way).
    ///
    /// Returns false if it was already rejected.
    pub fn reject(&mut self, id: &ImageId) -> Result<bool> {
        let index = self
            .index_of(id)
            .ok_or_else(|| Error::UnknownImage(id.to_string()))?;
        let image = &mut self.images[index];
        if image.status == ImageStatus::Rejected {
            return Ok(false);
        }
        image.status = ImageStatus::Rejected;
        Ok(true)
    }

    /// Restore a status read back from a progress record
    pub(crate) fn set_status(&mut self, index: usize, status: ImageStatus) {
        if let Some(image) = self.images.get_mut(index) {
            image.status = status;
        }
    }
}
