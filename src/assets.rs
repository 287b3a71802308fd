//! Asset fetching seam between the scene registry and whatever actually
//! produces scene content.
//!
//! The registry only needs two things from an asset: it must come out of an
//! [`AssetLoader`] and accept a [`SceneTransform`]. Format parsing lives on
//! the other side of the trait.

use crate::config::SceneTransform;
use crate::error::LoadError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Bytes received so far for a fetch in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    /// Expected size, when the source knows it.
    pub total: Option<u64>,
}

impl LoadProgress {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        Self { loaded, total }
    }

    /// Completed fraction, or `None` if the total is unknown or zero.
    pub fn fraction(&self) -> Option<f32> {
        match self.total {
            Some(total) if total > 0 => Some((self.loaded as f64 / total as f64) as f32),
            _ => None,
        }
    }

    /// Completed percentage clamped to `[0, 100]`; `0` when the total is unknown.
    pub fn percent(&self) -> f32 {
        self.fraction()
            .map(|f| (f * 100.0).clamp(0.0, 100.0))
            .unwrap_or(0.0)
    }
}

/// A loaded scene root that can be positioned in the world.
pub trait SceneAsset {
    fn set_transform(&mut self, transform: &SceneTransform);
}

/// Fetches scene assets by locator.
///
/// Fetches run on the caller's thread and may suspend; they are never
/// cancelled and no timeout is applied.
#[async_trait(?Send)]
pub trait AssetLoader {
    type Asset: SceneAsset;

    async fn fetch(
        &self,
        locator: &str,
        progress: &dyn Fn(LoadProgress),
    ) -> Result<Self::Asset, LoadError>;
}

/// Raw, unparsed asset bytes as read from disk.
#[derive(Clone, Debug)]
pub struct BlobAsset {
    pub locator: String,
    pub bytes: Vec<u8>,
    pub transform: SceneTransform,
}

impl BlobAsset {
    pub fn new(locator: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            locator: locator.into(),
            bytes,
            transform: SceneTransform::default(),
        }
    }
}

impl SceneAsset for BlobAsset {
    fn set_transform(&mut self, transform: &SceneTransform) {
        self.transform = *transform;
    }
}

/// Loads assets from files below a root directory.
///
/// Locators are resolved relative to the root; a leading `/` is ignored so
/// web-style paths like `/scene2.glb` work unchanged.
pub struct FileAssetLoader {
    root: PathBuf,
    chunk_size: usize,
}

impl FileAssetLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            chunk_size: 64 * 1024,
        }
    }

    /// Read granularity, which is also the progress reporting granularity.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn resolve(&self, locator: &str) -> PathBuf {
        self.root.join(locator.trim_start_matches('/'))
    }
}

#[async_trait(?Send)]
impl AssetLoader for FileAssetLoader {
    type Asset = BlobAsset;

    async fn fetch(
        &self,
        locator: &str,
        progress: &dyn Fn(LoadProgress),
    ) -> Result<BlobAsset, LoadError> {
        let path = self.resolve(locator);
        let mut file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound(locator.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let total = file.metadata().await?.len();
        let mut bytes = Vec::with_capacity(total as usize);
        let mut chunk = vec![0u8; self.chunk_size];
        progress(LoadProgress::new(0, Some(total)));

        loop {
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..read]);
            progress(LoadProgress::new(bytes.len() as u64, Some(total)));
        }

        if bytes.is_empty() {
            return Err(LoadError::Decode(format!("'{}' is empty", locator)));
        }

        Ok(BlobAsset::new(locator, bytes))
    }
}
