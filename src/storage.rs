use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::Rng;

/// Filename of the placeholder every new account starts with. It is shared
/// by all users and must never be deleted.
pub const NO_IMG: &str = "no-img.png";

/// Local-disk object store for profile images. Files are public under
/// `base_url`, so the stored URL can be denormalized straight into scream
/// and comment rows.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    base_url: String,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create image directory {}", root.display()))?;
        Ok(Self {
            root,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    pub fn placeholder_url(&self) -> String {
        format!("{}/{}", self.base_url, NO_IMG)
    }

    pub fn is_placeholder(&self, url: &str) -> bool {
        url.ends_with(NO_IMG)
    }

    /// Stores the bytes under a random numeric filename keeping the caller's
    /// extension and returns the public URL.
    pub async fn store(&self, extension: &str, bytes: &[u8]) -> Result<String> {
        let extension: String = extension
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(8)
            .collect();
        let extension = if extension.is_empty() {
            "png".to_owned()
        } else {
            extension
        };
        let file_name = format!(
            "{}.{}",
            rand::thread_rng().gen_range(0..1_000_000_000_000u64),
            extension
        );
        tokio::fs::write(self.root.join(&file_name), bytes)
            .await
            .with_context(|| format!("Failed to write image {file_name}"))?;
        Ok(format!("{}/{}", self.base_url, file_name))
    }

    /// Deletes the file a previously issued URL points at. Missing files are
    /// fine, the URL may have been propagated before a crash wiped the disk.
    pub async fn delete_by_url(&self, url: &str) -> Result<()> {
        let file_name = match url.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => return Ok(()),
        };
        match tokio::fs::remove_file(self.root.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete image {file_name}")),
        }
    }
}
