//! Boundary to the wiki host's file store
//!
//! The host resolves files and enumerates their thumbnails; everything past
//! this boundary works on plain [`FileFacts`].

use crate::models::{FileFacts, ThumbnailSpec};
use std::collections::HashMap;

pub trait FileRepository: Send + Sync {
    /// URL of the original upload, `None` when the file does not exist.
    fn file_url(&self, file: &str) -> Option<String>;

    /// Existing thumbnails of `file`. Unknown files have none.
    fn list_thumbnails(&self, file: &str) -> Vec<ThumbnailSpec>;
}

impl FileFacts {
    pub fn resolve(repo: &dyn FileRepository, name: &str) -> Option<Self> {
        let url = repo.file_url(name)?;

        Some(Self {
            name: name.to_string(),
            url,
            thumbnails: repo.list_thumbnails(name),
        })
    }
}

struct StoredFile {
    url: String,
    thumbnails: Vec<ThumbnailSpec>,
}

/// In-memory repository, for hosts that hand over file listings up front.
#[derive(Default)]
pub struct StaticFileRepository {
    files: HashMap<String, StoredFile>,
}

impl StaticFileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: &str, url: &str) -> Self {
        self.files.insert(
            name.to_string(),
            StoredFile {
                url: url.to_string(),
                thumbnails: Vec::new(),
            },
        );
        self
    }

    /// Register a thumbnail. `url` is what the host would report for it; the
    /// thumbnail name is its last path segment.
    pub fn with_thumbnail(mut self, file: &str, url: &str) -> Self {
        if let Some(stored) = self.files.get_mut(file) {
            stored.thumbnails.push(ThumbnailSpec {
                file: file.to_string(),
                name: url.rsplit('/').next().unwrap_or(url).to_string(),
                url: url.to_string(),
            });
        } else {
            tracing::warn!("Ignoring thumbnail {} for unknown file {}", url, file);
        }
        self
    }
}

impl FileRepository for StaticFileRepository {
    fn file_url(&self, file: &str) -> Option<String> {
        self.files.get(file).map(|stored| stored.url.clone())
    }

    fn list_thumbnails(&self, file: &str) -> Vec<ThumbnailSpec> {
        self.files
            .get(file)
            .map(|stored| stored.thumbnails.clone())
            .unwrap_or_default()
    }
}
