//! URL collection for purge events
//!
//! Turns a [`PurgeEvent`] into the absolute URLs the CDN has to evict. Thumbnail
//! and file URLs handed over by the host may be relative to the wiki; those are
//! joined onto the upload host (or the server URL) here.

use crate::models::{Config, FileFacts, PageFacts, PurgeEvent, TitleFacts};
use url::Url;

#[derive(Debug, Clone)]
pub struct UrlCollector {
    base: String,
}

impl UrlCollector {
    /// `server` is the wiki's base URL; `upload_path` is where uploads are
    /// served from, either a path on the server or an absolute URL.
    pub fn new(server: &str, upload_path: &str) -> Self {
        let base = match parse_with_host(upload_path) {
            Some(url) => upload_base(upload_path, &url),
            None => server.to_string(),
        };

        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.server, &config.upload_path)
    }

    /// Base that relative URLs are joined onto.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn collect(&self, event: &PurgeEvent) -> Vec<String> {
        match event {
            PurgeEvent::FileThumbnailsPurged { file, .. } => self.file_urls(file),
            PurgeEvent::TitlePurged { title, urls } => Self::title_urls(title, urls),
            PurgeEvent::ArticlePurged { page } => self.page_urls(page),
        }
    }

    /// Every thumbnail URL of `file` followed by the file's own URL.
    pub fn file_urls(&self, file: &FileFacts) -> Vec<String> {
        file.thumbnails
            .iter()
            .map(|thumb| self.absolutize(&thumb.url))
            .chain(std::iter::once(self.absolutize(&file.url)))
            .collect()
    }

    /// Make `candidate` absolute unless it already names a host.
    pub fn absolutize(&self, candidate: &str) -> String {
        if has_host(candidate) {
            candidate.to_string()
        } else {
            format!("{}/{}", self.base, candidate.trim_start_matches('/'))
        }
    }

    fn title_urls(title: &TitleFacts, urls: &[String]) -> Vec<String> {
        if title.is_file() {
            urls.to_vec()
        } else {
            Vec::new()
        }
    }

    fn page_urls(&self, page: &PageFacts) -> Vec<String> {
        if page.is_file_page() {
            return match &page.file {
                Some(file) => self.file_urls(file),
                None => {
                    tracing::debug!("File page without a resolvable file, nothing to purge");
                    Vec::new()
                }
            };
        }

        if page.title.is_none() {
            return Vec::new();
        }

        page.source_url.iter().cloned().collect()
    }
}

fn parse_with_host(candidate: &str) -> Option<Url> {
    // Protocol-relative URLs carry a host but no scheme. Three or more slashes
    // is an absolute path, not an empty authority.
    if candidate.starts_with("///") {
        return None;
    }

    let parsed = if candidate.starts_with("//") {
        Url::parse(&format!("http:{}", candidate))
    } else {
        Url::parse(candidate)
    };

    parsed
        .ok()
        .filter(|url| url.host_str().is_some_and(|host| !host.is_empty()))
}

/// Origin of an absolute upload path. A protocol-relative path keeps
/// inheriting the page's scheme.
fn upload_base(upload_path: &str, url: &Url) -> String {
    let origin = url.origin().ascii_serialization();
    if upload_path.starts_with("//") {
        match origin.strip_prefix("http:") {
            Some(rest) => rest.to_string(),
            None => origin,
        }
    } else {
        origin
    }
}

fn has_host(candidate: &str) -> bool {
    parse_with_host(candidate).is_some()
}
