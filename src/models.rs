//! Data models and structures
//!
//! Defines the purge events delivered by the wiki host, the facts they carry,
//! the CDN request/response payloads, and process configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Namespace id of file description pages on the wiki.
pub const NS_FILE: i32 = 6;

pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com";

#[derive(Clone, PartialEq, Eq)]
pub struct CdnCredentials {
    pub zone_id: String,
    pub account_id: String,
    pub api_token: String,
}

impl CdnCredentials {
    pub fn new(zone_id: String, account_id: String, api_token: String) -> Self {
        Self {
            zone_id,
            account_id,
            api_token,
        }
    }

    /// True when every field needed to authenticate a purge is present.
    pub fn is_complete(&self) -> bool {
        !self.zone_id.is_empty() && !self.account_id.is_empty() && !self.api_token.is_empty()
    }
}

impl fmt::Debug for CdnCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdnCredentials")
            .field("zone_id", &self.zone_id)
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// One thumbnail of an uploaded file, as enumerated by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailSpec {
    pub file: String,
    /// Thumbnail parameter name, e.g. `120px-Example.png`.
    pub name: String,
    /// URL the host derives for this thumbnail; may be relative.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFacts {
    pub name: String,
    pub url: String,
    pub thumbnails: Vec<ThumbnailSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFacts {
    pub text: String,
    pub namespace: i32,
}

impl TitleFacts {
    pub fn new(text: impl Into<String>, namespace: i32) -> Self {
        Self {
            text: text.into(),
            namespace,
        }
    }

    pub fn is_file(&self) -> bool {
        self.namespace == NS_FILE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFacts {
    pub title: Option<TitleFacts>,
    pub source_url: Option<String>,
    pub file: Option<FileFacts>,
}

impl PageFacts {
    /// A page counts as a file page only when its title lives in the file
    /// namespace. The file itself may still be missing.
    pub fn is_file_page(&self) -> bool {
        self.title.as_ref().is_some_and(TitleFacts::is_file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeEvent {
    FileThumbnailsPurged {
        file: FileFacts,
        /// Name of an old file version, `None` for the current one.
        archive_name: Option<String>,
        /// URLs the host already scheduled for purging.
        urls: Vec<String>,
    },
    TitlePurged {
        title: TitleFacts,
        urls: Vec<String>,
    },
    ArticlePurged {
        page: PageFacts,
    },
}

impl PurgeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            PurgeEvent::FileThumbnailsPurged { .. } => "file_thumbnails",
            PurgeEvent::TitlePurged { .. } => "title",
            PurgeEvent::ArticlePurged { .. } => "article",
        }
    }
}

// Cloudflare API Request/Response models
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PurgeRequest {
    pub files: Vec<String>,
}

impl PurgeRequest {
    pub fn new(files: Vec<String>) -> Self {
        Self { files }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingCredentials,
    NoUrls,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeOutcome {
    Skipped(SkipReason),
    Success,
    Failure { message: String },
}

impl PurgeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PurgeOutcome::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, PurgeOutcome::Failure { .. })
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: CdnCredentials,
    pub server: String,
    pub upload_path: String,
    pub api_base: String,
    pub dry_run: bool,
}

impl Config {
    /// Load configuration from the environment (and `.env` when present).
    ///
    /// Missing Cloudflare credentials are not an error: they leave the
    /// corresponding field empty, which disables dispatch.
    pub fn from_env() -> crate::Result<Self> {
        tolerate_missing(dotenvy::dotenv().map(|_| ()))?;

        let dry_run = match std::env::var("DRY_RUN") {
            Ok(value) => parse_flag(&value).ok_or_else(|| {
                crate::Error::Config(format!("DRY_RUN must be true/false, got '{}'", value))
            })?,
            Err(_) => false,
        };

        Ok(Self {
            credentials: CdnCredentials::new(
                std::env::var("CLOUDFLARE_ZONE_ID").unwrap_or_default(),
                std::env::var("CLOUDFLARE_ACCOUNT_ID").unwrap_or_default(),
                std::env::var("CLOUDFLARE_API_TOKEN").unwrap_or_default(),
            ),
            server: std::env::var("WIKI_SERVER")
                .unwrap_or_else(|_| "http://localhost".to_string()),
            upload_path: std::env::var("WIKI_UPLOAD_PATH")
                .unwrap_or_else(|_| "/images".to_string()),
            api_base: std::env::var("CLOUDFLARE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            dry_run,
        })
    }
}

/// Load variables from an env file. A missing file is fine; a malformed one
/// is an error.
pub fn load_env_file(path: &Path) -> crate::Result<()> {
    tolerate_missing(dotenvy::from_path(path))
}

fn tolerate_missing(result: std::result::Result<(), dotenvy::Error>) -> crate::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}
