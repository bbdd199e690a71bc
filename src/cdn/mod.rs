//! CDN integration for cache purging
//!
//! Sends purge requests to Cloudflare. Transports implement [`PurgeService`];
//! the [`Dispatcher`] guards them so that incomplete configuration or an empty
//! URL list never reaches the network and failures never reach the caller.

pub mod client;
pub mod dispatcher;
pub mod mock;

pub use client::CloudflareClient;
pub use dispatcher::Dispatcher;
pub use mock::{MockPurgeClient, RecordedPurge};

use crate::models::{CdnCredentials, PurgeRequest};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PurgeService: Send + Sync {
    async fn purge(&self, credentials: &CdnCredentials, request: &PurgeRequest) -> Result<()>;
}
