use super::PurgeService;
use crate::models::{CdnCredentials, PurgeOutcome, PurgeRequest, SkipReason};
use tracing::{debug, info, warn};

/// Sends at most one purge per call and turns every failure into an outcome.
pub struct Dispatcher {
    credentials: CdnCredentials,
    transport: Box<dyn PurgeService>,
}

impl Dispatcher {
    pub fn new(credentials: CdnCredentials, transport: Box<dyn PurgeService>) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    pub fn credentials(&self) -> &CdnCredentials {
        &self.credentials
    }

    pub async fn dispatch(&self, urls: &[String]) -> PurgeOutcome {
        if !self.credentials.is_complete() {
            debug!("Cloudflare credentials incomplete, skipping purge");
            return PurgeOutcome::Skipped(SkipReason::MissingCredentials);
        }

        if urls.is_empty() {
            debug!("No URLs to purge");
            return PurgeOutcome::Skipped(SkipReason::NoUrls);
        }

        let request = PurgeRequest::new(urls.to_vec());

        match self.transport.purge(&self.credentials, &request).await {
            Ok(()) => {
                info!("Purged {} URL(s) from Cloudflare", urls.len());
                PurgeOutcome::Success
            }
            Err(e) => {
                warn!("Cloudflare purge of {} URL(s) failed: {}", urls.len(), e);
                PurgeOutcome::Failure {
                    message: e.to_string(),
                }
            }
        }
    }
}
