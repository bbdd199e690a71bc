use super::PurgeService;
use crate::models::{CdnCredentials, PurgeRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPurge {
    pub zone_id: String,
    pub files: Vec<String>,
}

/// Transport that records purges instead of sending them. Clones share the
/// same record, so a test can keep one handle after boxing another.
#[derive(Clone)]
pub struct MockPurgeClient {
    purges: Arc<Mutex<Vec<RecordedPurge>>>,
    failure: Option<String>,
}

impl MockPurgeClient {
    pub fn new() -> Self {
        Self {
            purges: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    /// Make every purge fail with `message` (after recording it).
    pub fn with_failure(mut self, message: String) -> Self {
        self.failure = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.purges.lock().unwrap().len()
    }

    pub fn get_purges(&self) -> Vec<RecordedPurge> {
        self.purges.lock().unwrap().clone()
    }
}

impl Default for MockPurgeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PurgeService for MockPurgeClient {
    async fn purge(&self, credentials: &CdnCredentials, request: &PurgeRequest) -> Result<()> {
        self.purges.lock().unwrap().push(RecordedPurge {
            zone_id: credentials.zone_id.clone(),
            files: request.files.clone(),
        });

        match &self.failure {
            Some(message) => Err(Error::Cloudflare(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> CdnCredentials {
        CdnCredentials::new("zone".into(), "acct".into(), "token".into())
    }

    #[tokio::test]
    async fn test_mock_records_purges() {
        let client = MockPurgeClient::new();
        let handle = client.clone();

        client
            .purge(&credentials(), &PurgeRequest::new(vec!["a".to_string()]))
            .await
            .unwrap();

        assert_eq!(handle.get_call_count(), 1);
        assert_eq!(
            handle.get_purges(),
            vec![RecordedPurge {
                zone_id: "zone".to_string(),
                files: vec!["a".to_string()],
            }]
        );
    }

    #[tokio::test]
    async fn test_mock_configured_failure() {
        let client = MockPurgeClient::new().with_failure("boom".to_string());

        let result = client
            .purge(&credentials(), &PurgeRequest::new(vec!["a".to_string()]))
            .await;

        assert!(result.unwrap_err().to_string().contains("boom"));
        assert_eq!(client.get_call_count(), 1);
    }
}
