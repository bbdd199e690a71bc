//! Purge orchestration for wiki events.

use crate::cdn::{CloudflareClient, Dispatcher, MockPurgeClient, PurgeService};
use crate::collector::UrlCollector;
use crate::models::{CdnCredentials, Config, PurgeEvent, PurgeOutcome};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Handles purge events: collects URLs and dispatches them to the CDN.
pub struct Purger {
    collector: UrlCollector,
    dispatcher: Dispatcher,
}

/// Injectable service bundle used to construct [`Purger`] in tests/harnesses.
pub struct PurgeServices {
    pub credentials: CdnCredentials,
    pub transport: Box<dyn PurgeService>,
}

impl Purger {
    pub fn with_services(services: PurgeServices, collector: UrlCollector) -> Self {
        Self {
            collector,
            dispatcher: Dispatcher::new(services.credentials, services.transport),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let transport: Box<dyn PurgeService> = if config.dry_run {
            info!("DRY_RUN enabled, purges will be recorded but not sent");
            Box::new(MockPurgeClient::new())
        } else {
            Box::new(CloudflareClient::new().with_base_url(config.api_base.clone()))
        };

        Self::with_services(
            PurgeServices {
                credentials: config.credentials.clone(),
                transport,
            },
            UrlCollector::from_config(config),
        )
    }

    pub fn collector(&self) -> &UrlCollector {
        &self.collector
    }

    /// Purge everything `event` invalidates. One outcome per request sent or
    /// skipped; failures are reported here and never as errors.
    pub async fn handle(&self, event: &PurgeEvent) -> Vec<PurgeOutcome> {
        debug!("Handling {} purge event", event.kind());

        let mut outcomes = vec![self.purge_urls(&self.collector.collect(event)).await];

        // The host's own URL list for a file goes out as a separate request.
        if let PurgeEvent::FileThumbnailsPurged {
            urls, archive_name, ..
        } = event
        {
            if let Some(archive) = archive_name {
                debug!("Purging thumbnails of archived version {}", archive);
            }
            outcomes.push(self.purge_urls(urls).await);
        }

        outcomes
    }

    /// Run [`Purger::handle`] on the runtime without waiting for it.
    pub fn handle_in_background(
        self: &Arc<Self>,
        event: PurgeEvent,
    ) -> JoinHandle<Vec<PurgeOutcome>> {
        let purger = Arc::clone(self);
        tokio::spawn(async move { purger.handle(&event).await })
    }

    pub async fn purge_urls(&self, urls: &[String]) -> PurgeOutcome {
        self.dispatcher.dispatch(urls).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileFacts, SkipReason, ThumbnailSpec, TitleFacts, NS_FILE};
    use pretty_assertions::assert_eq;

    fn purger(mock: &MockPurgeClient) -> Purger {
        Purger::with_services(
            PurgeServices {
                credentials: CdnCredentials::new("zone".into(), "acct".into(), "token".into()),
                transport: Box::new(mock.clone()),
            },
            UrlCollector::new("https://wiki.example", "/images"),
        )
    }

    fn example_file() -> FileFacts {
        FileFacts {
            name: "Example.png".to_string(),
            url: "/images/Example.png".to_string(),
            thumbnails: vec![ThumbnailSpec {
                file: "Example.png".to_string(),
                name: "120px-Example.png".to_string(),
                url: "/images/thumb/120px-Example.png".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_file_event_sends_two_requests() {
        let mock = MockPurgeClient::new();
        let purger = purger(&mock);

        let outcomes = purger
            .handle(&PurgeEvent::FileThumbnailsPurged {
                file: example_file(),
                archive_name: None,
                urls: vec!["https://wiki.example/wiki/File:Example.png".to_string()],
            })
            .await;

        assert_eq!(outcomes, vec![PurgeOutcome::Success, PurgeOutcome::Success]);
        let purges = mock.get_purges();
        assert_eq!(
            purges[0].files,
            vec![
                "https://wiki.example/images/thumb/120px-Example.png",
                "https://wiki.example/images/Example.png",
            ]
        );
        assert_eq!(
            purges[1].files,
            vec!["https://wiki.example/wiki/File:Example.png"]
        );
    }

    #[tokio::test]
    async fn test_file_event_without_host_urls_skips_second_request() {
        let mock = MockPurgeClient::new();
        let purger = purger(&mock);

        let outcomes = purger
            .handle(&PurgeEvent::FileThumbnailsPurged {
                file: example_file(),
                archive_name: Some("20240101000000!Example.png".to_string()),
                urls: Vec::new(),
            })
            .await;

        assert_eq!(
            outcomes,
            vec![
                PurgeOutcome::Success,
                PurgeOutcome::Skipped(SkipReason::NoUrls)
            ]
        );
        assert_eq!(mock.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_file_title_sends_nothing() {
        let mock = MockPurgeClient::new();
        let purger = purger(&mock);

        let outcomes = purger
            .handle(&PurgeEvent::TitlePurged {
                title: TitleFacts::new("Main Page", 0),
                urls: vec!["https://wiki.example/wiki/Main_Page".to_string()],
            })
            .await;

        assert_eq!(outcomes, vec![PurgeOutcome::Skipped(SkipReason::NoUrls)]);
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_does_not_escape() {
        let mock = MockPurgeClient::new().with_failure("503".to_string());
        let purger = purger(&mock);

        let outcomes = purger
            .handle(&PurgeEvent::TitlePurged {
                title: TitleFacts::new("Example.png", NS_FILE),
                urls: vec!["https://wiki.example/wiki/File:Example.png".to_string()],
            })
            .await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_failure());
    }

    #[tokio::test]
    async fn test_handle_in_background() {
        let mock = MockPurgeClient::new();
        let purger = Arc::new(purger(&mock));

        let handle = purger.handle_in_background(PurgeEvent::TitlePurged {
            title: TitleFacts::new("Example.png", NS_FILE),
            urls: vec!["https://wiki.example/a".to_string()],
        });

        let outcomes = handle.await.unwrap();
        assert_eq!(outcomes, vec![PurgeOutcome::Success]);
        assert_eq!(mock.get_call_count(), 1);
    }

    #[test]
    fn test_from_config_dry_run() {
        let config = Config {
            credentials: CdnCredentials::new("zone".into(), "acct".into(), "token".into()),
            server: "https://wiki.example".to_string(),
            upload_path: "https://upload.example/images".to_string(),
            api_base: "https://api.cloudflare.com".to_string(),
            dry_run: true,
        };

        let purger = Purger::from_config(&config);
        assert_eq!(purger.collector().base(), "https://upload.example");
    }
}
