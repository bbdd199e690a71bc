use anyhow::Result;
use clap::{Parser, Subcommand};
use cloudflare_purge::app::Purger;
use cloudflare_purge::host::StaticFileRepository;
use cloudflare_purge::models::{
    Config, FileFacts, PageFacts, PurgeEvent, PurgeOutcome, TitleFacts,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CLI_FILE_NAME: &str = "cli-file";

#[derive(Debug, Parser)]
#[command(name = "cloudflare-purge")]
#[command(about = "Purge wiki URLs from the Cloudflare cache")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Purge the given URLs as-is.
    Urls {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Purge a file and its thumbnails.
    File {
        /// URL of the original upload (relative or absolute).
        #[arg(long)]
        url: String,
        #[arg(long = "thumb")]
        thumbs: Vec<String>,
        /// Extra URLs purged as a separate request.
        #[arg(long = "extra")]
        extra: Vec<String>,
        #[arg(long)]
        archive_name: Option<String>,
    },
    /// Purge URLs attached to a title; only file-namespace titles are purged.
    Title {
        #[arg(long, default_value_t = 0)]
        namespace: i32,
        #[arg(long, default_value = "")]
        title: String,
        urls: Vec<String>,
    },
    /// Purge a page, or a file page with its thumbnails.
    Page {
        #[arg(long, default_value_t = 0)]
        namespace: i32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        source_url: Option<String>,
        #[arg(long)]
        file_url: Option<String>,
        #[arg(long = "thumb")]
        thumbs: Vec<String>,
    },
}

fn file_facts(url: Option<&str>, thumbs: &[String]) -> Option<FileFacts> {
    let repo = thumbs.iter().fold(
        StaticFileRepository::new().with_file(CLI_FILE_NAME, url?),
        |repo, thumb| repo.with_thumbnail(CLI_FILE_NAME, thumb),
    );
    FileFacts::resolve(&repo, CLI_FILE_NAME)
}

fn build_event(command: Command) -> Option<PurgeEvent> {
    match command {
        Command::Urls { .. } => None,
        Command::File {
            url,
            thumbs,
            extra,
            archive_name,
        } => file_facts(Some(&url), &thumbs).map(|file| PurgeEvent::FileThumbnailsPurged {
            file,
            archive_name,
            urls: extra,
        }),
        Command::Title {
            namespace,
            title,
            urls,
        } => Some(PurgeEvent::TitlePurged {
            title: TitleFacts::new(title, namespace),
            urls,
        }),
        Command::Page {
            namespace,
            title,
            source_url,
            file_url,
            thumbs,
        } => Some(PurgeEvent::ArticlePurged {
            page: PageFacts {
                title: title.map(|text| TitleFacts::new(text, namespace)),
                source_url,
                file: file_facts(file_url.as_deref(), &thumbs),
            },
        }),
    }
}

fn report(outcome: &PurgeOutcome) {
    match outcome {
        PurgeOutcome::Success => info!("Purge succeeded"),
        PurgeOutcome::Skipped(reason) => info!("Purge skipped: {:?}", reason),
        PurgeOutcome::Failure { message } => warn!("Purge failed: {}", message),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloudflare_purge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let purger = Purger::from_config(&config);

    let outcomes = match args.command {
        Command::Urls { urls } => vec![purger.purge_urls(&urls).await],
        command => match build_event(command) {
            Some(event) => purger.handle(&event).await,
            None => Vec::new(),
        },
    };

    outcomes.iter().for_each(report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudflare_purge::models::NS_FILE;

    #[test]
    fn test_parse_file_command() {
        let args = CliArgs::try_parse_from([
            "cloudflare-purge",
            "file",
            "--url",
            "/images/Foo.png",
            "--thumb",
            "/images/thumb/60px-Foo.png",
            "--thumb",
            "/images/thumb/120px-Foo.png",
        ])
        .unwrap();

        match build_event(args.command) {
            Some(PurgeEvent::FileThumbnailsPurged { file, urls, .. }) => {
                assert_eq!(file.url, "/images/Foo.png");
                assert_eq!(file.thumbnails.len(), 2);
                assert_eq!(file.thumbnails[1].name, "120px-Foo.png");
                assert!(urls.is_empty());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_parse_page_command_without_file() {
        let args = CliArgs::try_parse_from([
            "cloudflare-purge",
            "page",
            "--namespace",
            "6",
            "--title",
            "Foo.png",
        ])
        .unwrap();

        match build_event(args.command) {
            Some(PurgeEvent::ArticlePurged { page }) => {
                assert_eq!(page.title.unwrap().namespace, NS_FILE);
                assert!(page.file.is_none());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_urls_command_requires_urls() {
        assert!(CliArgs::try_parse_from(["cloudflare-purge", "urls"]).is_err());
    }
}
