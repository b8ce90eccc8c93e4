//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::BeatSaver;
use crate::config::ClientOptions;
use crate::error::{Error, Result, ResultExt};
use crate::http::{FetchOptions, ProgressSink};
use crate::models::{Beatmap, User};
use crate::pagination::{Page, PageType};
use futures::TryStreamExt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Application name sent when no config file names one
const CLI_APP_NAME: &str = "beatsaver-cli";

/// CLI runner
pub struct Runner {
    cli: Cli,
    cancel: CancellationToken,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that aborts in-flight requests when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = BeatSaver::new(self.client_options()?)?;

        match &self.cli.command {
            Commands::List {
                kind,
                page,
                all,
                limit,
            } => {
                let kind = PageType::from(*kind);
                if *all {
                    self.list_all(&client, kind, *limit).await
                } else {
                    let page = client
                        .listing_page(kind, *page, self.fetch_options())
                        .await?;
                    self.print_page(&page)
                }
            }
            Commands::Search {
                query,
                advanced,
                page,
            } => {
                let page = client
                    .search_with(query, *advanced, *page, self.fetch_options())
                    .await?;
                self.print_page(&page)
            }
            Commands::Map { key } => {
                let map = client
                    .beatmap_by_key_with(key, self.fetch_options())
                    .await?
                    .ok_or_else(|| Error::Other(format!("No map with key {key}")))?;
                println!("{}", render_map(self.cli.format, &map)?);
                Ok(())
            }
            Commands::Hash { hash } => {
                let map = client
                    .beatmap_by_hash_with(hash, self.fetch_options())
                    .await?
                    .ok_or_else(|| Error::Other(format!("No map with hash {hash}")))?;
                println!("{}", render_map(self.cli.format, &map)?);
                Ok(())
            }
            Commands::User { id, maps, page } => {
                let user = client
                    .user_with(id, self.fetch_options())
                    .await?
                    .ok_or_else(|| Error::Other(format!("No user with id {id}")))?;
                println!("{}", render_user(self.cli.format, &user)?);

                if *maps {
                    let uploads = user.beatmaps_with(*page, self.fetch_options()).await?;
                    self.print_page(&uploads)?;
                }
                Ok(())
            }
        }
    }

    /// Resolve client options from the config file and flags
    pub fn client_options(&self) -> Result<ClientOptions> {
        let mut options = match &self.cli.config {
            Some(path) => ClientOptions::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => ClientOptions::new(CLI_APP_NAME, crate::VERSION),
        };

        if let Some(base_url) = &self.cli.base_url {
            options.base_url.clone_from(base_url);
        }
        if let Some(secs) = self.cli.timeout {
            options.timeout = Duration::from_secs(secs);
        }
        if self.cli.no_rate_limit_handling {
            options.handle_rate_limits = false;
        }

        Ok(options)
    }

    fn fetch_options(&self) -> FetchOptions {
        let options = FetchOptions::new().cancel_token(self.cancel.clone());
        if self.cli.verbose {
            options.progress(ProgressSink::new(|value| {
                debug!("Download progress: {:.0}%", value * 100.0);
            }))
        } else {
            options
        }
    }

    async fn list_all(&self, client: &BeatSaver, kind: PageType, limit: Option<usize>) -> Result<()> {
        let mut docs = client.listing(kind).with_options(self.fetch_options()).docs();
        let mut count = 0usize;

        while let Some(map) = docs.try_next().await? {
            println!("{}", render_map(self.cli.format, &map)?);
            count += 1;
            if limit.is_some_and(|limit| count >= limit) {
                break;
            }
        }

        info!("Listed {count} maps from {kind}");
        Ok(())
    }

    fn print_page(&self, page: &Page) -> Result<()> {
        for map in &page.docs {
            println!("{}", render_map(self.cli.format, map)?);
        }
        info!("{}", page_summary(page));
        Ok(())
    }
}

/// One-line position summary, with 1-based page numbers
pub fn page_summary(page: &Page) -> String {
    let current = page.prev_page.map_or(0, |p| p + 1);
    format!(
        "{} page {} of {} ({} maps total)",
        page.base_path(),
        current + 1,
        page.last_page + 1,
        page.total_docs
    )
}

/// Render one map for output
pub fn render_map(format: OutputFormat, map: &Beatmap) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(map)?),
        OutputFormat::Pretty => {
            let uploader = map.uploader.as_ref().map_or("?", |u| u.username.as_str());
            Ok(format!(
                "{:<8} {} [{}] by {} ({} downloads, {:.0}% rating)",
                map.key,
                map.name,
                map.metadata.song_author_name,
                uploader,
                map.stats.downloads,
                map.stats.rating * 100.0
            ))
        }
    }
}

/// Render one user for output
pub fn render_user(format: OutputFormat, user: &User) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(user)?),
        OutputFormat::Pretty => Ok(format!("{} ({})", user.username, user.id)),
    }
}
