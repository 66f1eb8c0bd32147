//! Exposes the command line application.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hnapi_service::config::Config;
use hnapi_service::lazy::Page;
use hnapi_service::types::{Item, Items, Username};
use hnapi_service::{HnApi, metrics};
use hnapi_sources::{ItemId, StoryList};
use tracing::level_filters::LevelFilter;

use crate::output::{self, ItemSummary, OutputFormat, UserSummary};
use crate::{logging, scan};

/// The name of the configuration file looked up in the user's config directory.
pub const CONFIG_FILE_NAME: &str = "hnapi/config.yml";

/// The lists that can be browsed with `hncli stories`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListName {
    Top,
    New,
    Best,
    Ask,
    Show,
    Job,
    /// Every item ever posted, newest first.
    All,
    /// Items that changed recently.
    Changed,
}

/// hncli commands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Print one page of a list of stories.
    Stories(StoriesArgs),

    /// Print a single item.
    Item {
        /// The id of the item.
        id: ItemId,
    },

    /// Print a user profile and the first page of their submissions.
    User {
        /// The username.
        name: Username,
    },

    /// Fetch a range of items one by one, and record the ids that fail to fetch or decode.
    Scan(scan::ScanArgs),
}

#[derive(Debug, Args)]
struct StoriesArgs {
    /// The list to print.
    #[arg(value_enum, default_value = "top")]
    list: ListName,

    /// The page to print, starting at 1.
    #[arg(long, short, default_value_t = 1)]
    page: usize,

    /// The number of stories per page. Defaults to `page_size` from the configuration.
    #[arg(long)]
    page_size: Option<usize>,
}

/// A command line client for the Hacker News API.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to your configuration file.
    ///
    /// Defaults to `hnapi/config.yml` in the user's config directory, if it exists.
    #[arg(long, short, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// The severity level of logging output, overriding the configuration.
    ///
    /// Possible values:
    /// off, error, warn, info, debug, trace
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,

    /// The output format.
    #[arg(long, value_enum, global = true, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Returns the path to the configuration file.
    fn config(&self) -> Option<PathBuf> {
        self.config.clone().or_else(find_global_config_file)
    }
}

/// Returns the configuration file in the user's config directory, if there is one.
fn find_global_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

/// Runs the main application.
pub async fn execute() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::get(cli.config().as_deref()).context("failed loading config")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    logging::init_logging(&config);
    if let Some(ref statsd) = config.metrics.statsd {
        metrics::configure_statsd(
            &config.metrics.prefix,
            statsd.as_str(),
            config.metrics.custom_tags.clone(),
        )?;
    }

    match cli.command {
        Command::Stories(args) => print_stories(&config, args, cli.format).await,
        Command::Item { id } => print_item(&config, id, cli.format).await,
        Command::User { name } => print_user(&config, name, cli.format).await,
        Command::Scan(args) => scan::run(&config, args).await,
    }
}

fn create_api(config: &Config) -> Result<HnApi> {
    HnApi::from_config(config).context("failed to create the API client")
}

fn list(api: &HnApi, name: ListName) -> Items {
    match name {
        ListName::Top => api.stories(StoryList::Top),
        ListName::New => api.stories(StoryList::New),
        ListName::Best => api.stories(StoryList::Best),
        ListName::Ask => api.stories(StoryList::Ask),
        ListName::Show => api.stories(StoryList::Show),
        ListName::Job => api.stories(StoryList::Job),
        ListName::All => api.all_items(),
        ListName::Changed => api.changed_items(),
    }
}

/// Fetches the current page of `items` as summaries.
async fn fetch_summaries(items: &Items) -> Result<Page<ItemSummary>> {
    let page = items
        .and_then(|item: Item| ItemSummary::resolve(item))
        .fetch()
        .await?;
    Ok(page)
}

async fn print_stories(config: &Config, args: StoriesArgs, format: OutputFormat) -> Result<()> {
    let api = create_api(config)?;
    let mut items = list(&api, args.list).set_page(args.page)?;
    if let Some(page_size) = args.page_size {
        items = items.set_page_size(page_size)?;
    }

    tracing::debug!(list = ?args.list, page = args.page, "Fetching stories");
    let page = fetch_summaries(&items)
        .await
        .with_context(|| format!("failed to fetch page {} of {:?}", args.page, args.list))?;
    output::print_page(&page, format)
}

async fn print_item(config: &Config, id: ItemId, format: OutputFormat) -> Result<()> {
    let api = create_api(config)?;
    let item = api
        .item(id)
        .fetch()
        .await
        .with_context(|| format!("failed to fetch item {id}"))?;
    let summary = ItemSummary::resolve(item).await?;
    output::print_item(&summary, format)
}

async fn print_user(config: &Config, name: Username, format: OutputFormat) -> Result<()> {
    let api = create_api(config)?;
    let user = api
        .user(name.as_str())
        .fetch()
        .await
        .with_context(|| format!("failed to fetch user {name}"))?;
    let submitted = fetch_summaries(&user.submitted)
        .await
        .with_context(|| format!("failed to fetch the submissions of {name}"))?;
    output::print_user(&UserSummary::new(&user, submitted), format)
}
