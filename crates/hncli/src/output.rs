use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use hnapi_service::Error;
use hnapi_service::lazy::Page;
use hnapi_service::types::{Item, User};
use hnapi_sources::{ItemId, ItemKind};
use prettytable::format::consts::FORMAT_CLEAN;
use prettytable::{Table, row};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Outputs the fetched entities as a table.
    Table,
    /// Outputs the fetched entities as JSON.
    Json,
}

/// The printable fields of an item.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemSummary {
    pub id: ItemId,
    pub kind: ItemKind,
    pub by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
    pub dead: bool,
    pub score: Option<u64>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
    pub parent: Option<ItemId>,
}

impl ItemSummary {
    /// Summarizes `item`. This resolves the ids of referenced entities, but not their values.
    pub async fn resolve(item: Item) -> Result<Self, Error> {
        let by = match item.by() {
            Some(by) => Some(by.id().await?),
            None => None,
        };
        let parent = match &item {
            Item::Comment(comment) => Some(comment.parent.id().await?),
            Item::PollOption(option) => Some(option.poll.id().await?),
            _ => None,
        };
        let (url, text) = match &item {
            Item::Story(story) => (story.url.clone(), story.text.clone()),
            Item::Job(job) => (job.url.clone(), job.text.clone()),
            Item::Comment(comment) => (None, comment.text.clone()),
            Item::Poll(poll) => (None, poll.text.clone()),
            Item::PollOption(option) => (None, option.text.clone()),
            Item::Tombstone(_) => (None, None),
        };

        Ok(Self {
            id: item.id(),
            kind: item.kind(),
            by,
            created_at: item.created_at(),
            deleted: item.is_deleted(),
            dead: item.is_dead(),
            score: item.score(),
            title: item.title().map(str::to_owned),
            url,
            text,
            parent,
        })
    }
}

/// The printable fields of a user and their submissions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub karma: u64,
    pub about: Option<String>,
    pub submitted: Page<ItemSummary>,
}

impl UserSummary {
    pub fn new(user: &User, submitted: Page<ItemSummary>) -> Self {
        Self {
            username: user.username.clone(),
            created_at: user.created_at,
            karma: user.karma,
            about: user.about.clone(),
            submitted,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_owned(), |value| value.to_string())
}

fn describe_kind(item: &ItemSummary) -> String {
    match (item.deleted, item.dead) {
        (true, _) => format!("{} (deleted)", item.kind),
        (false, true) => format!("{} (dead)", item.kind),
        (false, false) => item.kind.to_string(),
    }
}

fn page_table(page: &Page<ItemSummary>) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_CLEAN);
    table.set_titles(row![b => "Id", "Kind", "Score", "By", "Title"]);

    for item in &page.elements {
        table.add_row(row![
            r->item.id,
            describe_kind(item),
            r->or_dash(item.score),
            or_dash(item.by.as_deref()),
            or_dash(item.title.as_deref()),
        ]);
    }

    table
}

fn page_footer(page: &Page<ItemSummary>) -> String {
    format!(
        "page {} of {} ({} elements, {} per page)",
        page.page, page.total_pages, page.total_elements, page.page_size
    )
}

/// Prints one page of items.
pub fn print_page(page: &Page<ItemSummary>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(page),
        OutputFormat::Table => {
            page_table(page).printstd();
            println!();
            println!("{}", page_footer(page));
            Ok(())
        }
    }
}

/// Prints a single item as a list of fields.
pub fn print_item(item: &ItemSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(item),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_format(*FORMAT_CLEAN);
            table.add_row(row![b->"Id", item.id]);
            table.add_row(row![b->"Kind", describe_kind(item)]);
            table.add_row(row![b->"By", or_dash(item.by.as_deref())]);
            table.add_row(row![b->"Created", item.created_at.to_rfc3339()]);
            table.add_row(row![b->"Score", or_dash(item.score)]);
            table.add_row(row![b->"Title", or_dash(item.title.as_deref())]);
            table.add_row(row![b->"Url", or_dash(item.url.as_deref())]);
            table.add_row(row![b->"Parent", or_dash(item.parent)]);
            table.printstd();

            if let Some(ref text) = item.text {
                println!();
                println!("{text}");
            }
            Ok(())
        }
    }
}

/// Prints a user profile, followed by a page of their submissions.
pub fn print_user(user: &UserSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(user),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_format(*FORMAT_CLEAN);
            table.add_row(row![b->"User", user.username]);
            table.add_row(row![b->"Created", user.created_at.to_rfc3339()]);
            table.add_row(row![b->"Karma", user.karma]);
            table.add_row(row![b->"About", or_dash(user.about.as_deref())]);
            table.printstd();

            println!();
            print_page(&user.submitted, format)
        }
    }
}
