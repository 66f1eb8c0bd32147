//! The typed entities handed out by [`HnApi`](crate::HnApi).
//!
//! Cross references between entities (authors, replies, parents, poll options) are not fetched
//! with the entity. They are exposed as [`Element`]s and [`List`]s that resolve on demand.

use chrono::{DateTime, Utc};

pub use hnapi_sources::{ItemId, ItemKind, Username};

use crate::error::Error;
use crate::lazy::{Element, List};

/// A lazily fetched [`Item`].
pub type ItemElement = Element<Item, ItemId>;
/// A lazily fetched [`User`].
pub type UserElement = Element<User, Username>;
/// A lazily fetched, paginated list of [`Item`]s.
pub type Items = List<Item, ItemId>;
/// A lazily fetched, paginated list of [`User`]s.
pub type Users = List<User, Username>;

/// A story, including "Ask" and "Show" posts.
#[derive(Clone, Debug)]
pub struct Story {
    pub id: ItemId,
    pub by: UserElement,
    pub created_at: DateTime<Utc>,
    pub dead: bool,
    pub title: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
    pub score: u64,
    /// The total number of comments below this story.
    pub descendants: u64,
    /// The direct comments, in ranked display order.
    pub kids: Items,
}

/// A comment on a story, poll or another comment.
#[derive(Clone, Debug)]
pub struct Comment {
    pub id: ItemId,
    pub by: UserElement,
    pub created_at: DateTime<Utc>,
    pub dead: bool,
    pub text: Option<String>,
    /// The item this comment replies to.
    pub parent: ItemElement,
    /// The direct replies, in ranked display order.
    pub kids: Items,
}

/// A job posting.
#[derive(Clone, Debug)]
pub struct Job {
    pub id: ItemId,
    pub by: UserElement,
    pub created_at: DateTime<Utc>,
    pub dead: bool,
    pub title: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
    pub score: u64,
}

/// A poll.
#[derive(Clone, Debug)]
pub struct Poll {
    pub id: ItemId,
    pub by: UserElement,
    pub created_at: DateTime<Utc>,
    pub dead: bool,
    pub title: Option<String>,
    pub text: Option<String>,
    pub score: u64,
    pub descendants: u64,
    pub kids: Items,
    /// The options of this poll, in display order.
    pub parts: Items,
}

/// A single option of a [`Poll`].
#[derive(Clone, Debug)]
pub struct PollOption {
    pub id: ItemId,
    pub by: UserElement,
    pub created_at: DateTime<Utc>,
    pub dead: bool,
    pub text: Option<String>,
    pub score: u64,
    /// The poll this option belongs to.
    pub poll: ItemElement,
}

/// What remains of a deleted item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tombstone {
    pub id: ItemId,
    /// The kind of the item before it was deleted.
    pub kind: ItemKind,
    pub created_at: DateTime<Utc>,
    pub dead: bool,
}

/// Any item.
#[derive(Clone, Debug)]
pub enum Item {
    Story(Story),
    Comment(Comment),
    Job(Job),
    Poll(Poll),
    PollOption(PollOption),
    /// A deleted item of any kind.
    Tombstone(Tombstone),
}

impl Item {
    pub fn id(&self) -> ItemId {
        match self {
            Self::Story(story) => story.id,
            Self::Comment(comment) => comment.id,
            Self::Job(job) => job.id,
            Self::Poll(poll) => poll.id,
            Self::PollOption(option) => option.id,
            Self::Tombstone(tombstone) => tombstone.id,
        }
    }

    /// The kind of this item. For tombstones, this is the kind of the deleted item.
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Story(_) => ItemKind::Story,
            Self::Comment(_) => ItemKind::Comment,
            Self::Job(_) => ItemKind::Job,
            Self::Poll(_) => ItemKind::Poll,
            Self::PollOption(_) => ItemKind::PollOption,
            Self::Tombstone(tombstone) => tombstone.kind,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Story(story) => story.created_at,
            Self::Comment(comment) => comment.created_at,
            Self::Job(job) => job.created_at,
            Self::Poll(poll) => poll.created_at,
            Self::PollOption(option) => option.created_at,
            Self::Tombstone(tombstone) => tombstone.created_at,
        }
    }

    /// Whether the item was killed by moderation.
    pub fn is_dead(&self) -> bool {
        match self {
            Self::Story(story) => story.dead,
            Self::Comment(comment) => comment.dead,
            Self::Job(job) => job.dead,
            Self::Poll(poll) => poll.dead,
            Self::PollOption(option) => option.dead,
            Self::Tombstone(tombstone) => tombstone.dead,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Tombstone(_))
    }

    /// The author, unless the item was deleted.
    pub fn by(&self) -> Option<&UserElement> {
        match self {
            Self::Story(story) => Some(&story.by),
            Self::Comment(comment) => Some(&comment.by),
            Self::Job(job) => Some(&job.by),
            Self::Poll(poll) => Some(&poll.by),
            Self::PollOption(option) => Some(&option.by),
            Self::Tombstone(_) => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Story(Story { title, .. })
            | Self::Job(Job { title, .. })
            | Self::Poll(Poll { title, .. }) => title.as_deref(),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<u64> {
        match self {
            Self::Story(Story { score, .. })
            | Self::Job(Job { score, .. })
            | Self::Poll(Poll { score, .. })
            | Self::PollOption(PollOption { score, .. }) => Some(*score),
            _ => None,
        }
    }

    /// Describes this item for error messages, like "a story" or "a deleted comment".
    fn describe(&self) -> String {
        match self {
            Self::Tombstone(tombstone) => format!("a deleted {}", tombstone.kind),
            item => format!("a {}", item.kind()),
        }
    }
}

/// A user profile.
#[derive(Clone, Debug)]
pub struct User {
    pub username: Username,
    pub created_at: DateTime<Utc>,
    /// The self-description, as HTML.
    pub about: Option<String>,
    pub karma: u64,
    /// Everything the user submitted, newest first.
    pub submitted: Items,
}

fn unexpected(expected: ItemKind) -> impl Fn(&Item) -> Error + Send + Sync + 'static {
    move |item| Error::Rejected(format!("expected a {expected}, found {}", item.describe()))
}

impl ItemElement {
    /// Narrows this element to a [`Story`].
    pub fn story(&self) -> Element<Story, ItemId> {
        self.narrow(
            |item| match item {
                Item::Story(story) => Ok(story),
                other => Err(other),
            },
            unexpected(ItemKind::Story),
        )
    }

    /// Narrows this element to a [`Comment`].
    pub fn comment(&self) -> Element<Comment, ItemId> {
        self.narrow(
            |item| match item {
                Item::Comment(comment) => Ok(comment),
                other => Err(other),
            },
            unexpected(ItemKind::Comment),
        )
    }

    /// Narrows this element to a [`Job`].
    pub fn job(&self) -> Element<Job, ItemId> {
        self.narrow(
            |item| match item {
                Item::Job(job) => Ok(job),
                other => Err(other),
            },
            unexpected(ItemKind::Job),
        )
    }

    /// Narrows this element to a [`Poll`].
    pub fn poll(&self) -> Element<Poll, ItemId> {
        self.narrow(
            |item| match item {
                Item::Poll(poll) => Ok(poll),
                other => Err(other),
            },
            unexpected(ItemKind::Poll),
        )
    }

    /// Narrows this element to a [`PollOption`].
    pub fn poll_option(&self) -> Element<PollOption, ItemId> {
        self.narrow(
            |item| match item {
                Item::PollOption(option) => Ok(option),
                other => Err(other),
            },
            unexpected(ItemKind::PollOption),
        )
    }

    /// Passes the item through unless it was deleted.
    pub fn live(&self) -> Self {
        self.ensure_or(
            |item| !item.is_deleted(),
            |item| Error::Rejected(format!("item {} was deleted", item.id())),
        )
    }
}
