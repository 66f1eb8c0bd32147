use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{ItemId, ItemKind, Username};

/// Fields shared by every kind of item.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawHeader {
    /// The item's unique id.
    pub id: ItemId,
    /// The username of the item's author.
    ///
    /// Only deleted items are expected to omit this.
    #[serde(default)]
    pub by: Option<Username>,
    /// Creation date of the item.
    #[serde(deserialize_with = "crate::de::timestamp")]
    pub time: DateTime<Utc>,
    /// Whether the item was deleted.
    #[serde(default, deserialize_with = "crate::de::flag")]
    pub deleted: bool,
    /// Whether the item was killed by moderation.
    #[serde(default, deserialize_with = "crate::de::flag")]
    pub dead: bool,
    /// The text body, as HTML.
    #[serde(default)]
    pub text: Option<String>,
    /// The linked url.
    #[serde(default)]
    pub url: Option<String>,
}

/// A raw job posting.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawJob {
    /// Fields shared by all kinds.
    #[serde(flatten)]
    pub header: RawHeader,
    /// The number of votes.
    #[serde(default)]
    pub score: u64,
    /// The title, as HTML.
    #[serde(default)]
    pub title: Option<String>,
}

/// A raw story.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawStory {
    /// Fields shared by all kinds.
    #[serde(flatten)]
    pub header: RawHeader,
    /// The total comment count of the story.
    #[serde(default)]
    pub descendants: u64,
    /// Ids of the direct comments, in ranked display order.
    #[serde(default)]
    pub kids: Vec<ItemId>,
    /// The number of votes.
    #[serde(default)]
    pub score: u64,
    /// The title, as HTML.
    #[serde(default)]
    pub title: Option<String>,
}

/// A raw comment.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawComment {
    /// Fields shared by all kinds.
    #[serde(flatten)]
    pub header: RawHeader,
    /// Ids of the direct replies, in ranked display order.
    #[serde(default)]
    pub kids: Vec<ItemId>,
    /// The comment's parent, either another comment or the story.
    pub parent: ItemId,
}

/// A raw poll.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawPoll {
    /// Fields shared by all kinds.
    #[serde(flatten)]
    pub header: RawHeader,
    /// The total comment count of the poll.
    #[serde(default)]
    pub descendants: u64,
    /// Ids of the direct comments, in ranked display order.
    #[serde(default)]
    pub kids: Vec<ItemId>,
    /// Ids of the poll options, in display order.
    pub parts: Vec<ItemId>,
    /// The number of votes.
    #[serde(default)]
    pub score: u64,
    /// The title, as HTML.
    #[serde(default)]
    pub title: Option<String>,
}

/// A raw poll option.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawPollOption {
    /// Fields shared by all kinds.
    #[serde(flatten)]
    pub header: RawHeader,
    /// The poll this option belongs to.
    pub poll: ItemId,
    /// The number of votes.
    #[serde(default)]
    pub score: u64,
}

/// Any item record, discriminated by its `type` field.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawItem {
    /// A job posting.
    Job(RawJob),
    /// A story.
    Story(RawStory),
    /// A comment.
    Comment(RawComment),
    /// A poll.
    Poll(RawPoll),
    /// A poll option.
    #[serde(rename = "pollopt")]
    PollOption(RawPollOption),
}

impl RawItem {
    /// The discriminant of this record.
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Job(_) => ItemKind::Job,
            Self::Story(_) => ItemKind::Story,
            Self::Comment(_) => ItemKind::Comment,
            Self::Poll(_) => ItemKind::Poll,
            Self::PollOption(_) => ItemKind::PollOption,
        }
    }

    /// The fields shared by all kinds.
    pub fn header(&self) -> &RawHeader {
        match self {
            Self::Job(job) => &job.header,
            Self::Story(story) => &story.header,
            Self::Comment(comment) => &comment.header,
            Self::Poll(poll) => &poll.header,
            Self::PollOption(option) => &option.header,
        }
    }

    /// The item's id.
    pub fn id(&self) -> ItemId {
        self.header().id
    }
}

/// A raw user profile.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawUser {
    /// The username.
    pub id: Username,
    /// Creation date of the account.
    #[serde(deserialize_with = "crate::de::timestamp")]
    pub created: DateTime<Utc>,
    /// The self-description, as HTML.
    #[serde(default)]
    pub about: Option<String>,
    /// The user's karma.
    pub karma: u64,
    /// Ids of everything the user submitted, newest first.
    #[serde(default)]
    pub submitted: Vec<ItemId>,
}

/// The items and profiles that changed recently.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawUpdates {
    /// Ids of changed items.
    pub items: Vec<ItemId>,
    /// Usernames of changed profiles.
    pub profiles: Vec<Username>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_story() {
        let raw = json!({
            "by": "dhouston",
            "descendants": 71,
            "id": 8863,
            "kids": [8952, 9224],
            "score": 111,
            "time": 1175714200,
            "title": "My YC app: Dropbox - Throw away your USB drive",
            "type": "story",
            "url": "http://www.getdropbox.com/u/2/screencast.html"
        });
        let item: RawItem = serde_json::from_value(raw).unwrap();

        assert_eq!(item.kind(), ItemKind::Story);
        let RawItem::Story(story) = item else {
            panic!("expected a story");
        };
        assert_eq!(story.header.id, 8863);
        assert_eq!(story.header.by.as_deref(), Some("dhouston"));
        assert_eq!(story.header.time.timestamp(), 1175714200);
        assert_eq!(story.kids, vec![8952, 9224]);
        assert_eq!(story.descendants, 71);
        assert!(!story.header.deleted);
    }

    #[test]
    fn test_comment_defaults() {
        let raw = json!({
            "id": 2921983,
            "parent": 2921506,
            "time": 1314211127,
            "type": "comment",
            "deleted": 1
        });
        let RawItem::Comment(comment) = serde_json::from_value(raw).unwrap() else {
            panic!("expected a comment");
        };
        assert!(comment.header.deleted);
        assert!(!comment.header.dead);
        assert!(comment.kids.is_empty());
        assert_eq!(comment.header.by, None);
    }

    #[test]
    fn test_pollopt_date_string() {
        let raw = json!({
            "by": "pg",
            "id": 160705,
            "poll": 160704,
            "score": 335,
            "time": "2008-04-11T21:53:12Z",
            "type": "pollopt"
        });
        let item: RawItem = serde_json::from_value(raw).unwrap();
        assert_eq!(item.kind(), ItemKind::PollOption);
        assert_eq!(item.header().time.timestamp(), 1207950792);
    }

    #[test]
    fn test_negative_numbers_are_rejected() {
        let raw = json!({
            "id": 1,
            "score": -3,
            "time": 1175714200,
            "type": "job"
        });
        assert!(serde_json::from_value::<RawItem>(raw).is_err());
    }

    #[test]
    fn test_poll_requires_parts() {
        let raw = json!({
            "by": "pg",
            "id": 126809,
            "time": 1204403652,
            "type": "poll"
        });
        assert!(serde_json::from_value::<RawItem>(raw).is_err());
    }

    #[test]
    fn test_unknown_type() {
        let raw = json!({ "id": 1, "time": 0, "type": "ad" });
        assert!(serde_json::from_value::<RawItem>(raw).is_err());
    }

    #[test]
    fn test_user() {
        let raw = json!({
            "about": "This is a test",
            "created": 1173923446,
            "id": "jl",
            "karma": 2937,
            "submitted": [8265435, 8168423]
        });
        let user: RawUser = serde_json::from_value(raw).unwrap();
        assert_eq!(user.id, "jl");
        assert_eq!(user.karma, 2937);
        assert_eq!(user.submitted, vec![8265435, 8168423]);

        let raw = json!({ "created": 1173923446, "id": "quiet", "karma": 1 });
        let user: RawUser = serde_json::from_value(raw).unwrap();
        assert!(user.submitted.is_empty());
        assert_eq!(user.about, None);
    }

    #[test]
    fn test_updates() {
        let raw = json!({
            "items": [8423305, 8420805],
            "profiles": ["thefox", "mdda"]
        });
        let updates: RawUpdates = serde_json::from_value(raw).unwrap();
        assert_eq!(updates.items, vec![8423305, 8420805]);
        assert_eq!(updates.profiles, vec!["thefox", "mdda"]);
    }
}
