//! Turns raw records into typed entities with lazy cross references.

use hnapi_sources::{
    ItemId, RawComment, RawHeader, RawItem, RawJob, RawPoll, RawPollOption, RawStory, RawUser,
    Username,
};

use super::HnApi;
use crate::error::{Error, FetchError};
use crate::lazy::{Element, List};
use crate::types::{
    Comment, Item, ItemElement, Items, Job, Poll, PollOption, Story, Tombstone, User, UserElement,
};

impl HnApi {
    pub(super) fn item_element(&self, id: ItemId) -> ItemElement {
        let api = self.clone();
        Element::with_id(id, move |id| {
            let raw = api.source.fetch_item(id);
            let api = api.clone();
            async move { api.assemble_item(raw.await?) }
        })
    }

    pub(super) fn user_element(&self, name: Username) -> UserElement {
        let api = self.clone();
        Element::with_id(name, move |name: Username| {
            let raw = api.source.fetch_user(&name);
            let api = api.clone();
            async move { Ok(api.assemble_user(raw.await?)) }
        })
    }

    fn items(&self, ids: Vec<ItemId>) -> Items {
        let api = self.clone();
        List::from_ids(ids, move |id| api.item_element(id), self.settings)
    }

    /// The author of a live item.
    ///
    /// Only deleted items may omit their author, anything else is malformed.
    fn author(&self, header: &RawHeader) -> Result<UserElement, Error> {
        match &header.by {
            Some(by) => Ok(self.user_element(by.clone())),
            None => Err(FetchError::Malformed(format!("item {} has no author", header.id)).into()),
        }
    }

    fn assemble_item(&self, raw: RawItem) -> Result<Item, Error> {
        let header = raw.header();
        if header.deleted {
            return Ok(Item::Tombstone(Tombstone {
                id: header.id,
                kind: raw.kind(),
                created_at: header.time,
                dead: header.dead,
            }));
        }

        let by = self.author(header)?;
        let item = match raw {
            RawItem::Story(RawStory {
                header,
                descendants,
                kids,
                score,
                title,
            }) => Item::Story(Story {
                id: header.id,
                by,
                created_at: header.time,
                dead: header.dead,
                title,
                url: header.url,
                text: header.text,
                score,
                descendants,
                kids: self.items(kids),
            }),
            RawItem::Comment(RawComment {
                header,
                kids,
                parent,
            }) => Item::Comment(Comment {
                id: header.id,
                by,
                created_at: header.time,
                dead: header.dead,
                text: header.text,
                parent: self.item_element(parent),
                kids: self.items(kids),
            }),
            RawItem::Job(RawJob {
                header,
                score,
                title,
            }) => Item::Job(Job {
                id: header.id,
                by,
                created_at: header.time,
                dead: header.dead,
                title,
                url: header.url,
                text: header.text,
                score,
            }),
            RawItem::Poll(RawPoll {
                header,
                descendants,
                kids,
                parts,
                score,
                title,
            }) => Item::Poll(Poll {
                id: header.id,
                by,
                created_at: header.time,
                dead: header.dead,
                title,
                text: header.text,
                score,
                descendants,
                kids: self.items(kids),
                parts: self.items(parts),
            }),
            RawItem::PollOption(RawPollOption {
                header,
                poll,
                score,
            }) => Item::PollOption(PollOption {
                id: header.id,
                by,
                created_at: header.time,
                dead: header.dead,
                text: header.text,
                score,
                poll: self.item_element(poll),
            }),
        };
        Ok(item)
    }

    fn assemble_user(&self, raw: RawUser) -> User {
        User {
            username: raw.id,
            created_at: raw.created,
            about: raw.about,
            karma: raw.karma,
            submitted: self.items(raw.submitted),
        }
    }
}
