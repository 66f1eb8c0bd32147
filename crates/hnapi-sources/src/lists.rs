use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The named, ordered id lists published by the remote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryList {
    /// Up to 500 top stories, ranked.
    Top,
    /// Up to 500 newest stories.
    New,
    /// Up to 500 best stories.
    Best,
    /// Up to 200 latest "Ask HN" stories.
    Ask,
    /// Up to 200 latest "Show HN" stories.
    Show,
    /// Up to 200 latest job postings.
    Job,
}

impl StoryList {
    /// All known lists.
    pub const ALL: [StoryList; 6] = [
        Self::Top,
        Self::New,
        Self::Best,
        Self::Ask,
        Self::Show,
        Self::Job,
    ];

    /// The short name of the list, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::New => "new",
            Self::Best => "best",
            Self::Ask => "ask",
            Self::Show => "show",
            Self::Job => "job",
        }
    }

    /// The endpoint path of the list, without the `.json` suffix.
    ///
    /// This doubles as the cache key of the list.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Top => "topstories",
            Self::New => "newstories",
            Self::Best => "beststories",
            Self::Ask => "askstories",
            Self::Show => "showstories",
            Self::Job => "jobstories",
        }
    }
}

impl fmt::Display for StoryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unknown list name was given.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown story list `{0}`")]
pub struct UnknownStoryList(pub String);

impl FromStr for StoryList {
    type Err = UnknownStoryList;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|list| list.name() == s || list.endpoint() == s)
            .ok_or_else(|| UnknownStoryList(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("top".parse(), Ok(StoryList::Top));
        assert_eq!("askstories".parse(), Ok(StoryList::Ask));
        assert_eq!(
            "hot".parse::<StoryList>(),
            Err(UnknownStoryList("hot".into()))
        );
    }

    #[test]
    fn test_endpoints_are_distinct() {
        for (i, a) in StoryList::ALL.iter().enumerate() {
            for b in &StoryList::ALL[i + 1..] {
                assert_ne!(a.endpoint(), b.endpoint());
            }
        }
    }
}
