use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Identifier of an item (story, comment, job, poll or poll option).
///
/// Item ids are assigned sequentially by the remote, starting at `1`.
pub type ItemId = u64;

/// Identifier of a user, which is the case-sensitive username.
pub type Username = String;

/// The default location of the public API.
pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// The discriminant of an item record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A job posting.
    Job,
    /// A story, including "Ask" and "Show" posts.
    Story,
    /// A comment on a story, poll or another comment.
    Comment,
    /// A poll.
    Poll,
    /// A single option of a poll.
    #[serde(rename = "pollopt")]
    PollOption,
}

impl ItemKind {
    /// Returns the name the remote uses for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Story => "story",
            Self::Comment => "comment",
            Self::Poll => "poll",
            Self::PollOption => "pollopt",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned when a [`BaseUrl`] cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BaseUrlError {
    /// The url could not be parsed.
    #[error("invalid base url: {0}")]
    Invalid(#[from] url::ParseError),
    /// The url ends with a slash, which would produce `//` in every endpoint.
    #[error("the base url cannot end with \"/\"")]
    TrailingSlash,
}

/// The root that all endpoint paths are appended to, e.g. `https://hacker-news.firebaseio.com/v0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Validates and wraps the given url.
    pub fn new(url: Url) -> Result<Self, BaseUrlError> {
        if url.as_str().ends_with('/') {
            return Err(BaseUrlError::TrailingSlash);
        }
        Ok(Self(url))
    }

    /// Returns the full url of `{base}/{path}.json`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}.json", self.0, path.trim_start_matches('/'))
    }

    /// Returns the wrapped url.
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl Default for BaseUrl {
    fn default() -> Self {
        // the constant is a valid url without a trailing slash
        Self(Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"))
    }
}

impl FromStr for BaseUrl {
    type Err = BaseUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.parse()?)
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let base: BaseUrl = "http://localhost:1234/v0".parse().unwrap();
        assert_eq!(base.endpoint("item/8863"), "http://localhost:1234/v0/item/8863.json");
        assert_eq!(base.endpoint("/maxitem"), "http://localhost:1234/v0/maxitem.json");
    }

    #[test]
    fn test_trailing_slash() {
        assert_eq!(
            "http://localhost:1234/v0/".parse::<BaseUrl>(),
            Err(BaseUrlError::TrailingSlash)
        );
        // a bare host is normalized to `http://host/` by the url parser
        assert!("http://localhost:1234".parse::<BaseUrl>().is_err());
    }

    #[test]
    fn test_default() {
        assert_eq!(BaseUrl::default().to_string(), DEFAULT_BASE_URL);
    }
}
