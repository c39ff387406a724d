use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which users to look up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserLookup {
    /// Numeric user ids (`/users?ids=`).
    Ids(Vec<String>),
    /// Handles without the `@` (`/users/by?usernames=`).
    Usernames(Vec<String>),
}

impl UserLookup {
    pub fn usernames<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        UserLookup::Usernames(names.into_iter().map(Into::into).collect())
    }

    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        UserLookup::Ids(ids.into_iter().map(Into::into).collect())
    }

    pub(crate) fn endpoint(&self) -> &'static str {
        match self {
            UserLookup::Ids(_) => "/users",
            UserLookup::Usernames(_) => "/users/by",
        }
    }

    pub(crate) fn param(&self) -> (&'static str, String) {
        match self {
            UserLookup::Ids(ids) => ("ids", ids.join(",")),
            UserLookup::Usernames(names) => ("usernames", names.join(",")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicMetrics {
    pub followers_count: u64,
    pub following_count: u64,
    pub tweet_count: u64,
    pub listed_count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author_id: Option<String>,
}

/// `data` / `includes` / `meta` envelope used by list endpoints.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub includes: Option<Value>,
    #[serde(default)]
    pub meta: Option<Value>,
}

impl<T> Page<T> {
    /// Pagination token for the next page, if any.
    pub fn next_token(&self) -> Option<&str> {
        self.meta.as_ref()?.get("next_token")?.as_str()
    }
}

/// A filtered stream rule as stored by Twitter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// A rule to add.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRule {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl NewRule {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tag: None,
        }
    }

    pub fn tagged(value: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tag: Some(tag.into()),
        }
    }
}
