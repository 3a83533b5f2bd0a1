pub mod curiouscat;

use crate::error::FeedError;
use async_trait::async_trait;
use serde::Deserialize;

/// A decoded profile feed response.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileResponse {
    /// The service answered with an application-level error, e.g. 404 for
    /// an unknown profile.
    Failed { code: i64, detail: Option<String> },
    Feed(ProfileFeed),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFeed {
    /// Total answers on the profile, not just this page.
    pub answers: u64,
    /// Newest first.
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Post {
    Post { post: Answer },
    Status { status: StatusBody },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Answer {
    #[serde(default)]
    pub seconds_elapsed: f64,
    #[serde(rename = "senderData", default)]
    pub sender: Option<Participant>,
    #[serde(rename = "addresseeData", default)]
    pub addressee: Option<Participant>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub reply: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Answer {
    pub fn sender_avatar(&self) -> Option<&str> {
        self.sender.as_ref().and_then(|p| p.avatar.as_deref())
    }

    pub fn addressee_avatar(&self) -> Option<&str> {
        self.addressee.as_ref().and_then(|p| p.avatar.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

/// Source of profile feed pages. `cursor` is the `max_timestamp` to page
/// back from; `None` asks for the newest posts.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(
        &self,
        username: &str,
        cursor: Option<i64>,
    ) -> Result<ProfileResponse, FeedError>;
}
