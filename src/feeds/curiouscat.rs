use super::{Post, ProfileFeed, ProfileResponse, ProfileSource};
use crate::error::FeedError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://curiouscat.live/api/v2.1/profile/";

pub struct CuriousCatFetcher {
    endpoint: String,
    client: reqwest::Client,
}

/// Wire shape of the profile endpoint. Errors and content share one object,
/// so it is folded into [`ProfileResponse`] right after parsing.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    error: Option<i64>,
    #[serde(rename = "errorCode", default)]
    error_code: Option<serde_json::Value>,
    #[serde(default)]
    answers: Option<u64>,
    #[serde(default)]
    posts: Vec<Post>,
}

impl From<ApiEnvelope> for ProfileResponse {
    fn from(envelope: ApiEnvelope) -> Self {
        match envelope.error {
            // `error: 0` is not an error
            Some(code) if code != 0 => ProfileResponse::Failed {
                code,
                detail: envelope.error_code.map(|value| match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                }),
            },
            _ => ProfileResponse::Feed(ProfileFeed {
                answers: envelope.answers.unwrap_or(0),
                posts: envelope.posts,
            }),
        }
    }
}

impl CuriousCatFetcher {
    pub fn new(endpoint: String, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Build the feed URL. `max_timestamp` is only present when paging back.
pub fn profile_url(endpoint: &str, username: &str, cursor: Option<i64>) -> String {
    let mut url = format!("{}?username={}", endpoint, urlencoding::encode(username));
    if let Some(max_timestamp) = cursor {
        url.push_str(&format!("&max_timestamp={}", max_timestamp));
    }
    url
}

/// Decode a response body into a typed [`ProfileResponse`].
pub fn parse_profile(body: &str) -> Result<ProfileResponse, FeedError> {
    let envelope: ApiEnvelope = serde_json::from_str(body)?;
    Ok(envelope.into())
}

#[async_trait]
impl ProfileSource for CuriousCatFetcher {
    async fn fetch_profile(
        &self,
        username: &str,
        cursor: Option<i64>,
    ) -> Result<ProfileResponse, FeedError> {
        let url = profile_url(&self.endpoint, username, cursor);
        debug!(%url, "fetching profile feed");

        // The status code is not checked: the API reports unknown profiles
        // as a JSON envelope, whatever status it comes with.
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "profile feed response");

        parse_profile(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::{Answer, Participant, StatusBody};

    const PAGE: &str = r#"{
        "answers": 42,
        "posts": [
            {
                "type": "post",
                "post": {
                    "id": 1,
                    "seconds_elapsed": 3661,
                    "senderData": {"id": 7, "username": "asker", "avatar": "https://cdn.example/a.png"},
                    "addresseeData": {"id": 8, "username": "me", "avatar": "https://cdn.example/b.png"},
                    "comment": "what is at https://example.com ?",
                    "reply": "a website",
                    "timestamp": 1600000000,
                    "likes": 3
                }
            },
            {"type": "status", "status": {"status": "on vacation", "timestamp": 1599999000}},
            {"type": "shared_post", "post": {}},
            {
                "type": "post",
                "post": {
                    "seconds_elapsed": 90000.5,
                    "senderData": {"id": null},
                    "addresseeData": {"avatar": "https://cdn.example/b.png"},
                    "comment": "anon?",
                    "reply": "yes",
                    "timestamp": 1599990000
                }
            }
        ]
    }"#;

    #[test]
    fn test_profile_url_fresh() {
        assert_eq!(
            profile_url(DEFAULT_ENDPOINT, "someone", None),
            "https://curiouscat.live/api/v2.1/profile/?username=someone"
        );
    }

    #[test]
    fn test_profile_url_with_cursor() {
        assert_eq!(
            profile_url(DEFAULT_ENDPOINT, "someone", Some(1599989999)),
            "https://curiouscat.live/api/v2.1/profile/?username=someone&max_timestamp=1599989999"
        );
    }

    #[test]
    fn test_profile_url_encodes_username() {
        let url = profile_url("http://localhost/p/", "a b&c", None);
        assert_eq!(url, "http://localhost/p/?username=a%20b%26c");
    }

    #[test]
    fn test_parse_page() {
        let response = parse_profile(PAGE).unwrap();
        let ProfileResponse::Feed(feed) = response else {
            panic!("expected a feed");
        };

        assert_eq!(feed.answers, 42);
        assert_eq!(feed.posts.len(), 4);
        assert_eq!(
            feed.posts[0],
            Post::Post {
                post: Answer {
                    seconds_elapsed: 3661.0,
                    sender: Some(Participant {
                        avatar: Some("https://cdn.example/a.png".to_string()),
                        username: Some("asker".to_string()),
                    }),
                    addressee: Some(Participant {
                        avatar: Some("https://cdn.example/b.png".to_string()),
                        username: Some("me".to_string()),
                    }),
                    comment: "what is at https://example.com ?".to_string(),
                    reply: "a website".to_string(),
                    timestamp: 1600000000,
                }
            }
        );
        assert_eq!(
            feed.posts[1],
            Post::Status {
                status: StatusBody {
                    status: "on vacation".to_string()
                }
            }
        );
        assert_eq!(feed.posts[2], Post::Unknown);
    }

    #[test]
    fn test_parse_anonymous_sender() {
        let ProfileResponse::Feed(feed) = parse_profile(PAGE).unwrap() else {
            panic!("expected a feed");
        };
        let Post::Post { post } = &feed.posts[3] else {
            panic!("expected a post");
        };
        assert_eq!(post.sender_avatar(), None);
        assert_eq!(post.addressee_avatar(), Some("https://cdn.example/b.png"));
        assert_eq!(post.timestamp, 1599990000);
    }

    #[test]
    fn test_parse_not_found() {
        let response = parse_profile(r#"{"error": 404, "errorCode": "user_not_found"}"#).unwrap();
        assert_eq!(
            response,
            ProfileResponse::Failed {
                code: 404,
                detail: Some("user_not_found".to_string())
            }
        );
    }

    #[test]
    fn test_parse_error_without_detail() {
        let response = parse_profile(r#"{"error": 500}"#).unwrap();
        assert_eq!(
            response,
            ProfileResponse::Failed {
                code: 500,
                detail: None
            }
        );
    }

    #[test]
    fn test_parse_numeric_error_code() {
        let response = parse_profile(r#"{"error": 429, "errorCode": 17}"#).unwrap();
        assert_eq!(
            response,
            ProfileResponse::Failed {
                code: 429,
                detail: Some("17".to_string())
            }
        );
    }

    #[test]
    fn test_parse_zero_error_is_content() {
        let response = parse_profile(r#"{"error": 0, "answers": 0, "posts": []}"#).unwrap();
        assert_eq!(response, ProfileResponse::Feed(ProfileFeed::default()));
    }

    #[test]
    fn test_parse_empty_profile() {
        let response = parse_profile(r#"{"answers": 0, "posts": []}"#).unwrap();
        assert_eq!(response, ProfileResponse::Feed(ProfileFeed::default()));
    }

    #[test]
    fn test_parse_invalid_body() {
        let err = parse_profile("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, FeedError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_endpoint_is_transport_error() {
        let fetcher = CuriousCatFetcher::new("http://127.0.0.1:9/".to_string(), "catfeed-test");
        let err = fetcher.fetch_profile("someone", None).await.unwrap_err();
        assert!(matches!(err, FeedError::Transport(_)));
        assert!(err.to_string().starts_with("Request failed: "));
    }

    #[test]
    fn test_fetcher_new() {
        let fetcher = CuriousCatFetcher::new(DEFAULT_ENDPOINT.to_string(), "catfeed-test");
        assert_eq!(fetcher.endpoint(), DEFAULT_ENDPOINT);
    }
}
