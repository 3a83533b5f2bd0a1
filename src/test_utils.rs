//! In-memory fixtures shared by the unit tests.

use crate::error::FeedError;
use crate::feeds::{Answer, Participant, Post, ProfileFeed, ProfileResponse, ProfileSource};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Notify;

/// Replays canned responses and records the requests it saw.
#[derive(Default)]
pub struct ScriptedSource {
    responses: StdMutex<VecDeque<Result<ProfileResponse, FeedError>>>,
    requests: StdMutex<Vec<(String, Option<i64>)>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedSource {
    pub fn with(responses: Vec<Result<ProfileResponse, FeedError>>) -> Self {
        Self {
            responses: StdMutex::new(responses.into()),
            ..Default::default()
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn requests(&self) -> Vec<(String, Option<i64>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileSource for ScriptedSource {
    async fn fetch_profile(
        &self,
        username: &str,
        cursor: Option<i64>,
    ) -> Result<ProfileResponse, FeedError> {
        self.requests
            .lock()
            .unwrap()
            .push((username.to_string(), cursor));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left")
    }
}

pub fn answer(timestamp: i64) -> Post {
    Post::Post {
        post: Answer {
            seconds_elapsed: 61.0,
            sender: Some(Participant {
                avatar: Some("https://cdn.example/sender.png".to_string()),
                username: None,
            }),
            addressee: Some(Participant {
                avatar: Some("https://cdn.example/me.png".to_string()),
                username: Some("me".to_string()),
            }),
            comment: format!("question {} https://example.com/q", timestamp),
            reply: "<b>answer</b>".to_string(),
            timestamp,
        },
    }
}

pub fn page(answers: u64, count: usize, newest: i64) -> ProfileResponse {
    ProfileResponse::Feed(ProfileFeed {
        answers,
        posts: (0..count).map(|i| answer(newest - i as i64 * 10)).collect(),
    })
}
