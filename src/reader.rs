//! The feed reader: fetches a profile page and renders it into its targets.

use crate::display::{Block, Node, Surface, Targets, Toggle};
use crate::error::{FeedError, ReaderError};
use crate::feeds::{Answer, Post, ProfileFeed, ProfileResponse, ProfileSource};
use crate::format::{current_date, elapsed_f64, linked_markup};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

/// Page size the API uses. A full page means older posts may exist.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// What a `show_data` call ended with. The same outcome is also rendered
/// into the display.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Loaded {
        shown: usize,
        answers: u64,
        /// Timestamp of the oldest answer on the page.
        cursor: i64,
        has_more: bool,
    },
    Empty,
    ApiError {
        code: i64,
        detail: Option<String>,
    },
    TransportError(String),
}

struct LoaderBank {
    writing: bool,
    toggles: Vec<Box<dyn Toggle>>,
}

impl LoaderBank {
    fn set_writing(&mut self, writing: bool) {
        self.writing = writing;
        for toggle in &mut self.toggles {
            toggle.set_visible(writing);
        }
    }
}

/// Holds the writing flag for one `show_data` call and clears it on drop,
/// including when the call's future is dropped mid-flight.
struct Writing<'a>(&'a mut LoaderBank);

impl<'a> Writing<'a> {
    fn begin(bank: &'a mut LoaderBank) -> Self {
        bank.set_writing(true);
        Writing(bank)
    }
}

impl Drop for Writing<'_> {
    fn drop(&mut self) {
        self.0.set_writing(false);
    }
}

struct Session {
    source: Arc<dyn ProfileSource>,
    display: Box<dyn Surface>,
    load_more: Box<dyn Toggle>,
    page_size: usize,
    reading: bool,
    reading_more: bool,
    cursor: Option<i64>,
    data: Option<ProfileResponse>,
}

pub struct Reader {
    loaders: LoaderBank,
    session: Session,
}

impl Reader {
    pub fn new(source: Arc<dyn ProfileSource>, targets: Targets) -> Self {
        Self {
            loaders: LoaderBank {
                writing: false,
                toggles: targets.loaders,
            },
            session: Session {
                source,
                display: targets.display,
                load_more: targets.load_more,
                page_size: DEFAULT_PAGE_SIZE,
                reading: false,
                reading_more: false,
                cursor: None,
                data: None,
            },
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.session.page_size = page_size;
        self
    }

    pub fn is_writing(&self) -> bool {
        self.loaders.writing
    }

    pub fn is_reading(&self) -> bool {
        self.session.reading
    }

    pub fn is_reading_more(&self) -> bool {
        self.session.reading_more
    }

    /// Timestamp of the oldest answer rendered by the last content page.
    pub fn cursor(&self) -> Option<i64> {
        self.session.cursor
    }

    /// The response from the last successful fetch.
    pub fn last_response(&self) -> Option<&ProfileResponse> {
        self.session.data.as_ref()
    }

    /// Load one page for `username` and render it.
    ///
    /// `cursor: None` is a fresh load and clears the display first. With a
    /// cursor the page is appended below what is already shown. Failures
    /// are rendered and reported through the returned [`Outcome`]; this
    /// never errors.
    pub async fn show_data(&mut self, username: &str, cursor: Option<i64>) -> Outcome {
        let _writing = Writing::begin(&mut self.loaders);
        let outcome = self.session.show(username, cursor).await;
        info!(username, ?cursor, ?outcome, "feed load finished");
        outcome
    }
}

impl Session {
    async fn show(&mut self, username: &str, cursor: Option<i64>) -> Outcome {
        self.reading_more = cursor.is_some();
        if !self.reading_more {
            self.display.clear();
        }

        match self.read(username, cursor).await {
            Ok(response) => {
                let outcome = self.render(&response);
                self.data = Some(response);
                outcome
            }
            Err(e) => {
                warn!(username, error = %e, "failed to load profile feed");
                self.display.append(Node::error(format!("Error: {}.", e)));
                Outcome::TransportError(e.to_string())
            }
        }
    }

    async fn read(
        &mut self,
        username: &str,
        cursor: Option<i64>,
    ) -> Result<ProfileResponse, FeedError> {
        self.reading = true;
        let result = self.source.fetch_profile(username, cursor).await;
        self.reading = false;
        result
    }

    fn render(&mut self, response: &ProfileResponse) -> Outcome {
        match response {
            ProfileResponse::Failed { code, detail } => {
                let text = match code {
                    404 => "Error 404. Profile does not exist.".to_string(),
                    _ => format!(
                        "Error {}. Code: {}.",
                        code,
                        detail.as_deref().unwrap_or("unknown")
                    ),
                };
                self.display.append(Node::error(text));
                Outcome::ApiError {
                    code: *code,
                    detail: detail.clone(),
                }
            }
            ProfileResponse::Feed(feed) if feed.answers < 1 => {
                self.display.append(Node::paragraph("No answer found."));
                Outcome::Empty
            }
            ProfileResponse::Feed(feed) => self.render_feed(feed),
        }
    }

    fn render_feed(&mut self, feed: &ProfileFeed) -> Outcome {
        let shown = feed.posts.len();
        let summary = if self.reading_more {
            format!("Showing {} more previous answers.", shown)
        } else {
            format!(
                "{} answer{} found at {}. Showing the last {}.",
                feed.answers,
                if feed.answers == 1 { "" } else { "s" },
                current_date(),
                shown
            )
        };
        self.display.append(Node::paragraph(summary));

        let mut last_timestamp = 0;
        for post in &feed.posts {
            match post {
                Post::Post { post } => {
                    self.display.append(answer_node(post));
                    last_timestamp = post.timestamp;
                }
                Post::Status { status } => {
                    self.display.append(Node::Article(vec![markup(&status.status)]));
                }
                Post::Unknown => {}
            }
        }
        self.cursor = Some(last_timestamp);

        let has_more = shown == self.page_size;
        if !has_more {
            self.display.append(Node::paragraph("No more posts."));
        }
        self.load_more.set_visible(has_more);

        Outcome::Loaded {
            shown,
            answers: feed.answers,
            cursor: last_timestamp,
            has_more,
        }
    }
}

fn markup(text: &str) -> Block {
    Block::Markup {
        html: linked_markup(text).into_string(),
        text: text.to_string(),
    }
}

fn answer_node(answer: &Answer) -> Node {
    let mut blocks = vec![Block::Text(format!(
        "{} ago.",
        elapsed_f64(answer.seconds_elapsed)
    ))];
    if let Some(avatar) = answer.sender_avatar() {
        blocks.push(Block::Avatar(avatar.to_string()));
    }
    blocks.push(Block::Label("Comment:".to_string()));
    blocks.push(markup(&answer.comment));
    if let Some(avatar) = answer.addressee_avatar() {
        blocks.push(Block::Avatar(avatar.to_string()));
    }
    blocks.push(Block::Label("Reply:".to_string()));
    blocks.push(markup(&answer.reply));
    Node::Article(blocks)
}

/// A reader shared between a UI and background loads.
///
/// Only one load runs at a time: a call made while another is in flight
/// is rejected with [`ReaderError::Busy`], never queued.
#[derive(Clone)]
pub struct SharedReader {
    inner: Arc<Mutex<Reader>>,
}

impl SharedReader {
    pub fn new(reader: Reader) -> Self {
        Self {
            inner: Arc::new(Mutex::new(reader)),
        }
    }

    /// Take exclusive hold of the reader, or fail if a load is running.
    /// The guard can be moved into a spawned task.
    pub fn try_acquire(&self) -> Result<OwnedMutexGuard<Reader>, ReaderError> {
        self.inner
            .clone()
            .try_lock_owned()
            .map_err(|_| ReaderError::Busy)
    }

    pub async fn try_show_data(
        &self,
        username: &str,
        cursor: Option<i64>,
    ) -> Result<Outcome, ReaderError> {
        let mut reader = self.try_acquire()?;
        Ok(reader.show_data(username, cursor).await)
    }

    pub fn is_busy(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}
