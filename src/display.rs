//! Output targets the reader renders into.
//!
//! The reader never touches a terminal or a file directly. It is handed a
//! [`Surface`] for its output and [`Toggle`]s for the loader indicators and
//! the "load more" control, so the same reader drives the TUI, the HTML
//! export, and the tests.

use maud::{html, Markup, PreEscaped, Render, DOCTYPE};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    Error,
}

/// One rendered element of the output area.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A line of plain text, escaped when written as HTML.
    Paragraph {
        text: String,
        class: Option<NodeClass>,
    },
    /// One feed entry.
    Article(Vec<Block>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(String),
    Label(String),
    Avatar(String),
    /// User text with links. `html` is already escaped and linkified
    /// (see [`crate::format::linked_markup`]), `text` is the source text.
    Markup { html: String, text: String },
}

impl Node {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::Paragraph {
            text: text.into(),
            class: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Node::Paragraph {
            text: text.into(),
            class: Some(NodeClass::Error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Node::Paragraph {
                class: Some(NodeClass::Error),
                ..
            }
        )
    }

    /// Plain text lines, the way a terminal shows the node.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Node::Paragraph { text, .. } => vec![text.clone()],
            Node::Article(blocks) => blocks
                .iter()
                .map(|block| match block {
                    Block::Text(text) | Block::Label(text) => text.clone(),
                    Block::Avatar(src) => format!("[avatar] {}", src),
                    Block::Markup { text, .. } => text.clone(),
                })
                .collect(),
        }
    }

    pub fn to_html(&self) -> String {
        self.render().into_string()
    }
}

impl Render for Node {
    fn render(&self) -> Markup {
        match self {
            Node::Paragraph { text, class } => html! {
                @if let Some(NodeClass::Error) = class {
                    p.error { (text) }
                } @else {
                    p { (text) }
                }
            },
            Node::Article(blocks) => html! {
                article {
                    @for block in blocks {
                        (block)
                    }
                }
            },
        }
    }
}

impl Render for Block {
    fn render(&self) -> Markup {
        match self {
            Block::Text(text) => html! { p { (text) } },
            Block::Label(text) => html! { p { strong { (text) } } },
            Block::Avatar(src) => html! { img src=(src) alt="Avatar" class="avatar"; },
            Block::Markup { html: markup, .. } => html! { p { (PreEscaped(markup)) } },
        }
    }
}

/// The output container.
pub trait Surface: Send {
    fn clear(&mut self);
    fn append(&mut self, node: Node);
}

/// Anything that can be shown or hidden: loader indicators, the "load
/// more" control.
pub trait Toggle: Send {
    fn set_visible(&mut self, visible: bool);
}

/// Everything a reader writes to.
pub struct Targets {
    pub display: Box<dyn Surface>,
    pub loaders: Vec<Box<dyn Toggle>>,
    pub load_more: Box<dyn Toggle>,
}

/// A surface whose nodes can be read from another handle, e.g. by the
/// TUI while a load runs on a background task.
#[derive(Debug, Clone, Default)]
pub struct SharedSurface {
    nodes: Arc<Mutex<Vec<Node>>>,
}

impl SharedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Node>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Vec<Node> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Surface for SharedSurface {
    fn clear(&mut self) {
        self.lock().clear();
    }

    fn append(&mut self, node: Node) {
        self.lock().push(node);
    }
}

/// A shared visibility flag.
#[derive(Debug, Clone, Default)]
pub struct Flag {
    visible: Arc<AtomicBool>,
}

impl Flag {
    pub fn new(visible: bool) -> Self {
        Self {
            visible: Arc::new(AtomicBool::new(visible)),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}

impl Toggle for Flag {
    fn set_visible(&mut self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }
}

const STYLESHEET: &str = "body{font-family:sans-serif;max-width:40em;margin:auto}\
article{border-bottom:1px solid #ccc;padding:.5em 0}\
.avatar{width:48px;height:48px;border-radius:50%}\
.error{color:#b00}";

/// Wrap rendered nodes into a standalone HTML page.
pub fn render_document(title: &str, nodes: &[Node]) -> String {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(STYLESHEET)) }
            }
            body {
                section id="output" {
                    @for node in nodes {
                        (node)
                    }
                }
            }
        }
    }
    .into_string()
}
