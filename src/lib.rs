pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod feeds;
pub mod format;
pub mod reader;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use display::{Flag, Node, SharedSurface, Surface, Targets, Toggle};
pub use error::{FeedError, ReaderError};
pub use feeds::curiouscat::CuriousCatFetcher;
pub use feeds::{Post, ProfileResponse, ProfileSource};
pub use reader::{Outcome, Reader, SharedReader};
