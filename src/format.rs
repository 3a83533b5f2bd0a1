//! Text shaping helpers used when rendering feed entries.

use jiff::Zoned;
use maud::{html, Markup, PreEscaped};
use regex::Regex;
use std::sync::LazyLock;

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Render an elapsed number of seconds as "2 days + 1 hour + 5 seconds".
///
/// Zero components are skipped, so `elapsed(0)` is the empty string.
pub fn elapsed(seconds: u64) -> String {
    let parts = [
        (seconds / DAY, "day"),
        (seconds % DAY / HOUR, "hour"),
        (seconds % HOUR / MINUTE, "minute"),
        (seconds % MINUTE, "second"),
    ];

    parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| pluralize(*value, unit))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Same as [`elapsed`] for the raw JSON number the API hands out.
///
/// Fractions are floored; negative and NaN inputs count as zero.
pub fn elapsed_f64(seconds: f64) -> String {
    // `as` saturates: NaN and negatives become 0
    elapsed(seconds.floor() as u64)
}

fn pluralize(value: u64, unit: &str) -> String {
    if value == 1 {
        format!("{} {}", value, unit)
    } else {
        format!("{} {}s", value, unit)
    }
}

/// Wrap every bare `http(s)://` URL in an anchor that opens a new tab.
///
/// Text outside the matches is copied through untouched, so user text must
/// be escaped first. [`linked_markup`] does both.
pub fn urlify(text: &str) -> String {
    URL_REGEX
        .replace_all(text, |caps: &regex::Captures| {
            let url = &caps[0];
            format!(r#"<a href="{}" target="_blank">{}</a>"#, url, url)
        })
        .into_owned()
}

/// Escape untrusted `text` as HTML and link the URLs in it.
///
/// `urlify` runs on the escaped text, so an `&` inside a URL ends up as
/// `&amp;` in the href.
pub fn linked_markup(text: &str) -> Markup {
    let escaped = html! { (text) }.into_string();
    PreEscaped(urlify(&escaped))
}

/// Pull the URLs back out of a piece of text, in order of appearance.
pub fn find_urls(text: &str) -> Vec<String> {
    URL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Local wall-clock time used in the "answers found at ..." summary.
pub fn current_date() -> String {
    Zoned::now().strftime("%Y-%m-%d %H:%M:%S").to_string()
}
