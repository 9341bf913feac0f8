//! Permalink generation responses
//!
//! After a title edit the host page asks the server for a sample permalink.
//! The session observes every completed request, keeps the permalink ones and
//! pulls the generated slug out of the returned markup.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const AJAX_ENDPOINT: &str = "/admin-ajax.php";
pub const PERMALINK_ACTION: &str = "action=sample-permalink";

lazy_static! {
    static ref SLUG_OPEN: Regex = Regex::new(
        r#"(?is)<(?P<tag>[a-z][a-z0-9]*)\b[^>]*\bid\s*=\s*["']editable-post-name-full["'][^>]*>"#
    )
    .unwrap();
    static ref ELEMENT_TAG: Regex =
        Regex::new(r"(?s)<(?P<close>/)?(?P<name>[a-zA-Z][a-zA-Z0-9]*)\b[^>]*?(?P<empty>/)?>").unwrap();
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref POST_ID: Regex = Regex::new(r"(?:^|&)post_id=(\d+)(?:&|$)").unwrap();
}

/// A completed request observed on the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCompletion {
    pub url: String,
    /// Form encoded request body, when it was a string
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub response_text: String,
}

impl RequestCompletion {
    pub fn new(url: &str, data: Option<&str>, response_text: &str) -> Self {
        Self {
            url: url.to_string(),
            data: data.map(str::to_string),
            response_text: response_text.to_string(),
        }
    }

    /// Whether this was a permalink generation request
    pub fn is_permalink_request(&self) -> bool {
        self.url.ends_with(AJAX_ENDPOINT)
            && self
                .data
                .as_deref()
                .is_some_and(|data| data.contains(PERMALINK_ACTION))
    }

    /// Post the permalink was generated for, when the request names one
    pub fn post_id(&self) -> Option<u64> {
        let data = self.data.as_deref()?;
        POST_ID
            .captures(data)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// Extract the generated slug from a permalink response body
///
/// Returns `None` for an empty or malformed response; callers fall back to
/// the title-derived value.
pub fn slug_from_response(response_text: &str) -> Option<String> {
    if response_text.trim().is_empty() {
        return None;
    }
    let open = SLUG_OPEN.captures(response_text)?;
    let tag = open.name("tag")?.as_str();
    let inner = element_content(&response_text[open.get(0)?.end()..], tag)?;
    let slug = decode_entities(TAG.replace_all(inner, "").trim());
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Markup up to the tag closing an element named `tag`, skipping nested
/// elements of the same name
fn element_content<'a>(rest: &'a str, tag: &str) -> Option<&'a str> {
    let mut depth = 1usize;
    for caps in ELEMENT_TAG.captures_iter(rest) {
        let name = caps.name("name")?.as_str();
        if !name.eq_ignore_ascii_case(tag) || caps.name("empty").is_some() {
            continue;
        }
        if caps.name("close").is_some() {
            depth -= 1;
            if depth == 0 {
                return Some(&rest[..caps.get(0)?.start()]);
            }
        } else {
            depth += 1;
        }
    }
    None
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
