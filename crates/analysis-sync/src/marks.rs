//! Mark markup in editor content
//!
//! Marks are painted by wrapping ranges of the editor markup in a custom
//! element. The same element is stripped again before text is handed to the
//! scoring engine so highlights never feed back into the analysis.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{Mark, MarkSet};
use tracing::debug;

pub const MARK_TAG: &str = "analysismark";
pub const MARK_CLASS: &str = "analysis-text-mark";

lazy_static! {
    static ref MARK_MARKUP: Regex = Regex::new(r"(?i)</?analysismark\b[^>]*>").unwrap();
}

/// Remove all mark markup, leaving the marked text in place
pub fn strip_marks(markup: &str) -> String {
    MARK_MARKUP.replace_all(markup, "").into_owned()
}

pub fn has_marks(markup: &str) -> bool {
    MARK_MARKUP.is_match(markup)
}

fn is_paintable(text: &str, mark: &Mark, cursor: usize) -> bool {
    !mark.is_empty()
        && mark.start >= cursor
        && mark.end <= text.len()
        && text.is_char_boundary(mark.start)
        && text.is_char_boundary(mark.end)
}

/// Wrap every valid mark range of `text` in mark markup
///
/// Out of range, empty, overlapping or non char-aligned marks are skipped.
/// Returns the painted markup and the number of marks applied.
pub fn render_marks(text: &str, marks: &MarkSet) -> (String, usize) {
    let clean = strip_marks(text);
    let mut out = String::with_capacity(clean.len() + marks.len() * 48);
    let mut cursor = 0;
    let mut applied = 0;

    for mark in marks {
        if !is_paintable(&clean, mark, cursor) {
            debug!(start = mark.start, end = mark.end, "Skipping unpaintable mark");
            continue;
        }
        out.push_str(&clean[cursor..mark.start]);
        out.push_str(&format!(
            "<{} class=\"{}\" data-kind=\"{}\">",
            MARK_TAG,
            MARK_CLASS,
            escape_attr(&mark.kind)
        ));
        out.push_str(&clean[mark.start..mark.end]);
        out.push_str(&format!("</{}>", MARK_TAG));
        cursor = mark.end;
        applied += 1;
    }
    out.push_str(&clean[cursor..]);

    (out, applied)
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
