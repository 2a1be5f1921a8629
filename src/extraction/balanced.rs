//! Balanced-tag-depth scanning.
//!
//! # Responsibilities
//! - Locate every opening `div` whose `class` attribute carries the marker token
//! - Walk forward counting nested `<div` opens and `</div>` closes
//! - Cut the fragment where the running depth returns to zero
//!
//! # Design Decisions
//! - Marker match is token-exact (`route-inner` does not match `route-inner-x`)
//! - Candidates that never close are dropped, so every fragment is balanced
//! - A marker element nested inside another marker element yields its own
//!   fragment as well as being part of the outer one
//! - Tag names are matched case-insensitively, attribute values are not
//! - Markup is scanned, not parsed: a `</div>` inside a comment or `<script>`
//!   text still counts, so such an element closes early

use regex::Regex;

use crate::extraction::fragment::Fragment;

/// Finds complete marker elements by depth counting.
#[derive(Debug, Clone)]
pub struct BalancedScanner {
    marker: String,
    start: Regex,
    tag: Regex,
}

impl BalancedScanner {
    pub fn new(marker: &str) -> Result<Self, regex::Error> {
        let start = Regex::new(
            r#"(?i)<div(?:\s[^>]*?)?\sclass\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#,
        )?;
        let tag = Regex::new(r"(?i)<div(?:\s[^>]*)?>|</div\s*>")?;
        Ok(Self {
            marker: marker.to_string(),
            start,
            tag,
        })
    }

    /// Byte offsets of every opening tag carrying the marker token.
    pub fn start_positions(&self, markup: &str) -> Vec<usize> {
        self.start
            .captures_iter(markup)
            .filter(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .map(|value| value.as_str().split_whitespace().any(|t| t == self.marker))
                    .unwrap_or(false)
            })
            .filter_map(|caps| caps.get(0).map(|m| m.start()))
            .collect()
    }

    /// End offset (exclusive) of the element opening at `start`, if it closes.
    pub fn element_end(&self, markup: &str, start: usize) -> Option<usize> {
        let mut depth: usize = 0;
        for tag in self.tag.find_iter(&markup[start..]) {
            if tag.as_str().starts_with("</") {
                // A stray close before the first open cannot belong to us
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + tag.end());
                }
            } else {
                depth += 1;
            }
        }
        None
    }

    pub fn scan(&self, markup: &str) -> Vec<Fragment> {
        self.start_positions(markup)
            .into_iter()
            .filter_map(|start| {
                let end = self.element_end(markup, start);
                if end.is_none() {
                    tracing::trace!(offset = start, "Marker element never closes, skipping");
                }
                end.map(|end| Fragment::new(&markup[start..end]))
            })
            .collect()
    }
}
