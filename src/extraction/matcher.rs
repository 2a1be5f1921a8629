//! Fragment matching cascade.
//!
//! # Responsibilities
//! - Hold the ordered list of extraction strategies
//! - Run them against fetched markup, stopping at the first that finds anything
//! - Report which strategy won
//!
//! # Strategy Order
//! ```text
//! 1. exact-tag        <div class="route-inner">.*?</div>
//! 2. flexible-attrs   <div ... class="... route-inner ..." ...>.*?</div>
//! 3. dom-query        live DOM snapshot (rendered fetch only)
//! 4. balanced-depth   depth-counted scan, always complete elements
//! 5. lenient          [\s\S]*? body followed by two closing tags
//! ```
//!
//! # Design Decisions
//! - Regex strategies stop at the first `</div>`, so nested content truncates.
//!   This is kept as-is; the balanced scan is the authoritative fallback.
//! - The order is fixed even for rendered fetches: when the marker already
//!   appears in the page source, the text strategies win over the DOM
//!   snapshot. The snapshot only decides when the source has no match.
//! - Strategies are trait objects behind one capability (`try_match`)
//! - The marker is regex-escaped into every pattern

use regex::Regex;

use crate::extraction::balanced::BalancedScanner;
use crate::extraction::fragment::{Fragment, FragmentSet};
use crate::fetch::{DomSnapshot, FetchedPage};

/// Default CSS class that marks one route option.
pub const DEFAULT_MARKER: &str = "route-inner";

/// What a strategy sees: the markup text and, for rendered fetches, a DOM snapshot.
#[derive(Debug, Clone, Copy)]
pub struct MatchInput<'a> {
    pub markup: &'a str,
    pub dom: Option<&'a DomSnapshot>,
}

impl<'a> MatchInput<'a> {
    pub fn markup(markup: &'a str) -> Self {
        Self { markup, dom: None }
    }

    pub fn with_dom(mut self, dom: &'a DomSnapshot) -> Self {
        self.dom = Some(dom);
        self
    }
}

impl<'a> From<&'a FetchedPage> for MatchInput<'a> {
    fn from(page: &'a FetchedPage) -> Self {
        Self {
            markup: &page.markup,
            dom: page.dom.as_ref(),
        }
    }
}

/// One way of pulling marker elements out of a page.
pub trait FragmentStrategy: Send + Sync + std::fmt::Debug {
    /// Stable name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// `None` when the strategy cannot run on this input (e.g. no DOM).
    fn try_match(&self, input: &MatchInput<'_>) -> Option<Vec<Fragment>>;
}

/// A strategy driven by a single regular expression.
#[derive(Debug, Clone)]
pub struct RegexStrategy {
    name: &'static str,
    pattern: Regex,
}

impl RegexStrategy {
    pub fn new(name: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
        })
    }

    /// Literal `<div class="MARKER">`, non-greedy body, first `</div>`.
    pub fn exact_tag(marker: &str) -> Result<Self, regex::Error> {
        let m = regex::escape(marker);
        Self::new("exact-tag", &format!(r#"(?s)<div class="{m}">.*?</div>"#))
    }

    /// Any attributes, class value containing the marker, first `</div>`.
    pub fn flexible_attributes(marker: &str) -> Result<Self, regex::Error> {
        let m = regex::escape(marker);
        Self::new(
            "flexible-attrs",
            &format!(r#"(?s)<div[^>]*class="[^"]*{m}[^"]*"[^>]*>.*?</div>"#),
        )
    }

    /// Loosest form: either quote style, body up to two consecutive closing tags.
    pub fn lenient(marker: &str) -> Result<Self, regex::Error> {
        let m = regex::escape(marker);
        Self::new(
            "lenient",
            &format!(r#"<div[^>]*class=["'][^"']*{m}[^"']*["'][^>]*>[\s\S]*?</div>\s*</div>"#),
        )
    }
}

impl FragmentStrategy for RegexStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn try_match(&self, input: &MatchInput<'_>) -> Option<Vec<Fragment>> {
        Some(
            self.pattern
                .find_iter(input.markup)
                .map(|m| Fragment::new(m.as_str()))
                .collect(),
        )
    }
}

/// Elements already selected from a live DOM by the rendering agent.
///
/// Class-name (CSS) results win; the XPath query is consulted only when the
/// class query came back empty.
#[derive(Debug, Clone, Default)]
pub struct DomQueryStrategy;

impl FragmentStrategy for DomQueryStrategy {
    fn name(&self) -> &'static str {
        "dom-query"
    }

    fn try_match(&self, input: &MatchInput<'_>) -> Option<Vec<Fragment>> {
        let dom = input.dom?;
        let elements = if dom.by_class.is_empty() {
            &dom.by_xpath
        } else {
            &dom.by_class
        };
        Some(elements.iter().map(|e| Fragment::new(e.as_str())).collect())
    }
}

/// Depth-counted scan; see [`BalancedScanner`].
#[derive(Debug, Clone)]
pub struct BalancedStrategy {
    scanner: BalancedScanner,
}

impl BalancedStrategy {
    pub fn new(marker: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            scanner: BalancedScanner::new(marker)?,
        })
    }
}

impl FragmentStrategy for BalancedStrategy {
    fn name(&self) -> &'static str {
        "balanced-depth"
    }

    fn try_match(&self, input: &MatchInput<'_>) -> Option<Vec<Fragment>> {
        Some(self.scanner.scan(input.markup))
    }
}

/// Fragments found by the winning strategy, before deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub strategy: &'static str,
    pub fragments: Vec<Fragment>,
}

/// Ordered strategy cascade for one marker class.
#[derive(Debug)]
pub struct FragmentMatcher {
    marker: String,
    strategies: Vec<Box<dyn FragmentStrategy>>,
}

impl FragmentMatcher {
    /// Build the standard five-step cascade for `marker`.
    pub fn new(marker: &str) -> Result<Self, regex::Error> {
        let strategies: Vec<Box<dyn FragmentStrategy>> = vec![
            Box::new(RegexStrategy::exact_tag(marker)?),
            Box::new(RegexStrategy::flexible_attributes(marker)?),
            Box::new(DomQueryStrategy),
            Box::new(BalancedStrategy::new(marker)?),
            Box::new(RegexStrategy::lenient(marker)?),
        ];
        Ok(Self::with_strategies(marker, strategies))
    }

    pub fn with_strategies(marker: &str, strategies: Vec<Box<dyn FragmentStrategy>>) -> Self {
        Self {
            marker: marker.to_string(),
            strategies,
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run strategies in order; the first non-empty result wins.
    ///
    /// Returns `None` when nothing matched, which is not an error.
    pub fn run(&self, input: &MatchInput<'_>) -> Option<MatchOutcome> {
        if input.dom.is_none()
            && (input.markup.trim().is_empty() || !input.markup.contains(&self.marker))
        {
            return None;
        }

        for strategy in &self.strategies {
            match strategy.try_match(input) {
                Some(fragments) if !fragments.is_empty() => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        fragments = fragments.len(),
                        "Strategy matched"
                    );
                    return Some(MatchOutcome {
                        strategy: strategy.name(),
                        fragments,
                    });
                }
                Some(_) => {
                    tracing::trace!(strategy = strategy.name(), "Strategy found nothing");
                }
                None => {
                    tracing::trace!(strategy = strategy.name(), "Strategy not applicable");
                }
            }
        }
        None
    }

    /// Match plain markup and deduplicate.
    pub fn find(&self, markup: &str) -> FragmentSet {
        self.find_in(&MatchInput::markup(markup))
    }

    pub fn find_in(&self, input: &MatchInput<'_>) -> FragmentSet {
        self.run(input)
            .map(|outcome| FragmentSet::dedupe(outcome.fragments))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> FragmentMatcher {
        FragmentMatcher::new(DEFAULT_MARKER).unwrap()
    }

    fn strings(fragments: Vec<Fragment>) -> Vec<String> {
        fragments.into_iter().map(Fragment::into_string).collect()
    }

    #[test]
    fn test_simple_route() {
        let html = r#"<div class="route-inner"><span>X</span></div>"#;
        assert_eq!(matcher().find(html).into_strings(), vec![html.to_string()]);
    }

    #[test]
    fn test_exact_tag_truncates_nested_close() {
        let html = r#"<div class="route-inner"><div class="x"></div></div>"#;
        let exact = RegexStrategy::exact_tag(DEFAULT_MARKER).unwrap();
        let found = exact.try_match(&MatchInput::markup(html)).unwrap();
        assert_eq!(
            strings(found),
            vec![r#"<div class="route-inner"><div class="x"></div>"#.to_string()]
        );

        let balanced = BalancedStrategy::new(DEFAULT_MARKER).unwrap();
        let found = balanced.try_match(&MatchInput::markup(html)).unwrap();
        assert_eq!(strings(found), vec![html.to_string()]);
    }

    #[test]
    fn test_no_marker_is_empty() {
        let m = matcher();
        assert!(m.find("").is_empty());
        assert!(m.find("   \n ").is_empty());
        assert!(m.find(r#"<div class="route"><span>x</span></div>"#).is_empty());
        assert!(m.run(&MatchInput::markup("<html></html>")).is_none());
    }

    #[test]
    fn test_flexible_handles_extra_attributes() {
        let html = r#"<div id="r1" class="card route-inner selected" data-x="1"><b>A</b></div>"#;
        let outcome = matcher().run(&MatchInput::markup(html)).unwrap();
        assert_eq!(outcome.strategy, "flexible-attrs");
        assert_eq!(strings(outcome.fragments), vec![html.to_string()]);
    }

    #[test]
    fn test_exact_wins_over_later_strategies() {
        let html = concat!(
            r#"<div class="route-inner"><i>1</i></div>"#,
            r#"<div class="a route-inner"><i>2</i></div>"#,
        );
        let outcome = matcher().run(&MatchInput::markup(html)).unwrap();
        assert_eq!(outcome.strategy, "exact-tag");
        assert_eq!(outcome.fragments.len(), 1);
    }

    #[test]
    fn test_balanced_runs_when_regexes_miss() {
        // Single-quoted class defeats both double-quote regexes
        let html = r#"<div class='route-inner'><div>a</div><div>b</div></div>"#;
        let outcome = matcher().run(&MatchInput::markup(html)).unwrap();
        assert_eq!(outcome.strategy, "balanced-depth");
        assert_eq!(strings(outcome.fragments), vec![html.to_string()]);
    }

    #[test]
    fn test_lenient_is_last_resort() {
        // Substring-only marker: balanced is token-exact and skips it
        let html = r#"<div class='x-route-inner-y'><div>a</div></div>"#;
        let outcome = matcher().run(&MatchInput::markup(html)).unwrap();
        assert_eq!(outcome.strategy, "lenient");
        assert_eq!(strings(outcome.fragments), vec![html.to_string()]);
    }

    #[test]
    fn test_substring_marker_over_matches_in_flexible() {
        let html = r#"<div class="my-route-inner-x"><span>1</span></div>"#;
        let outcome = matcher().run(&MatchInput::markup(html)).unwrap();
        assert_eq!(outcome.strategy, "flexible-attrs");
    }

    #[test]
    fn test_dom_snapshot_used_when_regexes_miss() {
        let dom = DomSnapshot {
            by_class: vec![r#"<div class="route-inner x"><div>a</div></div>"#.into()],
            by_xpath: vec!["ignored".into()],
        };
        let input = MatchInput::markup("<html><body></body></html>").with_dom(&dom);
        let outcome = matcher().run(&input).unwrap();
        assert_eq!(outcome.strategy, "dom-query");
        assert_eq!(outcome.fragments.len(), 1);
    }

    #[test]
    fn test_page_source_match_precedes_dom_snapshot() {
        let html = r#"<div class="route-inner"><div>a</div><div>b</div></div>"#;
        let dom = DomSnapshot {
            by_class: vec![html.into()],
            by_xpath: Vec::new(),
        };
        let outcome = matcher().run(&MatchInput::markup(html).with_dom(&dom)).unwrap();
        assert_eq!(outcome.strategy, "exact-tag");
        assert_eq!(
            outcome.fragments,
            vec![Fragment::from(r#"<div class="route-inner"><div>a</div>"#)]
        );
    }

    #[test]
    fn test_dom_xpath_fallback() {
        let dom = DomSnapshot {
            by_class: Vec::new(),
            by_xpath: vec!["<div class=\"route-inner\">p</div>".into()],
        };
        let found = DomQueryStrategy
            .try_match(&MatchInput::markup("").with_dom(&dom))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(DomQueryStrategy.try_match(&MatchInput::markup("")).is_none());
    }

    #[test]
    fn test_duplicates_removed() {
        let route = r#"<div class="route-inner"><span>X</span></div>"#;
        let html = format!("{route}<hr>{route}<div class=\"route-inner\">Y</div>");
        let found = matcher().find(&html).into_strings();
        assert_eq!(found, vec![route.to_string(), r#"<div class="route-inner">Y</div>"#.to_string()]);
    }

    #[test]
    fn test_idempotent() {
        let html = r#"<div class="a route-inner"><div>1</div></div><div class="route-inner">2</div>"#;
        let m = matcher();
        assert_eq!(m.find(html), m.find(html));
    }

    #[test]
    fn test_marker_is_escaped() {
        let m = FragmentMatcher::new("route.inner").unwrap();
        assert!(m.find(r#"<div class="routeXinner">x</div>"#).is_empty());
        assert_eq!(m.find(r#"<div class="route.inner">x</div>"#).len(), 1);
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(
            matcher().strategy_names(),
            vec!["exact-tag", "flexible-attrs", "dom-query", "balanced-depth", "lenient"]
        );
    }
}
