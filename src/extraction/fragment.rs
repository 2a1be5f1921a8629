//! Fragment types and order-preserving deduplication.

use serde::Serialize;
use std::collections::HashSet;

/// One extracted route element, serialized as HTML text.
///
/// Fragments are opaque at this layer: no route semantics are parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fragment(String);

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl AsRef<str> for Fragment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered fragments with no two identical texts.
///
/// The only way to build one is [`FragmentSet::dedupe`], so the uniqueness
/// invariant holds for every instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FragmentSet(Vec<Fragment>);

impl FragmentSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Keep the first occurrence of every distinct text, in original order.
    pub fn dedupe<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = Fragment>,
    {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        for fragment in fragments {
            if seen.insert(fragment.0.clone()) {
                kept.push(fragment);
            }
        }
        Self(kept)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fragment> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Fragment] {
        &self.0
    }

    /// Plain strings, as sent over the wire.
    pub fn into_strings(self) -> Vec<String> {
        self.0.into_iter().map(Fragment::into_string).collect()
    }
}

impl IntoIterator for FragmentSet {
    type Item = Fragment;
    type IntoIter = std::vec::IntoIter<Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FragmentSet {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
