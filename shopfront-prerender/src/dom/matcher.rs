//! Selector → elements lookup.
//!
//! Hover listeners are attached through the same contract at bootstrap and
//! when content is inserted later; only the search scope differs.

use std::sync::Arc;

use super::{ElementRef, Node, PageHost};
use crate::error::DomError;

/// Finds elements matching a selector within some scope.
pub trait ElementMatcher {
    fn matching(&self, selector: &str) -> Result<Vec<ElementRef>, DomError>;
}

/// Matches against the whole document as it stands.
pub struct SnapshotMatcher<'a> {
    host: &'a dyn PageHost,
}

impl<'a> SnapshotMatcher<'a> {
    pub fn new(host: &'a dyn PageHost) -> Self {
        Self { host }
    }
}

impl ElementMatcher for SnapshotMatcher<'_> {
    fn matching(&self, selector: &str) -> Result<Vec<ElementRef>, DomError> {
        self.host.query_selector_all(selector)
    }
}

/// Matches within freshly inserted subtrees.
///
/// Each root element is itself a candidate, as are all of its descendants.
/// Text nodes are skipped, and an element reachable from two roots is
/// returned once.
pub struct SubtreeMatcher<'a> {
    roots: &'a [Node],
}

impl<'a> SubtreeMatcher<'a> {
    pub fn new(roots: &'a [Node]) -> Self {
        Self { roots }
    }
}

impl ElementMatcher for SubtreeMatcher<'_> {
    fn matching(&self, selector: &str) -> Result<Vec<ElementRef>, DomError> {
        let mut found: Vec<ElementRef> = Vec::new();

        for root in self.roots.iter().filter_map(Node::as_element) {
            let candidates = std::iter::once(Arc::clone(root)).chain(root.descendants());
            for candidate in candidates {
                if !candidate.matches(selector)? {
                    continue;
                }
                if !found.iter().any(|seen| same_element(seen, &candidate)) {
                    found.push(candidate);
                }
            }
        }

        Ok(found)
    }
}

fn same_element(a: &ElementRef, b: &ElementRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
