//! Page-wide rule set registry.
//!
//! Every rule document the engine produces passes through here on its way
//! into the page. The registry is append-only: fragments are never removed
//! or replaced, and the effective rule set is the union of everything
//! inserted since load. It lives exactly as long as the page session that
//! owns it.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::dom::RuleSink;
use crate::error::PrerenderResult;
use crate::rules::{Placement, RuleDocument, RuleKind};

/// One inserted rule document.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFragment {
    /// Insertion index, starting at 0.
    pub id: usize,
    pub placement: Placement,
    pub document: RuleDocument,
    /// The exact JSON handed to the host.
    pub json: String,
}

impl RuleFragment {
    pub fn kind(&self) -> Option<RuleKind> {
        self.document.kind()
    }
}

/// Append-only registry of inserted rule documents.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct RuleSetRegistry {
    sink: Arc<dyn RuleSink>,
    fragments: Arc<Mutex<Vec<RuleFragment>>>,
}

impl RuleSetRegistry {
    pub fn new(sink: Arc<dyn RuleSink>) -> Self {
        Self {
            sink,
            fragments: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serialize `document`, insert it into the page and record it.
    ///
    /// The fragment is only recorded once the host has accepted it.
    ///
    /// # Returns
    ///
    /// The fragment id.
    pub fn append(&self, placement: Placement, document: RuleDocument) -> PrerenderResult<usize> {
        let json = document.to_json()?;
        self.sink.insert_rule_script(placement, &json)?;

        let mut fragments = self.fragments.lock();
        let id = fragments.len();
        debug!(id, ?placement, bytes = json.len(), "Rule set fragment inserted");
        fragments.push(RuleFragment {
            id,
            placement,
            document,
            json,
        });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.fragments.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.lock().is_empty()
    }

    /// Snapshot of every fragment in insertion order.
    pub fn fragments(&self) -> Vec<RuleFragment> {
        self.fragments.lock().clone()
    }

    /// Every explicitly listed URL across all fragments, duplicates included.
    pub fn urls(&self) -> Vec<String> {
        self.fragments
            .lock()
            .iter()
            .flat_map(|f| f.document.prerender.iter())
            .flat_map(|rule| rule.urls().iter().cloned())
            .collect()
    }
}
