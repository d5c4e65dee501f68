//! Host document boundary.
//!
//! The engine never talks to a browser directly. Everything it needs from
//! the page, from selector queries to rule-script insertion, goes through
//! the traits in this module so that any host can drive it: a wasm binding
//! in production, [`memory::MemoryPage`] in tests and tooling.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐     ┌──────────────────────────┐
//! │ PageHost                 │     │ Element                  │
//! │  query_selector_all()    │────►│  href() / matches()      │
//! │  insert_rule_script()    │     │  data() / set_data()     │
//! │  observe_insertions()    │     │  add_hover_listener()    │
//! │  when_activated()        │     └──────────────────────────┘
//! └──────────────────────────┘
//!              ▲
//!              │ ElementMatcher
//!   SnapshotMatcher (bootstrap) / SubtreeMatcher (inserted nodes)
//! ```
//!
//! All traits are `Send + Sync` so that listeners and observers can be held
//! behind `Arc` and shared between the bootstrap path and event callbacks.

mod matcher;
pub mod memory;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::activation::WhenActivated;
use crate::error::DomError;
use crate::rules::Placement;

pub use matcher::{ElementMatcher, SnapshotMatcher, SubtreeMatcher};

/// Boxed future type for tasks handed to the host.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Shared handle to a host element.
pub type ElementRef = Arc<dyn Element>;

/// A single element in the host document.
pub trait Element: Send + Sync + fmt::Debug {
    /// Resolved absolute link target, if the element carries one.
    fn href(&self) -> Option<String>;

    /// Check the element against a selector list.
    fn matches(&self, selector: &str) -> Result<bool, DomError>;

    /// Parent element, `None` at the document root or when detached.
    fn parent(&self) -> Option<ElementRef>;

    /// Descendant elements in document order, excluding the element itself.
    fn descendants(&self) -> Vec<ElementRef>;

    /// Read a dataset entry (`data-<key>`).
    fn data(&self, key: &str) -> Option<String>;

    /// Write a dataset entry (`data-<key>`).
    fn set_data(&self, key: &str, value: &str);

    /// Attach a hover listener.
    ///
    /// Attaching the identical listener reference twice is a no-op; returns
    /// `false` in that case.
    fn add_hover_listener(&self, listener: Arc<dyn HoverListener>) -> bool;
}

/// Find the element itself or its nearest ancestor matching `selector`.
pub fn closest(element: &ElementRef, selector: &str) -> Result<Option<ElementRef>, DomError> {
    let mut current = Some(Arc::clone(element));
    while let Some(candidate) = current {
        if candidate.matches(selector)? {
            return Ok(Some(candidate));
        }
        current = candidate.parent();
    }
    Ok(None)
}

/// A node delivered in a mutation batch.
#[derive(Debug, Clone)]
pub enum Node {
    Element(ElementRef),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&ElementRef> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }
}

/// A pointer-enter style event.
#[derive(Debug, Clone)]
pub struct HoverEvent {
    /// Innermost element under the pointer.
    pub target: ElementRef,
}

/// Receives hover events from elements it is attached to.
pub trait HoverListener: Send + Sync {
    fn on_hover(&self, event: &HoverEvent);
}

/// Receives batches of inserted subtree roots.
///
/// Hosts coalesce bursts of insertions into one call per tick; each call
/// carries every root inserted since the previous one.
pub trait InsertionObserver: Send + Sync {
    fn on_inserted_subtree(&self, roots: &[Node]);
}

/// Document parsing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// Read access to the navigation timing entry.
pub trait NavigationTiming: Send + Sync {
    /// `activationStart` of the navigation entry in milliseconds, if any.
    fn activation_start_ms(&self) -> Result<Option<f64>, DomError>;
}

/// Destination for serialized rule documents.
pub trait RuleSink: Send + Sync {
    /// Insert a `<script type="speculationrules">` carrying `json`.
    fn insert_rule_script(&self, placement: Placement, json: &str) -> Result<(), DomError>;
}

/// The page the engine runs in.
pub trait PageHost: RuleSink {
    /// Whether the browser understands speculation rules.
    fn supports_speculation_rules(&self) -> bool;

    /// Path component of the current location.
    fn location_path(&self) -> String;

    fn ready_state(&self) -> ReadyState;

    /// Run `callback` once document parsing completes.
    fn on_content_loaded(&self, callback: Box<dyn FnOnce() + Send>);

    /// Elements matching a selector list, in document order, each once.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementRef>, DomError>;

    /// Subscribe to node insertions under the content root for the rest of
    /// the page's lifetime.
    fn observe_insertions(&self, observer: Arc<dyn InsertionObserver>) -> Result<(), DomError>;

    /// One-shot signal for prerendered-page activation.
    fn when_activated(&self) -> WhenActivated;

    fn navigation_timing(&self) -> Arc<dyn NavigationTiming>;

    /// Run a task on the page's event loop.
    fn spawn(&self, task: BoxFuture<'static, ()>);
}
