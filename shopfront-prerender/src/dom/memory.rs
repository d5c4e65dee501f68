//! In-memory page host.
//!
//! A small, deterministic stand-in for a browser document. It keeps an
//! element tree under `<body>`, resolves link targets against the page URL,
//! records every inserted rule script, and lets callers drive the events the
//! engine reacts to: hover dispatch, batched insertions, content-loaded and
//! prerender activation.
//!
//! Selectors are evaluated by `scraper` against an HTML mirror of the
//! element's tree. Each mirrored element carries a `data-memory-node`
//! attribute that maps it back to its [`MemoryElement`].
//!
//! # Example
//!
//! ```
//! use shopfront_prerender::dom::memory::MemoryPage;
//!
//! let page = MemoryPage::builder("/collections/summer").build().unwrap();
//! let card = page.create_element("div").with_class("product-card");
//! card.append_child(page.create_element("a").with_attr("href", "/products/tee"));
//! page.body().append_child(card);
//!
//! assert_eq!(page.element_count(), 3);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use scraper::{ElementRef as HtmlElement, Html, Selector};
use url::Url;

use super::{
    BoxFuture, Element, ElementRef, HoverEvent, HoverListener, InsertionObserver,
    NavigationTiming, Node, PageHost, ReadyState, RuleSink,
};
use crate::activation::{ActivationNotifier, WhenActivated};
use crate::error::DomError;
use crate::rules::{Placement, RuleDocument};

/// Default origin for resolving relative links.
pub const DEFAULT_ORIGIN: &str = "https://shop.example";

/// Attribute linking a mirrored HTML element to its [`MemoryElement`].
const NODE_ID_ATTRIBUTE: &str = "data-memory-node";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// An element in a [`MemoryPage`].
pub struct MemoryElement {
    id: u64,
    tag: String,
    /// URL of the owning page; relative links resolve against it.
    base: Url,
    query_fault: Arc<AtomicBool>,
    attributes: Mutex<Vec<(String, String)>>,
    parent: Mutex<Weak<MemoryElement>>,
    children: Mutex<Vec<Arc<MemoryElement>>>,
    listeners: Mutex<Vec<Arc<dyn HoverListener>>>,
}

impl MemoryElement {
    fn new(tag: &str, base: &Url, query_fault: &Arc<AtomicBool>) -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            tag: tag.to_ascii_lowercase(),
            base: base.clone(),
            query_fault: Arc::clone(query_fault),
            attributes: Mutex::new(Vec::new()),
            parent: Mutex::new(Weak::new()),
            children: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
        })
    }

    /// Set an attribute, builder style.
    pub fn with_attr(self: Arc<Self>, name: &str, value: &str) -> Arc<Self> {
        self.set_attr(name, value);
        self
    }

    /// Add a class, builder style.
    pub fn with_class(self: Arc<Self>, class: &str) -> Arc<Self> {
        let classes = match self.attr("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr("class", &classes);
        self
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        let mut attributes = self.attributes.lock();
        match attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.attributes
            .lock()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// Append a child without notifying insertion observers.
    ///
    /// Use this to build the initial document; use [`MemoryPage::insert`]
    /// for content that arrives after load.
    pub fn append_child(self: &Arc<Self>, child: Arc<MemoryElement>) {
        *child.parent.lock() = Arc::downgrade(self);
        self.children.lock().push(child);
    }

    pub fn children(&self) -> Vec<Arc<MemoryElement>> {
        self.children.lock().clone()
    }

    /// Number of distinct hover listeners attached.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn descendant_elements(&self) -> Vec<Arc<MemoryElement>> {
        let mut out = Vec::new();
        for child in self.children() {
            out.push(Arc::clone(&child));
            out.extend(child.descendant_elements());
        }
        out
    }

    fn parent_element(&self) -> Option<Arc<MemoryElement>> {
        self.parent.lock().upgrade()
    }

    fn topmost_ancestor(&self) -> Option<Arc<MemoryElement>> {
        let mut top = self.parent_element()?;
        while let Some(parent) = top.parent_element() {
            top = parent;
        }
        Some(top)
    }

    fn check_queries(&self) -> Result<(), DomError> {
        if self.query_fault.load(Ordering::SeqCst) {
            return Err(DomError::Host("selector query failed".to_string()));
        }
        Ok(())
    }

    /// Parse the tree this element belongs to as an HTML document.
    ///
    /// A detached tree is placed under a bare `<body>`.
    fn mirror(&self) -> Html {
        let ancestor = self.topmost_ancestor();
        let root: &MemoryElement = ancestor.as_deref().unwrap_or(self);

        let mut markup = String::from("<!DOCTYPE html><html><head></head>");
        if root.tag == "body" {
            root.write_markup(&mut markup);
        } else {
            markup.push_str("<body>");
            root.write_markup(&mut markup);
            markup.push_str("</body>");
        }
        markup.push_str("</html>");

        Html::parse_document(&markup)
    }

    fn write_markup(&self, out: &mut String) {
        out.push_str(&format!("<{} {}=\"{}\"", self.tag, NODE_ID_ATTRIBUTE, self.id));
        for (name, value) in self.attributes.lock().iter() {
            out.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }
        for child in self.children() {
            child.write_markup(out);
        }
        out.push_str(&format!("</{}>", self.tag));
    }
}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryElement")
            .field("tag", &self.tag)
            .field("attributes", &*self.attributes.lock())
            .finish()
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn parse_selector(selector: &str) -> Result<Selector, DomError> {
    Selector::parse(selector).map_err(|_| DomError::InvalidSelector(selector.to_string()))
}

fn node_id(element: &HtmlElement<'_>) -> Option<u64> {
    element.value().attr(NODE_ID_ATTRIBUTE)?.parse().ok()
}

impl Element for MemoryElement {
    fn href(&self) -> Option<String> {
        let href = self.attr("href")?;
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.base.join(href).ok().map(String::from)
    }

    fn matches(&self, selector: &str) -> Result<bool, DomError> {
        self.check_queries()?;
        let selector = parse_selector(selector)?;
        let html = self.mirror();

        let mirrored = html
            .root_element()
            .descendants()
            .filter_map(HtmlElement::wrap)
            .find(|e| node_id(e) == Some(self.id));
        Ok(mirrored.is_some_and(|e| selector.matches(&e)))
    }

    fn parent(&self) -> Option<ElementRef> {
        self.parent_element().map(|p| p as ElementRef)
    }

    fn descendants(&self) -> Vec<ElementRef> {
        self.descendant_elements()
            .into_iter()
            .map(|e| e as ElementRef)
            .collect()
    }

    fn data(&self, key: &str) -> Option<String> {
        self.attr(&format!("data-{key}"))
    }

    fn set_data(&self, key: &str, value: &str) {
        self.set_attr(&format!("data-{key}"), value);
    }

    fn add_hover_listener(&self, listener: Arc<dyn HoverListener>) -> bool {
        let mut listeners = self.listeners.lock();
        if listeners
            .iter()
            .any(|l| std::ptr::addr_eq(Arc::as_ptr(l), Arc::as_ptr(&listener)))
        {
            return false;
        }
        listeners.push(listener);
        true
    }
}

/// Navigation timing backed by plain values.
#[derive(Debug, Default)]
pub struct MemoryTiming {
    activation_start_ms: Mutex<Option<f64>>,
    unavailable: AtomicBool,
}

impl NavigationTiming for MemoryTiming {
    fn activation_start_ms(&self) -> Result<Option<f64>, DomError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomError::Host("navigation timing unavailable".to_string()));
        }
        Ok(*self.activation_start_ms.lock())
    }
}

/// Builder for [`MemoryPage`].
#[derive(Debug, Clone)]
pub struct MemoryPageBuilder {
    origin: String,
    path: String,
    supports_rules: bool,
    prerendering: bool,
    ready_state: ReadyState,
}

impl MemoryPageBuilder {
    pub fn origin(mut self, origin: &str) -> Self {
        self.origin = origin.to_string();
        self
    }

    /// Simulate a browser without speculation-rules support.
    pub fn without_speculation_rules(mut self) -> Self {
        self.supports_rules = false;
        self
    }

    /// Simulate a page that is itself being prerendered.
    pub fn prerendering(mut self) -> Self {
        self.prerendering = true;
        self
    }

    /// Simulate a document that is still parsing.
    pub fn loading(mut self) -> Self {
        self.ready_state = ReadyState::Loading;
        self
    }

    /// Build the page.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidUrl`] if the origin does not parse or the
    /// path cannot be joined onto it.
    pub fn build(self) -> Result<Arc<MemoryPage>, DomError> {
        let url = Url::parse(&self.origin)
            .and_then(|origin| origin.join(&self.path))
            .map_err(|_| DomError::InvalidUrl(format!("{}{}", self.origin, self.path)))?;

        let query_fault = Arc::new(AtomicBool::new(false));
        let body = MemoryElement::new("body", &url, &query_fault);

        Ok(Arc::new(MemoryPage {
            url,
            supports_rules: self.supports_rules,
            prerendering: self.prerendering,
            ready_state: Mutex::new(self.ready_state),
            loaded_callbacks: Mutex::new(Vec::new()),
            body,
            query_fault,
            scripts: Mutex::new(Vec::new()),
            reject_scripts: AtomicBool::new(false),
            observers: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
            notifier: Mutex::new(None),
            timing: Arc::new(MemoryTiming::default()),
            tasks: Mutex::new(Vec::new()),
        }))
    }
}

/// An in-memory storefront page.
pub struct MemoryPage {
    url: Url,
    supports_rules: bool,
    prerendering: bool,
    ready_state: Mutex<ReadyState>,
    loaded_callbacks: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
    body: Arc<MemoryElement>,
    /// Shared with every element of the page.
    query_fault: Arc<AtomicBool>,
    scripts: Mutex<Vec<(Placement, String)>>,
    reject_scripts: AtomicBool,
    observers: Mutex<Vec<Arc<dyn InsertionObserver>>>,
    pending: Mutex<Vec<Node>>,
    notifier: Mutex<Option<ActivationNotifier>>,
    timing: Arc<MemoryTiming>,
    tasks: Mutex<Vec<BoxFuture<'static, ()>>>,
}

impl MemoryPage {
    /// Start building a page at `path` on the default origin.
    pub fn builder(path: &str) -> MemoryPageBuilder {
        MemoryPageBuilder {
            origin: DEFAULT_ORIGIN.to_string(),
            path: path.to_string(),
            supports_rules: true,
            prerendering: false,
            ready_state: ReadyState::Complete,
        }
    }

    /// Create a detached element belonging to this page.
    pub fn create_element(&self, tag: &str) -> Arc<MemoryElement> {
        MemoryElement::new(tag, &self.url, &self.query_fault)
    }

    pub fn body(&self) -> &Arc<MemoryElement> {
        &self.body
    }

    /// Insert `child` under `parent` after load.
    ///
    /// The insertion is queued for observers until [`flush_mutations`](Self::flush_mutations).
    pub fn insert(&self, parent: &Arc<MemoryElement>, child: Arc<MemoryElement>) {
        parent.append_child(Arc::clone(&child));
        self.pending.lock().push(Node::Element(child));
    }

    /// Queue an inserted text node.
    pub fn insert_text(&self, text: &str) {
        self.pending.lock().push(Node::Text(text.to_string()));
    }

    /// Deliver queued insertions to every observer as one batch.
    ///
    /// Returns the number of roots delivered.
    pub fn flush_mutations(&self) -> usize {
        let roots = std::mem::take(&mut *self.pending.lock());
        if roots.is_empty() {
            return 0;
        }
        let observers = self.observers.lock().clone();
        for observer in observers {
            observer.on_inserted_subtree(&roots);
        }
        roots.len()
    }

    /// Dispatch a hover on `target`, bubbling through its ancestors.
    pub fn hover(&self, target: &Arc<MemoryElement>) {
        let event = HoverEvent {
            target: Arc::clone(target) as ElementRef,
        };
        let mut current = Some(Arc::clone(target));
        while let Some(element) = current {
            let listeners = element.listeners.lock().clone();
            for listener in listeners {
                listener.on_hover(&event);
            }
            current = element.parent_element();
        }
    }

    /// Finish parsing and run content-loaded callbacks.
    pub fn finish_loading(&self) {
        *self.ready_state.lock() = ReadyState::Interactive;
        let callbacks = std::mem::take(&mut *self.loaded_callbacks.lock());
        for callback in callbacks {
            callback();
        }
    }

    /// Activate a prerendered page.
    pub fn activate(&self, activation_start_ms: f64) {
        *self.timing.activation_start_ms.lock() = Some(activation_start_ms);
        if let Some(notifier) = self.notifier.lock().take() {
            notifier.notify();
        }
    }

    /// Discard a prerendered page without activating it.
    pub fn discard(&self) {
        self.notifier.lock().take();
    }

    /// Record a navigation timing value without activation.
    pub fn set_activation_start(&self, activation_start_ms: f64) {
        *self.timing.activation_start_ms.lock() = Some(activation_start_ms);
    }

    /// Make navigation timing reads fail.
    pub fn fail_navigation_timing(&self) {
        self.timing.unavailable.store(true, Ordering::SeqCst);
    }

    /// Make selector queries and element matching fail (or succeed again).
    pub fn fail_selector_queries(&self, fail: bool) {
        self.query_fault.store(fail, Ordering::SeqCst);
    }

    /// Make rule-script insertion fail (or succeed again).
    pub fn reject_rule_scripts(&self, reject: bool) {
        self.reject_scripts.store(reject, Ordering::SeqCst);
    }

    /// Rule scripts inserted so far, in insertion order.
    pub fn rule_scripts(&self) -> Vec<(Placement, String)> {
        self.scripts.lock().clone()
    }

    /// Inserted rule scripts parsed back into documents.
    pub fn rule_documents(&self) -> Vec<RuleDocument> {
        self.scripts
            .lock()
            .iter()
            .filter_map(|(_, json)| serde_json::from_str(json).ok())
            .collect()
    }

    /// Hover listeners attached across the whole document.
    pub fn attached_listener_count(&self) -> usize {
        self.body.listener_count()
            + self
                .body
                .descendant_elements()
                .iter()
                .map(|e| e.listener_count())
                .sum::<usize>()
    }

    /// Elements in the document, including `<body>`.
    pub fn element_count(&self) -> usize {
        1 + self.body.descendant_elements().len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Take every task spawned on the page so the caller can drive them.
    pub fn take_tasks(&self) -> Vec<BoxFuture<'static, ()>> {
        std::mem::take(&mut *self.tasks.lock())
    }
}

impl RuleSink for MemoryPage {
    fn insert_rule_script(&self, placement: Placement, json: &str) -> Result<(), DomError> {
        if self.reject_scripts.load(Ordering::SeqCst) {
            return Err(DomError::Host("rule script rejected".to_string()));
        }
        self.scripts.lock().push((placement, json.to_string()));
        Ok(())
    }
}

impl PageHost for MemoryPage {
    fn supports_speculation_rules(&self) -> bool {
        self.supports_rules
    }

    fn location_path(&self) -> String {
        self.url.path().to_string()
    }

    fn ready_state(&self) -> ReadyState {
        *self.ready_state.lock()
    }

    fn on_content_loaded(&self, callback: Box<dyn FnOnce() + Send>) {
        self.loaded_callbacks.lock().push(callback);
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementRef>, DomError> {
        self.body.check_queries()?;
        let selector = parse_selector(selector)?;
        let html = self.body.mirror();

        let mut by_id: HashMap<u64, Arc<MemoryElement>> = std::iter::once(Arc::clone(&self.body))
            .chain(self.body.descendant_elements())
            .map(|e| (e.id, e))
            .collect();

        Ok(html
            .select(&selector)
            .filter_map(|e| node_id(&e))
            .filter_map(|id| by_id.remove(&id))
            .map(|e| e as ElementRef)
            .collect())
    }

    fn observe_insertions(&self, observer: Arc<dyn InsertionObserver>) -> Result<(), DomError> {
        self.observers.lock().push(observer);
        Ok(())
    }

    fn when_activated(&self) -> WhenActivated {
        if !self.prerendering {
            return WhenActivated::Resolved;
        }
        let (notifier, when) = WhenActivated::pending();
        *self.notifier.lock() = Some(notifier);
        when
    }

    fn navigation_timing(&self) -> Arc<dyn NavigationTiming> {
        Arc::clone(&self.timing) as Arc<dyn NavigationTiming>
    }

    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self.tasks.lock().push(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_href_resolution() {
        let page = MemoryPage::builder("/").build().unwrap();

        let rooted = page.create_element("a").with_attr("href", "/products/tee");
        assert_eq!(
            rooted.href().as_deref(),
            Some("https://shop.example/products/tee")
        );

        let absolute = page
            .create_element("a")
            .with_attr("href", "https://other.example/x");
        assert_eq!(absolute.href().as_deref(), Some("https://other.example/x"));

        let scheme_relative = page
            .create_element("a")
            .with_attr("href", "//cdn.example/products/tee");
        assert_eq!(
            scheme_relative.href().as_deref(),
            Some("https://cdn.example/products/tee")
        );

        let empty = page.create_element("a").with_attr("href", "  ");
        assert_eq!(empty.href(), None);
        assert_eq!(page.create_element("a").href(), None);
    }

    #[test]
    fn test_relative_href_resolves_against_page_path() {
        let page = MemoryPage::builder("/collections/summer").build().unwrap();

        let sibling = page.create_element("a").with_attr("href", "products/tee");
        assert_eq!(
            sibling.href().as_deref(),
            Some("https://shop.example/collections/products/tee")
        );

        let parent = page.create_element("a").with_attr("href", "../pages/faq");
        assert_eq!(parent.href().as_deref(), Some("https://shop.example/pages/faq"));

        let fragment = page.create_element("a").with_attr("href", "#reviews");
        assert_eq!(
            fragment.href().as_deref(),
            Some("https://shop.example/collections/summer#reviews")
        );
    }

    #[test]
    fn test_builder_origin() {
        let page = MemoryPage::builder("/products/tee")
            .origin("http://localhost:9292")
            .build()
            .unwrap();
        let link = page.create_element("a").with_attr("href", "/cart");

        assert_eq!(link.href().as_deref(), Some("http://localhost:9292/cart"));
        assert_eq!(page.location_path(), "/products/tee");
    }

    #[test]
    fn test_invalid_origin_fails_build() {
        let result = MemoryPage::builder("/").origin("shop.example").build();
        assert!(matches!(result, Err(DomError::InvalidUrl(_))));
    }

    #[test]
    fn test_query_selector_all_document_order_once() {
        let page = MemoryPage::builder("/").build().unwrap();
        let card = page.create_element("div").with_class("product-card");
        let first = page
            .create_element("a")
            .with_class("product-link")
            .with_attr("href", "/products/a");
        let second = page.create_element("a").with_attr("href", "/products/b");
        card.append_child(first);
        card.append_child(second);
        page.body().append_child(card);

        let found = page
            .query_selector_all(".product-card a, .product-link")
            .unwrap();

        let hrefs: Vec<String> = found.iter().filter_map(|e| e.href()).collect();
        assert_eq!(
            hrefs,
            vec![
                "https://shop.example/products/a".to_string(),
                "https://shop.example/products/b".to_string(),
            ]
        );
    }

    #[test]
    fn test_full_selector_grammar() {
        let page = MemoryPage::builder("/collections/all").build().unwrap();
        let card = page.create_element("div").with_class("product-card");
        let product = page.create_element("a").with_attr("href", "/products/tee");
        let skipped = page
            .create_element("a")
            .with_class("no-prerender")
            .with_attr("href", "/pages/sizing");
        card.append_child(Arc::clone(&product));
        card.append_child(Arc::clone(&skipped));
        page.body().append_child(card);

        assert!(product.matches("[href *= \"/products/\"]").unwrap());
        assert!(!skipped.matches("[href *= \"/products/\"]").unwrap());
        assert!(product.matches(".product-card > a").unwrap());
        assert!(product.matches("a[href]:not(.no-prerender)").unwrap());
        assert!(!skipped.matches("a[href]:not(.no-prerender)").unwrap());

        assert_eq!(
            page.query_selector_all("a[href]:not(.no-prerender)").unwrap().len(),
            1
        );
    }

    #[test]
    fn test_detached_subtree_matches() {
        let page = MemoryPage::builder("/").build().unwrap();
        let widget = page.create_element("section").with_class("product-recommendations");
        let link = page.create_element("a").with_attr("href", "/products/hat");
        widget.append_child(Arc::clone(&link));

        assert!(link.matches(".product-recommendations a").unwrap());
        assert!(!link.matches("body > a").unwrap());
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let page = MemoryPage::builder("/").build().unwrap();
        let link = page
            .create_element("a")
            .with_attr("title", "\"quoted\" & more");

        assert!(link.matches("[title='\"quoted\" & more']").unwrap());
    }

    #[test]
    fn test_unsupported_selector_is_rejected() {
        let page = MemoryPage::builder("/").build().unwrap();
        let link = page.create_element("a");

        assert!(matches!(
            link.matches("a:hover"),
            Err(DomError::InvalidSelector(_))
        ));
        assert!(matches!(
            page.query_selector_all("a::before"),
            Err(DomError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_failed_selector_queries() {
        let page = MemoryPage::builder("/").build().unwrap();
        let link = page.create_element("a");
        page.body().append_child(Arc::clone(&link));

        page.fail_selector_queries(true);
        assert!(matches!(link.matches("a"), Err(DomError::Host(_))));
        assert!(matches!(page.query_selector_all("a"), Err(DomError::Host(_))));

        page.fail_selector_queries(false);
        assert!(link.matches("a").unwrap());
    }

    #[test]
    fn test_add_hover_listener_is_idempotent() {
        struct Noop;
        impl HoverListener for Noop {
            fn on_hover(&self, _event: &HoverEvent) {}
        }

        let page = MemoryPage::builder("/").build().unwrap();
        let link = page.create_element("a");
        let listener: Arc<dyn HoverListener> = Arc::new(Noop);

        assert!(link.add_hover_listener(Arc::clone(&listener)));
        assert!(!link.add_hover_listener(Arc::clone(&listener)));
        assert!(link.add_hover_listener(Arc::new(Noop)));
        assert_eq!(link.listener_count(), 2);
    }

    #[test]
    fn test_data_uses_data_attributes() {
        let page = MemoryPage::builder("/").build().unwrap();
        let link = page.create_element("a");

        link.set_data("prerendered", "true");
        assert_eq!(link.attr("data-prerendered").as_deref(), Some("true"));
        assert!(link.matches("[data-prerendered]").unwrap());
    }

    #[test]
    fn test_flush_without_pending_is_noop() {
        let page = MemoryPage::builder("/").build().unwrap();
        assert_eq!(page.flush_mutations(), 0);
    }

    #[test]
    fn test_rejected_rule_script() {
        let page = MemoryPage::builder("/").build().unwrap();
        page.reject_rule_scripts(true);

        assert!(page.insert_rule_script(Placement::Body, "{}").is_err());
        assert!(page.rule_scripts().is_empty());
    }
}
