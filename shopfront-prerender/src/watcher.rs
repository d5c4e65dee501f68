//! Mutation watching.
//!
//! Content added after load (infinite scroll, recommendation widgets,
//! quick-view drawers) needs the same hover listeners as the initial
//! document. The watcher re-runs selector-driven attachment over each batch
//! of inserted subtrees. Attachment is idempotent, so an element seen twice
//! still ends up with exactly one listener.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::PrerenderConfig;
use crate::dom::{HoverListener, InsertionObserver, Node, SubtreeMatcher};
use crate::hover::attach_for_selector;

/// Re-binds hover listeners on inserted content.
pub struct MutationWatcher {
    selectors: Vec<String>,
    listener: Arc<dyn HoverListener>,
}

impl MutationWatcher {
    /// Create a watcher tracking the same selectors as bootstrap.
    pub fn new(config: &PrerenderConfig, listener: Arc<dyn HoverListener>) -> Self {
        Self {
            selectors: config.tracked_selectors().map(str::to_string).collect(),
            listener,
        }
    }

    /// Attach listeners within one batch of inserted roots.
    ///
    /// Each root and each selector is handled on its own: a selector the
    /// host rejects, or a root that fails mid-scan, is logged and skipped
    /// without affecting the rest of the batch.
    ///
    /// # Returns
    ///
    /// The number of listeners newly attached.
    pub fn rebind(&self, roots: &[Node]) -> usize {
        let mut attached = 0;

        for root in roots {
            if root.as_element().is_none() {
                continue;
            }
            let scope = std::slice::from_ref(root);
            let matcher = SubtreeMatcher::new(scope);

            for selector in &self.selectors {
                match attach_for_selector(&matcher, selector, &self.listener) {
                    Ok(n) => attached += n,
                    Err(e) => debug!(
                        selector = %selector,
                        error = %e,
                        "Listener re-bind failed"
                    ),
                }
            }
        }

        trace!(roots = roots.len(), attached, "Mutation batch processed");
        attached
    }
}

impl InsertionObserver for MutationWatcher {
    fn on_inserted_subtree(&self, roots: &[Node]) {
        self.rebind(roots);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigEntry, PageCategory};
    use crate::dom::memory::MemoryPage;
    use crate::dom::{HoverEvent, PageHost};
    use parking_lot::Mutex;

    /// Records the href of every hovered target.
    #[derive(Default)]
    struct Recorder {
        hovers: Mutex<Vec<Option<String>>>,
    }

    impl HoverListener for Recorder {
        fn on_hover(&self, event: &HoverEvent) {
            self.hovers.lock().push(event.target.href());
        }
    }

    fn watcher(config: &PrerenderConfig) -> (MutationWatcher, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let watcher = MutationWatcher::new(config, recorder.clone());
        (watcher, recorder)
    }

    #[test]
    fn test_inserted_link_gets_listener() {
        let page = MemoryPage::builder("/products/tee").build().unwrap();
        let (watcher, recorder) = watcher(&PrerenderConfig::default());
        let watcher = Arc::new(watcher);
        page.observe_insertions(watcher).unwrap();

        let grid = page.create_element("div").with_class("product-recommendations");
        let link = page.create_element("a").with_attr("href", "/products/hat");
        grid.append_child(link.clone());
        page.insert(page.body(), grid);

        assert_eq!(page.flush_mutations(), 1);
        assert_eq!(link.listener_count(), 1);

        page.hover(&link);
        assert_eq!(
            recorder.hovers.lock().as_slice(),
            &[Some("https://shop.example/products/hat".to_string())]
        );
    }

    #[test]
    fn test_rebind_is_idempotent() {
        let page = MemoryPage::builder("/").build().unwrap();
        let (watcher, _) = watcher(&PrerenderConfig::default());

        let link = page.create_element("a").with_attr("href", "/products/hat");
        let roots = vec![Node::Element(link.clone())];

        assert_eq!(watcher.rebind(&roots), 1);
        assert_eq!(watcher.rebind(&roots), 0);
        assert_eq!(link.listener_count(), 1);
    }

    #[test]
    fn test_text_nodes_are_skipped() {
        let (watcher, _) = watcher(&PrerenderConfig::default());
        assert_eq!(watcher.rebind(&[Node::Text("Loading…".to_string())]), 0);
    }

    #[test]
    fn test_bad_selector_does_not_block_others() {
        let mut config = PrerenderConfig::default();
        config
            .entries
            .insert(0, ConfigEntry::new(PageCategory::Product, &["a:hover"]));
        let (watcher, _) = watcher(&config);

        let page = MemoryPage::builder("/").build().unwrap();
        let first = page.create_element("a").with_attr("href", "/products/a");
        let second = page.create_element("a").with_attr("href", "/collections/b");
        let roots = vec![Node::Element(first.clone()), Node::Element(second.clone())];

        assert_eq!(watcher.rebind(&roots), 2);
        assert_eq!(first.listener_count(), 1);
        assert_eq!(second.listener_count(), 1);
    }
}
