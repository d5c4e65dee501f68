//! Hover intent detection.
//!
//! Hovering a link precedes clicking it by enough time for a prerender to
//! get going, so a hover over a tracked element is treated as an intent
//! signal for its enclosing link. Each link is speculated on at most once
//! per page load; the processed marker on the link enforces that.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::PROCESSED_MARKER;
use crate::dom::{closest, ElementMatcher, ElementRef, HoverEvent, HoverListener};
use crate::error::{DomError, PrerenderResult};
use crate::filter::{ExclusionFilter, ExclusionReason};
use crate::injector::DynamicBatchInjector;

/// Selector for the link a hover resolves to.
const LINK_SELECTOR: &str = "a";

/// What a single hover led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverOutcome {
    /// The target is not inside a link.
    NoLink,
    /// The link has already triggered an injection.
    AlreadyProcessed,
    /// The link has no resolvable target.
    NoHref,
    /// The target was rejected; the link stays unmarked.
    Excluded(ExclusionReason),
    /// A single-URL batch was injected.
    Injected { url: String },
}

/// Turns hovers over tracked elements into single-URL speculation hints.
pub struct HoverIntentDetector {
    filter: ExclusionFilter,
    injector: DynamicBatchInjector,
}

impl HoverIntentDetector {
    pub fn new(filter: ExclusionFilter, injector: DynamicBatchInjector) -> Self {
        Self { filter, injector }
    }

    /// Handle a hover whose innermost target is `target`.
    pub fn handle(&self, target: &ElementRef) -> PrerenderResult<HoverOutcome> {
        let Some(link) = closest(target, LINK_SELECTOR)? else {
            return Ok(HoverOutcome::NoLink);
        };

        if link.data(PROCESSED_MARKER).is_some() {
            return Ok(HoverOutcome::AlreadyProcessed);
        }

        let Some(url) = link.href() else {
            return Ok(HoverOutcome::NoHref);
        };

        if let Err(reason) = self.filter.check(&url, Some(&link)) {
            return Ok(HoverOutcome::Excluded(reason));
        }

        link.set_data(PROCESSED_MARKER, "true");
        self.injector.inject(std::slice::from_ref(&url))?;

        Ok(HoverOutcome::Injected { url })
    }
}

impl HoverListener for HoverIntentDetector {
    fn on_hover(&self, event: &HoverEvent) {
        match self.handle(&event.target) {
            Ok(HoverOutcome::Injected { url }) => debug!(url = %url, "Hover prerender injected"),
            Ok(outcome) => trace!(?outcome, "Hover ignored"),
            Err(e) => debug!(error = %e, "Hover handling failed"),
        }
    }
}

/// Attach `listener` to every element the matcher finds for `selector`.
///
/// # Returns
///
/// The number of elements that gained the listener; elements that already
/// had it are not counted.
pub fn attach_for_selector(
    matcher: &dyn ElementMatcher,
    selector: &str,
    listener: &Arc<dyn HoverListener>,
) -> Result<usize, DomError> {
    let attached = matcher
        .matching(selector)?
        .iter()
        .filter(|element| element.add_hover_listener(Arc::clone(listener)))
        .count();
    Ok(attached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::{MemoryElement, MemoryPage};
    use crate::dom::SnapshotMatcher;
    use crate::registry::RuleSetRegistry;

    struct Fixture {
        page: Arc<MemoryPage>,
        registry: RuleSetRegistry,
        detector: HoverIntentDetector,
    }

    fn fixture() -> Fixture {
        let page = MemoryPage::builder("/").build().unwrap();
        let registry = RuleSetRegistry::new(page.clone());
        let detector = HoverIntentDetector::new(
            ExclusionFilter::default(),
            DynamicBatchInjector::new(registry.clone()),
        );
        Fixture {
            page,
            registry,
            detector,
        }
    }

    fn link(page: &MemoryPage, href: &str) -> Arc<MemoryElement> {
        page.create_element("a").with_attr("href", href)
    }

    #[test]
    fn test_hover_on_link_child_injects_once() {
        let f = fixture();
        let a = link(&f.page, "/products/tee");
        let img = f.page.create_element("img");
        a.append_child(Arc::clone(&img));
        f.page.body().append_child(Arc::clone(&a));

        let target: ElementRef = img;
        assert_eq!(
            f.detector.handle(&target).unwrap(),
            HoverOutcome::Injected {
                url: "https://shop.example/products/tee".to_string()
            }
        );
        assert_eq!(
            f.detector.handle(&target).unwrap(),
            HoverOutcome::AlreadyProcessed
        );
        assert_eq!(f.registry.len(), 1);
        assert_eq!(a.attr("data-prerendered").as_deref(), Some("true"));
    }

    #[test]
    fn test_hover_outside_link_is_noop() {
        let f = fixture();
        let target: ElementRef = f.page.create_element("span");

        assert_eq!(f.detector.handle(&target).unwrap(), HoverOutcome::NoLink);
        assert!(f.registry.is_empty());
    }

    #[test]
    fn test_link_without_href() {
        let f = fixture();
        let target: ElementRef = f.page.create_element("a");

        assert_eq!(f.detector.handle(&target).unwrap(), HoverOutcome::NoHref);
    }

    #[test]
    fn test_excluded_link_stays_unmarked() {
        let f = fixture();
        let a = link(&f.page, "/cart");
        let target: ElementRef = a.clone();

        assert_eq!(
            f.detector.handle(&target).unwrap(),
            HoverOutcome::Excluded(ExclusionReason::CartPath)
        );
        assert_eq!(a.attr("data-prerendered"), None);
        assert!(f.registry.is_empty());
    }

    #[test]
    fn test_injection_failure_is_reported_and_link_marked() {
        let f = fixture();
        f.page.reject_rule_scripts(true);
        let a = link(&f.page, "/products/tee");
        let target: ElementRef = a.clone();

        assert!(f.detector.handle(&target).is_err());
        assert_eq!(a.attr("data-prerendered").as_deref(), Some("true"));
    }

    #[test]
    fn test_attach_for_selector_is_idempotent() {
        let f = fixture();
        let grid = f.page.create_element("div").with_class("product-grid");
        grid.append_child(link(&f.page, "/products/a"));
        grid.append_child(link(&f.page, "/products/b"));
        f.page.body().append_child(grid);

        let listener: Arc<dyn HoverListener> = Arc::new(f.detector);
        let matcher = SnapshotMatcher::new(&*f.page);

        assert_eq!(attach_for_selector(&matcher, ".product-grid a", &listener).unwrap(), 2);
        assert_eq!(attach_for_selector(&matcher, ".product-grid a", &listener).unwrap(), 0);
        assert_eq!(f.page.attached_listener_count(), 2);
    }
}
