//! Dynamic batch injection.
//!
//! Turns an ordered list of already-filtered URLs into a single
//! explicit-list rule and appends it to the registry. Each call is
//! independent; URLs injected by earlier calls are not deduplicated, since
//! the host treats a repeat as a no-op.

use tracing::debug;

use crate::config::{PrerenderConfig, DEFAULT_MAX_DYNAMIC_URLS};
use crate::error::PrerenderResult;
use crate::registry::RuleSetRegistry;
use crate::rules::{Eagerness, Placement, PrerenderRule, RuleDocument};

/// Eagerness of every explicit-list rule.
pub const DYNAMIC_EAGERNESS: Eagerness = Eagerness::Moderate;

/// Build the explicit-list document for `urls`, keeping at most `max_urls`
/// in input order.
///
/// Returns `None` for an empty list.
pub fn build_batch(urls: &[String], max_urls: usize) -> Option<RuleDocument> {
    if urls.is_empty() || max_urls == 0 {
        return None;
    }
    let urls = urls.iter().take(max_urls).cloned().collect();
    Some(RuleDocument::single(PrerenderRule::List {
        urls,
        eagerness: DYNAMIC_EAGERNESS,
    }))
}

/// Appends bounded explicit-list fragments to the registry.
#[derive(Clone)]
pub struct DynamicBatchInjector {
    registry: RuleSetRegistry,
    max_urls: usize,
}

impl DynamicBatchInjector {
    pub fn new(registry: RuleSetRegistry) -> Self {
        Self {
            registry,
            max_urls: DEFAULT_MAX_DYNAMIC_URLS,
        }
    }

    pub fn from_config(registry: RuleSetRegistry, config: &PrerenderConfig) -> Self {
        Self {
            registry,
            max_urls: config.max_dynamic_urls,
        }
    }

    pub fn max_urls(&self) -> usize {
        self.max_urls
    }

    /// Inject one explicit-list fragment.
    ///
    /// Callers must pass eligible URLs. An empty list is a no-op.
    ///
    /// # Returns
    ///
    /// The fragment id, or `None` when nothing was injected.
    pub fn inject(&self, urls: &[String]) -> PrerenderResult<Option<usize>> {
        let Some(document) = build_batch(urls, self.max_urls) else {
            return Ok(None);
        };

        if urls.len() > self.max_urls {
            debug!(
                requested = urls.len(),
                kept = self.max_urls,
                "Dynamic batch truncated"
            );
        }

        let id = self.registry.append(Placement::Body, document)?;
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryPage;
    use crate::rules::RuleKind;
    use proptest::prelude::*;

    fn urls(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("https://shop.example/products/p{i}"))
            .collect()
    }

    fn injector() -> (DynamicBatchInjector, RuleSetRegistry) {
        let page = MemoryPage::builder("/").build().unwrap();
        let registry = RuleSetRegistry::new(page);
        (DynamicBatchInjector::new(registry.clone()), registry)
    }

    #[test]
    fn test_seven_urls_keep_first_five_in_order() {
        let (injector, registry) = injector();

        let id = injector.inject(&urls(7)).unwrap();

        assert_eq!(id, Some(0));
        assert_eq!(registry.len(), 1);
        let fragments = registry.fragments();
        let fragment = &fragments[0];
        assert_eq!(fragment.kind(), Some(RuleKind::ExplicitList));
        assert_eq!(fragment.placement, Placement::Body);
        assert_eq!(fragment.document.prerender[0].urls(), &urls(5)[..]);
        assert_eq!(fragment.document.prerender[0].eagerness(), Eagerness::Moderate);
    }

    #[test]
    fn test_empty_list_is_noop() {
        let (injector, registry) = injector();

        assert_eq!(injector.inject(&[]).unwrap(), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_repeat_calls_are_independent() {
        let (injector, registry) = injector();

        injector.inject(&urls(1)).unwrap();
        injector.inject(&urls(1)).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.urls(), vec![urls(1)[0].clone(), urls(1)[0].clone()]);
    }

    #[test]
    fn test_from_config_uses_configured_cap() {
        let page = MemoryPage::builder("/").build().unwrap();
        let mut config = PrerenderConfig::default();
        config.max_dynamic_urls = 2;
        let injector = DynamicBatchInjector::from_config(RuleSetRegistry::new(page), &config);

        assert_eq!(injector.max_urls(), 2);
        let doc = build_batch(&urls(4), injector.max_urls()).unwrap();
        assert_eq!(doc.prerender[0].urls().len(), 2);
    }

    proptest! {
        /// A batch is never larger than the cap and is always an input prefix.
        #[test]
        fn prop_batch_is_bounded_prefix(n in 1usize..20) {
            let input = urls(n);
            let doc = build_batch(&input, DEFAULT_MAX_DYNAMIC_URLS).unwrap();
            let kept = doc.prerender[0].urls();

            prop_assert_eq!(kept.len(), n.min(DEFAULT_MAX_DYNAMIC_URLS));
            prop_assert_eq!(kept, &input[..kept.len()]);
        }
    }
}
