//! Page-type context batches.
//!
//! Run once at startup, each initializer looks at the current path and, if
//! it is responsible for that kind of page, scans the document for the
//! links a shopper is most likely to follow next and injects them as one
//! batch.
//!
//! - Product pages: next/previous/other product links.
//! - Collection pages: the first few product cards, a stand-in for "above
//!   the fold" without viewport detection.

use tracing::debug;

use crate::config::{PageCategory, PrerenderConfig};
use crate::dom::ElementMatcher;
use crate::error::PrerenderResult;
use crate::filter::ExclusionFilter;
use crate::injector::DynamicBatchInjector;

/// A run-once, page-type-specific link scan.
pub trait ContextBatchInitializer: Send + Sync {
    /// Get a human-readable name for this initializer.
    fn name(&self) -> &'static str;

    /// Whether the initializer applies to the page at `path`.
    fn applies_to(&self, path: &str) -> bool;

    /// Collect eligible candidate URLs in document order.
    fn collect(&self, matcher: &dyn ElementMatcher) -> PrerenderResult<Vec<String>>;
}

/// Related-product links on product detail pages.
#[derive(Debug, Clone)]
pub struct ProductPageInitializer {
    selector: String,
    filter: ExclusionFilter,
}

impl ProductPageInitializer {
    pub fn new(config: &PrerenderConfig, filter: ExclusionFilter) -> Self {
        Self {
            selector: config.product_context_selectors.join(", "),
            filter,
        }
    }
}

impl ContextBatchInitializer for ProductPageInitializer {
    fn name(&self) -> &'static str {
        "product-page"
    }

    fn applies_to(&self, path: &str) -> bool {
        PageCategory::Product.matches_path(path)
    }

    fn collect(&self, matcher: &dyn ElementMatcher) -> PrerenderResult<Vec<String>> {
        let urls = matcher
            .matching(&self.selector)?
            .iter()
            .filter_map(|link| link.href().map(|href| (href, link)))
            .filter(|(href, link)| self.filter.is_eligible(href, Some(link)))
            .map(|(href, _)| href)
            .collect();
        Ok(urls)
    }
}

/// Leading product cards on collection listing pages.
#[derive(Debug, Clone)]
pub struct CollectionPageInitializer {
    selector: String,
    above_fold: usize,
    filter: ExclusionFilter,
}

impl CollectionPageInitializer {
    pub fn new(config: &PrerenderConfig, filter: ExclusionFilter) -> Self {
        Self {
            selector: config.collection_card_selectors.join(", "),
            above_fold: config.collection_above_fold,
            filter,
        }
    }
}

impl ContextBatchInitializer for CollectionPageInitializer {
    fn name(&self) -> &'static str {
        "collection-page"
    }

    fn applies_to(&self, path: &str) -> bool {
        PageCategory::Collection.matches_path(path)
    }

    /// Takes the first cards in document order, then filters. A card that
    /// fails the filter is dropped rather than replaced by a later one.
    fn collect(&self, matcher: &dyn ElementMatcher) -> PrerenderResult<Vec<String>> {
        let urls = matcher
            .matching(&self.selector)?
            .iter()
            .take(self.above_fold)
            .filter_map(|link| link.href().map(|href| (href, link)))
            .filter(|(href, link)| self.filter.is_eligible(href, Some(link)))
            .map(|(href, _)| href)
            .collect();
        Ok(urls)
    }
}

/// The initializers for the storefront page types.
pub fn default_initializers(
    config: &PrerenderConfig,
    filter: &ExclusionFilter,
) -> Vec<Box<dyn ContextBatchInitializer>> {
    vec![
        Box::new(ProductPageInitializer::new(config, filter.clone())),
        Box::new(CollectionPageInitializer::new(config, filter.clone())),
    ]
}

/// Run one initializer against the page.
///
/// # Returns
///
/// The injected fragment id, or `None` if the initializer does not apply
/// or found nothing eligible.
pub fn run_initializer(
    initializer: &dyn ContextBatchInitializer,
    path: &str,
    matcher: &dyn ElementMatcher,
    injector: &DynamicBatchInjector,
) -> PrerenderResult<Option<usize>> {
    if !initializer.applies_to(path) {
        return Ok(None);
    }

    let urls = initializer.collect(matcher)?;
    debug!(
        initializer = initializer.name(),
        candidates = urls.len(),
        "Context batch collected"
    );
    injector.inject(&urls)
}
