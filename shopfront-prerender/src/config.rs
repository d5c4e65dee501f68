//! Storefront prerender configuration.
//!
//! The configuration is a fixed in-process table: which selectors mark
//! navigation links for each page category, and which patterns exclude a
//! target from speculation. It is built once and read-only afterwards.

use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;

// ==================== Limits ====================

/// Maximum number of URLs in a single explicit-list rule.
///
/// Independent of [`DEFAULT_COLLECTION_ABOVE_FOLD`]; the injector applies
/// this cap to every batch regardless of what the caller already trimmed.
pub const DEFAULT_MAX_DYNAMIC_URLS: usize = 5;

/// Number of product cards treated as initially visible on a collection page.
pub const DEFAULT_COLLECTION_ABOVE_FOLD: usize = 3;

// ==================== Markers ====================

/// Class and attribute that opt a link (or any ancestor) out of speculation.
pub const OPT_OUT_SELECTOR: &str = ".no-prerender, [data-no-prerender]";

/// Dataset key set on a link once it has triggered a hover injection.
pub const PROCESSED_MARKER: &str = "prerendered";

// ==================== Page paths ====================

/// Path fragment identifying a product detail page.
pub const PRODUCT_PATH_SEGMENT: &str = "/products/";

/// Path fragment identifying a collection listing page.
pub const COLLECTION_PATH_SEGMENT: &str = "/collections/";

/// Storefront page categories with tracked navigation links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageCategory {
    Product,
    Collection,
    Cart,
}

impl PageCategory {
    /// All categories in table order.
    pub const ALL: [PageCategory; 3] = [
        PageCategory::Product,
        PageCategory::Collection,
        PageCategory::Cart,
    ];

    /// Get a short name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageCategory::Product => "product",
            PageCategory::Collection => "collection",
            PageCategory::Cart => "cart",
        }
    }

    /// Check whether a location path denotes a page of this category.
    ///
    /// Cart pages are never the subject of a context batch, so no path
    /// is considered a cart page here.
    pub fn matches_path(&self, path: &str) -> bool {
        match self {
            PageCategory::Product => path.contains(PRODUCT_PATH_SEGMENT),
            PageCategory::Collection => path.contains(COLLECTION_PATH_SEGMENT),
            PageCategory::Cart => false,
        }
    }
}

impl fmt::Display for PageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single exclusion entry.
///
/// Raw entries mix element selectors (`[data-add-to-cart]`) and URL globs
/// (`*/admin/*`); [`ExcludePattern::parse`] tells them apart. Globs are
/// matched against the whole URL and `*` spans path separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "pattern", rename_all = "snake_case")]
pub enum ExcludePattern {
    /// Matches the originating element or one of its ancestors.
    Selector(String),
    /// Matches the absolute URL.
    UrlGlob(String),
}

impl ExcludePattern {
    /// Classify a raw pattern string.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with('[') || raw.starts_with('.') || raw.starts_with('#') {
            ExcludePattern::Selector(raw.to_string())
        } else {
            ExcludePattern::UrlGlob(raw.to_string())
        }
    }

    /// Get the raw pattern text.
    pub fn as_str(&self) -> &str {
        match self {
            ExcludePattern::Selector(s) | ExcludePattern::UrlGlob(s) => s,
        }
    }
}

/// Tracked selectors and exclusions for one page category.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigEntry {
    pub category: PageCategory,
    pub selectors: Vec<String>,
    pub exclude_patterns: Vec<ExcludePattern>,
}

impl ConfigEntry {
    /// Create an entry with no exclusions.
    pub fn new(category: PageCategory, selectors: &[&str]) -> Self {
        Self {
            category,
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Add raw exclusion patterns.
    pub fn with_excludes(mut self, patterns: &[&str]) -> Self {
        self.exclude_patterns
            .extend(patterns.iter().map(|p| ExcludePattern::parse(p)));
        self
    }
}

/// Complete prerender configuration.
#[derive(Debug, Clone, Serialize)]
pub struct PrerenderConfig {
    /// Per-category link selectors and exclusions, in attachment order.
    pub entries: Vec<ConfigEntry>,

    /// Cap on URLs per explicit-list rule.
    ///
    /// Default: 5.
    pub max_dynamic_urls: usize,

    /// Product cards considered above the fold on collection pages.
    ///
    /// Default: 3.
    pub collection_above_fold: usize,

    /// Related-product links scanned on product pages.
    pub product_context_selectors: Vec<String>,

    /// Product card links scanned on collection pages.
    pub collection_card_selectors: Vec<String>,
}

impl Default for PrerenderConfig {
    fn default() -> Self {
        let product = ConfigEntry::new(
            PageCategory::Product,
            &[
                "[href*=\"/products/\"]",
                ".product-card a",
                ".product-grid a",
                ".product-link",
                ".product-recommendations a",
                ".featured-products a",
            ],
        )
        .with_excludes(&["[data-add-to-cart]", "[data-variant-selector]"]);

        let collection = ConfigEntry::new(
            PageCategory::Collection,
            &[
                "[href*=\"/collections/\"]",
                ".collection-nav a",
                ".collection-card a",
                ".collection-link",
            ],
        );

        let cart = ConfigEntry::new(
            PageCategory::Cart,
            &[
                "[name=\"checkout\"]",
                "[href*=\"/checkout\"]",
                "[href*=\"/cart\"]",
            ],
        );

        Self {
            entries: vec![product, collection, cart],
            max_dynamic_urls: DEFAULT_MAX_DYNAMIC_URLS,
            collection_above_fold: DEFAULT_COLLECTION_ABOVE_FOLD,
            product_context_selectors: vec![
                ".next-product a".to_string(),
                ".previous-product a".to_string(),
                ".other-products a".to_string(),
                "[data-product-link]".to_string(),
            ],
            collection_card_selectors: vec![
                ".product-card a".to_string(),
                ".product-link".to_string(),
                "[data-product-link]".to_string(),
            ],
        }
    }
}

impl PrerenderConfig {
    /// Create a new configuration with the storefront defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every tracked selector across all categories, in table order.
    pub fn tracked_selectors(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|e| e.selectors.iter().map(String::as_str))
    }

    /// Exclusion selectors across all categories.
    pub fn exclude_selectors(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|e| e.exclude_patterns.iter())
            .filter_map(|p| match p {
                ExcludePattern::Selector(s) => Some(s.as_str()),
                ExcludePattern::UrlGlob(_) => None,
            })
    }

    /// URL exclusion globs across all categories.
    pub fn exclude_globs(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|e| e.exclude_patterns.iter())
            .filter_map(|p| match p {
                ExcludePattern::UrlGlob(g) => Some(g.as_str()),
                ExcludePattern::Selector(_) => None,
            })
    }

    /// Check the table for empty categories and malformed globs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for entry in &self.entries {
            if entry.selectors.is_empty() {
                return Err(ConfigError::EmptySelectors(entry.category));
            }
        }

        for pattern in self.exclude_globs() {
            glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlob {
                pattern: pattern.to_string(),
                reason: e.msg.to_string(),
            })?;
        }

        Ok(())
    }
}
