//! Exclusion filter.
//!
//! The single safety gate every dynamic path funnels through. A target is
//! rejected when speculating on it could cause a side effect (cart and
//! checkout endpoints, action verbs, query strings) or when the page has
//! opted the link out.
//!
//! Checks here run on the parsed URL: the query and path components decide,
//! the fragment never does. The static rule set expresses the same
//! exclusions as negated predicates instead.

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::{PrerenderConfig, OPT_OUT_SELECTOR};
use crate::dom::{closest, ElementRef};

/// Path words that denote side-effecting endpoints.
const ACTION_VERBS: [&str; 4] = ["add", "remove", "update", "change"];

/// Why a target is not eligible for speculation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    #[error("empty URL")]
    Empty,

    #[error("not an absolute URL")]
    InvalidUrl,

    #[error("URL carries a query string")]
    QueryString,

    #[error("administrative path")]
    AdminPath,

    #[error("cart path")]
    CartPath,

    #[error("checkout path")]
    CheckoutPath,

    #[error("action verb '{0}' in path")]
    ActionVerb(String),

    #[error("matches exclusion pattern '{0}'")]
    Pattern(String),

    #[error("opted out via '{0}'")]
    OptedOut(String),
}

/// Decides whether a URL (and its originating element) is safe to speculate on.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    url_patterns: Vec<glob::Pattern>,
    opt_out_selectors: Vec<String>,
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new(&PrerenderConfig::default())
    }
}

impl ExclusionFilter {
    /// Build a filter from the configured exclusions.
    ///
    /// The built-in opt-out markers always apply. Globs that do not compile
    /// are skipped here; [`PrerenderConfig::validate`] reports them.
    pub fn new(config: &PrerenderConfig) -> Self {
        let url_patterns = config
            .exclude_globs()
            .filter_map(|g| glob::Pattern::new(g).ok())
            .collect();

        let opt_out_selectors = std::iter::once(OPT_OUT_SELECTOR)
            .chain(config.exclude_selectors())
            .map(str::to_string)
            .collect();

        Self {
            url_patterns,
            opt_out_selectors,
        }
    }

    /// Check an absolute URL on its own.
    pub fn check_url(&self, url: &str) -> Result<(), ExclusionReason> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ExclusionReason::Empty);
        }
        let parsed = Url::parse(url).map_err(|_| ExclusionReason::InvalidUrl)?;
        if parsed.query().is_some() {
            return Err(ExclusionReason::QueryString);
        }

        let path = parsed.path().to_ascii_lowercase();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if segments.iter().any(|s| *s == "admin") {
            return Err(ExclusionReason::AdminPath);
        }

        let words: Vec<&str> = segments
            .iter()
            .flat_map(|s| s.split(|c: char| !c.is_ascii_alphanumeric()))
            .filter(|w| !w.is_empty())
            .collect();

        if words.iter().any(|w| *w == "checkout" || *w == "checkouts") {
            return Err(ExclusionReason::CheckoutPath);
        }
        if words.iter().any(|w| *w == "cart") {
            return Err(ExclusionReason::CartPath);
        }
        if let Some(verb) = words.iter().find(|w| ACTION_VERBS.contains(*w)) {
            return Err(ExclusionReason::ActionVerb(verb.to_string()));
        }

        if let Some(pattern) = self.url_patterns.iter().find(|p| p.matches(parsed.as_str())) {
            return Err(ExclusionReason::Pattern(pattern.as_str().to_string()));
        }

        Ok(())
    }

    /// Check a URL together with the element it came from.
    ///
    /// An element whose opt-out state cannot be determined is treated as
    /// opted out.
    pub fn check(&self, url: &str, element: Option<&ElementRef>) -> Result<(), ExclusionReason> {
        self.check_url(url)?;

        if let Some(element) = element {
            for selector in &self.opt_out_selectors {
                match closest(element, selector) {
                    Ok(None) => {}
                    Ok(Some(_)) => return Err(ExclusionReason::OptedOut(selector.clone())),
                    Err(e) => {
                        debug!(selector = %selector, error = %e, "Opt-out check failed");
                        return Err(ExclusionReason::OptedOut(selector.clone()));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn is_eligible(&self, url: &str, element: Option<&ElementRef>) -> bool {
        self.check(url, element).is_ok()
    }
}
