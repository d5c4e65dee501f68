//! Static rule compilation.
//!
//! Builds the page-type rule set inserted once at startup. Two
//! pattern-based rules cover every qualifying link on the page, including
//! links that appear later:
//!
//! - collection listings, `conservative`: browsing often continues within
//!   the list, so destination intent is uncertain.
//! - product detail pages, `moderate`.
//!
//! There is deliberately no cart or checkout rule.

use crate::config::OPT_OUT_SELECTOR;
use crate::dom::Element;
use crate::error::PrerenderResult;
use crate::registry::RuleSetRegistry;
use crate::rules::{Eagerness, Placement, Predicate, PrerenderRule, RuleDocument};

pub const COLLECTION_HREF: &str = "*/collections/*";
pub const COLLECTION_PRODUCT_HREF: &str = "*/collections/*/products/*";
pub const COLLECTION_EDIT_HREF: &str = "*/collections/*/edit";
pub const PRODUCT_HREF: &str = "*/products/*";
pub const PRODUCT_EDIT_HREF: &str = "*/products/*/edit";

/// Compiles the static, pattern-based rule set.
#[derive(Debug, Clone)]
pub struct StaticRuleCompiler {
    opt_out_selector: String,
}

impl Default for StaticRuleCompiler {
    fn default() -> Self {
        Self {
            opt_out_selector: OPT_OUT_SELECTOR.to_string(),
        }
    }
}

impl StaticRuleCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the rule document.
    pub fn compile(&self) -> RuleDocument {
        let opted_out = || Predicate::not(Predicate::selector(self.opt_out_selector.as_str()));

        let collections = PrerenderRule::Where {
            condition: Predicate::and(vec![
                Predicate::href(COLLECTION_HREF),
                Predicate::not(Predicate::href(COLLECTION_PRODUCT_HREF)),
                Predicate::not(Predicate::href(COLLECTION_EDIT_HREF)),
                opted_out(),
            ]),
            eagerness: Eagerness::Conservative,
        };

        let products = PrerenderRule::Where {
            condition: Predicate::and(vec![
                Predicate::href(PRODUCT_HREF),
                Predicate::not(Predicate::href(PRODUCT_EDIT_HREF)),
                opted_out(),
            ]),
            eagerness: Eagerness::Moderate,
        };

        RuleDocument {
            prerender: vec![collections, products],
        }
    }

    /// Compile and insert the rule set into the document head.
    pub fn register(&self, registry: &RuleSetRegistry) -> PrerenderResult<usize> {
        registry.append(Placement::Head, self.compile())
    }

    /// Eagerness of the first static rule matching the candidate, if any.
    pub fn matching_eagerness(
        document: &RuleDocument,
        href: &str,
        element: Option<&dyn Element>,
    ) -> PrerenderResult<Option<Eagerness>> {
        for rule in &document.prerender {
            if let PrerenderRule::Where { condition, eagerness } = rule {
                if condition.evaluate(href, element)? {
                    return Ok(Some(*eagerness));
                }
            }
        }
        Ok(None)
    }
}
