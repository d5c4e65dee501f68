//! Speculation rule documents.
//!
//! These types serialize to the exact JSON the browser's speculation-rules
//! engine consumes:
//!
//! ```text
//! { "prerender": [ { "where": <predicate>, "eagerness": "conservative" } ] }
//! { "prerender": [ { "urls": ["https://…", …], "eagerness": "moderate" } ] }
//! ```
//!
//! Predicates are a small tree over `and`, `not`, `href_matches` and
//! `selector_matches`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::Element;
use crate::error::{ConfigError, PrerenderResult};

/// How early and how liberally the host acts on a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eagerness {
    Conservative,
    Moderate,
    Eager,
}

impl Eagerness {
    /// Get a short description for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Eagerness::Conservative => "conservative",
            Eagerness::Moderate => "moderate",
            Eagerness::Eager => "eager",
        }
    }
}

impl fmt::Display for Eagerness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a rule script is inserted in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Head,
    Body,
}

/// The two rule subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Continuously evaluated against every link on the page.
    PatternBased,
    /// Snapshot list of concrete URLs, evaluated once at insertion.
    ExplicitList,
}

/// Boolean predicate tree over link attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    And(Vec<Predicate>),
    Not(Box<Predicate>),
    HrefMatches(String),
    SelectorMatches(String),
}

impl Predicate {
    pub fn href(pattern: impl Into<String>) -> Self {
        Predicate::HrefMatches(pattern.into())
    }

    pub fn selector(selector: impl Into<String>) -> Self {
        Predicate::SelectorMatches(selector.into())
    }

    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    pub fn and(parts: Vec<Predicate>) -> Self {
        Predicate::And(parts)
    }

    /// Evaluate the predicate for a candidate link.
    ///
    /// This is a local approximation of what the host engine does: href
    /// patterns are matched as globs against the absolute URL (with `*`
    /// spanning `/`), and selector predicates are false when no element is
    /// supplied. The host remains the authority.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob does not compile or the element rejects a
    /// selector.
    pub fn evaluate(&self, href: &str, element: Option<&dyn Element>) -> PrerenderResult<bool> {
        match self {
            Predicate::And(parts) => {
                for part in parts {
                    if !part.evaluate(href, element)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Not(inner) => Ok(!inner.evaluate(href, element)?),
            Predicate::HrefMatches(pattern) => {
                let glob = glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlob {
                    pattern: pattern.clone(),
                    reason: e.msg.to_string(),
                })?;
                Ok(glob.matches(href))
            }
            Predicate::SelectorMatches(selector) => match element {
                Some(element) => Ok(element.matches(selector)?),
                None => Ok(false),
            },
        }
    }
}

/// A single prerender rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrerenderRule {
    /// Pattern-based rule.
    Where {
        #[serde(rename = "where")]
        condition: Predicate,
        eagerness: Eagerness,
    },
    /// Explicit-list rule.
    List { urls: Vec<String>, eagerness: Eagerness },
}

impl PrerenderRule {
    pub fn eagerness(&self) -> Eagerness {
        match self {
            PrerenderRule::Where { eagerness, .. } | PrerenderRule::List { eagerness, .. } => {
                *eagerness
            }
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            PrerenderRule::Where { .. } => RuleKind::PatternBased,
            PrerenderRule::List { .. } => RuleKind::ExplicitList,
        }
    }

    /// URLs of an explicit-list rule, empty for pattern-based rules.
    pub fn urls(&self) -> &[String] {
        match self {
            PrerenderRule::List { urls, .. } => urls,
            PrerenderRule::Where { .. } => &[],
        }
    }
}

/// A complete rule document, inserted into the page as one script.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleDocument {
    pub prerender: Vec<PrerenderRule>,
}

impl RuleDocument {
    /// Create a document holding a single rule.
    pub fn single(rule: PrerenderRule) -> Self {
        Self {
            prerender: vec![rule],
        }
    }

    /// Serialize to the compact JSON inserted into the page.
    pub fn to_json(&self) -> PrerenderResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON for inspection.
    pub fn to_json_pretty(&self) -> PrerenderResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The document's kind, taken from its first rule.
    pub fn kind(&self) -> Option<RuleKind> {
        self.prerender.first().map(PrerenderRule::kind)
    }
}
