//! Shopfront Prerender - speculative prerender hints for storefront pages
//!
//! Decides which links on a storefront page the browser should prerender,
//! and how eagerly, then emits speculation-rules documents to the host.
//! Three paths produce hints:
//!
//! - a static, pattern-based rule set inserted once at startup
//!   ([`StaticRuleCompiler`]);
//! - page-type context batches for product and collection pages
//!   ([`context`]);
//! - single-URL batches on hover intent ([`HoverIntentDetector`]), kept
//!   attached to late content by the [`MutationWatcher`].
//!
//! Every dynamic URL passes through the [`ExclusionFilter`] first; cart,
//! checkout, admin and query-string targets are never speculated on.
//!
//! The browser is reached only through the traits in [`dom`], so the engine
//! runs the same against a real page binding or [`dom::memory::MemoryPage`].

pub mod activation;
pub mod bootstrap;
pub mod compiler;
pub mod config;
pub mod context;
pub mod dom;
pub mod error;
pub mod filter;
pub mod hover;
pub mod injector;
pub mod registry;
pub mod rules;
pub mod watcher;

pub use activation::{ActivationMonitor, ActivationReport, WhenActivated};
pub use bootstrap::{BootstrapOutcome, BootstrapReport, BootstrapStage, PrerenderSession};
pub use compiler::StaticRuleCompiler;
pub use config::{PageCategory, PrerenderConfig};
pub use error::{ConfigError, DomError, PrerenderError, PrerenderResult};
pub use filter::{ExclusionFilter, ExclusionReason};
pub use hover::{HoverIntentDetector, HoverOutcome};
pub use injector::DynamicBatchInjector;
pub use registry::{RuleFragment, RuleSetRegistry};
pub use rules::{Eagerness, Placement, Predicate, PrerenderRule, RuleDocument, RuleKind};
pub use watcher::MutationWatcher;
