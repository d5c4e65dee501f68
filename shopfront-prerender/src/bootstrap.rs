//! Session bootstrap.
//!
//! [`PrerenderSession`] owns everything that lives for one page load: the
//! configuration table, the rule-set registry and the hover detector shared
//! by bootstrap and the mutation watcher. It wires the components together
//! in a fixed order and is the failure boundary for setup.
//!
//! # Example
//!
//! ```ignore
//! use shopfront_prerender::{PrerenderConfig, PrerenderSession};
//!
//! let session = PrerenderSession::new(host, PrerenderConfig::default());
//! match session.install() {
//!     BootstrapOutcome::Started(report) => { /* listeners attached */ }
//!     BootstrapOutcome::Deferred => { /* runs on content loaded */ }
//!     _ => {}
//! }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::activation::{ActivationMonitor, ActivationReport};
use crate::compiler::StaticRuleCompiler;
use crate::config::PrerenderConfig;
use crate::context::{default_initializers, run_initializer};
use crate::dom::{HoverListener, PageHost, ReadyState, RuleSink, SnapshotMatcher};
use crate::error::{PrerenderError, PrerenderResult};
use crate::filter::ExclusionFilter;
use crate::hover::{attach_for_selector, HoverIntentDetector};
use crate::injector::DynamicBatchInjector;
use crate::registry::RuleSetRegistry;
use crate::watcher::MutationWatcher;

/// Setup stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    StaticRules,
    HoverListeners,
    ContextBatches,
    ActivationMonitor,
    MutationWatcher,
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BootstrapStage::StaticRules => "static rules",
            BootstrapStage::HoverListeners => "hover listeners",
            BootstrapStage::ContextBatches => "context batches",
            BootstrapStage::ActivationMonitor => "activation monitor",
            BootstrapStage::MutationWatcher => "mutation watcher",
        };
        f.write_str(name)
    }
}

/// Counts from a bootstrap run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Pattern-based fragments inserted.
    pub static_fragments: usize,
    /// Hover listeners attached to existing elements.
    pub listeners_attached: usize,
    /// Context batches injected.
    pub context_batches: usize,
}

/// How a bootstrap attempt ended.
#[derive(Debug)]
pub enum BootstrapOutcome {
    /// The host has no speculation-rules support; nothing was done.
    Unsupported,
    /// The document is still loading; bootstrap runs on content loaded.
    Deferred,
    /// Bootstrap already ran for this session.
    AlreadyStarted,
    /// Every stage completed.
    Started(BootstrapReport),
    /// A stage failed. Earlier stages stay in effect.
    Degraded {
        completed: Vec<BootstrapStage>,
        error: PrerenderError,
    },
}

impl BootstrapOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, BootstrapOutcome::Started(_))
    }
}

/// Page-load-scoped prerender state.
pub struct PrerenderSession {
    host: Arc<dyn PageHost>,
    config: PrerenderConfig,
    registry: RuleSetRegistry,
    filter: ExclusionFilter,
    injector: DynamicBatchInjector,
    /// Shared by bootstrap and the watcher so re-attachment is a no-op.
    listener: Arc<dyn HoverListener>,
    started: AtomicBool,
    activation: Mutex<Option<watch::Receiver<Option<ActivationReport>>>>,
}

impl PrerenderSession {
    pub fn new<H: PageHost + 'static>(host: Arc<H>, config: PrerenderConfig) -> Arc<Self> {
        let sink: Arc<dyn RuleSink> = host.clone();
        let host: Arc<dyn PageHost> = host;

        let registry = RuleSetRegistry::new(sink);
        let filter = ExclusionFilter::new(&config);
        let injector = DynamicBatchInjector::from_config(registry.clone(), &config);
        let listener: Arc<dyn HoverListener> =
            Arc::new(HoverIntentDetector::new(filter.clone(), injector.clone()));

        Arc::new(Self {
            host,
            config,
            registry,
            filter,
            injector,
            listener,
            started: AtomicBool::new(false),
            activation: Mutex::new(None),
        })
    }

    pub fn registry(&self) -> &RuleSetRegistry {
        &self.registry
    }

    /// What the activation monitor observed.
    ///
    /// `None` until the monitor task has finished, or when bootstrap never
    /// reached the monitor stage.
    pub fn activation_report(&self) -> Option<ActivationReport> {
        self.activation
            .lock()
            .as_ref()
            .and_then(|rx| rx.borrow().clone())
    }

    /// Bootstrap now, or once the document has finished parsing.
    pub fn install(self: &Arc<Self>) -> BootstrapOutcome {
        if !self.host.supports_speculation_rules() {
            debug!("Speculation rules unsupported, prerendering disabled");
            return BootstrapOutcome::Unsupported;
        }

        if self.host.ready_state() == ReadyState::Loading {
            let session = Arc::clone(self);
            self.host.on_content_loaded(Box::new(move || {
                session.bootstrap();
            }));
            return BootstrapOutcome::Deferred;
        }

        self.bootstrap()
    }

    /// Run every setup stage once.
    ///
    /// Never panics or returns an error: a failing stage stops the sequence
    /// and is reported as [`BootstrapOutcome::Degraded`].
    pub fn bootstrap(&self) -> BootstrapOutcome {
        if !self.host.supports_speculation_rules() {
            return BootstrapOutcome::Unsupported;
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return BootstrapOutcome::AlreadyStarted;
        }

        let mut completed = Vec::new();
        let mut report = BootstrapReport::default();

        match self.run_stages(&mut completed, &mut report) {
            Ok(()) => {
                info!(
                    path = %self.host.location_path(),
                    static_fragments = report.static_fragments,
                    listeners = report.listeners_attached,
                    context_batches = report.context_batches,
                    "Prerender bootstrap complete"
                );
                BootstrapOutcome::Started(report)
            }
            Err(error) => {
                debug!(
                    error = %error,
                    completed = completed.len(),
                    "Prerender bootstrap degraded"
                );
                BootstrapOutcome::Degraded { completed, error }
            }
        }
    }

    fn run_stages(
        &self,
        completed: &mut Vec<BootstrapStage>,
        report: &mut BootstrapReport,
    ) -> PrerenderResult<()> {
        self.config.validate()?;

        StaticRuleCompiler::new().register(&self.registry)?;
        report.static_fragments = 1;
        completed.push(BootstrapStage::StaticRules);

        let matcher = SnapshotMatcher::new(self.host.as_ref());
        for selector in self.config.tracked_selectors() {
            report.listeners_attached += attach_for_selector(&matcher, selector, &self.listener)?;
        }
        completed.push(BootstrapStage::HoverListeners);

        let path = self.host.location_path();
        for initializer in default_initializers(&self.config, &self.filter) {
            if run_initializer(initializer.as_ref(), &path, &matcher, &self.injector)?.is_some() {
                report.context_batches += 1;
            }
        }
        completed.push(BootstrapStage::ContextBatches);

        let monitor = ActivationMonitor::new(self.host.navigation_timing());
        *self.activation.lock() = Some(monitor.start(self.host.as_ref()));
        completed.push(BootstrapStage::ActivationMonitor);

        let watcher = MutationWatcher::new(&self.config, Arc::clone(&self.listener));
        self.host.observe_insertions(Arc::new(watcher))?;
        completed.push(BootstrapStage::MutationWatcher);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryPage;
    use crate::error::DomError;

    #[test]
    fn test_bootstrap_runs_all_stages() {
        let page = MemoryPage::builder("/").build().unwrap();
        let link = page.create_element("a").with_attr("href", "/products/tee");
        page.body().append_child(link.clone());

        let session = PrerenderSession::new(page.clone(), PrerenderConfig::default());
        let BootstrapOutcome::Started(report) = session.install() else {
            panic!("expected Started");
        };
        assert_eq!(report.static_fragments, 1);
        assert_eq!(report.listeners_attached, 1);
        assert_eq!(report.context_batches, 0);
        assert_eq!(page.observer_count(), 1);
        assert_eq!(page.take_tasks().len(), 1);
        assert_eq!(session.activation_report(), None);
    }

    #[test]
    fn test_bootstrap_runs_once() {
        let page = MemoryPage::builder("/").build().unwrap();
        let session = PrerenderSession::new(page.clone(), PrerenderConfig::default());

        assert!(session.bootstrap().is_started());
        assert!(matches!(session.bootstrap(), BootstrapOutcome::AlreadyStarted));
        assert_eq!(session.registry().len(), 1);
    }

    #[test]
    fn test_unsupported_host_is_noop() {
        let page = MemoryPage::builder("/")
            .without_speculation_rules()
            .build().unwrap();
        let session = PrerenderSession::new(page.clone(), PrerenderConfig::default());

        assert!(matches!(session.install(), BootstrapOutcome::Unsupported));
        assert!(page.rule_scripts().is_empty());
        assert_eq!(page.observer_count(), 0);
    }

    #[test]
    fn test_failed_stage_keeps_earlier_work() {
        let mut config = PrerenderConfig::default();
        config.entries[0].selectors.push("a:hover".to_string());
        let page = MemoryPage::builder("/").build().unwrap();
        let session = PrerenderSession::new(page.clone(), config);

        let BootstrapOutcome::Degraded { completed, error } = session.bootstrap() else {
            panic!("expected Degraded");
        };
        assert_eq!(completed, vec![BootstrapStage::StaticRules]);
        assert!(matches!(
            error,
            PrerenderError::Dom(DomError::InvalidSelector(_))
        ));
        assert_eq!(session.registry().len(), 1);
        assert_eq!(page.observer_count(), 0);
    }

    #[test]
    fn test_invalid_config_stops_before_any_stage() {
        let mut config = PrerenderConfig::default();
        config.entries[1].selectors.clear();
        let page = MemoryPage::builder("/").build().unwrap();
        let session = PrerenderSession::new(page.clone(), config);

        let BootstrapOutcome::Degraded { completed, .. } = session.bootstrap() else {
            panic!("expected Degraded");
        };
        assert!(completed.is_empty());
        assert!(page.rule_scripts().is_empty());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(BootstrapStage::ContextBatches.to_string(), "context batches");
    }
}
