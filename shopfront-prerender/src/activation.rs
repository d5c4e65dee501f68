//! Prerender activation monitoring.
//!
//! When the current page was itself prerendered, the interesting number is
//! how long after navigation start the page became active. The monitor waits
//! for activation, reads `activationStart` from navigation timing and logs
//! it. It is purely observational: every failure is swallowed. The outcome
//! is published on a watch channel once the wait ends.

use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tracing::{debug, trace};

use crate::dom::{NavigationTiming, PageHost};

/// Resolves the pending side of a [`WhenActivated`].
#[derive(Debug)]
pub struct ActivationNotifier(oneshot::Sender<()>);

impl ActivationNotifier {
    /// Signal activation. Consumes the notifier, so it can fire only once.
    pub fn notify(self) {
        // The receiver may already be gone if the monitor never started.
        let _ = self.0.send(());
    }
}

/// One-shot activation signal.
#[derive(Debug)]
pub enum WhenActivated {
    /// The page was never prerendering; it is already active.
    Resolved,
    /// The page is prerendering; resolves when the notifier fires.
    Pending(oneshot::Receiver<()>),
}

impl WhenActivated {
    /// Create a pending signal and the notifier that resolves it.
    pub fn pending() -> (ActivationNotifier, Self) {
        let (tx, rx) = oneshot::channel();
        (ActivationNotifier(tx), WhenActivated::Pending(rx))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, WhenActivated::Pending(_))
    }

    /// Wait for activation.
    ///
    /// Returns `false` if the notifier was dropped without firing, which
    /// happens when a prerendered page is discarded.
    pub async fn wait(self) -> bool {
        match self {
            WhenActivated::Resolved => true,
            WhenActivated::Pending(rx) => rx.await.is_ok(),
        }
    }
}

/// What the monitor observed.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationReport {
    /// No positive `activationStart`; the page was loaded normally.
    NotPrerendered,
    /// The page was prerendered and activated.
    Activated { activation_start_ms: f64 },
    /// The page was discarded before activation.
    Abandoned,
    /// Navigation timing could not be read.
    Unavailable,
}

/// Observes prerender activation.
pub struct ActivationMonitor {
    timing: Arc<dyn NavigationTiming>,
}

impl ActivationMonitor {
    pub fn new(timing: Arc<dyn NavigationTiming>) -> Self {
        Self { timing }
    }

    /// Wait for `when` and record the activation latency.
    pub async fn observe(self, when: WhenActivated) -> ActivationReport {
        let was_prerendering = when.is_pending();
        if !when.wait().await {
            trace!("Prerendered page discarded before activation");
            return ActivationReport::Abandoned;
        }

        match self.timing.activation_start_ms() {
            Ok(Some(start)) if start > 0.0 => {
                debug!(
                    activation_start_ms = start,
                    was_prerendering, "Prerendered page activated"
                );
                ActivationReport::Activated {
                    activation_start_ms: start,
                }
            }
            Ok(_) => ActivationReport::NotPrerendered,
            Err(e) => {
                trace!(error = %e, "Navigation timing unavailable");
                ActivationReport::Unavailable
            }
        }
    }

    /// Subscribe to the host's activation signal on the host's event loop.
    ///
    /// The returned receiver holds `None` until the spawned task has run to
    /// completion, then the report.
    pub fn start(self, host: &dyn PageHost) -> watch::Receiver<Option<ActivationReport>> {
        let (tx, rx) = watch::channel(None);
        let when = host.when_activated();
        host.spawn(Box::pin(async move {
            let report = self.observe(when).await;
            tx.send_replace(Some(report));
        }));
        rx
    }
}
