//! The user-interface collaborator.
//!
//! The executor never renders anything itself. It reports loading and
//! connectivity changes to a [`UiDelegate`] supplied by the application.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Receives loading and connectivity notifications from the executor.
///
/// Calls may arrive from runtime worker threads or the reachability queue.
pub trait UiDelegate: Send + Sync {
    /// A non-silent request started.
    fn show_loading(&self);

    /// The request that showed the indicator is finished with it.
    fn hide_loading(&self);

    /// The network became unreachable while a request was in flight.
    fn no_connectivity(&self);
}

/// A delegate that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopUi;

impl UiDelegate for NoopUi {
    fn show_loading(&self) {}
    fn hide_loading(&self) {}
    fn no_connectivity(&self) {}
}

/// Shows the loading indicator on creation and hides it exactly once.
///
/// Hiding happens on the first call to [`hide`](Self::hide) or on drop,
/// whichever comes first. A guard created for a silent request never shows
/// or hides anything.
pub struct LoadingGuard {
    ui: Arc<dyn UiDelegate>,
    pending: AtomicBool,
}

impl LoadingGuard {
    /// Show the indicator unless `silent`.
    pub fn show(ui: Arc<dyn UiDelegate>, silent: bool) -> Self {
        if !silent {
            ui.show_loading();
        }
        Self {
            ui,
            pending: AtomicBool::new(!silent),
        }
    }

    /// Hide the indicator if it is still shown.
    pub fn hide(&self) {
        if self.pending.swap(false, Ordering::AcqRel) {
            self.ui.hide_loading();
        }
    }

    /// Whether the indicator is still shown.
    pub fn is_shown(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.hide();
    }
}

impl std::fmt::Debug for LoadingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingGuard")
            .field("shown", &self.is_shown())
            .finish()
    }
}
