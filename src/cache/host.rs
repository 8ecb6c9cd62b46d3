//! Visibility and focus signals of the hosting context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Handle the host (a window, a tab, a test) uses to report whether the
/// context is visible and when it regains focus.
///
/// Clones share the same signals.
#[derive(Clone)]
pub struct HostContext {
    inner: Arc<HostInner>,
}

struct HostInner {
    visible: AtomicBool,
    focus: Notify,
}

impl HostContext {
    /// A visible context.
    pub fn new() -> Self {
        Self::with_visibility(true)
    }

    /// A context that starts in the background.
    pub fn hidden() -> Self {
        Self::with_visibility(false)
    }

    fn with_visibility(visible: bool) -> Self {
        Self {
            inner: Arc::new(HostInner {
                visible: AtomicBool::new(visible),
                focus: Notify::new(),
            }),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.inner.visible.load(Ordering::SeqCst)
    }

    pub fn set_visible(&self, visible: bool) {
        self.inner.visible.store(visible, Ordering::SeqCst);
    }

    /// The context regained focus. A focused context is visible.
    pub fn focus(&self) {
        self.set_visible(true);
        self.inner.focus.notify_one();
    }

    /// Resolves on the next focus signal. A focus reported while nobody
    /// was waiting is kept for the next waiter.
    pub async fn focused(&self) {
        self.inner.focus.notified().await
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new()
    }
}
