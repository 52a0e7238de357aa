//! The pairing session store
//!
//! A single explicit state container built from the pure reducer in
//! [`reducer`]. The store is handed to orchestrators and the controller by
//! dependency injection; there are no ambient globals. Dispatch is
//! synchronous — the screen a click or voice action selects is observable
//! before any scan or pairing future resolves.
//!
//! Async callbacks never call [`SessionStore::dispatch`] directly; they go
//! through [`SessionStore::commit_scan`] / [`SessionStore::commit_pairing`],
//! which compare the callback's captured generation against the live
//! session and silently drop stale mutations.

mod reducer;
mod state;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::AbortHandle;

pub use reducer::{Action, reduce};
pub use state::{
    DeviceRecord, FailureKind, PairingSession, PairingState, PairingStatus, ScanSession,
    ScanStatus, Screen, VoiceCommandContext,
};

/// How long the success screen lingers before the modal closes itself
pub const SUCCESS_AUTO_CLOSE: Duration = Duration::from_millis(2000);

struct Inner {
    state: PairingState,
    /// Pending success auto-close timer, aborted by the next dispatch
    auto_close: Option<AbortHandle>,
}

/// Shared, generation-guarded state container for the pairing modal
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<Inner>>,
    auto_close_after: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a store with the standard 2000ms success auto-close
    #[must_use]
    pub fn new() -> Self {
        Self::with_auto_close(SUCCESS_AUTO_CLOSE)
    }

    /// Create a store with a custom success auto-close delay
    #[must_use]
    pub fn with_auto_close(auto_close_after: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: PairingState::default(),
                auto_close: None,
            })),
            auto_close_after,
        }
    }

    /// Apply an action unconditionally
    pub fn dispatch(&self, action: Action) {
        let mut inner = self.inner.lock();
        self.apply(&mut inner, &action);
    }

    /// Apply an action only if the captured scan generation is still live
    ///
    /// Returns `false` (dropping the action) when the session has been
    /// superseded or torn down since the generation was captured.
    #[must_use = "a false return means the session was superseded"]
    pub fn commit_scan(&self, generation: u64, action: Action) -> bool {
        let mut inner = self.inner.lock();
        if inner.state.scan.generation != generation {
            tracing::debug!(
                action = action.name(),
                captured = generation,
                live = inner.state.scan.generation,
                "dropping stale scan mutation"
            );
            return false;
        }
        self.apply(&mut inner, &action);
        true
    }

    /// Apply an action only if the captured pairing generation is still live
    #[must_use = "a false return means the session was superseded"]
    pub fn commit_pairing(&self, generation: u64, action: Action) -> bool {
        let mut inner = self.inner.lock();
        let live = inner.state.pairing.as_ref().map(|p| p.generation);
        if live != Some(generation) {
            tracing::debug!(
                action = action.name(),
                captured = generation,
                live = ?live,
                "dropping stale pairing mutation"
            );
            return false;
        }
        self.apply(&mut inner, &action);
        true
    }

    /// Snapshot of the full state for the renderer
    #[must_use]
    pub fn state(&self) -> PairingState {
        self.inner.lock().state.clone()
    }

    /// The single authoritative screen field
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.inner.lock().state.current_screen
    }

    /// Whether the modal is currently open
    #[must_use]
    pub fn is_modal_open(&self) -> bool {
        self.inner.lock().state.modal_open
    }

    /// Generation of the current scan session
    #[must_use]
    pub fn scan_generation(&self) -> u64 {
        self.inner.lock().state.scan.generation
    }

    /// Generation of the active pairing session, if any
    #[must_use]
    pub fn pairing_generation(&self) -> Option<u64> {
        self.inner.lock().state.pairing.as_ref().map(|p| p.generation)
    }

    /// Read-only projection for the voice interpreter
    #[must_use]
    pub fn voice_context(&self) -> VoiceCommandContext {
        VoiceCommandContext::from(&self.inner.lock().state)
    }

    /// Reduce under the lock; every action supersedes a pending auto-close
    fn apply(&self, inner: &mut Inner, action: &Action) {
        if let Some(handle) = inner.auto_close.take() {
            handle.abort();
        }

        inner.state = reduce(&inner.state, action);
        tracing::debug!(
            action = action.name(),
            screen = ?inner.state.current_screen,
            "store action applied"
        );

        if matches!(action, Action::SetConnectionSuccess) {
            self.schedule_auto_close(inner);
        }
    }

    /// Arm the success auto-close timer for the current pairing session
    ///
    /// The timer is both abortable (any later dispatch cancels it) and
    /// generation-guarded, so it can never close a newer, unrelated
    /// session. Outside a Tokio runtime the timer is skipped; the host is
    /// then responsible for closing the modal.
    fn schedule_auto_close(&self, inner: &mut Inner) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::trace!("no runtime, success auto-close not scheduled");
            return;
        };
        let Some(generation) = inner.state.pairing.as_ref().map(|p| p.generation) else {
            return;
        };

        let store = self.clone();
        let delay = self.auto_close_after;
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            store.auto_close(generation);
        });
        inner.auto_close = Some(task.abort_handle());
    }

    /// Fired by the auto-close timer; drops itself if superseded
    fn auto_close(&self, generation: u64) {
        let mut inner = self.inner.lock();
        let live = inner.state.pairing.as_ref().map(|p| p.generation);
        if live != Some(generation) || inner.state.current_screen != Screen::Success {
            tracing::trace!(captured = generation, live = ?live, "auto-close superseded");
            return;
        }
        tracing::debug!("success screen auto-closing");
        self.apply(&mut inner, &Action::CloseModal);
    }
}
