//! Reducer-style store owning one logical selection set.
//!
//! Each active page owns exactly one store per logical collection (one for
//! "selected courses", one for "selected emails" within a single enrollment
//! session). Handles are passed explicitly as `Arc<SelectionStore>`, never
//! reached through ambient state, so independent flows cannot clobber each
//! other's selections. The reduction itself is the pure function in
//! `cohort-types`; this store adds ownership and change notification.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use cohort_types::{SelectionAction, SelectionSet, reduce};
use tracing::warn;

/// Handle returned by [`SelectionStore::subscribe`], used to unsubscribe.
pub type SubscriptionId = u64;

type Listener = Box<dyn Fn(&SelectionSet) + Send + Sync>;

/// In-memory store for one selection set, with change subscription.
///
/// Dispatches are applied in call order with no batching or coalescing; each
/// dispatch runs the pure reducer and then notifies listeners synchronously
/// with the post-reduction state. Listeners must not subscribe or
/// unsubscribe from within a notification.
#[derive(Default)]
pub struct SelectionStore {
    state: Mutex<SelectionSet>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl SelectionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store behind the shared handle callers pass around.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Applies `action` and notifies listeners with the resulting state.
    pub fn dispatch(&self, action: SelectionAction) {
        let snapshot = {
            let mut state = self.state.lock().expect("selection state lock poisoned");
            let current = std::mem::take(&mut *state);
            *state = reduce(current, action);
            state.clone()
        };

        let listeners = self.listeners.lock().expect("selection listeners lock poisoned");
        for (_, listener) in listeners.iter() {
            listener(&snapshot);
        }
    }

    /// Cloned snapshot of the current selection set.
    pub fn state(&self) -> SelectionSet {
        self.state.lock().expect("selection state lock poisoned").clone()
    }

    /// Runs `f` against the current selection set without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&SelectionSet) -> R) -> R {
        let state = self.state.lock().expect("selection state lock poisoned");
        f(&state)
    }

    /// Registers a listener invoked after every dispatch.
    pub fn subscribe(&self, listener: impl Fn(&SelectionSet) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .expect("selection listeners lock poisoned")
            .push((id, Box::new(listener)));
        id
    }

    /// Removes a previously registered listener. Unknown ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .lock()
            .expect("selection listeners lock poisoned")
            .retain(|(listener_id, _)| *listener_id != id);
    }
}

impl std::fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore")
            .field("len", &self.state.lock().expect("selection state lock poisoned").len())
            .finish()
    }
}

/// Watches a store and logs a warning when the selection first grows past
/// `cap`, re-arming once it drops back under.
///
/// The store itself has no capacity bound; this is the caller-side advisory
/// that keeps unbounded growth visible without ever truncating or blocking.
pub fn selection_cap_watch(store: &SelectionStore, cap: usize) -> SubscriptionId {
    let over_cap = AtomicBool::new(false);
    store.subscribe(move |set| {
        if set.len() > cap {
            if !over_cap.swap(true, Ordering::Relaxed) {
                warn!(selected = set.len(), cap, "selection exceeds advisory cap");
            }
        } else {
            over_cap.store(false, Ordering::Relaxed);
        }
    })
}
