//! Network activity indicator.
//!
//! A counter of in-flight requests rather than a flag, so two overlapping
//! requests keep the indicator on until both have delivered. It has no
//! effect on correctness and does not serialize anything.
//!
//! The observer is called outside any lock, so it may replace or clear
//! itself. Counting and notifying are separate steps: when requests begin
//! and end on different threads, an observer can receive `false` after a
//! newer `true`. Read [`NetworkActivity::is_active`] for the current state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

type Observer = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
pub struct NetworkActivity {
    in_flight: AtomicUsize,
    observer: Mutex<Option<Observer>>,
}

static GLOBAL: OnceLock<Arc<NetworkActivity>> = OnceLock::new();

impl NetworkActivity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The process-wide indicator used by clients that are not given their own.
    pub fn global() -> Arc<Self> {
        GLOBAL.get_or_init(NetworkActivity::new).clone()
    }

    /// Mark one request as in flight until the guard is dropped.
    pub fn begin(self: &Arc<Self>) -> ActivityGuard {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            self.notify(true);
        }
        ActivityGuard {
            activity: Arc::clone(self),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.in_flight() > 0
    }

    /// Called with `true` when the count leaves zero and `false` when it
    /// returns to zero.
    pub fn set_observer<F>(&self, observer: F)
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        if let Ok(mut slot) = self.observer.lock() {
            *slot = Some(Arc::new(observer));
        }
    }

    pub fn clear_observer(&self) {
        if let Ok(mut slot) = self.observer.lock() {
            *slot = None;
        }
    }

    fn end(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify(false);
        }
    }

    fn notify(&self, active: bool) {
        let observer = match self.observer.lock() {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        };
        if let Some(observer) = observer {
            observer(active);
        }
    }
}

/// Keeps its request counted until dropped.
#[must_use = "dropping the guard ends the activity immediately"]
pub struct ActivityGuard {
    activity: Arc<NetworkActivity>,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.activity.end();
    }
}
