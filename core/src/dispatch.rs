//! The callback context.
//!
//! # Design
//! Network I/O happens on background threads, but completions must all run
//! on one well-known context: the host's UI thread. `callback_context()`
//! returns a cloneable sending half, handed to everything that completes
//! work, and a single `CallbackLoop` that the host drains from that thread.
//! Completions run one at a time, in arrival order, and only inside the
//! loop's `run_*` methods.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

type Completion = Box<dyn FnOnce() + Send + 'static>;

/// Sending half: schedules closures onto the callback loop.
#[derive(Clone)]
pub struct CallbackContext {
    tx: Sender<Completion>,
}

/// Receiving half: runs scheduled closures on the thread that drains it.
pub struct CallbackLoop {
    rx: Receiver<Completion>,
}

pub fn callback_context() -> (CallbackContext, CallbackLoop) {
    let (tx, rx) = mpsc::channel();
    (CallbackContext { tx }, CallbackLoop { rx })
}

impl CallbackContext {
    /// Schedule `f` on the callback loop. Returns `false`, dropping `f`, when
    /// the loop no longer exists.
    pub fn dispatch<F>(&self, f: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(f)).is_err() {
            log::warn!("callback loop is gone; dropping completion");
            return false;
        }
        true
    }
}

impl CallbackLoop {
    /// Run everything already queued without waiting. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(completion) = self.rx.try_recv() {
            completion();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one completion and run it.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => {
                completion();
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Run completions as they arrive until `done` holds or `timeout` passes.
    /// Returns whether `done` held.
    pub fn run_until<F>(&self, timeout: Duration, mut done: F) -> bool
    where
        F: FnMut() -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            self.run_pending();
            if done() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.run_next(deadline - now);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;

    use super::*;

    #[test]
    fn completions_run_on_the_draining_thread() {
        let (ctx, callbacks) = callback_context();
        let ran_on = Arc::new(Mutex::new(None));

        let sink = Arc::clone(&ran_on);
        let worker = thread::spawn(move || {
            ctx.dispatch(move || {
                *sink.lock().unwrap() = Some(thread::current().id());
            });
        });
        worker.join().unwrap();

        assert!(ran_on.lock().unwrap().is_none());
        assert_eq!(callbacks.run_pending(), 1);
        assert_eq!(*ran_on.lock().unwrap(), Some(thread::current().id()));
    }

    #[test]
    fn completions_run_in_arrival_order() {
        let (ctx, callbacks) = callback_context();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..5 {
            let sink = Arc::clone(&order);
            ctx.dispatch(move || sink.lock().unwrap().push(i));
        }
        callbacks.run_pending();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn dispatch_after_loop_dropped_reports_false() {
        let (ctx, callbacks) = callback_context();
        drop(callbacks);
        assert!(!ctx.dispatch(|| {}));
    }

    #[test]
    fn run_until_times_out() {
        let (_ctx, callbacks) = callback_context();
        assert!(!callbacks.run_until(Duration::from_millis(20), || false));
    }
}
