//! Reusable broadcast barrier
//!
//! A per-group rendezvous gate with two states, cleared and raised. A caller
//! that sleeps raises the gate (idempotently) and then blocks until some
//! other caller clears it; a wake clears the gate and releases every sleeper
//! at once. The gate is reusable: after a wake, the next sleeper raises it
//! again and a fresh cohort can accumulate. There is no timeout; the only
//! other release path is group teardown, which performs a final wake.

use std::sync::{Condvar, Mutex};

#[derive(Debug, Default)]
pub(crate) struct Barrier {
    raised: Mutex<bool>,
    released: Condvar,
}

impl Barrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the gate and block the calling thread until it is cleared.
    pub fn sleep(&self) {
        let mut raised = self.raised.lock().unwrap();
        *raised = true;
        while *raised {
            raised = self.released.wait(raised).unwrap();
        }
    }

    /// Clear the gate if raised, then release every sleeping caller. Calling
    /// this with nobody asleep is a no-op, not an error.
    pub fn wake(&self) {
        let mut raised = self.raised.lock().unwrap();
        if *raised {
            *raised = false;
        }
        self.released.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        *self.raised.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wake_without_sleepers_is_noop() {
        let barrier = Barrier::new();
        barrier.wake();
        barrier.wake();
        assert!(!barrier.is_raised());
    }

    #[test]
    fn test_sleep_raises_and_wake_releases_all() {
        let barrier = Arc::new(Barrier::new());
        let released = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();

        for _ in 0..4 {
            let barrier = Arc::clone(&barrier);
            let released = Arc::clone(&released);
            handles.push(thread::spawn(move || {
                barrier.sleep();
                released.fetch_add(1, Ordering::SeqCst);
            }));
        }

        // Give all sleepers time to block on the gate.
        thread::sleep(Duration::from_millis(200));
        assert!(barrier.is_raised());
        assert_eq!(released.load(Ordering::SeqCst), 0);

        barrier.wake();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(released.load(Ordering::SeqCst), 4);
        assert!(!barrier.is_raised());
    }

    #[test]
    fn test_gate_is_reusable_across_cohorts() {
        let barrier = Arc::new(Barrier::new());

        for _ in 0..3 {
            let sleeper = {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || barrier.sleep())
            };
            thread::sleep(Duration::from_millis(100));
            assert!(barrier.is_raised());
            barrier.wake();
            sleeper.join().unwrap();
        }
    }
}
