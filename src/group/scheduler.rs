//! Delayed publication scheduler
//!
//! Each group owns one scheduler: a deadline-ordered set of timers plus a
//! dedicated worker thread that executes expirations. Every write accepted
//! under a nonzero delay schedules exactly one timer, at the delay in force
//! at that moment. When a timer expires, the worker publishes the oldest
//! pending message of the group; a timer is deliberately not bound to the
//! specific message whose write scheduled it.
//!
//! Revoke coordination: while a flush is relocating messages in bulk, the
//! group's flushing flag makes forced expirations skip the message move, so
//! the flush drains every outstanding timer without touching a message twice.
//! The timer set's mutex is held across the whole flush, which serialises it
//! against the worker the way a single-threaded work queue would.
//!
//! Lock order: timer set, then pending store, then visible store.

use crate::group::group::GroupShared;
use crate::group::GroupId;
use log::{debug, warn};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// One outstanding delayed publication. Ordered by deadline, with the
/// schedule sequence breaking ties so equal deadlines fire in write order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct TimerEntry {
    deadline: Instant,
    seq: u64,
}

#[derive(Debug)]
struct TimerSet {
    entries: BinaryHeap<Reverse<TimerEntry>>,
    next_seq: u64,
    shutdown: bool,
}

#[derive(Debug)]
struct SchedulerShared {
    timers: Mutex<TimerSet>,
    expiry: Condvar,
}

/// Per-group timer bookkeeping and worker thread.
#[derive(Debug)]
pub(crate) struct DelayScheduler {
    shared: Arc<SchedulerShared>,
    group_id: GroupId,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DelayScheduler {
    /// Create the scheduler for `group` and start its worker thread.
    pub fn spawn(group: Arc<GroupShared>) -> Self {
        let shared = Arc::new(SchedulerShared {
            timers: Mutex::new(TimerSet {
                entries: BinaryHeap::new(),
                next_seq: 0,
                shutdown: false,
            }),
            expiry: Condvar::new(),
        });

        let group_id = group.id();
        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name(format!("group-delay-{}", group_id))
            .spawn(move || worker_loop(group, worker_shared))
            .expect("failed to spawn delay worker thread");

        Self {
            shared,
            group_id,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Register one timer firing `delay` from now.
    pub fn schedule(&self, delay: Duration) {
        let mut timers = self.shared.timers.lock().unwrap();
        if timers.shutdown {
            warn!(
                "group {}: timer scheduled after scheduler shutdown, dropping",
                self.group_id
            );
            return;
        }
        let seq = timers.next_seq;
        timers.next_seq += 1;
        timers.entries.push(Reverse(TimerEntry {
            deadline: Instant::now() + delay,
            seq,
        }));
        debug!(
            "group {}: timer {} scheduled in {} msecs",
            self.group_id,
            seq,
            delay.as_millis()
        );
        self.shared.expiry.notify_all();
    }

    /// Force all pending messages into the visible store and drain every
    /// outstanding timer.
    ///
    /// Holding the timer-set lock for the whole operation keeps the worker
    /// out; the flushing flag keeps the forced expirations from moving a
    /// message the bulk splice already relocated. Each drained entry still
    /// runs its expiry action so that no timer can fire later against a
    /// group that may be torn down.
    pub fn flush(&self, group: &GroupShared) {
        let mut timers = self.shared.timers.lock().unwrap();

        group.set_flushing(true);
        group.splice_pending_into_visible();

        let outstanding = timers.entries.len();
        while timers.entries.pop().is_some() {
            group.publish_oldest_pending();
        }
        group.set_flushing(false);

        if outstanding > 0 {
            debug!(
                "group {}: drained {} outstanding timers during flush",
                self.group_id, outstanding
            );
        }
    }

    /// Stop the worker thread and join it. Any timer still registered at
    /// this point is discarded; callers flush first so the set is empty.
    pub fn shutdown(&self) {
        {
            let mut timers = self.shared.timers.lock().unwrap();
            if timers.shutdown {
                return;
            }
            timers.shutdown = true;
            if !timers.entries.is_empty() {
                warn!(
                    "group {}: {} timers discarded at scheduler shutdown",
                    self.group_id,
                    timers.entries.len()
                );
            }
            self.shared.expiry.notify_all();
        }

        if let Some(worker) = self.worker.lock().unwrap().take() {
            let _ = worker.join();
        }
    }

    #[cfg(test)]
    pub fn outstanding_timers(&self) -> usize {
        self.shared.timers.lock().unwrap().entries.len()
    }
}

impl Drop for DelayScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(group: Arc<GroupShared>, shared: Arc<SchedulerShared>) {
    let mut timers = shared.timers.lock().unwrap();
    loop {
        if timers.shutdown {
            break;
        }

        let wait_for = match timers.entries.peek() {
            None => None,
            Some(&Reverse(entry)) => {
                let now = Instant::now();
                if entry.deadline <= now {
                    timers.entries.pop();
                    // The expiry action runs under the timer-set lock, so a
                    // concurrent flush cannot interleave with the move.
                    group.publish_oldest_pending();
                    continue;
                }
                Some(entry.deadline.duration_since(now))
            }
        };

        timers = match wait_for {
            None => shared.expiry.wait(timers).unwrap(),
            Some(timeout) => shared.expiry.wait_timeout(timers, timeout).unwrap().0,
        };
    }
}
