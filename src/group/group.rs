//! A single group: two stores, a delay scheduler, a barrier and a bounded
//! outstanding-message counter.
//!
//! Writes land in the visible store directly (delay 0) or in the pending
//! store plus one scheduled timer (delay > 0). Reads drain the visible store
//! in FIFO order. Revoke forces everything pending into the visible store at
//! once. The outstanding counter covers both stores and is only decremented
//! when a message is actually delivered.

use crate::core::config::FacilityConfig;
use crate::group::barrier::Barrier;
use crate::group::error::{GroupError, GroupResult};
use crate::group::message::Message;
use crate::group::scheduler::DelayScheduler;
use crate::group::store::FifoStore;
use crate::group::GroupId;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// State shared between a group and its scheduler worker thread.
#[derive(Debug)]
pub(crate) struct GroupShared {
    id: GroupId,
    pending: FifoStore,
    visible: FifoStore,
    /// Set only while a flush is relocating messages; tells a firing timer
    /// that the move side of its expiry action belongs to the flush.
    flushing: AtomicBool,
    /// Messages accepted but not yet delivered, across both stores.
    outstanding: AtomicUsize,
    capacity: usize,
    max_message_size: usize,
    /// Publication delay in milliseconds; sampled at write time, so changing
    /// it never affects already-scheduled timers.
    delay_msecs: AtomicU64,
    barrier: Barrier,
}

impl GroupShared {
    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn is_flushing(&self) -> bool {
        self.flushing.load(Ordering::Acquire)
    }

    pub fn set_flushing(&self, value: bool) {
        self.flushing.store(value, Ordering::Release);
    }

    pub fn splice_pending_into_visible(&self) {
        self.visible.splice_all_from(&self.pending);
    }

    /// Expiry action of one timer: move the oldest pending message to the
    /// visible store. During a flush the bulk splice owns all moves, so this
    /// only discards the timer's turn.
    pub fn publish_oldest_pending(&self) {
        if self.is_flushing() {
            debug!("group {}: timer fired during flush, move skipped", self.id);
            return;
        }
        let Some(msg) = self.pending.pop_oldest() else {
            debug!("group {}: timer fired with empty pending store", self.id);
            return;
        };
        // Pending lock is released before the visible lock is taken.
        let len = msg.len();
        self.visible.push(msg);
        info!("group {}: delayed message of {} bytes published", self.id, len);
    }

    /// Claim one storage slot, failing when the group is at capacity. The
    /// compare-and-update keeps `outstanding` from ever exceeding the limit
    /// under concurrent writers.
    fn reserve_slot(&self) -> bool {
        self.outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                (count < self.capacity).then_some(count + 1)
            })
            .is_ok()
    }

    fn release_slot(&self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

/// An independently addressable message queue.
#[derive(Debug)]
pub(crate) struct Group {
    shared: Arc<GroupShared>,
    scheduler: DelayScheduler,
}

impl Group {
    pub fn new(id: GroupId, config: &FacilityConfig) -> Self {
        let shared = Arc::new(GroupShared {
            id,
            pending: FifoStore::new(),
            visible: FifoStore::new(),
            flushing: AtomicBool::new(false),
            outstanding: AtomicUsize::new(0),
            capacity: config.max_group_messages,
            max_message_size: config.max_message_size,
            delay_msecs: AtomicU64::new(0),
            barrier: Barrier::new(),
        });
        let scheduler = DelayScheduler::spawn(Arc::clone(&shared));
        Self { shared, scheduler }
    }

    pub fn id(&self) -> GroupId {
        self.shared.id
    }

    /// Accept a message. Returns the number of bytes actually stored: the
    /// payload truncated to the maximum message size, or 0 when the group is
    /// at capacity (a silent drop, not an error).
    pub fn write(&self, payload: &[u8]) -> GroupResult<usize> {
        if payload.is_empty() {
            return Err(GroupError::EmptyMessage);
        }

        let msg = Message::capture(payload, self.shared.max_message_size);
        let accepted = msg.len();

        if !self.shared.reserve_slot() {
            warn!("group {}: no space to store message, write dropped", self.id());
            return Ok(0);
        }

        let delay = self.delay();
        if delay.is_zero() {
            self.shared.visible.push(msg);
        } else {
            self.shared.pending.push(msg);
            self.scheduler.schedule(delay);
        }

        info!(
            "group {}: accepted {} bytes with delay {} msecs",
            self.id(),
            accepted,
            delay.as_millis()
        );
        Ok(accepted)
    }

    /// Deliver the oldest visible message, truncated to `buf_len` bytes, or
    /// `None` when nothing is deliverable. The message is consumed either
    /// way; truncated-away bytes are lost.
    pub fn read(&self, buf_len: usize) -> Option<Vec<u8>> {
        let msg = self.shared.visible.pop_oldest()?;
        self.shared.release_slot();
        let delivered = msg.deliver(buf_len);
        info!("group {}: delivered {} bytes", self.id(), delivered.len());
        Some(delivered)
    }

    /// Set the publication delay for future writes. Already-scheduled timers
    /// keep the delay they were created with.
    pub fn set_delay(&self, msecs: i64) -> GroupResult<()> {
        if msecs < 0 {
            return Err(GroupError::NegativeDelay { msecs });
        }
        self.shared.delay_msecs.store(msecs as u64, Ordering::SeqCst);
        debug!("group {}: delay set to {} msecs", self.id(), msecs);
        Ok(())
    }

    pub fn delay_msecs(&self) -> u64 {
        self.shared.delay_msecs.load(Ordering::SeqCst)
    }

    fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_msecs())
    }

    /// Make every pending message visible immediately. The configured delay
    /// is untouched; later writes are delayed again.
    pub fn revoke(&self) {
        self.scheduler.flush(&self.shared);
        info!("group {}: delayed messages revoked", self.id());
    }

    /// Block the caller on the group's barrier until it is released.
    pub fn sleep_on_barrier(&self) {
        debug!("group {}: caller sleeping on barrier", self.id());
        self.shared.barrier.sleep();
        debug!("group {}: caller released from barrier", self.id());
    }

    /// Release every caller sleeping on the group's barrier.
    pub fn awake_barrier(&self) {
        self.shared.barrier.wake();
        debug!("group {}: barrier awakened", self.id());
    }

    /// Drop all state: release sleepers, drain timers, discard undelivered
    /// messages and stop the scheduler worker.
    pub fn teardown(&self) {
        self.shared.barrier.wake();
        self.scheduler.flush(&self.shared);
        self.scheduler.shutdown();

        let dropped = self.shared.visible.drain_all() + self.shared.pending.drain_all();
        if dropped > 0 {
            warn!(
                "group {}: discarded {} undelivered messages at teardown",
                self.id(),
                dropped
            );
        }
        self.shared.outstanding.store(0, Ordering::SeqCst);
        info!("group {} torn down", self.id());
    }

    pub fn outstanding(&self) -> usize {
        self.shared.outstanding.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.shared.pending.len()
    }

    #[cfg(test)]
    pub fn visible_len(&self) -> usize {
        self.shared.visible.len()
    }

    #[cfg(test)]
    pub fn outstanding_timers(&self) -> usize {
        self.scheduler.outstanding_timers()
    }

    #[cfg(test)]
    pub fn barrier_raised(&self) -> bool {
        self.shared.barrier.is_raised()
    }
}
