//! Per-group client handle
//!
//! A lightweight handle bound to one group id, mirroring the verbs a client
//! of the facility uses: send, receive, delay control, revocation and the
//! barrier pair. The handle holds a weak reference to the facility, so
//! operations after the facility is gone fail cleanly instead of keeping the
//! engine alive.

use crate::group::error::{GroupError, GroupResult};
use crate::group::facility::GroupFacility;
use crate::group::GroupId;
use std::sync::{Arc, Weak};

#[derive(Clone)]
pub struct GroupHandle {
    group_id: GroupId,
    facility: Weak<GroupFacility>,
}

impl GroupHandle {
    pub(crate) fn new(group_id: GroupId, facility: Weak<GroupFacility>) -> Self {
        Self { group_id, facility }
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    fn facility(&self) -> GroupResult<Arc<GroupFacility>> {
        self.facility.upgrade().ok_or(GroupError::FacilityShutdown)
    }

    /// Write a message to the group. Returns the accepted byte count; 0
    /// means the group's storage is full.
    pub fn send(&self, payload: &[u8]) -> GroupResult<usize> {
        self.facility()?.write(self.group_id, payload)
    }

    /// Read the oldest visible message, truncated to `buf_len` bytes.
    pub fn recv(&self, buf_len: usize) -> GroupResult<Option<Vec<u8>>> {
        self.facility()?.read(self.group_id, buf_len)
    }

    /// Set the publication delay for future sends, in milliseconds.
    pub fn set_send_delay(&self, msecs: i64) -> GroupResult<()> {
        self.facility()?.set_delay(self.group_id, msecs)
    }

    /// Publish all delayed messages immediately. The configured delay is
    /// unmodified: further sends are still delayed.
    pub fn revoke_delayed(&self) -> GroupResult<()> {
        self.facility()?.revoke(self.group_id)
    }

    /// Sleep until another caller awakes the group's barrier.
    pub fn sleep_on_barrier(&self) -> GroupResult<()> {
        self.facility()?.sleep_on_barrier(self.group_id)
    }

    /// Awake every caller sleeping on the group's barrier.
    pub fn awake_barrier(&self) -> GroupResult<()> {
        self.facility()?.awake_barrier(self.group_id)
    }
}
