//! GroupFacility - central coordination for the group message engine
//!
//! The facility owns the registry and the immutable process-wide limits, and
//! exposes the complete command surface: install, write, read, set_delay,
//! revoke, the barrier pair, and lifecycle operations. It is the only path
//! to a group; nothing in the engine is ambient global state.
//!
//! # Thread Safety
//!
//! The facility is fully thread-safe and is shared across threads as
//! `Arc<GroupFacility>`. All operations are atomic or protected by the
//! appropriate per-group lock domains.
//!
//! # Example
//!
//! ```rust
//! use groupmsg::core::config::FacilityConfig;
//! use groupmsg::group::api::GroupFacility;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let facility = GroupFacility::new(FacilityConfig::default());
//!
//! facility.install(0)?;
//! facility.write(0, b"hello")?;
//! if let Some(msg) = facility.read(0, 64)? {
//!     println!("received {} bytes", msg.len());
//! }
//! facility.shutdown();
//! # Ok(())
//! # }
//! ```

use crate::core::config::FacilityConfig;
use crate::group::error::GroupResult;
use crate::group::handle::GroupHandle;
use crate::group::registry::GroupRegistry;
use crate::group::GroupId;
use log::info;
use std::sync::Arc;

pub struct GroupFacility {
    config: FacilityConfig,
    registry: GroupRegistry,
}

impl GroupFacility {
    /// Create a facility with the given limits. The configuration is read
    /// once here and is immutable afterwards.
    pub fn new(config: FacilityConfig) -> Arc<Self> {
        info!(
            "facility started (max_message_size: {}, max_group_messages: {}, max_groups: {})",
            config.max_message_size, config.max_group_messages, config.max_groups
        );
        Arc::new(Self {
            config,
            registry: GroupRegistry::new(),
        })
    }

    pub fn with_defaults() -> Arc<Self> {
        Self::new(FacilityConfig::default())
    }

    pub fn config(&self) -> &FacilityConfig {
        &self.config
    }

    /// The configured global message size ceiling.
    pub fn max_message_size(&self) -> usize {
        self.config.max_message_size
    }

    /// Install a group id, idempotently.
    pub fn install(&self, id: GroupId) -> GroupResult<()> {
        self.registry.install(id, &self.config)
    }

    /// Install a group id and return a handle bound to it.
    pub fn open(self: &Arc<Self>, id: GroupId) -> GroupResult<GroupHandle> {
        self.install(id)?;
        Ok(GroupHandle::new(id, Arc::downgrade(self)))
    }

    /// Store a message in a group. Returns the accepted byte count; 0 means
    /// the group's storage is full and the message was dropped.
    pub fn write(&self, id: GroupId, payload: &[u8]) -> GroupResult<usize> {
        self.registry.get(id)?.write(payload)
    }

    /// Retrieve the oldest visible message of a group, truncated to
    /// `buf_len` bytes. `None` means nothing is deliverable right now.
    pub fn read(&self, id: GroupId, buf_len: usize) -> GroupResult<Option<Vec<u8>>> {
        Ok(self.registry.get(id)?.read(buf_len))
    }

    /// Set the publication delay, in milliseconds, for future writes to a
    /// group.
    pub fn set_delay(&self, id: GroupId, msecs: i64) -> GroupResult<()> {
        self.registry.get(id)?.set_delay(msecs)
    }

    /// Force every pending message of a group into the visible store.
    pub fn revoke(&self, id: GroupId) -> GroupResult<()> {
        self.registry.get(id)?.revoke();
        Ok(())
    }

    /// Block the calling thread on a group's barrier until released.
    pub fn sleep_on_barrier(&self, id: GroupId) -> GroupResult<()> {
        // The Arc returned by the registry keeps the group alive while the
        // caller sleeps, even across a concurrent teardown.
        let group = self.registry.get(id)?;
        group.sleep_on_barrier();
        Ok(())
    }

    /// Release every caller sleeping on a group's barrier.
    pub fn awake_barrier(&self, id: GroupId) -> GroupResult<()> {
        self.registry.get(id)?.awake_barrier();
        Ok(())
    }

    /// Destroy one group: release sleepers, drain timers, discard messages.
    pub fn teardown(&self, id: GroupId) -> GroupResult<()> {
        self.registry.teardown(id)
    }

    /// Destroy every group. The facility remains usable for new installs.
    pub fn shutdown(&self) {
        self.registry.shutdown();
    }

    pub fn group_count(&self) -> usize {
        self.registry.population()
    }

    #[cfg(test)]
    pub(crate) fn group(&self, id: GroupId) -> GroupResult<Arc<crate::group::group::Group>> {
        self.registry.get(id)
    }
}

impl Drop for GroupFacility {
    fn drop(&mut self) {
        self.registry.shutdown();
    }
}
