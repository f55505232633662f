//! Group registry
//!
//! Maps caller-chosen small integer ids to live groups. Ids are not
//! allocated here; installing an existing id succeeds idempotently. All
//! membership mutation goes through one registry-wide lock, so two callers
//! installing the same id concurrently can never create two groups.

use crate::core::config::FacilityConfig;
use crate::group::error::{GroupError, GroupResult};
use crate::group::group::Group;
use crate::group::GroupId;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub(crate) struct GroupRegistry {
    groups: Mutex<HashMap<GroupId, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the group with the given id, creating it on first use.
    pub fn install(&self, id: GroupId, config: &FacilityConfig) -> GroupResult<()> {
        if id as usize >= config.max_groups {
            return Err(GroupError::InvalidGroupId {
                id,
                max: config.max_groups,
            });
        }

        let mut groups = self.groups.lock().unwrap();
        if groups.contains_key(&id) {
            debug!("group {} already installed", id);
            return Ok(());
        }
        if groups.len() >= config.max_groups {
            warn!("cannot install additional groups");
            return Err(GroupError::GroupLimitReached {
                max: config.max_groups,
            });
        }

        groups.insert(id, Arc::new(Group::new(id, config)));
        info!("group {} installed ({} of {} in use)", id, groups.len(), config.max_groups);
        Ok(())
    }

    /// Look up a group. The registry lock is released before the group is
    /// used, so long-running operations never block membership changes.
    pub fn get(&self, id: GroupId) -> GroupResult<Arc<Group>> {
        self.groups
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(GroupError::GroupNotInstalled { id })
    }

    /// Remove one group and tear it down. Callers already blocked inside the
    /// group (barrier sleepers) hold their own reference and are released by
    /// the teardown itself.
    pub fn teardown(&self, id: GroupId) -> GroupResult<()> {
        let group = self
            .groups
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or(GroupError::GroupNotInstalled { id })?;
        group.teardown();
        Ok(())
    }

    /// Tear down every group. Idempotent.
    pub fn shutdown(&self) {
        let drained: Vec<(GroupId, Arc<Group>)> =
            self.groups.lock().unwrap().drain().collect();
        let count = drained.len();
        for (_, group) in drained {
            group.teardown();
        }
        if count > 0 {
            info!("registry shut down, {} groups torn down", count);
        }
    }

    pub fn population(&self) -> usize {
        self.groups.lock().unwrap().len()
    }
}
