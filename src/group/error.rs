//! Group engine error types

use crate::group::GroupId;

#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("group id {id} outside addressable range (0..{max})")]
    InvalidGroupId { id: GroupId, max: usize },

    #[error("group {id} is not installed")]
    GroupNotInstalled { id: GroupId },

    #[error("cannot install additional groups (max {max})")]
    GroupLimitReached { max: usize },

    #[error("empty message payload")]
    EmptyMessage,

    #[error("negative delay: {msecs} msecs")]
    NegativeDelay { msecs: i64 },

    #[error("facility no longer exists")]
    FacilityShutdown,
}

/// Result type for group operations
pub type GroupResult<T> = Result<T, GroupError>;
