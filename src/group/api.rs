//! Public API for the group message engine
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Core engine components
pub use crate::group::facility::GroupFacility;
pub use crate::group::handle::GroupHandle;

// Message type
pub use crate::group::message::Message;

// Error handling
pub use crate::group::error::{GroupError, GroupResult};

// Identifiers
pub use crate::group::GroupId;
