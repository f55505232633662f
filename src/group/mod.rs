//! Group Message Engine
//!
//! A collection of independently addressable group message queues with FIFO
//! delivery, optional delayed publication, explicit revocation of delayed
//! messages, and a reusable broadcast barrier per group.
//!
//! # Overview
//!
//! Each group carries two FIFO stores and a scheduler:
//!
//! - A write with delay 0 goes straight to the *visible* store and can be
//!   read immediately.
//! - A write under a nonzero delay goes to the *pending* store and one timer
//!   is scheduled at the delay in force at that moment; when it expires, the
//!   oldest pending message becomes visible.
//! - `revoke` publishes everything pending at once and drains the timers.
//! - The barrier lets any number of callers block on a group until another
//!   caller releases them all in one broadcast.
//!
//! # Architecture
//!
//! ```text
//!                 ┌────────────────────────────────────────────┐
//!                 │               GroupFacility                │
//!                 │  ┌──────────────────────────────────────┐  │
//!                 │  │           GroupRegistry              │  │
//!                 │  │   id → Group (created on install)    │  │
//!                 │  └──────────────────────────────────────┘  │
//!                 └────────────────────────────────────────────┘
//!                                      │
//!                ┌─────────────────────┴─────────────────────┐
//!                │                  Group                    │
//!   write ──────▶│ pending store ──(timer/revoke)──▶ visible │──────▶ read
//!   (delay > 0)  │                                    store  │
//!   write ───────┼───────────────────────────────────▶       │
//!   (delay 0)    │       DelayScheduler    Barrier           │
//!                └───────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use groupmsg::core::config::FacilityConfig;
//! use groupmsg::group::api::GroupFacility;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let facility = GroupFacility::new(FacilityConfig::default());
//!
//! let group = facility.open(0)?;
//! group.set_send_delay(500)?;
//! group.send(b"delayed greeting")?;
//!
//! // Nothing visible yet; force publication instead of waiting.
//! group.revoke_delayed()?;
//! assert!(group.recv(64)?.is_some());
//! # Ok(())
//! # }
//! ```

mod barrier;
mod error;
mod facility;
pub(crate) mod group;
mod handle;
mod message;
mod registry;
mod scheduler;
mod store;

pub use error::{GroupError, GroupResult};
pub use facility::GroupFacility;
pub use handle::GroupHandle;
pub use message::Message;

/// Caller-chosen small integer identifying a group.
pub type GroupId = u32;

pub mod api;

#[cfg(test)]
mod tests;
