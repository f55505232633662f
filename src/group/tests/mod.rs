//! Test modules for the group message engine
//!
//! Tests are organized by functional area: basic read/write, delayed
//! publication, revocation, barrier synchronization, capacity enforcement,
//! lifecycle and concurrency.

mod concurrent;
