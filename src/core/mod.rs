//! Core infrastructure shared across the crate

pub mod config;
pub mod logging;
