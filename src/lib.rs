pub mod core;
pub mod group;
