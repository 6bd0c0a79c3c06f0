//! # Configuration Module
//!
//! Central home for the numeric limits shared by the memory store, the schema
//! compiler, the record manager and the arena deque. Values that depend on one
//! another live side by side and are checked with compile-time assertions.
//!
//! - [`constants`]: word geometry, storage ceilings, header widths, sentinels

pub mod constants;
pub use constants::*;
