//! Shared utilities.

pub mod logger;
