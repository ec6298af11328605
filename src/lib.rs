//! Imprint: Content-Addressed Asset Fingerprinting
//!
//! Walks a source tree, computes a streaming content digest for every file
//! matching a configured extension set, and writes a JSON manifest mapping
//! each asset's logical name to its fingerprinted name for cache-busting.

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod manifest;
pub mod tree;
