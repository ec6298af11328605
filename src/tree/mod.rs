//! Source Tree Digestion
//!
//! Walks a source tree, selects files by extension, and computes a content
//! digest for each selected file. Every filesystem failure is fatal so a
//! partially hashed tree can never reach the manifest.

pub mod filter;
pub mod hasher;
pub mod path;
pub mod walker;
