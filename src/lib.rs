//! Savegame backups with a bounded, content-addressed history per game.
//!
//! Each configured save directory is packed into a deterministic `.tar.gz`,
//! fingerprinted, and kept only when it differs from the newest archive in
//! that game's store. Stores are capped; the oldest archive goes to the trash.

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod platform;
pub mod report;
pub mod run;
pub mod slug;
pub mod store;
pub mod trash;
pub mod util;
