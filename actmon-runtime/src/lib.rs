//! actmon Runtime
//!
//! Feeds inbound chat traffic into the activity monitor:
//! - IRC protocol line parsing (PRIVMSG only)
//! - Channel filtering and `!activity` queries
//! - Periodic busiest-channel reports and optional idle pruning

pub mod ingest;
pub mod service;

pub use ingest::*;
pub use service::*;
