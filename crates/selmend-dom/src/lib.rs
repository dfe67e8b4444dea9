//! Immutable document snapshots for selector healing
//!
//! Wraps a parsed HTML tree behind a small query surface:
//! - CSS selector queries in document order
//! - attribute and tag scans for the heuristic matchers
//! - bounded serialization for provider payloads
//!
//! Snapshots are single-threaded by construction; the engine only touches
//! them synchronously.

pub mod errors;
pub mod snapshot;

pub use errors::*;
pub use snapshot::*;
