//! Shared primitives for the Selmend selector healing stack.

pub mod types;

pub use types::*;
