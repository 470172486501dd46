//! Rotation use-case services.
//!
//! # Responsibility
//! - Allocate one slate fairly (`allocator`).
//! - Advance the rotation by one period (`scheduler`).
//! - Provide the injectable randomness port (`shuffle`).
//!
//! # Invariants
//! - Services are storage-agnostic; they only transform in-memory state.

pub mod allocator;
pub mod scheduler;
pub mod shuffle;
