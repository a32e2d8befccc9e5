//! Lightweight behavior tree library for real-time, frame-stepped games.
//!
//! This library provides a minimal, deterministic behavior tree implementation
//! designed for per-entity decision making in a fixed-timestep simulation.
//!
//! - **Trees are data**: nodes form a tagged enum, generic over the leaf
//!   payloads, so trees can be inspected, logged, and built from files
//! - **Running state**: a `Sequence` suspended on a `Running` child resumes
//!   at the same index on the next tick
//! - **Minimal state**: the only mutable per-tick state is the sequence
//!   resume index and the cooldown fire timestamp
//! - **Zero dependencies**: pure Rust with no external crates
//!
//! # Architecture
//!
//! - [`Status`]: Success, Failure, or Running
//! - [`Node`]: the tree itself — `Selector`, `Sequence`, `Condition`,
//!   `Action`, `Cooldown`
//! - [`Predicate`] / [`Effect`]: traits the leaf payload types implement
//!   against a caller-supplied context

pub mod builder;
pub mod node;
pub mod status;

// Re-export core types for ergonomic API
pub use node::{Effect, Node, Predicate};
pub use status::Status;
