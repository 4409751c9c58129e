//! Outline structural editor.
//!
//! # Responsibility
//! - Rewrite the flat, depth-annotated note sequence of an `Outline`:
//!   promote, demote, move up/down/first/last, clone and refactor.
//! - Report each rewrite as a `Patch` so views repaint only what changed.
//!
//! # Invariants
//! - No explicit tree is built; subtree and sibling boundaries come from
//!   `blocks`.
//! - Rewrites keep subtree contiguity: blocks move whole, in order.
//! - "Nothing to do" is a `Patch` with `Diff::No`, never an error.
//! - The editor performs no I/O and never calls into a view.

pub mod blocks;
mod copy;
mod depth;
mod moves;
pub mod refactor;

pub use refactor::refactor_note;
