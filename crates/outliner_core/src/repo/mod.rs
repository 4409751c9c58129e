//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the outline lookup/remember contract used by services.
//! - Isolate SQLite query details from editing orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Outline::validate()` before persistence.
//! - Loads return detached copies; edits reach storage only through a save.

pub mod memory_repo;
pub mod outline_repo;
