//! Core domain logic for the outline structural editor.
//!
//! Outlines are flat, depth-annotated note sequences. The `editor` module
//! rewrites them (promote, demote, move, clone, refactor) and reports each
//! change as a `Patch`; `service::mind_service` resolves ids, remembers
//! outlines through a repository and forwards patches to observers.

pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use editor::refactor_note;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::note::{mangle_name, Note, NoteId};
pub use model::outline::{Outline, OutlineId, MAX_NOTE_DEPTH};
pub use model::patch::{Diff, Patch};
pub use model::ValidationError;
pub use repo::memory_repo::InMemoryOutlineRepository;
pub use repo::outline_repo::{
    OutlineRepoError, OutlineRepoResult, OutlineRepository, OutlineSummary,
    SqliteOutlineRepository,
};
pub use service::mind_service::{
    EditOperation, MindError, MindResult, MindService, PatchNotice, PatchObserver,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
