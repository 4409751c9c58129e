//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire config, logging, storage and the mind service together.
//! - Run one deterministic structural edit and print the outline before and
//!   after, with the resulting patch.

use log::{error, info};
use outliner_core::db::{open_db, open_db_in_memory};
use outliner_core::{
    init_logging_from_config, CoreConfig, MindService, Note, Outline, OutlineRepository,
    SqliteOutlineRepository,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("outliner: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("outliner: logging disabled: {err}");
    }

    println!("outliner_core version={}", outliner_core::core_version());
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("outliner: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CoreConfig) -> Result<(), Box<dyn Error>> {
    let mut conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let repo = SqliteOutlineRepository::try_new(&mut conn)?;
    info!(
        "event=cli_run module=cli status=start storage={}",
        if config.db_path.is_some() { "file" } else { "memory" }
    );
    demo(MindService::new(repo))
}

/// Moves `4` above `3` in a nine-note outline.
fn demo<R: OutlineRepository>(mut mind: MindService<R>) -> Result<(), Box<dyn Error>> {
    let mut outline = Outline::new("demo");
    for (name, depth) in [
        ("1", 0),
        ("2", 0),
        ("3", 0),
        ("33", 1),
        ("333", 2),
        ("4", 0),
        ("44", 1),
        ("5", 0),
        ("6", 0),
    ] {
        outline.add_note(Note::new(name, depth));
    }
    mind.remember(&mut outline)?;
    print_outline("before", &outline);

    let moved = outline
        .note_by_name("4")
        .map(|note| note.id)
        .ok_or("demo note `4` missing")?;
    let patch = mind.note_up(outline.id, moved)?;
    println!("patch diff={} start={} count={}", patch.diff, patch.start, patch.count);

    print_outline("after", &mind.outline_get(outline.id)?);
    Ok(())
}

fn print_outline(label: &str, outline: &Outline) {
    println!("{label}:");
    for note in outline.notes() {
        println!("  {}{}", "  ".repeat(usize::from(note.depth)), note.name);
    }
}
