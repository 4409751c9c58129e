//! Outline repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Load and remember whole outlines, including note order and depth.
//! - Keep SQL details behind the `OutlineRepository` boundary.
//!
//! # Invariants
//! - A saved outline is restored with identical note order (`position ASC`).
//! - Saving replaces the outline's notes atomically; a note id lives in at
//!   most one outline.
//! - Writes run `Outline::validate()` before touching storage.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::note::Note;
use crate::model::outline::{Outline, OutlineId};
use crate::model::ValidationError;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type used by outline repository operations.
pub type OutlineRepoResult<T> = Result<T, OutlineRepoError>;

/// Errors from outline repository operations.
#[derive(Debug)]
pub enum OutlineRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    OutlineNotFound(OutlineId),
    /// Outline or note failed validation before write.
    Validation(ValidationError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid outline.
    InvalidData(String),
}

impl Display for OutlineRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::OutlineNotFound(id) => write!(f, "outline not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "outline repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "outline repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "outline repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid outline data: {message}"),
        }
    }
}

impl Error for OutlineRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::OutlineNotFound(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for OutlineRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for OutlineRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for OutlineRepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Lightweight listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineSummary {
    pub id: OutlineId,
    pub name: String,
    pub note_count: usize,
    /// Epoch ms.
    pub modified_at: i64,
}

impl OutlineSummary {
    pub fn of(outline: &Outline) -> Self {
        Self {
            id: outline.id,
            name: outline.name.clone(),
            note_count: outline.len(),
            modified_at: outline.modified_at,
        }
    }
}

/// Outline lookup and remembrance.
pub trait OutlineRepository {
    /// Loads one outline by id. `Ok(None)` when unknown.
    fn load_outline(&self, id: OutlineId) -> OutlineRepoResult<Option<Outline>>;
    /// Lists known outlines ordered by name (case-insensitive), then id.
    fn list_outlines(&self) -> OutlineRepoResult<Vec<OutlineSummary>>;
    /// Inserts or replaces one outline with all of its notes.
    fn save_outline(&mut self, outline: &Outline) -> OutlineRepoResult<()>;
    /// Saves several outlines; used when one edit touches two outlines.
    fn save_outlines(&mut self, outlines: &[&Outline]) -> OutlineRepoResult<()> {
        for outline in outlines {
            self.save_outline(outline)?;
        }
        Ok(())
    }
    /// Forgets one outline and its notes.
    fn delete_outline(&mut self, id: OutlineId) -> OutlineRepoResult<()>;
}

/// SQLite-backed outline repository.
pub struct SqliteOutlineRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteOutlineRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Fails fast when the connection has not gone through `open_db`.
    pub fn try_new(conn: &'conn mut Connection) -> OutlineRepoResult<Self> {
        ensure_outline_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl OutlineRepository for SqliteOutlineRepository<'_> {
    fn load_outline(&self, id: OutlineId) -> OutlineRepoResult<Option<Outline>> {
        let uuid = id.to_string();
        let outline = self
            .conn
            .query_row(
                "SELECT
                    uuid,
                    name,
                    description,
                    created_at,
                    modified_at,
                    read_at,
                    reads,
                    revision
                 FROM outlines
                 WHERE uuid = ?1;",
                [uuid.as_str()],
                map_outline_row,
            )
            .optional()?;
        let Some(outline) = outline else {
            return Ok(None);
        };
        let mut outline = outline?;

        outline.tags = load_tags(
            self.conn,
            "SELECT outline_uuid, tag
             FROM outline_tags
             WHERE outline_uuid = ?1
             ORDER BY position ASC;",
            &uuid,
        )?
        .remove(&uuid)
        .unwrap_or_default();

        let mut note_tags = load_tags(
            self.conn,
            "SELECT nt.note_uuid, nt.tag
             FROM note_tags nt
             INNER JOIN notes n ON n.uuid = nt.note_uuid
             WHERE n.outline_uuid = ?1
             ORDER BY nt.note_uuid ASC, nt.position ASC;",
            &uuid,
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT
                uuid,
                depth,
                name,
                type,
                description,
                progress,
                deadline,
                created_at,
                modified_at,
                read_at,
                reads,
                revision
             FROM notes
             WHERE outline_uuid = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([uuid.as_str()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let mut note = map_note_row(row, &uuid_text)?;
            note.tags = note_tags.remove(&uuid_text).unwrap_or_default();
            notes.push(note);
        }

        outline.set_notes(notes);
        Ok(Some(outline))
    }

    fn list_outlines(&self) -> OutlineRepoResult<Vec<OutlineSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                o.uuid,
                o.name,
                o.modified_at,
                (SELECT COUNT(*) FROM notes n WHERE n.outline_uuid = o.uuid) AS note_count
             FROM outlines o
             ORDER BY o.name COLLATE NOCASE ASC, o.uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            summaries.push(OutlineSummary {
                id: parse_uuid(&uuid_text, "outlines.uuid")?,
                name: row.get("name")?,
                note_count: row.get("note_count")?,
                modified_at: row.get("modified_at")?,
            });
        }
        Ok(summaries)
    }

    fn save_outline(&mut self, outline: &Outline) -> OutlineRepoResult<()> {
        self.save_outlines(&[outline])
    }

    fn save_outlines(&mut self, outlines: &[&Outline]) -> OutlineRepoResult<()> {
        for outline in outlines {
            outline.validate()?;
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for outline in outlines {
            write_outline(&tx, outline)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_outline(&mut self, id: OutlineId) -> OutlineRepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM outlines WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(OutlineRepoError::OutlineNotFound(id));
        }
        Ok(())
    }
}

fn write_outline(tx: &Transaction<'_>, outline: &Outline) -> OutlineRepoResult<()> {
    let outline_uuid = outline.id.to_string();
    tx.execute(
        "INSERT INTO outlines (
            uuid,
            name,
            description,
            created_at,
            modified_at,
            read_at,
            reads,
            revision
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(uuid) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            created_at = excluded.created_at,
            modified_at = excluded.modified_at,
            read_at = excluded.read_at,
            reads = excluded.reads,
            revision = excluded.revision;",
        params![
            outline_uuid,
            outline.name,
            outline.description,
            outline.created_at,
            outline.modified_at,
            outline.read_at,
            outline.reads,
            outline.revision,
        ],
    )?;

    tx.execute(
        "DELETE FROM outline_tags WHERE outline_uuid = ?1;",
        [outline_uuid.as_str()],
    )?;
    for (position, tag) in outline.tags.iter().enumerate() {
        tx.execute(
            "INSERT INTO outline_tags (outline_uuid, position, tag) VALUES (?1, ?2, ?3);",
            params![outline_uuid, position, tag],
        )?;
    }

    // note_tags rows follow through ON DELETE CASCADE.
    tx.execute(
        "DELETE FROM notes WHERE outline_uuid = ?1;",
        [outline_uuid.as_str()],
    )?;
    for (position, note) in outline.notes().iter().enumerate() {
        write_note(tx, &outline_uuid, position, note)?;
    }

    Ok(())
}

fn write_note(
    tx: &Transaction<'_>,
    outline_uuid: &str,
    position: usize,
    note: &Note,
) -> OutlineRepoResult<()> {
    let note_uuid = note.id.to_string();
    // A note refactored in from another outline may still be stored there.
    tx.execute("DELETE FROM notes WHERE uuid = ?1;", [note_uuid.as_str()])?;
    tx.execute(
        "INSERT INTO notes (
            uuid,
            outline_uuid,
            position,
            depth,
            name,
            type,
            description,
            progress,
            deadline,
            created_at,
            modified_at,
            read_at,
            reads,
            revision
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
        params![
            note_uuid,
            outline_uuid,
            position,
            note.depth,
            note.name,
            note.kind,
            note.description,
            note.progress,
            note.deadline,
            note.created_at,
            note.modified_at,
            note.read_at,
            note.reads,
            note.revision,
        ],
    )?;
    for (tag_position, tag) in note.tags.iter().enumerate() {
        tx.execute(
            "INSERT INTO note_tags (note_uuid, position, tag) VALUES (?1, ?2, ?3);",
            params![note_uuid, tag_position, tag],
        )?;
    }
    Ok(())
}

fn map_outline_row(row: &Row<'_>) -> rusqlite::Result<OutlineRepoResult<Outline>> {
    let uuid_text: String = row.get("uuid")?;
    let name: String = row.get("name")?;
    let description: String = row.get("description")?;
    let created_at: i64 = row.get("created_at")?;
    let modified_at: i64 = row.get("modified_at")?;
    let read_at: i64 = row.get("read_at")?;
    let reads: u32 = row.get("reads")?;
    let revision: u32 = row.get("revision")?;

    Ok(parse_uuid(&uuid_text, "outlines.uuid").and_then(|id| {
        let mut outline = Outline::with_id(id, name)?;
        outline.description = description;
        outline.created_at = created_at;
        outline.modified_at = modified_at;
        outline.read_at = read_at;
        outline.reads = reads;
        outline.revision = revision;
        Ok(outline)
    }))
}

fn map_note_row(row: &Row<'_>, uuid_text: &str) -> OutlineRepoResult<Note> {
    let id = parse_uuid(uuid_text, "notes.uuid")?;
    let mut note = Note::with_id(id, row.get::<_, String>("name")?, row.get("depth")?)?;
    note.kind = row.get("type")?;
    note.description = row.get("description")?;
    note.progress = row.get("progress")?;
    note.deadline = row.get("deadline")?;
    note.created_at = row.get("created_at")?;
    note.modified_at = row.get("modified_at")?;
    note.read_at = row.get("read_at")?;
    note.reads = row.get("reads")?;
    note.revision = row.get("revision")?;
    Ok(note)
}

/// Runs a `(owner_uuid, tag)` query and groups tags by owner, keeping order.
fn load_tags(
    conn: &Connection,
    sql: &str,
    outline_uuid: &str,
) -> OutlineRepoResult<BTreeMap<String, Vec<String>>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([outline_uuid])?;
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let owner: String = row.get(0)?;
        let tag: String = row.get(1)?;
        grouped.entry(owner).or_default().push(tag);
    }
    Ok(grouped)
}

fn parse_uuid(value: &str, column: &'static str) -> OutlineRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| OutlineRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_outline_connection_ready(conn: &Connection) -> OutlineRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(OutlineRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let required: [(&'static str, &[&'static str]); 4] = [
        (
            "outlines",
            &["uuid", "name", "modified_at", "reads", "revision"],
        ),
        ("notes", &["uuid", "outline_uuid", "position", "depth"]),
        ("outline_tags", &["outline_uuid", "position", "tag"]),
        ("note_tags", &["note_uuid", "position", "tag"]),
    ];
    for (table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(OutlineRepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(OutlineRepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> OutlineRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> OutlineRepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
