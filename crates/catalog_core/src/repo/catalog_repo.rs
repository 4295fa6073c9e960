//! Catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Resolve root records by business key and read nested instances.
//! - Hydrate a complete `EntityGraph` for one root following the composition
//!   schema.
//! - Provide the write paths the catalog collector uses to evolve history.
//!
//! # Invariants
//! - Write paths must call `VersionedRecord::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Nested instances are always returned regardless of removal status.
//! - A child may only be stored under a parent whose kind declares it as a
//!   category in the catalog schema.
//! - SQLite graph hydration runs inside one read transaction, so the whole
//!   graph comes from a single consistent snapshot.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::graph::{EntityGraph, GraphError};
use crate::model::kind::EntityKind;
use crate::model::record::{BusinessKey, RecordId, RecordValidationError, VersionedRecord};
use crate::model::status::StatusInfo;
use crate::schema::{catalog_schema, CompositionSchema, SchemaError};
use chrono::NaiveDateTime;
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    kind,
    guid,
    business_id,
    x_road_instance,
    member_class,
    member_code,
    created,
    changed,
    removed,
    fetched
FROM records";

/// Upper bound of bound ids per `record_fields` lookup, well under SQLite's
/// host parameter limit.
const FIELD_BATCH_SIZE: usize = 500;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and graph hydration.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Graph(GraphError),
    Db(DbError),
    NotFound(RecordId),
    /// Root-only operation was asked for a nested kind.
    NotARootKind(EntityKind),
    DuplicateKey(BusinessKey),
    /// `child` is not a declared category of the `parent` kind.
    UndeclaredCategory {
        parent: EntityKind,
        child: EntityKind,
    },
    Schema(SchemaError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Graph(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::NotARootKind(kind) => write!(f, "{kind} is not a root kind"),
            Self::DuplicateKey(key) => write!(f, "business key already in use: {key}"),
            Self::UndeclaredCategory { parent, child } => {
                write!(f, "{child} is not a declared category of {parent}")
            }
            Self::Schema(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Graph(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<GraphError> for RepoError {
    fn from(value: GraphError) -> Self {
        Self::Graph(value)
    }
}

impl From<SchemaError> for RepoError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface over versioned catalog records.
pub trait CatalogRepository {
    /// Finds the root record addressed by `key`.
    fn resolve(
        &self,
        key: &BusinessKey,
        include_removed: bool,
    ) -> RepoResult<Option<VersionedRecord>>;

    /// Records of `kind` attached directly under `parent`, removed included.
    fn instances(
        &self,
        parent: &VersionedRecord,
        kind: EntityKind,
    ) -> RepoResult<Vec<VersionedRecord>>;

    /// Root records of `kind`.
    fn list_roots(
        &self,
        kind: EntityKind,
        include_removed: bool,
    ) -> RepoResult<Vec<VersionedRecord>>;

    fn insert_root(&self, record: &VersionedRecord) -> RepoResult<RecordId>;

    fn insert_child(&self, parent: RecordId, record: &VersionedRecord) -> RepoResult<RecordId>;

    /// Persists status and fields of an existing record.
    fn update_record(&self, record: &VersionedRecord) -> RepoResult<()>;

    /// Records a modification of one record at `at`, reviving it if removed.
    fn mark_changed(&self, id: RecordId, at: NaiveDateTime) -> RepoResult<()>;

    /// Tombstones one record at `at`. Idempotent.
    fn mark_removed(&self, id: RecordId, at: NaiveDateTime) -> RepoResult<()>;

    /// Resolves `key` and hydrates its full graph following `schema`.
    fn load_graph(
        &self,
        schema: &CompositionSchema,
        key: &BusinessKey,
        include_removed: bool,
    ) -> RepoResult<Option<EntityGraph>> {
        match self.resolve(key, include_removed)? {
            Some(root) => hydrate_graph(self, schema, root).map(Some),
            None => Ok(None),
        }
    }
}

/// Builds the graph under `root` by reading every declared category level.
pub fn hydrate_graph<R>(
    repo: &R,
    schema: &CompositionSchema,
    root: VersionedRecord,
) -> RepoResult<EntityGraph>
where
    R: CatalogRepository + ?Sized,
{
    let root_kind = root.kind;
    let mut graph = EntityGraph::new(root.clone())?;
    attach_level(repo, schema, &mut graph, root_kind, &[root])?;
    Ok(graph)
}

fn attach_level<R>(
    repo: &R,
    schema: &CompositionSchema,
    graph: &mut EntityGraph,
    kind: EntityKind,
    parents: &[VersionedRecord],
) -> RepoResult<()>
where
    R: CatalogRepository + ?Sized,
{
    for edge in schema.categories(kind) {
        let mut level = Vec::new();
        for parent in parents {
            for child in repo.instances(parent, edge.child)? {
                graph.attach(parent.id, child.clone())?;
                level.push(child);
            }
        }
        if !level.is_empty() {
            attach_level(repo, schema, graph, edge.child, &level)?;
        }
    }
    Ok(())
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<VersionedRecord>> {
        Ok(self
            .query_records(
                &format!("{RECORD_SELECT_SQL} WHERE id = ?1;"),
                vec![Value::Text(id.to_string())],
            )?
            .into_iter()
            .next())
    }

    /// Runs a record query, then loads the fields of every returned row with
    /// one `record_fields` statement.
    fn query_records(&self, sql: &str, binds: Vec<Value>) -> RepoResult<Vec<VersionedRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        self.attach_fields(&mut records)?;
        for record in &records {
            record.validate()?;
        }
        Ok(records)
    }

    fn attach_fields(&self, records: &mut [VersionedRecord]) -> RepoResult<()> {
        for batch in records.chunks_mut(FIELD_BATCH_SIZE) {
            let placeholders = vec!["?"; batch.len()].join(", ");
            let mut stmt = self.conn.prepare(&format!(
                "SELECT record_id, name, value
                 FROM record_fields
                 WHERE record_id IN ({placeholders})
                 ORDER BY record_id, name;"
            ))?;
            let ids = batch.iter().map(|record| record.id.to_string());
            let rows = stmt.query_map(params_from_iter(ids), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;

            let mut fields: HashMap<String, Vec<(String, String)>> = HashMap::new();
            for row in rows {
                let (record_id, name, value) = row?;
                fields.entry(record_id).or_default().push((name, value));
            }
            for record in batch.iter_mut() {
                if let Some(values) = fields.remove(&record.id.to_string()) {
                    record.fields.extend(values);
                }
            }
        }
        Ok(())
    }

    fn insert_row(&self, parent: Option<RecordId>, record: &VersionedRecord) -> RepoResult<()> {
        let (guid, business_id, x_road_instance, member_class, member_code) =
            key_columns(record.key.as_ref());

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO records (
                id,
                kind,
                parent_id,
                guid,
                business_id,
                x_road_instance,
                member_class,
                member_code,
                created,
                changed,
                removed,
                fetched
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                record.id.to_string(),
                record.kind.as_str(),
                parent.map(|id| id.to_string()),
                guid,
                business_id,
                x_road_instance,
                member_class,
                member_code,
                record.status.created,
                record.status.changed,
                record.status.removed,
                record.status.fetched,
            ],
        )?;
        write_fields(&tx, record)?;
        tx.commit()?;
        Ok(())
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn resolve(
        &self,
        key: &BusinessKey,
        include_removed: bool,
    ) -> RepoResult<Option<VersionedRecord>> {
        let (clause, mut binds) = match key {
            BusinessKey::OrganizationGuid(guid) => {
                ("guid = ?1", vec![Value::Text(guid.clone())])
            }
            BusinessKey::CompanyBusinessId(business_id) => {
                ("business_id = ?1", vec![Value::Text(business_id.clone())])
            }
            BusinessKey::Member {
                x_road_instance,
                member_class,
                member_code,
            } => (
                "x_road_instance = ?1 AND member_class = ?2 AND member_code = ?3",
                vec![
                    Value::Text(x_road_instance.clone()),
                    Value::Text(member_class.clone()),
                    Value::Text(member_code.clone()),
                ],
            ),
        };
        let kind_index = binds.len() + 1;
        binds.push(Value::Text(key.root_kind().as_str().to_string()));
        let removed_index = binds.len() + 1;
        binds.push(Value::Integer(bool_to_int(include_removed)));

        let sql = format!(
            "{RECORD_SELECT_SQL}
             WHERE {clause}
               AND kind = ?{kind_index}
               AND (?{removed_index} = 1 OR removed IS NULL);"
        );
        Ok(self.query_records(&sql, binds)?.into_iter().next())
    }

    fn instances(
        &self,
        parent: &VersionedRecord,
        kind: EntityKind,
    ) -> RepoResult<Vec<VersionedRecord>> {
        self.query_records(
            &format!(
                "{RECORD_SELECT_SQL}
                 WHERE parent_id = ?1 AND kind = ?2
                 ORDER BY created ASC, id ASC;"
            ),
            vec![
                Value::Text(parent.id.to_string()),
                Value::Text(kind.as_str().to_string()),
            ],
        )
    }

    fn list_roots(
        &self,
        kind: EntityKind,
        include_removed: bool,
    ) -> RepoResult<Vec<VersionedRecord>> {
        if !kind.is_root() {
            return Err(RepoError::NotARootKind(kind));
        }
        self.query_records(
            &format!(
                "{RECORD_SELECT_SQL}
                 WHERE kind = ?1
                   AND parent_id IS NULL
                   AND (?2 = 1 OR removed IS NULL)
                 ORDER BY created ASC, id ASC;"
            ),
            vec![
                Value::Text(kind.as_str().to_string()),
                Value::Integer(bool_to_int(include_removed)),
            ],
        )
    }

    fn insert_root(&self, record: &VersionedRecord) -> RepoResult<RecordId> {
        record.validate()?;
        let Some(key) = record.key.as_ref() else {
            return Err(RepoError::NotARootKind(record.kind));
        };
        if self.resolve(key, true)?.is_some() {
            return Err(RepoError::DuplicateKey(key.clone()));
        }

        self.insert_row(None, record)?;
        Ok(record.id)
    }

    fn insert_child(&self, parent: RecordId, record: &VersionedRecord) -> RepoResult<RecordId> {
        record.validate()?;
        let Some(parent_record) = self.get_record(parent)? else {
            return Err(RepoError::NotFound(parent));
        };
        let declared = catalog_schema()?
            .categories(parent_record.kind)
            .iter()
            .any(|edge| edge.child == record.kind);
        if !declared {
            return Err(RepoError::UndeclaredCategory {
                parent: parent_record.kind,
                child: record.kind,
            });
        }

        self.insert_row(Some(parent), record)?;
        Ok(record.id)
    }

    fn update_record(&self, record: &VersionedRecord) -> RepoResult<()> {
        record.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE records
             SET
                created = ?1,
                changed = ?2,
                removed = ?3,
                fetched = ?4
             WHERE id = ?5 AND kind = ?6;",
            params![
                record.status.created,
                record.status.changed,
                record.status.removed,
                record.status.fetched,
                record.id.to_string(),
                record.kind.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(record.id));
        }

        tx.execute(
            "DELETE FROM record_fields WHERE record_id = ?1;",
            [record.id.to_string()],
        )?;
        write_fields(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    fn mark_changed(&self, id: RecordId, at: NaiveDateTime) -> RepoResult<()> {
        let Some(mut record) = self.get_record(id)? else {
            return Err(RepoError::NotFound(id));
        };
        record.status.mark_changed(at);
        record.validate()?;

        self.conn.execute(
            "UPDATE records SET changed = ?1, fetched = ?2, removed = NULL WHERE id = ?3;",
            params![record.status.changed, record.status.fetched, id.to_string()],
        )?;
        Ok(())
    }

    fn mark_removed(&self, id: RecordId, at: NaiveDateTime) -> RepoResult<()> {
        let Some(mut record) = self.get_record(id)? else {
            return Err(RepoError::NotFound(id));
        };
        if record.is_removed() {
            return Ok(());
        }
        record.status.mark_removed(at);
        record.validate()?;

        self.conn.execute(
            "UPDATE records SET removed = ?1 WHERE id = ?2;",
            params![record.status.removed, id.to_string()],
        )?;
        Ok(())
    }

    fn load_graph(
        &self,
        schema: &CompositionSchema,
        key: &BusinessKey,
        include_removed: bool,
    ) -> RepoResult<Option<EntityGraph>> {
        let started_at = Instant::now();
        // Deferred read transaction: every level below is read from one snapshot.
        let tx = self.conn.unchecked_transaction()?;

        let loaded = match self.resolve(key, include_removed) {
            Ok(Some(root)) => hydrate_graph(self, schema, root).map(Some),
            Ok(None) => Ok(None),
            Err(err) => Err(err),
        };

        match loaded {
            Ok(graph) => {
                tx.commit()?;
                debug!(
                    "event=graph_load module=repo status=ok root_kind={} found={} records={} duration_ms={}",
                    key.root_kind(),
                    graph.is_some(),
                    graph.as_ref().map_or(0, EntityGraph::record_count),
                    started_at.elapsed().as_millis()
                );
                Ok(graph)
            }
            Err(err) => {
                error!(
                    "event=graph_load module=repo status=error root_kind={} duration_ms={} error={}",
                    key.root_kind(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn write_fields(conn: &Connection, record: &VersionedRecord) -> RepoResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO record_fields (record_id, name, value) VALUES (?1, ?2, ?3);",
    )?;
    for (name, value) in &record.fields {
        stmt.execute(params![record.id.to_string(), name, value])?;
    }
    Ok(())
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<VersionedRecord> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in records.id"))
    })?;

    let kind_text: String = row.get("kind")?;
    let kind = EntityKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid record kind `{kind_text}` in records.kind"))
    })?;

    let status = StatusInfo {
        created: row.get("created")?,
        changed: row.get("changed")?,
        removed: row.get("removed")?,
        fetched: row.get("fetched")?,
    };

    let mut record = VersionedRecord::with_id(id, kind, status);
    record.key = parse_business_key(row, kind)?;
    Ok(record)
}

fn parse_business_key(row: &Row<'_>, kind: EntityKind) -> RepoResult<Option<BusinessKey>> {
    let required = |column: &str| -> RepoResult<String> {
        row.get::<_, Option<String>>(column)?.ok_or_else(|| {
            RepoError::InvalidData(format!("{kind} record without records.{column}"))
        })
    };

    let key = match kind {
        EntityKind::Organization => Some(BusinessKey::OrganizationGuid(required("guid")?)),
        EntityKind::Company => Some(BusinessKey::CompanyBusinessId(required("business_id")?)),
        EntityKind::Member => Some(BusinessKey::Member {
            x_road_instance: required("x_road_instance")?,
            member_class: required("member_class")?,
            member_code: required("member_code")?,
        }),
        _ => None,
    };
    Ok(key)
}

type KeyColumns<'k> = (
    Option<&'k str>,
    Option<&'k str>,
    Option<&'k str>,
    Option<&'k str>,
    Option<&'k str>,
);

fn key_columns(key: Option<&BusinessKey>) -> KeyColumns<'_> {
    match key {
        Some(BusinessKey::OrganizationGuid(guid)) => (Some(guid.as_str()), None, None, None, None),
        Some(BusinessKey::CompanyBusinessId(business_id)) => {
            (None, Some(business_id.as_str()), None, None, None)
        }
        Some(BusinessKey::Member {
            x_road_instance,
            member_class,
            member_code,
        }) => (
            None,
            None,
            Some(x_road_instance.as_str()),
            Some(member_class.as_str()),
            Some(member_code.as_str()),
        ),
        None => (None, None, None, None, None),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
