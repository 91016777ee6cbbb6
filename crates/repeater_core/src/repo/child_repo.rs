//! Child repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/update/soft-delete/form-field APIs over repeater children.
//! - Keep owner scoping (foreign key, morph pair, pivot) inside one filter type.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `update` only targets active rows of the repository's model; soft-deleted
//!   rows are never resurrected.
//! - Soft delete sets `deleted_at`; only `force_delete` removes rows.
//! - Child listing is deterministic: `position ASC, id ASC`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::form::{ChildFormFields, FormFieldOptions, MediaFields};
use crate::model::record::{ChildId, ChildRecord, FieldMap, ParentRecord, RecordId};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    model,
    position,
    attributes,
    translations,
    deleted_at,
    created_at,
    updated_at
FROM repeater_items";

const MEDIAS_KEY: &str = "medias";
const FILES_KEY: &str = "files";
const BROWSERS_KEY: &str = "browsers";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence errors from child repositories.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Target child does not exist, is soft-deleted, or belongs to another model.
    NotFound(ChildId),
    /// Persisted row cannot be converted into a valid read model.
    InvalidData(String),
    /// Submitted fields cannot be persisted as given.
    InvalidInput(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "repeater child not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted repeater data: {message}"),
            Self::InvalidInput(message) => write!(f, "invalid repeater input: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "child repository requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
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

/// How children of one relation are tied to their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerScope {
    /// One-to-many: `<column> = parent_id`.
    ForeignKey { column: String, parent_id: RecordId },
    /// Polymorphic: `<morph>_type = morph_type AND <morph>_id = parent_id`.
    Morph {
        morph: String,
        morph_type: String,
        parent_id: RecordId,
    },
    /// Many-to-many through a pivot keyed by relation name.
    Pivot { relation: String, parent_id: RecordId },
}

impl OwnerScope {
    pub fn foreign_key(parent: &ParentRecord) -> Self {
        Self::ForeignKey {
            column: parent.foreign_key.clone(),
            parent_id: parent.id,
        }
    }

    pub fn morph(parent: &ParentRecord, morph: &str) -> Self {
        Self::Morph {
            morph: morph.to_string(),
            morph_type: parent.morph_class.clone(),
            parent_id: parent.id,
        }
    }

    pub fn pivot(parent: &ParentRecord, relation: &str) -> Self {
        Self::Pivot {
            relation: relation.to_string(),
            parent_id: parent.id,
        }
    }

    pub fn parent_id(&self) -> RecordId {
        match self {
            Self::ForeignKey { parent_id, .. }
            | Self::Morph { parent_id, .. }
            | Self::Pivot { parent_id, .. } => *parent_id,
        }
    }
}

impl Display for OwnerScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ForeignKey { column, parent_id } => write!(f, "{column}={parent_id}"),
            Self::Morph {
                morph,
                morph_type,
                parent_id,
            } => write!(f, "{morph}_type={morph_type},{morph}_id={parent_id}"),
            Self::Pivot {
                relation,
                parent_id,
            } => write!(f, "pivot:{relation}={parent_id}"),
        }
    }
}

/// Row filter for batched soft deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildFilter {
    /// Every active child owned through the scope.
    Owner(OwnerScope),
    /// Explicit child ids.
    Ids(Vec<ChildId>),
}

/// Repository interface for one repeater child model.
pub trait ChildRepository {
    /// Child model name served by this repository.
    fn model(&self) -> &str;
    /// Creates one child from submitted fields.
    fn create(&self, fields: &FieldMap) -> RepoResult<ChildRecord>;
    /// Updates one active child in place.
    fn update(&self, id: ChildId, fields: &FieldMap) -> RepoResult<ChildRecord>;
    /// Soft-deletes every active child matching `filter`; returns affected rows.
    fn soft_delete_where(&self, filter: &ChildFilter) -> RepoResult<usize>;
    /// Hard-deletes one child.
    fn force_delete(&self, id: ChildId) -> RepoResult<()>;
    /// Ties an existing child to a parent through `scope`.
    fn link(&self, id: ChildId, scope: &OwnerScope) -> RepoResult<()>;
    /// Lists active children owned through `scope`.
    fn list_children(&self, scope: &OwnerScope) -> RepoResult<Vec<ChildRecord>>;
    /// Extracts form fields of one child for re-display.
    fn form_fields(
        &self,
        child: &ChildRecord,
        options: &FormFieldOptions,
    ) -> RepoResult<ChildFormFields>;
}

impl<T: ChildRepository + ?Sized> ChildRepository for &T {
    fn model(&self) -> &str {
        (**self).model()
    }

    fn create(&self, fields: &FieldMap) -> RepoResult<ChildRecord> {
        (**self).create(fields)
    }

    fn update(&self, id: ChildId, fields: &FieldMap) -> RepoResult<ChildRecord> {
        (**self).update(id, fields)
    }

    fn soft_delete_where(&self, filter: &ChildFilter) -> RepoResult<usize> {
        (**self).soft_delete_where(filter)
    }

    fn force_delete(&self, id: ChildId) -> RepoResult<()> {
        (**self).force_delete(id)
    }

    fn link(&self, id: ChildId, scope: &OwnerScope) -> RepoResult<()> {
        (**self).link(id, scope)
    }

    fn list_children(&self, scope: &OwnerScope) -> RepoResult<Vec<ChildRecord>> {
        (**self).list_children(scope)
    }

    fn form_fields(
        &self,
        child: &ChildRecord,
        options: &FormFieldOptions,
    ) -> RepoResult<ChildFormFields> {
        (**self).form_fields(child, options)
    }
}

/// Custom repeater serialization hook of a child model.
pub type RepeaterSerializer = fn(&ChildRecord) -> FieldMap;

/// Storage description of one child model.
#[derive(Debug, Clone)]
pub struct ChildSchema {
    pub model: String,
    /// Submitted key carrying the parent id on create (one-to-many).
    pub foreign_key: Option<String>,
    /// Keys stored as `locale -> value` translations.
    pub translated_fields: Vec<String>,
    /// Locale used when grouping locale-less attachments by locale.
    pub default_locale: String,
    pub repeater_serializer: Option<RepeaterSerializer>,
}

impl ChildSchema {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            foreign_key: None,
            translated_fields: Vec::new(),
            default_locale: "en".to_string(),
            repeater_serializer: None,
        }
    }

    pub fn with_foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = Some(column.into());
        self
    }

    pub fn with_translated_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.translated_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    pub fn with_repeater_serializer(mut self, serializer: RepeaterSerializer) -> Self {
        self.repeater_serializer = Some(serializer);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttachmentKind {
    Media,
    File,
    Browser,
}

impl AttachmentKind {
    fn as_db(self) -> &'static str {
        match self {
            Self::Media => "media",
            Self::File => "file",
            Self::Browser => "browser",
        }
    }
}

#[derive(Debug)]
struct Attachment {
    role: String,
    locale: Option<String>,
    payload: Value,
}

/// Submitted fields split into storage columns.
#[derive(Debug, Default)]
struct SplitFields {
    position: Option<i64>,
    owner_id: Option<RecordId>,
    attributes: FieldMap,
    translations: FieldMap,
    attachments: Vec<(AttachmentKind, Vec<Attachment>)>,
}

/// SQLite-backed child repository for one model.
pub struct SqliteChildRepository<'conn> {
    conn: &'conn Connection,
    schema: ChildSchema,
}

impl<'conn> SqliteChildRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection, schema: ChildSchema) -> RepoResult<Self> {
        ensure_child_connection_ready(conn)?;
        Ok(Self { conn, schema })
    }

    pub fn schema(&self) -> &ChildSchema {
        &self.schema
    }

    /// Loads one child by id with optional deleted-row visibility.
    pub fn get(&self, id: ChildId, include_deleted: bool) -> RepoResult<Option<ChildRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE id = ?1
               AND model = ?2
               AND (?3 = 1 OR deleted_at IS NULL);"
        ))?;
        let mut rows = stmt.query(params![id, self.schema.model, i64::from(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_child_row(row)?));
        }
        Ok(None)
    }

    fn load_required(&self, id: ChildId) -> RepoResult<ChildRecord> {
        self.get(id, false)?.ok_or(RepoError::NotFound(id))
    }

    fn split_fields(&self, fields: &FieldMap) -> RepoResult<SplitFields> {
        let mut split = SplitFields::default();
        for (key, value) in fields {
            match key.as_str() {
                "id" => {}
                "position" => {
                    split.position = Some(value.as_i64().ok_or_else(|| {
                        RepoError::InvalidInput(format!("position must be an integer, got {value}"))
                    })?);
                }
                MEDIAS_KEY => split
                    .attachments
                    .push((AttachmentKind::Media, parse_attachments(key, value)?)),
                FILES_KEY => split
                    .attachments
                    .push((AttachmentKind::File, parse_attachments(key, value)?)),
                BROWSERS_KEY => split
                    .attachments
                    .push((AttachmentKind::Browser, parse_attachments(key, value)?)),
                _ if self.schema.foreign_key.as_deref() == Some(key.as_str()) => {
                    split.owner_id = Some(value.as_i64().ok_or_else(|| {
                        RepoError::InvalidInput(format!("{key} must be an integer id, got {value}"))
                    })?);
                }
                _ if self.schema.translated_fields.iter().any(|field| field == key) => {
                    split.translations.insert(key.clone(), value.clone());
                }
                _ => {
                    split.attributes.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(split)
    }

    fn replace_attachments(
        &self,
        id: ChildId,
        attachments: &[(AttachmentKind, Vec<Attachment>)],
    ) -> RepoResult<()> {
        for (kind, rows) in attachments {
            self.conn.execute(
                "DELETE FROM repeater_attachments WHERE item_id = ?1 AND kind = ?2;",
                params![id, kind.as_db()],
            )?;
            for attachment in rows {
                self.conn.execute(
                    "INSERT INTO repeater_attachments (item_id, kind, role, locale, payload)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        id,
                        kind.as_db(),
                        attachment.role,
                        attachment.locale,
                        attachment.payload.to_string(),
                    ],
                )?;
            }
        }
        Ok(())
    }

    fn load_attachments(&self, id: ChildId, kind: AttachmentKind) -> RepoResult<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(
            "SELECT role, locale, payload
             FROM repeater_attachments
             WHERE item_id = ?1
               AND kind = ?2
             ORDER BY role ASC, locale ASC, id ASC;",
        )?;
        let mut rows = stmt.query(params![id, kind.as_db()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let payload_text: String = row.get("payload")?;
            items.push(Attachment {
                role: row.get("role")?,
                locale: row.get("locale")?,
                payload: parse_json(&payload_text, "repeater_attachments.payload")?,
            });
        }
        Ok(items)
    }

    fn grouped_attachments(
        &self,
        id: ChildId,
        kind: AttachmentKind,
        by_locale: bool,
    ) -> RepoResult<Option<MediaFields>> {
        let attachments = self.load_attachments(id, kind)?;
        if attachments.is_empty() {
            return Ok(None);
        }

        if by_locale {
            let mut locales: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
            for attachment in attachments {
                let locale = attachment
                    .locale
                    .unwrap_or_else(|| self.schema.default_locale.clone());
                locales
                    .entry(locale)
                    .or_default()
                    .insert(attachment.role, attachment.payload);
            }
            return Ok(Some(MediaFields::ByLocale(locales)));
        }

        // Locale-less payload wins; otherwise the first locale in order.
        let mut roles: BTreeMap<String, Value> = BTreeMap::new();
        for attachment in attachments {
            if attachment.locale.is_none() || !roles.contains_key(&attachment.role) {
                roles.insert(attachment.role, attachment.payload);
            }
        }
        Ok(Some(MediaFields::ByRole(roles)))
    }
}

impl ChildRepository for SqliteChildRepository<'_> {
    fn model(&self) -> &str {
        &self.schema.model
    }

    fn create(&self, fields: &FieldMap) -> RepoResult<ChildRecord> {
        let split = self.split_fields(fields)?;
        let owner_key = split.owner_id.and(self.schema.foreign_key.as_deref());

        self.conn.execute(
            "INSERT INTO repeater_items (
                model,
                owner_key,
                owner_type,
                owner_id,
                position,
                attributes,
                translations
            ) VALUES (?1, ?2, NULL, ?3, ?4, ?5, ?6);",
            params![
                self.schema.model,
                owner_key,
                split.owner_id,
                split.position.unwrap_or(0),
                Value::Object(split.attributes).to_string(),
                Value::Object(split.translations).to_string(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.replace_attachments(id, &split.attachments)?;
        self.load_required(id)
    }

    fn update(&self, id: ChildId, fields: &FieldMap) -> RepoResult<ChildRecord> {
        let current = self.load_required(id)?;
        let split = self.split_fields(fields)?;

        let mut attributes = current.attributes;
        attributes.extend(split.attributes);
        let mut translations = current.translations;
        translations.extend(split.translations);

        let changed = self.conn.execute(
            "UPDATE repeater_items
             SET position = ?2,
                 attributes = ?3,
                 translations = ?4,
                 owner_id = COALESCE(?5, owner_id),
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND model = ?6
               AND deleted_at IS NULL;",
            params![
                id,
                split.position.unwrap_or(current.position),
                Value::Object(attributes).to_string(),
                Value::Object(translations).to_string(),
                split.owner_id,
                self.schema.model,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.replace_attachments(id, &split.attachments)?;
        self.load_required(id)
    }

    fn soft_delete_where(&self, filter: &ChildFilter) -> RepoResult<usize> {
        let mut sql = String::from(
            "UPDATE repeater_items
             SET deleted_at = (strftime('%s', 'now') * 1000),
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE model = ? AND deleted_at IS NULL",
        );
        let mut bind_values = vec![SqlValue::Text(self.schema.model.clone())];

        match filter {
            ChildFilter::Owner(scope) => {
                push_scope_clause(&mut sql, &mut bind_values, scope);
            }
            ChildFilter::Ids(ids) => {
                if ids.is_empty() {
                    return Ok(0);
                }
                sql.push_str(" AND id IN (");
                sql.push_str(&vec!["?"; ids.len()].join(", "));
                sql.push(')');
                bind_values.extend(ids.iter().map(|id| SqlValue::Integer(*id)));
            }
        }

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed)
    }

    fn force_delete(&self, id: ChildId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM repeater_items WHERE id = ?1 AND model = ?2;",
            params![id, self.schema.model],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn link(&self, id: ChildId, scope: &OwnerScope) -> RepoResult<()> {
        let changed = match scope {
            OwnerScope::ForeignKey { column, parent_id } => self.conn.execute(
                "UPDATE repeater_items
                 SET owner_key = ?2,
                     owner_type = NULL,
                     owner_id = ?3,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1
                   AND model = ?4
                   AND deleted_at IS NULL;",
                params![id, column, parent_id, self.schema.model],
            )?,
            OwnerScope::Morph {
                morph,
                morph_type,
                parent_id,
            } => self.conn.execute(
                "UPDATE repeater_items
                 SET owner_key = ?2,
                     owner_type = ?3,
                     owner_id = ?4,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1
                   AND model = ?5
                   AND deleted_at IS NULL;",
                params![id, morph, morph_type, parent_id, self.schema.model],
            )?,
            OwnerScope::Pivot {
                relation,
                parent_id,
            } => {
                if self.get(id, false)?.is_none() {
                    return Err(RepoError::NotFound(id));
                }
                self.conn.execute(
                    "INSERT OR IGNORE INTO repeater_pivots (relation, parent_id, item_id)
                     VALUES (?1, ?2, ?3);",
                    params![relation, parent_id, id],
                )?;
                1
            }
        };
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_children(&self, scope: &OwnerScope) -> RepoResult<Vec<ChildRecord>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE model = ? AND deleted_at IS NULL");
        let mut bind_values = vec![SqlValue::Text(self.schema.model.clone())];
        push_scope_clause(&mut sql, &mut bind_values, scope);
        sql.push_str(" ORDER BY position ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut children = Vec::new();
        while let Some(row) = rows.next()? {
            children.push(parse_child_row(row)?);
        }
        Ok(children)
    }

    fn form_fields(
        &self,
        child: &ChildRecord,
        options: &FormFieldOptions,
    ) -> RepoResult<ChildFormFields> {
        let browsers = self
            .load_attachments(child.id, AttachmentKind::Browser)?
            .into_iter()
            .map(|attachment| (attachment.role, attachment.payload))
            .collect();

        Ok(ChildFormFields {
            translations: child
                .translations
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            medias: self.grouped_attachments(
                child.id,
                AttachmentKind::Media,
                options.translated_media_fields,
            )?,
            files: self.grouped_attachments(
                child.id,
                AttachmentKind::File,
                options.locale_grouped_files,
            )?,
            browsers,
            attributes: child.attributes_to_map(),
            repeater_attributes: self.schema.repeater_serializer.map(|serialize| serialize(child)),
        })
    }
}

fn push_scope_clause(sql: &mut String, bind_values: &mut Vec<SqlValue>, scope: &OwnerScope) {
    match scope {
        OwnerScope::ForeignKey { column, parent_id } => {
            sql.push_str(" AND owner_key = ? AND owner_type IS NULL AND owner_id = ?");
            bind_values.push(SqlValue::Text(column.clone()));
            bind_values.push(SqlValue::Integer(*parent_id));
        }
        OwnerScope::Morph {
            morph,
            morph_type,
            parent_id,
        } => {
            sql.push_str(" AND owner_key = ? AND owner_type = ? AND owner_id = ?");
            bind_values.push(SqlValue::Text(morph.clone()));
            bind_values.push(SqlValue::Text(morph_type.clone()));
            bind_values.push(SqlValue::Integer(*parent_id));
        }
        OwnerScope::Pivot {
            relation,
            parent_id,
        } => {
            sql.push_str(
                " AND id IN (
                    SELECT item_id
                    FROM repeater_pivots
                    WHERE relation = ? AND parent_id = ?
                )",
            );
            bind_values.push(SqlValue::Text(relation.clone()));
            bind_values.push(SqlValue::Integer(*parent_id));
        }
    }
}

/// Reads `{role: payload}` or `{role: {locale: payload}}` submissions.
fn parse_attachments(key: &str, value: &Value) -> RepoResult<Vec<Attachment>> {
    let roles = value.as_object().ok_or_else(|| {
        RepoError::InvalidInput(format!("{key} must be an object keyed by role, got {value}"))
    })?;

    let mut attachments = Vec::new();
    for (role, payload) in roles {
        match payload {
            Value::Object(locales) if key != BROWSERS_KEY => {
                for (locale, localized) in locales {
                    attachments.push(Attachment {
                        role: role.clone(),
                        locale: Some(locale.clone()),
                        payload: localized.clone(),
                    });
                }
            }
            _ => attachments.push(Attachment {
                role: role.clone(),
                locale: None,
                payload: payload.clone(),
            }),
        }
    }
    Ok(attachments)
}

fn parse_child_row(row: &Row<'_>) -> RepoResult<ChildRecord> {
    let attributes_text: String = row.get("attributes")?;
    let translations_text: String = row.get("translations")?;

    Ok(ChildRecord {
        id: row.get("id")?,
        model: row.get("model")?,
        position: row.get("position")?,
        attributes: parse_json_object(&attributes_text, "repeater_items.attributes")?,
        translations: parse_json_object(&translations_text, "repeater_items.translations")?,
        deleted_at: row.get("deleted_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_json(text: &str, column: &'static str) -> RepoResult<Value> {
    serde_json::from_str(text)
        .map_err(|err| RepoError::InvalidData(format!("invalid json in {column}: {err}")))
}

fn parse_json_object(text: &str, column: &'static str) -> RepoResult<FieldMap> {
    match parse_json(text, column)? {
        Value::Object(map) => Ok(map),
        other => Err(RepoError::InvalidData(format!(
            "expected json object in {column}, got {other}"
        ))),
    }
}

fn ensure_child_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["repeater_items", "repeater_pivots", "repeater_attachments"] {
        let name: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1;",
                [table],
                |row| row.get(0),
            )
            .optional()?;
        if name.is_none() {
            return Err(RepoError::InvalidData(format!(
                "missing required table `{table}`"
            )));
        }
    }
    Ok(())
}
