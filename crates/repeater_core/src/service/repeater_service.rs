//! Repeater use-case service.
//!
//! # Responsibility
//! - Reconcile submitted repeater entries with stored child rows.
//! - Project stored child rows back into form fields for re-display.
//! - Run both directions for every declared repeater of a parent type.
//!
//! # Invariants
//! - Positions are reassigned 1-based in submission order on every pass.
//! - Children missing from a submission are soft-deleted in one batch;
//!   only `replace_repeater_many` hard-deletes.
//! - At most one create or update per submitted entry; no row is both
//!   updated and soft-deleted in the same pass.
//! - The service never opens transactions. Callers wrap calls in one and a
//!   failure aborts immediately.

use crate::config::RepeaterConfig;
use crate::model::block_field::parse_existing_id;
use crate::model::declaration::{normalize_declarations, RepeaterDeclaration, ResolvedRepeater};
use crate::model::form::{FormFields, SubmittedForm};
use crate::model::record::{ChildId, FieldMap, ParentRecord};
use crate::repo::child_repo::{ChildFilter, ChildRepository, OwnerScope, RepoError};
use crate::repo::registry::{ChildRepositoryRegistry, RegistryError};
use crate::service::projection::RepeaterProjection;
use log::{info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type RepeaterResult<T> = Result<T, RepeaterError>;

/// Errors from repeater synchronization and projection.
#[derive(Debug)]
pub enum RepeaterError {
    /// No block declaration exists for a repeater name.
    MissingDeclaration(String),
    /// Child repository cannot be resolved for a relation/model.
    Registry(RegistryError),
    /// Child repository call failed.
    Repo(RepoError),
}

impl RepeaterError {
    /// Configuration errors come from declarations/registry, never from storage.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingDeclaration(_) | Self::Registry(_))
    }
}

impl Display for RepeaterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDeclaration(name) => {
                write!(f, "no repeater block declared for `{name}`")
            }
            Self::Registry(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepeaterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingDeclaration(_) => None,
            Self::Registry(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RegistryError> for RepeaterError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<RepoError> for RepeaterError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Surviving child ids in submission order.
    pub surviving: Vec<ChildId>,
    pub created: Vec<ChildId>,
    pub updated: Vec<ChildId>,
    /// Rows soft-deleted (or force-deleted in replace mode).
    pub deleted: usize,
}

/// Use-case service for repeater relations of one parent type.
pub struct RepeaterService<'a> {
    registry: ChildRepositoryRegistry<'a>,
    declarations: Vec<ResolvedRepeater>,
    config: RepeaterConfig,
}

impl<'a> RepeaterService<'a> {
    pub fn new(
        registry: ChildRepositoryRegistry<'a>,
        declarations: Vec<ResolvedRepeater>,
        config: RepeaterConfig,
    ) -> Self {
        Self {
            registry,
            declarations,
            config,
        }
    }

    /// Normalizes a `(key, declaration)` table once and builds the service.
    pub fn from_declarations<K, I>(
        registry: ChildRepositoryRegistry<'a>,
        declarations: I,
        config: RepeaterConfig,
    ) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, RepeaterDeclaration)>,
    {
        Self::new(registry, normalize_declarations(declarations), config)
    }

    pub fn declarations(&self) -> &[ResolvedRepeater] {
        &self.declarations
    }

    pub fn config(&self) -> &RepeaterConfig {
        &self.config
    }

    fn declaration(&self, relation: &str) -> Option<&ResolvedRepeater> {
        self.declarations
            .iter()
            .find(|declaration| declaration.relation == relation)
    }

    /// Effective names: explicit hints, then the declaration of `relation`,
    /// then naming conventions.
    fn resolve_names(
        &self,
        relation: &str,
        model: Option<&str>,
        repeater_name: Option<&str>,
    ) -> ResolvedRepeater {
        let declared = self.declaration(relation);
        ResolvedRepeater::from_hints(
            relation,
            non_blank(model).or(declared.map(|declaration| declaration.model.as_str())),
            non_blank(repeater_name)
                .or(declared.map(|declaration| declaration.repeater_name.as_str())),
        )
    }

    /// Model the registered repository must serve: the explicit hint or the
    /// declared model. Conventions are never enforced.
    fn expected_model<'s>(&'s self, relation: &str, model: Option<&'s str>) -> Option<&'s str> {
        non_blank(model).or(self
            .declaration(relation)
            .map(|declaration| declaration.model.as_str()))
    }

    /// Reconciles every declared repeater after the parent was saved.
    pub fn after_save(&self, parent: &ParentRecord, form: &SubmittedForm) -> RepeaterResult<()> {
        for declaration in &self.declarations {
            self.update_repeater(
                parent,
                form,
                &declaration.relation,
                Some(&declaration.model),
                Some(&declaration.repeater_name),
            )?;
        }
        Ok(())
    }

    /// Reconciles a one-to-many relation keyed by the parent's foreign key.
    ///
    /// Entries are read under `repeater_name`, else the declared repeater
    /// name of `relation`, else `relation` itself.
    pub fn update_repeater(
        &self,
        parent: &ParentRecord,
        form: &SubmittedForm,
        relation: &str,
        model: Option<&str>,
        repeater_name: Option<&str>,
    ) -> RepeaterResult<SyncReport> {
        let names = self.resolve_names(relation, model, repeater_name);
        let repository = self
            .registry
            .resolve(relation, self.expected_model(relation, model))?;
        reconcile(
            repository,
            parent,
            form.entries(&names.repeater_name),
            relation,
            &OwnerScope::foreign_key(parent),
        )
    }

    /// Reconciles a polymorphic one-to-many relation.
    ///
    /// Children are scoped by `<morph>_type` + `<morph>_id`; `morph`
    /// defaults to the relation name.
    pub fn update_repeater_morph_many(
        &self,
        parent: &ParentRecord,
        form: &SubmittedForm,
        relation: &str,
        morph: Option<&str>,
        model: Option<&str>,
    ) -> RepeaterResult<SyncReport> {
        let repository = self
            .registry
            .resolve(relation, self.expected_model(relation, model))?;
        let scope = OwnerScope::morph(parent, morph.unwrap_or(relation));
        reconcile(repository, parent, form.entries(relation), relation, &scope)
    }

    /// Replaces a many-to-many relation: existing linked children are
    /// hard-deleted, then every entry is created and attached.
    pub fn replace_repeater_many(
        &self,
        parent: &ParentRecord,
        form: &SubmittedForm,
        relation: &str,
        model: Option<&str>,
    ) -> RepeaterResult<SyncReport> {
        let started_at = Instant::now();
        let repository = self
            .registry
            .resolve(relation, self.expected_model(relation, model))?;
        let scope = OwnerScope::pivot(parent, relation);

        let mut report = SyncReport::default();
        for child in repository.list_children(&scope)? {
            repository.force_delete(child.id)?;
            report.deleted += 1;
        }
        attach_entries(repository, form.entries(relation), &scope, 0, &mut report)?;

        log_sync("replace_many", relation, &scope, &report, started_at);
        Ok(report)
    }

    /// Appends to a many-to-many relation without touching existing children.
    pub fn append_repeater_many(
        &self,
        parent: &ParentRecord,
        form: &SubmittedForm,
        relation: &str,
        model: Option<&str>,
    ) -> RepeaterResult<SyncReport> {
        let started_at = Instant::now();
        let repository = self
            .registry
            .resolve(relation, self.expected_model(relation, model))?;
        let scope = OwnerScope::pivot(parent, relation);

        let existing = repository.list_children(&scope)?;
        let mut report = SyncReport {
            surviving: existing.iter().map(|child| child.id).collect(),
            ..SyncReport::default()
        };
        let offset = existing.iter().map(|child| child.position).max().unwrap_or(0);
        attach_entries(repository, form.entries(relation), &scope, offset, &mut report)?;

        log_sync("append_many", relation, &scope, &report, started_at);
        Ok(report)
    }

    /// Projects every declared repeater into `fields`.
    pub fn form_fields(
        &self,
        parent: &ParentRecord,
        fields: FormFields,
    ) -> RepeaterResult<FormFields> {
        self.declarations
            .iter()
            .try_fold(fields, |fields, declaration| {
                self.form_fields_for_repeater(
                    parent,
                    fields,
                    &declaration.relation,
                    Some(&declaration.model),
                    Some(&declaration.repeater_name),
                )
            })
    }

    /// Projects the children of a one-to-many relation into `fields`.
    pub fn form_fields_for_repeater(
        &self,
        parent: &ParentRecord,
        fields: FormFields,
        relation: &str,
        model: Option<&str>,
        repeater_name: Option<&str>,
    ) -> RepeaterResult<FormFields> {
        self.form_fields_for_scope(
            &OwnerScope::foreign_key(parent),
            fields,
            relation,
            model,
            repeater_name,
        )
    }

    /// Projects the children reachable through `scope` into `fields`.
    ///
    /// Used directly for polymorphic and pivot relations.
    pub fn form_fields_for_scope(
        &self,
        scope: &OwnerScope,
        mut fields: FormFields,
        relation: &str,
        model: Option<&str>,
        repeater_name: Option<&str>,
    ) -> RepeaterResult<FormFields> {
        let started_at = Instant::now();
        let names = self.resolve_names(relation, model, repeater_name);
        let repository = self
            .registry
            .resolve(relation, self.expected_model(relation, model))?;
        let options = self.config.form_field_options();

        let children = repository.list_children(scope)?;
        let mut projection = RepeaterProjection::default();
        for child in &children {
            let block = self
                .config
                .block(&names.repeater_name)
                .ok_or_else(|| RepeaterError::MissingDeclaration(names.repeater_name.clone()))?;
            let extracted = repository.form_fields(child, &options)?;
            projection.push_child(relation, child.id, block, extracted);
        }
        projection.apply(&mut fields, &names.repeater_name);

        info!(
            "event=repeater_form_fields module=repeater status=ok relation={} repeater={} owner={} children={} duration_ms={}",
            relation,
            names.repeater_name,
            scope,
            children.len(),
            started_at.elapsed().as_millis()
        );
        Ok(fields)
    }
}

/// Shared reconciliation for foreign-key and polymorphic relations.
fn reconcile(
    repository: &dyn ChildRepository,
    parent: &ParentRecord,
    entries: &[FieldMap],
    relation: &str,
    scope: &OwnerScope,
) -> RepeaterResult<SyncReport> {
    let started_at = Instant::now();
    let mut report = SyncReport::default();

    if entries.is_empty() {
        report.deleted = repository.soft_delete_where(&ChildFilter::Owner(scope.clone()))?;
        log_sync("sync", relation, scope, &report, started_at);
        return Ok(report);
    }

    for (index, entry) in entries.iter().enumerate() {
        let mut fields = entry.clone();
        fields.insert("position".to_string(), Value::from(index as i64 + 1));

        match existing_child_id(&fields, relation) {
            Some(id) => {
                repository.update(id, &fields)?;
                report.updated.push(id);
                report.surviving.push(id);
            }
            None => {
                fields.remove("id");
                if let OwnerScope::ForeignKey { column, .. } = scope {
                    fields.insert(column.clone(), Value::from(parent.id));
                }
                let child = repository.create(&fields)?;
                repository.link(child.id, scope)?;
                report.created.push(child.id);
                report.surviving.push(child.id);
            }
        }
    }

    let surviving: HashSet<ChildId> = report.surviving.iter().copied().collect();
    let stale: Vec<ChildId> = repository
        .list_children(scope)?
        .into_iter()
        .map(|child| child.id)
        .filter(|id| !surviving.contains(id))
        .collect();
    if !stale.is_empty() {
        report.deleted = repository.soft_delete_where(&ChildFilter::Ids(stale))?;
    }

    log_sync("sync", relation, scope, &report, started_at);
    Ok(report)
}

fn attach_entries(
    repository: &dyn ChildRepository,
    entries: &[FieldMap],
    scope: &OwnerScope,
    position_offset: i64,
    report: &mut SyncReport,
) -> RepeaterResult<()> {
    for (index, entry) in entries.iter().enumerate() {
        let mut fields = entry.clone();
        fields.remove("id");
        fields.insert(
            "position".to_string(),
            Value::from(position_offset + index as i64 + 1),
        );
        let child = repository.create(&fields)?;
        repository.link(child.id, scope)?;
        report.created.push(child.id);
        report.surviving.push(child.id);
    }
    Ok(())
}

/// Existing-row id carried by `fields`, if it is a `<relation>-<id>` token.
///
/// Any other token shape is treated as a new row. That keeps malformed
/// submissions working but can hide a client bug, so it is logged.
fn existing_child_id(fields: &FieldMap, relation: &str) -> Option<ChildId> {
    let token = fields.get("id")?;
    let parsed = token
        .as_str()
        .and_then(|token| parse_existing_id(token, relation));
    if parsed.is_none() && !token.is_null() {
        warn!(
            "event=repeater_token_ignored module=repeater status=degraded relation={} token={}",
            relation, token
        );
    }
    parsed
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn log_sync(
    mode: &str,
    relation: &str,
    scope: &OwnerScope,
    report: &SyncReport,
    started_at: Instant,
) {
    info!(
        "event=repeater_{} module=repeater status=ok relation={} owner={} created={} updated={} deleted={} duration_ms={}",
        mode,
        relation,
        scope,
        report.created.len(),
        report.updated.len(),
        report.deleted,
        started_at.elapsed().as_millis()
    );
}

#[cfg(test)]
mod tests {
    use super::existing_child_id;
    use crate::model::record::FieldMap;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> FieldMap {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn existing_child_id_accepts_relation_tokens_only() {
        assert_eq!(
            existing_child_id(&fields(json!({"id": "slides-2"})), "slides"),
            Some(2)
        );
        assert_eq!(existing_child_id(&fields(json!({"title": "x"})), "slides"), None);
        assert_eq!(
            existing_child_id(&fields(json!({"id": "cards-2"})), "slides"),
            None
        );
        assert_eq!(existing_child_id(&fields(json!({"id": 2})), "slides"), None);
        assert_eq!(existing_child_id(&fields(json!({"id": null})), "slides"), None);
    }
}
