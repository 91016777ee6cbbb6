//! Child repository registry keyed by relation name.

use crate::repo::child_repo::ChildRepository;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Registration/lookup errors. All of them are configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidRelation(String),
    DuplicateRelation(String),
    UnknownRelation(String),
    ModelMismatch {
        relation: String,
        expected: String,
        actual: String,
    },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRelation(value) => write!(f, "relation name is invalid: `{value}`"),
            Self::DuplicateRelation(value) => {
                write!(f, "relation already has a child repository: {value}")
            }
            Self::UnknownRelation(value) => {
                write!(f, "no child repository registered for relation: {value}")
            }
            Self::ModelMismatch {
                relation,
                expected,
                actual,
            } => write!(
                f,
                "relation {relation} expects model {expected}, repository serves {actual}"
            ),
        }
    }
}

impl Error for RegistryError {}

/// Explicit relation -> child repository mapping.
#[derive(Default)]
pub struct ChildRepositoryRegistry<'a> {
    repositories: BTreeMap<String, Box<dyn ChildRepository + 'a>>,
}

impl<'a> ChildRepositoryRegistry<'a> {
    pub fn new() -> Self {
        Self {
            repositories: BTreeMap::new(),
        }
    }

    /// Registers the repository serving `relation`.
    pub fn register(
        &mut self,
        relation: &str,
        repository: impl ChildRepository + 'a,
    ) -> Result<(), RegistryError> {
        let relation = relation.trim();
        if relation.is_empty() || relation.contains(['[', ']']) {
            return Err(RegistryError::InvalidRelation(relation.to_string()));
        }
        if self.repositories.contains_key(relation) {
            return Err(RegistryError::DuplicateRelation(relation.to_string()));
        }
        self.repositories
            .insert(relation.to_string(), Box::new(repository));
        Ok(())
    }

    /// Builder form of [`Self::register`].
    pub fn with(
        mut self,
        relation: &str,
        repository: impl ChildRepository + 'a,
    ) -> Result<Self, RegistryError> {
        self.register(relation, repository)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Returns sorted relation names.
    pub fn relations(&self) -> Vec<String> {
        self.repositories.keys().cloned().collect()
    }

    /// Looks up the repository for `relation` by exact key.
    ///
    /// When `model` is given it must match the repository's model.
    pub fn resolve(
        &self,
        relation: &str,
        model: Option<&str>,
    ) -> Result<&(dyn ChildRepository + 'a), RegistryError> {
        let repository = self
            .repositories
            .get(relation)
            .ok_or_else(|| RegistryError::UnknownRelation(relation.to_string()))?;

        if let Some(model) = model {
            if repository.model() != model {
                return Err(RegistryError::ModelMismatch {
                    relation: relation.to_string(),
                    expected: model.to_string(),
                    actual: repository.model().to_string(),
                });
            }
        }
        Ok(&**repository)
    }
}
