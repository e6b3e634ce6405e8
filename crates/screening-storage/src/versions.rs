use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use screening_core::models::definition::{Definition, VersionRecord};
use screening_core::models::flow::FlowAttributes;
use screening_core::models::screening::ScreeningAttributes;

use crate::error::StorageError;
use crate::table::{Change, Row, Table};

impl<A: Clone> Row for Definition<A> {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl<P: Clone> Row for VersionRecord<P> {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.definition_id)
    }
}

/// Names used in errors for a kind of versioned definition.
pub trait DefinitionKind {
    const ENTITY: &'static str;
    const VERSION_ENTITY: &'static str;
}

impl DefinitionKind for FlowAttributes {
    const ENTITY: &'static str = "flow";
    const VERSION_ENTITY: &'static str = "flow version";
}

impl DefinitionKind for ScreeningAttributes {
    const ENTITY: &'static str = "screening";
    const VERSION_ENTITY: &'static str = "screening version";
}

/// Append-only version log with one active-version pointer per definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "A: Serialize, P: Serialize",
    deserialize = "A: Clone + DeserializeOwned, P: Clone + DeserializeOwned"
))]
pub struct VersionLog<A, P> {
    definitions: Table<Definition<A>>,
    versions: Table<VersionRecord<P>>,
}

impl<A, P> Default for VersionLog<A, P> {
    fn default() -> Self {
        Self {
            definitions: Table::default(),
            versions: Table::default(),
        }
    }
}

impl<A: DefinitionKind + Clone, P: Clone> VersionLog<A, P> {
    pub fn create_definition(&mut self, name: &str, attributes: A) -> Definition<A> {
        let now = jiff::Timestamp::now();
        let definition = Definition {
            id: Uuid::new_v4(),
            name: name.to_string(),
            active_version_id: None,
            attributes,
            created_at: now,
            updated_at: now,
        };
        self.definitions.insert(definition.clone());
        definition
    }

    pub fn definition(&self, id: Uuid) -> Result<&Definition<A>, StorageError> {
        self.definitions
            .get(&id)
            .ok_or_else(|| StorageError::not_found(A::ENTITY, id))
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Definition<A>> {
        self.definitions.values()
    }

    /// Append a version numbered one past the highest existing number.
    pub fn create_version(
        &mut self,
        definition_id: Uuid,
        payload: P,
    ) -> Result<VersionRecord<P>, StorageError> {
        self.definition(definition_id)?;
        let version_number = self
            .versions
            .children_of(definition_id)
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
            + 1;
        let version = VersionRecord {
            id: Uuid::new_v4(),
            definition_id,
            version_number,
            payload,
            created_at: jiff::Timestamp::now(),
        };
        self.versions.insert(version.clone());
        Ok(version)
    }

    pub fn version(&self, version_id: Uuid) -> Result<&VersionRecord<P>, StorageError> {
        self.versions
            .get(&version_id)
            .ok_or_else(|| StorageError::not_found(A::VERSION_ENTITY, version_id))
    }

    /// All versions of a definition in version-number order.
    pub fn versions_of(&self, definition_id: Uuid) -> Result<Vec<&VersionRecord<P>>, StorageError> {
        self.definition(definition_id)?;
        let mut versions: Vec<_> = self.versions.children_of(definition_id).collect();
        versions.sort_by_key(|v| v.version_number);
        Ok(versions)
    }

    /// Point the definition at `version_id`.
    ///
    /// A version belonging to another definition is reported as not found.
    pub fn publish(
        &mut self,
        definition_id: Uuid,
        version_id: Uuid,
    ) -> Result<VersionRecord<P>, StorageError> {
        let version = self
            .versions
            .get(&version_id)
            .filter(|v| v.definition_id == definition_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(A::VERSION_ENTITY, version_id))?;
        let definition = self
            .definitions
            .get_mut(&definition_id)
            .ok_or_else(|| StorageError::not_found(A::ENTITY, definition_id))?;
        definition.active_version_id = Some(version_id);
        definition.updated_at = jiff::Timestamp::now();
        Ok(version)
    }

    pub fn active_version(&self, definition_id: Uuid) -> Result<&VersionRecord<P>, StorageError> {
        let definition = self.definition(definition_id)?;
        let version_id = definition
            .active_version_id
            .ok_or_else(|| StorageError::not_found("active version", definition_id))?;
        self.version(version_id)
    }
}

impl<A: Clone, P: Clone> VersionLog<A, P> {
    pub(crate) fn rollback(&mut self) {
        self.definitions.rollback();
        self.versions.rollback();
    }

    pub(crate) fn commit(&mut self) {
        self.definitions.commit();
        self.versions.commit();
    }
}

impl<A: Clone + Serialize + DeserializeOwned, P: Clone + Serialize + DeserializeOwned> VersionLog<A, P> {
    pub(crate) fn changes(&self, name: &str, out: &mut Vec<Change>) -> Result<(), StorageError> {
        self.definitions.changes(&format!("{name}.definitions"), out)?;
        self.versions.changes(&format!("{name}.versions"), out)
    }

    /// Replay a logged row. `part` is the suffix after the log name.
    pub(crate) fn apply(&mut self, part: &str, change: Change) -> Result<(), StorageError> {
        match part {
            "definitions" => self.definitions.apply(change),
            "versions" => self.versions.apply(change),
            other => Err(StorageError::UnknownTable(other.to_string())),
        }
    }
}
