use std::collections::{BTreeMap, BTreeSet};

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::error::StorageError;

/// A stored row with a surrogate id and, optionally, the id of the row
/// that owns it.
pub trait Row: Clone {
    fn id(&self) -> Uuid;

    /// Owning row, indexed so that [`Table::children_of`] does not scan.
    fn parent_id(&self) -> Option<Uuid> {
        None
    }
}

/// One row written by a committed transaction, as appended to the change
/// log.
#[derive(Debug, Serialize, Deserialize)]
pub struct Change {
    pub table: String,
    pub id: Uuid,
    pub row: serde_json::Value,
}

/// Rows keyed by id with a parent-key index and an undo journal.
///
/// Every write records the prior row in the journal. [`Table::rollback`]
/// restores those rows, [`Table::commit`] forgets them. Serializes as a
/// plain `id -> row` map.
#[derive(Debug, Clone)]
pub struct Table<V> {
    rows: BTreeMap<Uuid, V>,
    by_parent: BTreeMap<Uuid, BTreeSet<Uuid>>,
    journal: Vec<(Uuid, Option<V>)>,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            by_parent: BTreeMap::new(),
            journal: Vec::new(),
        }
    }
}

impl<V: Row> Table<V> {
    pub fn get(&self, id: &Uuid) -> Option<&V> {
        self.rows.get(id)
    }

    /// Mutable access to a row. The parent key must not be changed here;
    /// re-`insert` the row to move it.
    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut V> {
        let prior = self.rows.get(id)?.clone();
        self.journal.push((*id, Some(prior)));
        self.rows.get_mut(id)
    }

    pub fn insert(&mut self, row: V) {
        let id = row.id();
        let prior = self.put(row);
        self.journal.push((id, prior));
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.rows.values()
    }

    /// Rows whose parent is `parent_id`, in id order.
    pub fn children_of(&self, parent_id: Uuid) -> impl Iterator<Item = &V> {
        self.by_parent
            .get(&parent_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.rows.get(id))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn put(&mut self, row: V) -> Option<V> {
        let id = row.id();
        if let Some(parent_id) = row.parent_id() {
            self.by_parent.entry(parent_id).or_default().insert(id);
        }
        let prior = self.rows.insert(id, row);
        if let Some(old_parent) = prior.as_ref().and_then(Row::parent_id)
            && self.rows.get(&id).and_then(Row::parent_id) != Some(old_parent)
        {
            self.unindex(old_parent, id);
        }
        prior
    }

    fn remove(&mut self, id: Uuid) {
        if let Some(parent_id) = self.rows.remove(&id).as_ref().and_then(Row::parent_id) {
            self.unindex(parent_id, id);
        }
    }

    fn unindex(&mut self, parent_id: Uuid, id: Uuid) {
        if let Some(children) = self.by_parent.get_mut(&parent_id) {
            children.remove(&id);
            if children.is_empty() {
                self.by_parent.remove(&parent_id);
            }
        }
    }

    /// Undo every write since the last commit, newest first.
    pub(crate) fn rollback(&mut self) {
        while let Some((id, prior)) = self.journal.pop() {
            match prior {
                Some(row) => {
                    self.put(row);
                }
                None => self.remove(id),
            }
        }
    }

    pub(crate) fn commit(&mut self) {
        self.journal.clear();
    }

    /// Ids written since the last commit, each once.
    pub(crate) fn touched(&self) -> BTreeSet<Uuid> {
        self.journal.iter().map(|(id, _)| *id).collect()
    }
}

impl<V: Row + Serialize> Table<V> {
    pub(crate) fn changes(&self, table: &str, out: &mut Vec<Change>) -> Result<(), StorageError> {
        for id in self.touched() {
            if let Some(row) = self.rows.get(&id) {
                out.push(Change {
                    table: table.to_string(),
                    id,
                    row: serde_json::to_value(row)?,
                });
            }
        }
        Ok(())
    }
}

impl<V: Row + DeserializeOwned> Table<V> {
    /// Replay a logged row without journaling it.
    pub(crate) fn apply(&mut self, change: Change) -> Result<(), StorageError> {
        let row: V = serde_json::from_value(change.row)?;
        self.put(row);
        Ok(())
    }
}

impl<V: Row> FromIterator<V> for Table<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut table = Table::default();
        for row in iter {
            table.put(row);
        }
        table
    }
}

impl<V: Serialize> Serialize for Table<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

impl<'de, V: Row + Deserialize<'de>> Deserialize<'de> for Table<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = BTreeMap::<Uuid, V>::deserialize(deserializer)?;
        Ok(rows.into_values().collect())
    }
}
