use super::ThingStore;
use crate::core::{Result, ServiceError};
use crate::model::Thing;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Rows keyed by id plus the id sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThingTable {
    rows: BTreeMap<i32, Thing>,
    last_id: i32,
}

impl ThingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(rows: impl IntoIterator<Item = Thing>, last_id: i32) -> Self {
        let rows: BTreeMap<i32, Thing> = rows.into_iter().map(|t| (t.id, t)).collect();
        // never hand out an id that is already in use, even if the stored sequence lags
        let max_id = rows.keys().next_back().copied().unwrap_or(0);
        Self {
            rows,
            last_id: last_id.max(max_id),
        }
    }

    pub fn last_id(&self) -> i32 {
        self.last_id
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Thing> {
        self.rows.values()
    }

    pub fn get(&self, id: i32) -> Option<&Thing> {
        self.rows.get(&id)
    }

    pub fn name_taken(&self, name: &str, except_id: i32) -> bool {
        let probe = Thing {
            id: except_id,
            name: name.to_string(),
            description: String::new(),
        };
        self.rows.values().any(|row| probe.collides_with(row))
    }

    /// Assigns the next id and stores the row. Fails once the sequence is
    /// exhausted rather than wrapping into ids that read as unsaved.
    pub fn insert(&mut self, mut thing: Thing) -> Result<Thing> {
        let id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| ServiceError::storage("Thing id sequence exhausted"))?;
        self.last_id = id;
        thing.id = id;
        self.rows.insert(id, thing.clone());
        Ok(thing)
    }

    pub fn update(&mut self, thing: &Thing) -> u64 {
        match self.rows.get_mut(&thing.id) {
            Some(row) => {
                *row = thing.clone();
                1
            }
            None => 0,
        }
    }

    pub fn delete(&mut self, id: i32) -> u64 {
        u64::from(self.rows.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryThingStore {
    table: RwLock<ThingTable>,
}

impl InMemoryThingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with `things`, keeping their ids.
    pub fn with_rows(things: impl IntoIterator<Item = Thing>) -> Self {
        Self {
            table: RwLock::new(ThingTable::from_parts(things, 0)),
        }
    }
}

#[async_trait]
impl ThingStore for InMemoryThingStore {
    async fn all(&self) -> Result<Vec<Thing>> {
        Ok(self.table.read().await.rows().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Thing>> {
        Ok(self.table.read().await.get(id).cloned())
    }

    async fn name_taken(&self, name: &str, except_id: i32) -> Result<bool> {
        Ok(self.table.read().await.name_taken(name, except_id))
    }

    async fn insert(&self, thing: Thing) -> Result<Thing> {
        self.table.write().await.insert(thing)
    }

    async fn update(&self, thing: &Thing) -> Result<u64> {
        Ok(self.table.write().await.update(thing))
    }

    async fn delete(&self, id: i32) -> Result<u64> {
        Ok(self.table.write().await.delete(id))
    }
}
