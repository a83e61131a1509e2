//! Persistence collaborators for the Thing table.
//!
//! Stores only move rows. They enforce no uniqueness on `name`; that invariant
//! belongs to the revalidation gate in [`crate::service`].

pub mod memory;
pub mod persistence;

use crate::core::Result;
use crate::model::Thing;
use async_trait::async_trait;

pub use memory::{InMemoryThingStore, ThingTable};
pub use persistence::{FileThingStore, SnapshotManager, TableSnapshot};

#[async_trait]
pub trait ThingStore: Send + Sync {
    /// All rows ordered by id.
    async fn all(&self) -> Result<Vec<Thing>>;

    async fn get(&self, id: i32) -> Result<Option<Thing>>;

    /// True if a row other than `except_id` carries `name` (case-insensitive).
    async fn name_taken(&self, name: &str, except_id: i32) -> Result<bool>;

    /// Inserts with a freshly assigned id and returns the stored row.
    async fn insert(&self, thing: Thing) -> Result<Thing>;

    /// Overwrites the row with `thing.id`. Returns the number of rows affected.
    async fn update(&self, thing: &Thing) -> Result<u64>;

    /// Returns the number of rows removed; an absent id removes nothing.
    async fn delete(&self, id: i32) -> Result<u64>;
}
