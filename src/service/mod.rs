//! Server-side Thing operations and the write-time revalidation gate.
//!
//! `save` re-runs the full validity check under the write gate, in the same
//! call that performs the write. Whatever the client concluded earlier is
//! ignored: the name set may have changed between its last check and now.

use crate::core::{Result, ServiceError};
use crate::model::Thing;
use crate::storage::ThingStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct ThingService {
    store: Arc<dyn ThingStore>,
    /// Serializes check-then-write across concurrent saves.
    write_gate: Mutex<()>,
}

impl ThingService {
    pub fn new(store: Arc<dyn ThingStore>) -> Self {
        Self {
            store,
            write_gate: Mutex::new(()),
        }
    }

    pub async fn get_things(&self) -> Result<Vec<Thing>> {
        self.store.all().await
    }

    pub async fn get_thing(&self, id: i32) -> Result<Option<Thing>> {
        self.store.get(id).await
    }

    /// True if no other persisted Thing shares `thing.name` case-insensitively.
    /// The Thing's own row is excluded by id.
    pub async fn validate_name(&self, thing: &Thing) -> Result<bool> {
        let taken = self.store.name_taken(&thing.name, thing.id).await?;
        Ok(!taken)
    }

    /// Required name plus uniqueness.
    pub async fn validate(&self, thing: &Thing) -> Result<bool> {
        if thing.name.trim().is_empty() {
            return Ok(false);
        }
        self.validate_name(thing).await
    }

    /// Inserts (`id == 0`) or updates, after revalidating under the write gate.
    ///
    /// Returns `Ok(None)` when the write affected no rows, which happens when
    /// updating an id that no longer exists.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use thingbook::{InMemoryThingStore, ServiceError, Thing, ThingService};
    ///
    /// # tokio_test::block_on(async {
    /// let service = ThingService::new(Arc::new(InMemoryThingStore::new()));
    /// let saved = service.save(Thing::new("Widget", "")).await?.unwrap();
    /// assert!(saved.id > 0);
    ///
    /// let err = service.save(Thing::new("WIDGET", "")).await.unwrap_err();
    /// assert!(matches!(err, ServiceError::Validation(_)));
    /// # Ok::<(), ServiceError>(())
    /// # }).unwrap();
    /// ```
    pub async fn save(&self, thing: Thing) -> Result<Option<Thing>> {
        let _gate = self.write_gate.lock().await;

        if !self.validate(&thing).await? {
            warn!(id = thing.id, name = %thing.name, "save rejected by revalidation");
            return Err(ServiceError::validation(format!(
                "Save: Thing {} - {} is invalid",
                thing.id, thing.name
            )));
        }

        if thing.is_persisted() {
            let affected = self.store.update(&thing).await?;
            if affected == 0 {
                debug!(id = thing.id, "update matched no rows");
                return Ok(None);
            }
            info!(id = thing.id, name = %thing.name, "thing updated");
            Ok(Some(thing))
        } else {
            let stored = self.store.insert(thing).await?;
            info!(id = stored.id, name = %stored.name, "thing inserted");
            Ok(Some(stored))
        }
    }

    /// Removes the Thing with `id`. An absent id is a zero-row no-op.
    pub async fn remove(&self, id: i32) -> Result<u64> {
        let _gate = self.write_gate.lock().await;
        let affected = self.store.delete(id).await?;
        if affected > 0 {
            info!(id, "thing removed");
        } else {
            debug!(id, "remove matched no rows");
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryThingStore;

    fn service_with(rows: Vec<Thing>) -> ThingService {
        ThingService::new(Arc::new(InMemoryThingStore::with_rows(rows)))
    }

    #[tokio::test]
    async fn new_thing_with_fresh_name_is_inserted() {
        let svc = service_with(vec![]);
        let saved = svc.save(Thing::new("Widget", "")).await.unwrap().unwrap();

        assert!(saved.id > 0);
        assert_eq!(saved.name, "Widget");
        assert_eq!(saved.description, "");
        assert_eq!(svc.get_things().await.unwrap(), vec![saved]);
    }

    #[tokio::test]
    async fn colliding_name_is_rejected_without_a_write() {
        let svc = service_with(vec![Thing::new("widget", "").with_id(7)]);

        let err = svc.save(Thing::new("Widget", "")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(svc.get_things().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_keeping_own_name_passes() {
        let svc = service_with(vec![Thing::new("Widget", "").with_id(7)]);

        let updated = Thing::new("Widget", "x").with_id(7);
        assert!(svc.validate_name(&updated).await.unwrap());
        assert_eq!(svc.save(updated.clone()).await.unwrap(), Some(updated.clone()));
        assert_eq!(svc.get_thing(7).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn blank_names_are_invalid() {
        let svc = service_with(vec![]);
        assert!(!svc.validate(&Thing::new("   ", "")).await.unwrap());
        assert!(svc.save(Thing::new("", "")).await.is_err());
    }

    #[tokio::test]
    async fn update_of_missing_row_saves_nothing() {
        let svc = service_with(vec![]);
        let result = svc.save(Thing::new("Ghost", "").with_id(42)).await.unwrap();
        assert_eq!(result, None);
        assert!(svc.get_things().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let svc = service_with(vec![Thing::new("Widget", "").with_id(7)]);
        assert_eq!(svc.remove(7).await.unwrap(), 1);
        assert_eq!(svc.remove(7).await.unwrap(), 0);
        assert_eq!(svc.remove(12345).await.unwrap(), 0);
    }
}
