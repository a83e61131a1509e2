use super::controller::ThingForm;
use crate::client::ThingApi;
use crate::config::ValidatorConfig;
use crate::core::ClientResult;
use crate::model::Thing;
use std::sync::Arc;
use tracing::info;

/// The Thing list screen: the last fetched rows plus add/edit/remove actions.
pub struct ThingList {
    api: Arc<dyn ThingApi>,
    config: ValidatorConfig,
    things: Vec<Thing>,
}

impl ThingList {
    pub fn new(api: Arc<dyn ThingApi>, config: ValidatorConfig) -> Self {
        Self {
            api,
            config,
            things: Vec::new(),
        }
    }

    pub fn things(&self) -> &[Thing] {
        &self.things
    }

    pub async fn refresh(&mut self) -> ClientResult<()> {
        self.things = self.api.get_things().await?;
        Ok(())
    }

    /// Form for a new, unsaved Thing.
    pub fn add(&self) -> ThingForm {
        ThingForm::open(Thing::default(), Arc::clone(&self.api), &self.config)
    }

    pub fn edit(&self, thing: &Thing) -> ThingForm {
        ThingForm::open(thing.clone(), Arc::clone(&self.api), &self.config)
    }

    /// Called with the Thing a form just saved.
    pub async fn saved(&mut self, thing: &Thing) -> ClientResult<()> {
        info!(id = thing.id, name = %thing.name, "thing saved");
        self.refresh().await
    }

    /// Removes `thing`; refreshes only when something was actually removed.
    pub async fn remove(&mut self, thing: &Thing) -> ClientResult<u64> {
        let removed = self.api.remove(thing.id).await?;
        if removed > 0 {
            info!(id = thing.id, name = %thing.name, "thing removed");
            self.refresh().await?;
        }
        Ok(removed)
    }
}
