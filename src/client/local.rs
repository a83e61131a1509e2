use super::ThingApi;
use crate::core::{ClientError, ClientResult, ServiceError};
use crate::model::Thing;
use crate::service::ThingService;
use async_trait::async_trait;
use std::sync::Arc;

/// [`ThingApi`] backed by an in-process service, for embedding and tests.
#[derive(Clone)]
pub struct LocalThingClient {
    service: Arc<ThingService>,
}

impl LocalThingClient {
    pub fn new(service: Arc<ThingService>) -> Self {
        Self { service }
    }
}

impl From<ServiceError> for ClientError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(message) => ClientError::Rejected(message),
            ServiceError::Storage(message) => ClientError::Server {
                status: 500,
                message,
            },
        }
    }
}

#[async_trait]
impl ThingApi for LocalThingClient {
    async fn get_things(&self) -> ClientResult<Vec<Thing>> {
        Ok(self.service.get_things().await?)
    }

    async fn get_thing(&self, id: i32) -> ClientResult<Option<Thing>> {
        Ok(self.service.get_thing(id).await?)
    }

    async fn check_name_unique(&self, thing: &Thing) -> ClientResult<bool> {
        Ok(self.service.validate_name(thing).await?)
    }

    async fn check_valid(&self, thing: &Thing) -> ClientResult<bool> {
        Ok(self.service.validate(thing).await?)
    }

    async fn persist(&self, thing: &Thing) -> ClientResult<Option<Thing>> {
        Ok(self.service.save(thing.clone()).await?)
    }

    async fn remove(&self, id: i32) -> ClientResult<u64> {
        Ok(self.service.remove(id).await?)
    }
}
