//! Remote predicate client.
//!
//! [`ThingApi`] is the seam between the form pipeline and the backend: each
//! call is one request/response round trip with no retry and no caching.
//! [`HttpThingClient`] talks to the HTTP surface; [`LocalThingClient`] calls a
//! [`ThingService`](crate::service::ThingService) in-process.

pub mod http;
pub mod local;

use crate::core::ClientResult;
use crate::model::Thing;
use async_trait::async_trait;

pub use http::HttpThingClient;
pub use local::LocalThingClient;

#[async_trait]
pub trait ThingApi: Send + Sync {
    async fn get_things(&self) -> ClientResult<Vec<Thing>>;

    /// `Ok(None)` when no Thing has that id.
    async fn get_thing(&self, id: i32) -> ClientResult<Option<Thing>>;

    /// True if no other persisted Thing shares `thing.name`.
    async fn check_name_unique(&self, thing: &Thing) -> ClientResult<bool>;

    /// Required name plus uniqueness.
    async fn check_valid(&self, thing: &Thing) -> ClientResult<bool>;

    /// Insert or update. `Ok(None)` when the server wrote nothing;
    /// `Err(ClientError::Rejected)` when the server-side gate refused it.
    async fn persist(&self, thing: &Thing) -> ClientResult<Option<Thing>>;

    /// Rows removed: 0 for an absent id, 1 otherwise.
    async fn remove(&self, id: i32) -> ClientResult<u64>;
}
