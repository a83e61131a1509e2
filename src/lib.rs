// ============================================================================
// Thingbook Library
// ============================================================================

pub mod client;
pub mod config;
pub mod core;
pub mod form;
pub mod model;
pub mod service;
pub mod storage;
pub mod web;

// Re-export main types for convenience
pub use client::{HttpThingClient, LocalThingClient, ThingApi};
pub use config::{ServerConfig, ValidatorConfig};
pub use core::{ClientError, ClientResult, Result, ServiceError, SubmitError};
pub use form::{AsyncFieldValidator, FieldVerdict, ThingForm, ThingList};
pub use model::Thing;
pub use service::ThingService;
pub use storage::{FileThingStore, InMemoryThingStore, ThingStore};
pub use web::{AppState, build_router};

use std::sync::Arc;

// ============================================================================
// Wiring
// ============================================================================

/// Opens the store selected by `config`: the snapshot file when one is
/// configured, otherwise a fresh in-memory table.
///
/// # Examples
///
/// ```
/// use thingbook::{ServerConfig, ThingService, open_store};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let store = open_store(&ServerConfig::default()).await?;
/// let service = Arc::new(ThingService::new(store));
/// # let _ = service;
/// # Ok::<(), thingbook::ServiceError>(())
/// # }).unwrap();
/// ```
pub async fn open_store(config: &ServerConfig) -> Result<Arc<dyn ThingStore>> {
    match &config.data_file {
        Some(path) => Ok(Arc::new(FileThingStore::open(path).await?)),
        None => Ok(Arc::new(InMemoryThingStore::new())),
    }
}

/// Router over a service, with CORS when the config asks for it.
pub fn app(service: Arc<ThingService>, config: &ServerConfig) -> axum::Router {
    let router = build_router(AppState::new(service));
    if config.cors {
        router.layer(web::cors_layer())
    } else {
        router
    }
}
