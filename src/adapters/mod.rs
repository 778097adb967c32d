// Adapters layer: concrete implementations of the domain ports and the HTTP surface.

pub mod db;
pub mod http;
pub mod mail;
pub mod memory;

use crate::config::DatabaseConfig;
use crate::domain::ports::{ParticipantStore, WinnerStore};
use crate::utils::error::Result;
use std::sync::Arc;

pub type Stores = (Arc<dyn ParticipantStore>, Arc<dyn WinnerStore>);

/// Opens the configured backend: the in-memory store for `memory`, sea-orm otherwise.
pub async fn open_stores(config: &DatabaseConfig) -> Result<Stores> {
    if config.is_memory() {
        tracing::warn!("⚠️ Using the in-memory store, data is lost on exit");
        let store = Arc::new(memory::InMemoryStore::new());
        return Ok((store.clone(), store));
    }

    let store = Arc::new(db::SeaOrmStore::new(db::connect(config).await?));
    Ok((store.clone(), store))
}
