pub mod algorithms;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::models::*;

use services::recommendation::RecommendationService;
use services::storage::BidStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BidStore>,
    pub recommendation_service: Arc<RecommendationService>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let store = services::storage::connect(&config.storage).await?;
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn BidStore>) -> Self {
        let recommendation_service = Arc::new(RecommendationService::new(store.clone(), Arc::new(config)));

        Self {
            store,
            recommendation_service,
        }
    }

    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}

/// `RUST_LOG` wins over `default_level` when set.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::storage::InMemoryBidStore;

    #[tokio::test]
    async fn test_state_reads_through_shared_store() {
        let store = Arc::new(InMemoryBidStore::new());
        let state = AppState::with_store(Config::default(), store.clone());

        let user = ObjectId::from_bytes([1; 12]);
        let listing = ObjectId::from_bytes([2; 12]);
        store.insert_bid(Bid::new(user, listing)).await;

        let recommendations = state
            .recommendation_service
            .get_recommendations(&user)
            .await
            .unwrap();
        assert_eq!(recommendations, vec![listing.to_hex()]);
        assert!(state.store.health_check().await.is_ok());
    }
}
