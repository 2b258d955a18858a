use crate::algorithms::{ItemBasedCollaborativeFiltering, RecommendationAlgorithm};
use crate::config::Config;
use crate::error::Result;
use crate::models::{Listing, ObjectId, ScoredItem};
use crate::services::storage::BidStore;
use crate::utils::elapsed_ms;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Recomputes recommendations from the full bid history on every call.
pub struct RecommendationService {
    store: Arc<dyn BidStore>,
    algorithm: Arc<dyn RecommendationAlgorithm>,
    config: Arc<Config>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn BidStore>, config: Arc<Config>) -> Self {
        Self::with_algorithm(store, Arc::new(ItemBasedCollaborativeFiltering::new()), config)
    }

    pub fn with_algorithm(
        store: Arc<dyn BidStore>,
        algorithm: Arc<dyn RecommendationAlgorithm>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            algorithm,
            config,
        }
    }

    pub fn top_n(&self) -> usize {
        self.config.recommendation.top_n
    }

    pub async fn get_scored_recommendations(&self, user_id: &ObjectId) -> Result<Vec<ScoredItem<ObjectId>>> {
        let start_time = Instant::now();

        let bids = self.store.fetch_bids().await?;
        let ranked = self.algorithm.recommend(&bids, user_id, self.top_n());

        debug!(
            "Ranked {} listings for user {} from {} bids in {}ms",
            ranked.len(),
            user_id,
            bids.len(),
            elapsed_ms(start_time)
        );
        Ok(ranked)
    }

    /// Listing identifiers, best first, as hex strings.
    pub async fn get_recommendations(&self, user_id: &ObjectId) -> Result<Vec<String>> {
        let ranked = self.get_scored_recommendations(user_id).await?;
        Ok(ranked.into_iter().map(|scored| scored.item.to_string()).collect())
    }

    /// Full listing documents for the recommended ids, in rank order.
    pub async fn get_recommended_listings(&self, user_id: &ObjectId) -> Result<Vec<Listing>> {
        let ids: Vec<ObjectId> = self
            .get_scored_recommendations(user_id)
            .await?
            .into_iter()
            .map(|scored| scored.item)
            .collect();

        let mut by_id: HashMap<ObjectId, Listing> = self
            .store
            .fetch_listings(&ids)
            .await?
            .into_iter()
            .map(|listing| (listing.id, listing))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    pub async fn health_check(&self) -> Result<()> {
        self.store.health_check().await
    }
}
