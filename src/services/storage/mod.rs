pub mod postgres;

pub use postgres::PgBidStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use crate::models::{Bid, Listing, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Read access to the bids and listings collections.
#[async_trait::async_trait]
pub trait BidStore: Send + Sync {
    /// Every bid on record, in one bulk read.
    async fn fetch_bids(&self) -> Result<Vec<Bid>>;

    /// Listings whose id is in `ids`, in no particular order. Unknown ids are skipped.
    async fn fetch_listings(&self, ids: &[ObjectId]) -> Result<Vec<Listing>>;

    async fn health_check(&self) -> Result<()>;

    async fn close(&self) {}
}

pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn BidStore>> {
    match config.backend {
        StorageBackend::Postgres => Ok(Arc::new(PgBidStore::connect(config).await?)),
        StorageBackend::Memory => {
            let store = match &config.seed_file {
                Some(path) => InMemoryBidStore::from_seed_file(path).await?,
                None => InMemoryBidStore::new(),
            };
            Ok(Arc::new(store))
        }
    }
}

/// Contents of a seed file for [`InMemoryBidStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub bids: Vec<Bid>,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

#[derive(Default)]
pub struct InMemoryBidStore {
    bids: RwLock<Vec<Bid>>,
    listings: RwLock<HashMap<ObjectId, Listing>>,
}

impl InMemoryBidStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(seed: SeedData) -> Self {
        let listings = seed
            .listings
            .into_iter()
            .map(|listing| (listing.id, listing))
            .collect();

        Self {
            bids: RwLock::new(seed.bids),
            listings: RwLock::new(listings),
        }
    }

    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await?;
        let seed: SeedData = serde_json::from_slice(&raw)?;

        info!(
            "Loaded {} bids and {} listings from {}",
            seed.bids.len(),
            seed.listings.len(),
            path.display()
        );
        Ok(Self::with_data(seed))
    }

    pub async fn insert_bid(&self, bid: Bid) {
        self.bids.write().await.push(bid);
    }

    pub async fn insert_listing(&self, listing: Listing) {
        self.listings.write().await.insert(listing.id, listing);
    }
}

#[async_trait::async_trait]
impl BidStore for InMemoryBidStore {
    async fn fetch_bids(&self) -> Result<Vec<Bid>> {
        Ok(self.bids.read().await.clone())
    }

    async fn fetch_listings(&self, ids: &[ObjectId]) -> Result<Vec<Listing>> {
        let listings = self.listings.read().await;
        Ok(ids.iter().filter_map(|id| listings.get(id).cloned()).collect())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SEED: &str = r#"{
        "bids": [
            {"bidder": "000000000000000000000001", "listing": "0000000000000000000000a1"},
            {"bidder": "000000000000000000000002", "listing": "0000000000000000000000a1"}
        ],
        "listings": [{
            "id": "0000000000000000000000a1",
            "title": "Vintage camera",
            "description": "Rangefinder, working shutter",
            "startPrice": 40.0,
            "currentBid": 55.0,
            "startTime": "2024-03-01T10:00:00Z",
            "endTime": "2024-03-08T10:00:00Z",
            "seller": "0000000000000000000000ff",
            "image": "camera.jpg",
            "status": "active",
            "category": "electronics",
            "condition": "good",
            "bidCount": 2
        }]
    }"#;

    #[tokio::test]
    async fn test_seed_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let store = InMemoryBidStore::from_seed_file(file.path()).await.unwrap();
        assert_eq!(store.fetch_bids().await.unwrap().len(), 2);

        let id: ObjectId = "0000000000000000000000a1".parse().unwrap();
        let missing: ObjectId = "0000000000000000000000a2".parse().unwrap();
        let listings = store.fetch_listings(&[missing, id]).await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "Vintage camera");
    }

    #[tokio::test]
    async fn test_missing_seed_file_is_an_error() {
        let result = InMemoryBidStore::from_seed_file("/nonexistent/bids.json").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_insert_bid() {
        let store = InMemoryBidStore::new();
        assert!(store.fetch_bids().await.unwrap().is_empty());

        let bid = Bid::new(ObjectId::from_bytes([1; 12]), ObjectId::from_bytes([2; 12]));
        store.insert_bid(bid).await;
        assert_eq!(store.fetch_bids().await.unwrap(), vec![bid]);
        assert!(store.health_check().await.is_ok());
    }
}
