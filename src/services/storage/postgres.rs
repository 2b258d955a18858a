//! PostgreSQL-backed [`BidStore`].
//!
//! Expects two tables, read but never written:
//!
//! ```sql
//! CREATE TABLE bids (bidder TEXT NOT NULL, listing TEXT NOT NULL, ...);
//! CREATE TABLE listings (id TEXT PRIMARY KEY, title TEXT, ..., bid_count BIGINT);
//! ```
//!
//! Identifiers are stored as 24-character hex strings.

use super::BidStore;
use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::models::{Bid, Listing, ObjectId};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use tracing::{debug, info, instrument};

const FETCH_BIDS_SQL: &str = "SELECT bidder, listing FROM bids";

const FETCH_LISTINGS_SQL: &str = "SELECT id, title, description, start_price, current_bid, \
     start_time, end_time, seller, image, status, category, condition, bid_count \
     FROM listings WHERE id = ANY($1)";

#[derive(Debug, sqlx::FromRow)]
struct BidRow {
    bidder: String,
    listing: String,
}

impl TryFrom<BidRow> for Bid {
    type Error = Error;

    fn try_from(row: BidRow) -> Result<Self> {
        Ok(Bid {
            bidder: parse_stored_id(&row.bidder, "bids.bidder")?,
            listing: parse_stored_id(&row.listing, "bids.listing")?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: String,
    title: String,
    description: String,
    start_price: f64,
    current_bid: f64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    seller: String,
    image: String,
    status: String,
    category: String,
    condition: String,
    bid_count: i64,
}

impl TryFrom<ListingRow> for Listing {
    type Error = Error;

    fn try_from(row: ListingRow) -> Result<Self> {
        Ok(Listing {
            id: parse_stored_id(&row.id, "listings.id")?,
            title: row.title,
            description: row.description,
            start_price: row.start_price,
            current_bid: row.current_bid,
            start_time: row.start_time,
            end_time: row.end_time,
            seller: parse_stored_id(&row.seller, "listings.seller")?,
            image: row.image,
            status: row.status.parse()?,
            category: row.category,
            condition: row.condition.parse()?,
            bid_count: row.bid_count,
        })
    }
}

/// A malformed id coming out of storage is a data problem, not a bad request.
fn parse_stored_id(value: &str, column: &str) -> Result<ObjectId> {
    ObjectId::from_str(value)
        .map_err(|_| Error::corrupt_record(format!("{} holds invalid ObjectId '{}'", column, value)))
}

#[derive(Clone)]
pub struct PgBidStore {
    pool: PgPool,
}

impl PgBidStore {
    #[instrument(skip(config))]
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        info!("Creating storage connection pool...");
        debug!(
            "Pool config: max={}, min={}, connect_timeout={:?}",
            config.max_connections,
            config.min_connections,
            config.connect_timeout()
        );

        let connect_options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| Error::config(format!("invalid storage url: {}", e)))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout())
            .connect_with(connect_options)
            .await?;

        let store = Self { pool };
        store.health_check().await?;

        info!(
            "Storage connection pool created (size: {}, idle: {})",
            store.pool.size(),
            store.pool.num_idle()
        );
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BidStore for PgBidStore {
    async fn fetch_bids(&self) -> Result<Vec<Bid>> {
        let mut rows = sqlx::query_as::<_, BidRow>(FETCH_BIDS_SQL).fetch(&self.pool);

        let mut bids = Vec::new();
        while let Some(row) = rows.try_next().await? {
            bids.push(Bid::try_from(row)?);
        }

        debug!("Fetched {} bids", bids.len());
        Ok(bids)
    }

    async fn fetch_listings(&self, ids: &[ObjectId]) -> Result<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let hex_ids: Vec<String> = ids.iter().map(ObjectId::to_hex).collect();
        let rows = sqlx::query_as::<_, ListingRow>(FETCH_LISTINGS_SQL)
            .bind(hex_ids)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Listing::try_from).collect()
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        info!("Closing storage connection pool...");
        self.pool.close().await;
        info!("Storage connection pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_row_conversion() {
        let row = BidRow {
            bidder: "65a1b2c3d4e5f60718293a4b".to_string(),
            listing: "65a1b2c3d4e5f60718293a4c".to_string(),
        };
        let bid = Bid::try_from(row).unwrap();
        assert_eq!(bid.listing.to_string(), "65a1b2c3d4e5f60718293a4c");
    }

    #[test]
    fn test_corrupt_bid_row_is_server_error() {
        let row = BidRow {
            bidder: "not-hex".to_string(),
            listing: "65a1b2c3d4e5f60718293a4c".to_string(),
        };
        let err = Bid::try_from(row).unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { .. }));
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("bids.bidder"));
    }

    #[tokio::test]
    async fn test_fetch_bids_against_database() {
        // Requires a running database; skipped otherwise.
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };

        let pool = PgPool::connect(&url).await.unwrap();
        let store = PgBidStore::from_pool(pool);
        assert!(store.health_check().await.is_ok());
        assert!(store.fetch_listings(&[]).await.unwrap().is_empty());
        store.close().await;
    }
}
