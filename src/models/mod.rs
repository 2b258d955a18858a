use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 12-byte document identifier, written as 24 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| Error::InvalidObjectId {
            input: s.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single bid. Only who bid on what matters to the recommender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub bidder: ObjectId,
    pub listing: ObjectId,
}

impl Bid {
    pub fn new(bidder: ObjectId, listing: ObjectId) -> Self {
        Self { bidder, listing }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingStatus {
    Pending,
    Active,
    Ended,
    Completed,
    Rejected,
}

impl FromStr for ListingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "ended" => Ok(Self::Ended),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::corrupt_record(format!("unknown listing status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemCondition {
    New,
    LikeNew,
    Good,
    Fair,
    Poor,
}

impl FromStr for ItemCondition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "like-new" => Ok(Self::LikeNew),
            "good" => Ok(Self::Good),
            "fair" => Ok(Self::Fair),
            "poor" => Ok(Self::Poor),
            other => Err(Error::corrupt_record(format!("unknown item condition '{}'", other))),
        }
    }
}

/// An auction listing as stored in the listings collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub start_price: f64,
    pub current_bid: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub seller: ObjectId,
    pub image: String,
    pub status: ListingStatus,
    pub category: String,
    pub condition: ItemCondition,
    #[serde(default)]
    pub bid_count: i64,
}

/// An item paired with its aggregated similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem<I> {
    pub item: I,
    pub score: f64,
}

impl<I> ScoredItem<I> {
    pub fn new(item: I, score: f64) -> Self {
        Self { item, score }
    }
}
