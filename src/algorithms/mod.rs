pub mod matrix;
pub mod ranking;
pub mod similarity;

pub use matrix::InteractionMatrix;
pub use ranking::{aggregate_scores, rank_top_n};
pub use similarity::ItemSimilarity;

use crate::models::{Bid, ObjectId, ScoredItem};

pub trait RecommendationAlgorithm: Send + Sync {
    /// Ranks at most `top_n` listings for `user` from the full bid history.
    fn recommend(&self, bids: &[Bid], user: &ObjectId, top_n: usize) -> Vec<ScoredItem<ObjectId>>;
}

/// Item-based collaborative filtering on raw bid counts.
///
/// Builds the bidder×listing count matrix, takes cosine similarity between
/// listing columns, sums the similarity rows of every listing the user bid on
/// and returns the highest scoring listings. Listings the user already bid on
/// are not filtered out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemBasedCollaborativeFiltering;

impl ItemBasedCollaborativeFiltering {
    pub fn new() -> Self {
        Self
    }
}

impl RecommendationAlgorithm for ItemBasedCollaborativeFiltering {
    fn recommend(&self, bids: &[Bid], user: &ObjectId, top_n: usize) -> Vec<ScoredItem<ObjectId>> {
        recommend_items(bids.iter().map(|bid| (bid.bidder, bid.listing)), user, top_n)
    }
}

/// Runs the full pipeline over generic `(user, item)` interactions.
pub fn recommend_items<U, I, T>(interactions: T, user: &U, top_n: usize) -> Vec<ScoredItem<I>>
where
    U: Ord + Clone,
    I: Ord + Clone,
    T: IntoIterator<Item = (U, I)>,
{
    let matrix = InteractionMatrix::from_interactions(interactions);
    if matrix.is_empty() {
        return Vec::new();
    }
    if matrix.user_position(user).is_none() {
        return Vec::new();
    }

    let similarity = ItemSimilarity::from_matrix(&matrix);
    match aggregate_scores(&matrix, &similarity, user) {
        Some(scores) => rank_top_n(matrix.items(), scores.view(), top_n),
        None => Vec::new(),
    }
}
