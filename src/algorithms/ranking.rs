use super::matrix::InteractionMatrix;
use super::similarity::ItemSimilarity;
use crate::models::ScoredItem;
use ndarray::{Array1, ArrayView1};

/// Sums the similarity rows of every item `user` interacted with.
///
/// Returns `None` when the user has no row in the matrix.
pub fn aggregate_scores<U, I>(
    matrix: &InteractionMatrix<U, I>,
    similarity: &ItemSimilarity,
    user: &U,
) -> Option<Array1<f64>>
where
    U: Ord + Clone,
    I: Ord + Clone,
{
    let interacted = matrix.interacted_items(user)?;

    let mut scores = Array1::<f64>::zeros(matrix.n_items());
    for item in interacted {
        scores += &similarity.row(item);
    }

    Some(scores)
}

/// Orders items by score descending, ties by item ascending, and keeps the first `n`.
pub fn rank_top_n<I>(items: &[I], scores: ArrayView1<'_, f64>, n: usize) -> Vec<ScoredItem<I>>
where
    I: Ord + Clone,
{
    let mut ranked: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| items[a.0].cmp(&items[b.0])));

    ranked
        .into_iter()
        .take(n)
        .map(|(idx, score)| ScoredItem::new(items[idx].clone(), score))
        .collect()
}
