use super::matrix::InteractionMatrix;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// Symmetric item×item cosine similarity over the item columns of an
/// [`InteractionMatrix`].
///
/// An item with at least one interaction has similarity exactly 1.0 with
/// itself; an item vector of zero norm is 0.0 against everything.
///
/// The table is dense: it holds `n_items²` `f64` values and is rebuilt for
/// every request, so memory grows quadratically with the number of distinct
/// listings in the bid history (about 800 MB at 10k listings).
#[derive(Debug, Clone)]
pub struct ItemSimilarity {
    values: Array2<f64>,
}

impl ItemSimilarity {
    pub fn from_matrix<U, I>(matrix: &InteractionMatrix<U, I>) -> Self
    where
        U: Ord + Clone,
        I: Ord + Clone,
    {
        let counts = matrix.counts();
        let norms = counts.map_axis(Axis(0), |column| column.dot(&column).sqrt());
        let mut values = counts.t().dot(&counts);

        let n = norms.len();
        for i in 0..n {
            values[[i, i]] = if norms[i] > 0.0 { 1.0 } else { 0.0 };
            for j in (i + 1)..n {
                let denominator = norms[i] * norms[j];
                let similarity = if denominator > 0.0 {
                    (values[[i, j]] / denominator).min(1.0)
                } else {
                    0.0
                };
                // sim(i, j) and sim(j, i) must be bit-identical for ties to rank by id.
                values[[i, j]] = similarity;
                values[[j, i]] = similarity;
            }
        }

        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }
}
