use crate::models::{Bid, ObjectId};
use ndarray::{Array2, ArrayView1, ArrayView2};
use std::collections::{BTreeMap, BTreeSet};

/// Dense user×item table of interaction counts.
///
/// Rows and columns are sorted by identifier, so column index order is
/// item identifier order.
#[derive(Debug, Clone)]
pub struct InteractionMatrix<U, I> {
    users: Vec<U>,
    items: Vec<I>,
    user_index: BTreeMap<U, usize>,
    item_index: BTreeMap<I, usize>,
    counts: Array2<f64>,
}

impl<U, I> InteractionMatrix<U, I>
where
    U: Ord + Clone,
    I: Ord + Clone,
{
    /// Tabulates `(user, item)` pairs; a repeated pair increments its cell.
    pub fn from_interactions<T>(interactions: T) -> Self
    where
        T: IntoIterator<Item = (U, I)>,
    {
        let interactions: Vec<(U, I)> = interactions.into_iter().collect();

        let users: Vec<U> = interactions
            .iter()
            .map(|(u, _)| u.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let items: Vec<I> = interactions
            .iter()
            .map(|(_, i)| i.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let user_index: BTreeMap<U, usize> = users
            .iter()
            .enumerate()
            .map(|(idx, u)| (u.clone(), idx))
            .collect();
        let item_index: BTreeMap<I, usize> = items
            .iter()
            .enumerate()
            .map(|(idx, i)| (i.clone(), idx))
            .collect();

        let mut counts = Array2::<f64>::zeros((users.len(), items.len()));
        for (user, item) in &interactions {
            let row = user_index[user];
            let col = item_index[item];
            counts[[row, col]] += 1.0;
        }

        Self {
            users,
            items,
            user_index,
            item_index,
            counts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn users(&self) -> &[U] {
        &self.users
    }

    pub fn items(&self) -> &[I] {
        &self.items
    }

    pub fn counts(&self) -> ArrayView2<'_, f64> {
        self.counts.view()
    }

    pub fn user_position(&self, user: &U) -> Option<usize> {
        self.user_index.get(user).copied()
    }

    pub fn item_position(&self, item: &I) -> Option<usize> {
        self.item_index.get(item).copied()
    }

    pub fn user_row(&self, user: &U) -> Option<ArrayView1<'_, f64>> {
        self.user_position(user).map(|row| self.counts.row(row))
    }

    pub fn item_column(&self, item: &I) -> Option<ArrayView1<'_, f64>> {
        self.item_position(item).map(|col| self.counts.column(col))
    }

    pub fn count(&self, user: &U, item: &I) -> f64 {
        match (self.user_position(user), self.item_position(item)) {
            (Some(row), Some(col)) => self.counts[[row, col]],
            _ => 0.0,
        }
    }

    /// Column indices of the items `user` interacted with at least once.
    pub fn interacted_items(&self, user: &U) -> Option<Vec<usize>> {
        self.user_row(user).map(|row| {
            row.iter()
                .enumerate()
                .filter(|&(_, &count)| count > 0.0)
                .map(|(col, _)| col)
                .collect()
        })
    }
}

impl InteractionMatrix<ObjectId, ObjectId> {
    pub fn from_bids(bids: &[Bid]) -> Self {
        Self::from_interactions(bids.iter().map(|bid| (bid.bidder, bid.listing)))
    }
}
