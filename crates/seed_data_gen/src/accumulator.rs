//! Per-parent running totals.

use crate::generator::{ChildRecord, Delta, ParentId};
use std::collections::BTreeMap;

/// Running total of a child measure per parent id.
///
/// Every known parent id starts at zero, so the final snapshot covers all
/// parents even when a parent never received a child. Totals only grow by
/// exact integer addition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulator {
    totals: BTreeMap<ParentId, i64>,
}

impl Accumulator {
    pub fn new(parent_ids: &[ParentId]) -> Self {
        Self {
            totals: parent_ids.iter().map(|&id| (id, 0)).collect(),
        }
    }

    /// Rebuild totals from a recorded child list.
    pub fn tally<C: ChildRecord>(parent_ids: &[ParentId], children: &[C]) -> Self {
        let mut acc = Self::new(parent_ids);
        for child in children {
            acc.add(child.parent_id(), child.measure());
        }
        acc
    }

    /// Add `amount` to the total of `parent_id`.
    ///
    /// Returns `false` and leaves the totals untouched when `parent_id` was
    /// not part of the id set the accumulator was built with.
    pub fn add(&mut self, parent_id: ParentId, amount: i64) -> bool {
        match self.totals.get_mut(&parent_id) {
            Some(total) => {
                *total += amount;
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, delta: Delta) -> bool {
        self.add(delta.parent_id, delta.amount)
    }

    /// Read-only view ordered by parent id
    pub fn snapshot(&self) -> &BTreeMap<ParentId, i64> {
        &self.totals
    }

    /// Sum over all parents
    pub fn grand_total(&self) -> i64 {
        self.totals.values().sum()
    }

    pub fn into_totals(self) -> BTreeMap<ParentId, i64> {
        self.totals
    }
}
