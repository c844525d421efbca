//! Reference-respecting child generation.
//!
//! Parents come from a catalog loader with ids assigned from 1. Children are
//! produced one step at a time; each step yields the child and the delta it
//! contributes to the per-parent aggregate, and [`generate_children`] applies
//! both in the same iteration.

use crate::accumulator::Accumulator;
use crate::schema::Table;
use crate::value::Row;
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Identifier of a parent entity (1-based, catalog order)
pub type ParentId = i64;

/// A loaded parent entity
#[derive(Debug, Clone, PartialEq)]
pub struct Parent<T> {
    pub id: ParentId,
    pub attrs: T,
}

/// Assign sequential ids starting at 1 to catalog entries, in listed order.
pub fn load_catalog<T, I>(entries: I) -> Vec<Parent<T>>
where
    I: IntoIterator<Item = T>,
{
    entries
        .into_iter()
        .zip(1..)
        .map(|(attrs, id)| Parent { id, attrs })
        .collect()
}

pub fn parent_ids<T>(parents: &[Parent<T>]) -> Vec<ParentId> {
    parents.iter().map(|p| p.id).collect()
}

/// Inclusive integer range used for counts and measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub low: u32,
    pub high: u32,
}

impl CountRange {
    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    pub const fn fixed(n: u32) -> Self {
        Self { low: n, high: n }
    }

    /// `(min, max)`, tolerating swapped bounds
    pub fn bounds(&self) -> (u32, u32) {
        (self.low.min(self.high), self.low.max(self.high))
    }

    pub fn contains(&self, n: u32) -> bool {
        let (low, high) = self.bounds();
        (low..=high).contains(&n)
    }
}

impl std::fmt::Display for CountRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Time span ending at "now" from which child timestamps are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Longest lookback accepted by pipeline configs (about a century)
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

impl LookbackWindow {
    /// Window of `days` ending at `now`; `days` is capped at
    /// [`MAX_LOOKBACK_DAYS`] and the start saturates at the earliest
    /// representable instant.
    pub fn ending_at(now: NaiveDateTime, days: u32) -> Self {
        let span = TimeDelta::days(i64::from(days.min(MAX_LOOKBACK_DAYS)));
        Self {
            start: now.checked_sub_signed(span).unwrap_or(NaiveDateTime::MIN),
            end: now,
        }
    }

    /// `start + (end - start) * u`, for `u` in `[0, 1)`
    pub fn at(&self, u: f64) -> NaiveDateTime {
        let span_ms = (self.end - self.start).num_milliseconds();
        let offset_ms = (span_ms as f64 * u.clamp(0.0, 1.0)) as i64;
        self.start + TimeDelta::milliseconds(offset_ms)
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Contribution of one child to the aggregate of its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub parent_id: ParentId,
    pub amount: i64,
}

/// A generated row that references exactly one parent
pub trait ChildRecord {
    fn parent_id(&self) -> ParentId;

    /// Quantity summed into the parent's aggregate
    fn measure(&self) -> i64;

    /// Values in the order of the detail table's insert columns
    fn to_row(&self) -> Row;

    fn delta(&self) -> Delta {
        Delta {
            parent_id: self.parent_id(),
            amount: self.measure(),
        }
    }
}

/// Run `step` `count` times, recording each child and applying its delta.
pub fn generate_children<C, F>(count: usize, accumulator: &mut Accumulator, mut step: F) -> Vec<C>
where
    F: FnMut() -> (C, Delta),
{
    let mut children = Vec::with_capacity(count);
    for _ in 0..count {
        let (child, delta) = step();
        let applied = accumulator.apply(delta);
        debug_assert!(applied, "child references unknown parent {}", delta.parent_id);
        children.push(child);
    }
    children
}

/// Generated data for a single table
#[derive(Debug, Clone)]
pub struct TableData {
    pub table: Table,
    pub rows: Vec<Row>,
}

impl TableData {
    pub fn name(&self) -> &str {
        &self.table.name
    }
}

/// Everything one pipeline run emits, in emission order
#[derive(Debug, Clone)]
pub struct SeedData {
    /// Header label, e.g. `Novotel`
    pub label: String,
    pub database: Option<String>,
    pub tables: Vec<TableData>,
}

impl SeedData {
    pub fn table(&self, name: &str) -> Option<&TableData> {
        self.tables.iter().find(|t| t.name() == name)
    }

    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }
}
