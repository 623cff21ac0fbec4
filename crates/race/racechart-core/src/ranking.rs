//! Ranking precomputation: one top-N snapshot per integer unit.
//!
//! Snapshots are built for the whole range up front so the interpolator can
//! jump to any unit while scrubbing.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::{RaceParams, ValueMode};
use crate::ids::EntityId;
use crate::store::EntityStore;

/// One ranked row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub id: EntityId,
    pub value: f64,
    /// Tie-break key: the entity's position in (display_name, id) order.
    pub order: u32,
}

/// Ranking order: value descending, then display name ascending, then id ascending.
#[inline]
pub fn rank_cmp(a: &Standing, b: &Standing) -> Ordering {
    b.value
        .total_cmp(&a.value)
        .then_with(|| a.order.cmp(&b.order))
}

/// Exact ranked view at an integer unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub unit: i32,
    pub standings: Vec<Standing>,
}

impl Snapshot {
    pub fn value_of(&self, id: &EntityId) -> Option<f64> {
        self.standings
            .iter()
            .find(|s| &s.id == id)
            .map(|s| s.value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.standings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.standings.is_empty()
    }
}

/// All snapshots of a race, indexed by unit. Read-only once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTable {
    pub range_start: i32,
    pub range_end: i32,
    pub top_n: usize,
    snapshots: Vec<Snapshot>,
}

impl SnapshotTable {
    /// True when no entity has a positive value anywhere in the range.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, unit: i32) -> Option<&Snapshot> {
        if unit < self.range_start || unit > self.range_end {
            return None;
        }
        self.snapshots
            .get((i64::from(unit) - i64::from(self.range_start)) as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// Largest value across every snapshot.
    pub fn max_value(&self) -> f64 {
        self.snapshots
            .iter()
            .filter_map(|s| s.standings.first())
            .map(|s| s.value)
            .fold(0.0, f64::max)
    }
}

/// Build every snapshot in `[range_start, range_end]`.
///
/// Per unit: keep entities matching the filter whose value is positive, sort by
/// [`rank_cmp`], truncate to `top_n`. Pure; identical inputs give identical tables.
/// When nothing is ever positive the returned table is empty.
pub fn compute_all(store: &EntityStore, params: &RaceParams) -> SnapshotTable {
    let candidates: Vec<usize> = (0..store.len())
        .filter(|&i| params.filter.matches(store.entity_at(i)))
        .collect();

    let mut snapshots = Vec::with_capacity(params.unit_count());
    let mut any_positive = false;
    for unit in params.units().take(params.unit_count()) {
        let mut standings: Vec<Standing> = candidates
            .iter()
            .filter_map(|&i| {
                let value = match params.value_mode {
                    ValueMode::Cumulative => store.cumulative_at(i, unit),
                    ValueMode::PerUnit => store.raw_at(i, unit),
                };
                (value > 0.0).then(|| Standing {
                    id: store.entity_at(i).id.clone(),
                    value,
                    order: store.order_at(i),
                })
            })
            .collect();
        standings.sort_by(rank_cmp);
        standings.truncate(params.top_n);
        any_positive |= !standings.is_empty();
        snapshots.push(Snapshot { unit, standings });
    }

    if !any_positive {
        snapshots.clear();
    }

    SnapshotTable {
        range_start: params.range_start,
        range_end: params.range_end,
        top_n: params.top_n,
        snapshots,
    }
}
