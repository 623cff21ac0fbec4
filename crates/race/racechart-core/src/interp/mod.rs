//! Fractional-time frames blended from the two bracketing snapshots.

pub mod functions;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::MissingSidePolicy;
use crate::ids::EntityId;
use crate::ranking::{rank_cmp, Snapshot, SnapshotTable, Standing};

use self::functions::{clamp_tolerance, lerp, nearest_unit};

/// One row of a rendered frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameEntry {
    pub id: EntityId,
    pub value: f64,
    /// 0-based position in the frame.
    pub rank: usize,
    pub order: u32,
}

/// Ranked view at a (possibly fractional) time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedFrame {
    pub time: f64,
    /// The unit shown as the frame's label, `floor(time)`.
    pub unit_label: i32,
    pub entries: Vec<FrameEntry>,
    /// Largest value in this frame, for axis scaling.
    pub max_value: f64,
}

impl InterpolatedFrame {
    fn from_standings(time: f64, unit_label: i32, standings: &[Standing]) -> Self {
        let entries: Vec<FrameEntry> = standings
            .iter()
            .enumerate()
            .map(|(rank, s)| FrameEntry {
                id: s.id.clone(),
                value: s.value,
                rank,
                order: s.order,
            })
            .collect();
        let max_value = entries.first().map(|e| e.value).unwrap_or(0.0);
        Self {
            time,
            unit_label,
            entries,
            max_value,
        }
    }

    pub fn entry(&self, id: &EntityId) -> Option<&FrameEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entries.iter().map(|e| &e.id)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps a time to a frame over an immutable snapshot table.
///
/// Only the most recent `(time, frame)` pair is memoized.
#[derive(Debug)]
pub struct Interpolator {
    table: SnapshotTable,
    policy: MissingSidePolicy,
    tolerance: f64,
    last: Option<(f64, InterpolatedFrame)>,
    cache_hits: u64,
    computed: u64,
}

impl Interpolator {
    pub fn new(table: SnapshotTable, policy: MissingSidePolicy, tolerance: f64) -> Self {
        Self {
            table,
            policy,
            tolerance: clamp_tolerance(tolerance),
            last: None,
            cache_hits: 0,
            computed: 0,
        }
    }

    pub fn table(&self) -> &SnapshotTable {
        &self.table
    }

    #[inline]
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }

    #[inline]
    pub fn frames_computed(&self) -> u64 {
        self.computed
    }

    /// Clamp `t` into the race range. NaN maps to the range start.
    pub fn clamp_time(&self, t: f64) -> f64 {
        let (start, end) = (self.table.range_start as f64, self.table.range_end as f64);
        if t.is_nan() {
            start
        } else {
            t.clamp(start, end)
        }
    }

    /// Frame at time `t`, clamped to the range.
    pub fn at(&mut self, t: f64) -> &InterpolatedFrame {
        let t = self.clamp_time(t);
        let hit = matches!(&self.last, Some((lt, _)) if *lt == t);
        if hit {
            self.cache_hits += 1;
        } else {
            let frame = self.compute(t);
            self.computed += 1;
            self.last = Some((t, frame));
        }
        &self
            .last
            .get_or_insert_with(|| (t, InterpolatedFrame::default()))
            .1
    }

    fn compute(&self, t: f64) -> InterpolatedFrame {
        if let Some(unit) = nearest_unit(t, self.tolerance) {
            return match self.table.get(unit) {
                Some(snap) => InterpolatedFrame::from_standings(t, unit, &snap.standings),
                None => InterpolatedFrame {
                    time: t,
                    unit_label: unit,
                    ..InterpolatedFrame::default()
                },
            };
        }

        let t0 = t.floor();
        let f = t - t0;
        let u0 = t0 as i32;
        let (Some(s0), Some(s1)) = (self.table.get(u0), self.table.get(u0 + 1)) else {
            return InterpolatedFrame {
                time: t,
                unit_label: u0,
                ..InterpolatedFrame::default()
            };
        };

        let standings = self.blend(s0, s1, f);
        InterpolatedFrame::from_standings(t, u0, &standings)
    }

    fn blend(&self, s0: &Snapshot, s1: &Snapshot, f: f64) -> Vec<Standing> {
        let mut sides: HashMap<&EntityId, (Option<f64>, Option<f64>, u32)> =
            HashMap::with_capacity(s0.len() + s1.len());
        for s in &s0.standings {
            sides.entry(&s.id).or_insert((None, None, s.order)).0 = Some(s.value);
        }
        for s in &s1.standings {
            sides.entry(&s.id).or_insert((None, None, s.order)).1 = Some(s.value);
        }

        let mut out: Vec<Standing> = sides
            .into_iter()
            .map(|(id, (v0, v1, order))| {
                let (a, b) = match self.policy {
                    MissingSidePolicy::Zero => (v0.unwrap_or(0.0), v1.unwrap_or(0.0)),
                    MissingSidePolicy::HoldLast => {
                        let a = v0.or(v1).unwrap_or(0.0);
                        (a, v1.unwrap_or(a))
                    }
                };
                Standing {
                    id: id.clone(),
                    value: lerp(a, b, f),
                    order,
                }
            })
            .collect();
        out.sort_by(rank_cmp);
        out.truncate(self.table.top_n);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RaceParams;
    use crate::data::{Entity, RawTable};
    use crate::ranking::compute_all;
    use crate::store::EntityStore;

    fn interp(policy: MissingSidePolicy) -> Interpolator {
        // Cumulative: P = [10, 14], Q = [20, 24], R = [0, 30]
        let mut t = RawTable::new([0, 1]);
        t.push_series(Entity::new("P", "P"), &[10.0, 4.0]);
        t.push_series(Entity::new("Q", "Q"), &[20.0, 4.0]);
        t.push_series(Entity::new("R", "R"), &[0.0, 30.0]);
        let store = EntityStore::from_table(&t).unwrap();
        let table = compute_all(&store, &RaceParams::new(0, 1, 3));
        Interpolator::new(table, policy, 1e-6)
    }

    #[test]
    fn integer_time_returns_snapshot() {
        let mut it = interp(MissingSidePolicy::Zero);
        let snap = it.table().get(1).unwrap().clone();
        let frame = it.at(1.0).clone();
        assert_eq!(frame.entries.len(), snap.len());
        for (e, s) in frame.entries.iter().zip(snap.standings.iter()) {
            assert_eq!(e.id, s.id);
            assert_eq!(e.value, s.value);
        }
        assert_eq!(frame.unit_label, 1);
    }

    #[test]
    fn midpoint_blends_values() {
        let mut it = interp(MissingSidePolicy::Zero);
        let frame = it.at(0.5).clone();
        assert_eq!(frame.entry(&"P".into()).unwrap().value, 12.0);
        assert_eq!(frame.entry(&"Q".into()).unwrap().value, 22.0);
        // entering from zero
        assert_eq!(frame.entry(&"R".into()).unwrap().value, 15.0);
        assert_eq!(frame.unit_label, 0);
    }

    #[test]
    fn hold_last_keeps_missing_side() {
        let mut it = interp(MissingSidePolicy::HoldLast);
        let frame = it.at(0.5).clone();
        assert_eq!(frame.entry(&"R".into()).unwrap().value, 30.0);
        assert_eq!(frame.entries[0].id.as_str(), "R");
    }

    #[test]
    fn oversized_tolerance_still_interpolates() {
        let table = interp(MissingSidePolicy::Zero).table().clone();
        let mut wide = Interpolator::new(table.clone(), MissingSidePolicy::Zero, 0.75);
        let frame = wide.at(0.5).clone();
        assert_eq!(frame.entry(&"P".into()).unwrap().value, 12.0);
        assert_eq!(frame.entry(&"Q".into()).unwrap().value, 22.0);

        let mut nan = Interpolator::new(table, MissingSidePolicy::Zero, f64::NAN);
        assert_eq!(nan.at(1.0).unit_label, 1);
    }

    #[test]
    fn clamps_outside_range() {
        let mut it = interp(MissingSidePolicy::Zero);
        assert_eq!(it.at(-5.0).time, 0.0);
        assert_eq!(it.at(100.0).time, 1.0);
        assert_eq!(it.at(f64::NAN).time, 0.0);
    }

    #[test]
    fn memoizes_last_time_only() {
        let mut it = interp(MissingSidePolicy::Zero);
        it.at(0.25);
        it.at(0.25);
        assert_eq!(it.cache_hits(), 1);
        assert_eq!(it.frames_computed(), 1);
        it.at(0.75);
        it.at(0.25);
        assert_eq!(it.cache_hits(), 1);
        assert_eq!(it.frames_computed(), 3);
    }

    #[test]
    fn frames_are_ranked_and_truncated() {
        let mut t = RawTable::new([0, 1]);
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            t.push_series(Entity::new(*name, *name), &[i as f64 + 1.0, 4.0 - i as f64]);
        }
        let store = EntityStore::from_table(&t).unwrap();
        let table = compute_all(&store, &RaceParams::new(0, 1, 2));
        let mut it = Interpolator::new(table, MissingSidePolicy::Zero, 1e-6);
        let frame = it.at(0.5).clone();
        assert!(frame.entries.len() <= 2);
        for w in frame.entries.windows(2) {
            assert!(w[0].value >= w[1].value);
        }
        assert_eq!(frame.max_value, frame.entries[0].value);
    }
}
