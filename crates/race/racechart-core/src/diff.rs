//! Keyed enter/update/exit join between two consecutive frames.
//!
//! This is the only contract with a renderer: rows are keyed by `EntityId`,
//! so a renderer can keep one visual element per id across frames.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::ids::EntityId;
use crate::interp::{FrameEntry, InterpolatedFrame};

/// A row present in the new frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub id: EntityId,
    pub rank: usize,
    pub value: f64,
    /// Rank and value in the previous frame; `None` for entering rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<(usize, f64)>,
}

/// A row that was rendered previously and is gone now.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExitEntry {
    pub id: EntityId,
    pub last_rank: usize,
    pub last_value: f64,
}

/// Disjoint entering / updating / exiting lists.
///
/// `entering` and `updating` follow the new frame's rank order;
/// `exiting` follows the previous frame's rank order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDiff {
    pub entering: Vec<DiffEntry>,
    pub updating: Vec<DiffEntry>,
    pub exiting: Vec<ExitEntry>,
}

impl FrameDiff {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entering.is_empty() && self.updating.is_empty() && self.exiting.is_empty()
    }

    /// Updating rows whose rank changed.
    pub fn reordered(&self) -> impl Iterator<Item = &DiffEntry> {
        self.updating
            .iter()
            .filter(|e| matches!(e.previous, Some((r, _)) if r != e.rank))
    }
}

/// Join `prev` (what is on screen) against `next` (what should be).
pub fn diff_frames(prev: Option<&InterpolatedFrame>, next: &InterpolatedFrame) -> FrameDiff {
    let prev_rows: HashMap<&EntityId, &FrameEntry> = prev
        .map(|p| p.entries.iter().map(|e| (&e.id, e)).collect())
        .unwrap_or_default();

    let mut out = FrameDiff::default();
    for e in &next.entries {
        let row = DiffEntry {
            id: e.id.clone(),
            rank: e.rank,
            value: e.value,
            previous: prev_rows.get(&e.id).map(|p| (p.rank, p.value)),
        };
        if row.previous.is_some() {
            out.updating.push(row);
        } else {
            out.entering.push(row);
        }
    }

    if let Some(prev) = prev {
        out.exiting = prev
            .entries
            .iter()
            .filter(|p| next.entry(&p.id).is_none())
            .map(|p| ExitEntry {
                id: p.id.clone(),
                last_rank: p.rank,
                last_value: p.value,
            })
            .collect();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(rows: &[(&str, f64)]) -> InterpolatedFrame {
        InterpolatedFrame {
            time: 0.0,
            unit_label: 0,
            entries: rows
                .iter()
                .enumerate()
                .map(|(rank, (id, value))| FrameEntry {
                    id: (*id).into(),
                    value: *value,
                    rank,
                    order: rank as u32,
                })
                .collect(),
            max_value: rows.first().map(|r| r.1).unwrap_or(0.0),
        }
    }

    fn ids<T>(rows: &[T], f: impl Fn(&T) -> &EntityId) -> Vec<&str> {
        rows.iter().map(|r| f(r).as_str()).collect()
    }

    #[test]
    fn first_frame_is_all_entering() {
        let next = frame(&[("A", 3.0), ("B", 2.0)]);
        let d = diff_frames(None, &next);
        assert_eq!(ids(&d.entering, |e| &e.id), vec!["A", "B"]);
        assert!(d.updating.is_empty());
        assert!(d.exiting.is_empty());
    }

    #[test]
    fn enter_update_exit_are_disjoint() {
        let prev = frame(&[("A", 5.0), ("B", 4.0), ("C", 3.0)]);
        let next = frame(&[("D", 9.0), ("B", 6.0), ("A", 5.5)]);
        let d = diff_frames(Some(&prev), &next);
        assert_eq!(ids(&d.entering, |e| &e.id), vec!["D"]);
        assert_eq!(ids(&d.updating, |e| &e.id), vec!["B", "A"]);
        assert_eq!(ids(&d.exiting, |e| &e.id), vec!["C"]);
        assert_eq!(d.updating[0].previous, Some((1, 4.0)));
        assert_eq!(d.updating[0].rank, 1);
        assert_eq!(d.exiting[0].last_rank, 2);
        let moved: Vec<&str> = d.reordered().map(|e| e.id.as_str()).collect();
        assert_eq!(moved, vec!["A"]);
    }

    #[test]
    fn identical_frames_only_update() {
        let f = frame(&[("A", 1.0)]);
        let d = diff_frames(Some(&f), &f);
        assert!(d.entering.is_empty() && d.exiting.is_empty());
        assert_eq!(d.updating.len(), 1);
        assert_eq!(d.reordered().count(), 0);
        assert!(!d.is_empty());
    }

    #[test]
    fn empty_next_exits_everything() {
        let prev = frame(&[("A", 1.0), ("B", 0.5)]);
        let d = diff_frames(Some(&prev), &frame(&[]));
        assert_eq!(ids(&d.exiting, |e| &e.id), vec!["A", "B"]);
        assert!(diff_frames(None, &frame(&[])).is_empty());
    }
}
