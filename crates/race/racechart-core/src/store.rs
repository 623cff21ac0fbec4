//! Entity store: raw per-unit values and their running sums.
//!
//! Everything is materialized at load time; lookups afterwards are O(1).

use hashbrown::HashMap;

use crate::config::unit_span;
use crate::data::{Entity, RawTable, ValueSource};
use crate::error::RaceError;
use crate::ids::EntityId;

#[derive(Debug, Clone)]
struct Row {
    raw: Vec<f64>,
    cumulative: Vec<f64>,
}

/// Owns the catalog and the per-entity value tables for the loaded units.
#[derive(Debug, Clone)]
pub struct EntityStore {
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
    /// Tie-break key per entity: position in (display_name, id) order.
    order: Vec<u32>,
    rows: Vec<Row>,
    first_unit: i32,
    last_unit: i32,
}

impl EntityStore {
    /// Load a self-contained raw table.
    pub fn from_table(table: &RawTable) -> Result<Self, RaceError> {
        Self::load(table.entities.clone(), &table.units, table)
    }

    /// Ingest `catalog` × `units` from `source`.
    ///
    /// Fails when the catalog or unit list is empty, when a declared unit has no
    /// entry for any entity, or when a value is negative or not finite.
    /// Units between the first and last declared unit that were not declared count as zero.
    pub fn load(
        catalog: Vec<Entity>,
        units: &[i32],
        source: &dyn ValueSource,
    ) -> Result<Self, RaceError> {
        if catalog.is_empty() || units.is_empty() {
            return Err(RaceError::EmptyTable);
        }

        let mut index = HashMap::with_capacity(catalog.len());
        for (i, e) in catalog.iter().enumerate() {
            if index.insert(e.id.clone(), i).is_some() {
                return Err(RaceError::DuplicateEntity {
                    id: e.id.to_string(),
                });
            }
        }

        let mut sorted_units = units.to_vec();
        sorted_units.sort_unstable();
        sorted_units.dedup();
        let first_unit = sorted_units[0];
        let last_unit = sorted_units[sorted_units.len() - 1];
        let span = unit_span(first_unit, last_unit).ok_or(RaceError::InvalidRange {
            start: first_unit,
            end: last_unit,
        })?;

        let mut rows = Vec::with_capacity(catalog.len());
        let mut unit_seen = vec![false; span];
        for e in &catalog {
            let mut raw = vec![0.0; span];
            for &unit in &sorted_units {
                let slot = (i64::from(unit) - i64::from(first_unit)) as usize;
                if let Some(v) = source.raw_value(&e.id, unit) {
                    if !v.is_finite() || v < 0.0 {
                        return Err(RaceError::NegativeValue {
                            entity: e.id.to_string(),
                            unit,
                            value: v,
                        });
                    }
                    raw[slot] = v;
                    unit_seen[slot] = true;
                }
            }
            let mut running = 0.0;
            let cumulative = raw
                .iter()
                .map(|v| {
                    running += v;
                    running
                })
                .collect();
            rows.push(Row { raw, cumulative });
        }

        if let Some(&unit) = sorted_units
            .iter()
            .find(|&&u| !unit_seen[(i64::from(u) - i64::from(first_unit)) as usize])
        {
            return Err(RaceError::MissingTimeUnit { unit });
        }

        let mut by_name: Vec<usize> = (0..catalog.len()).collect();
        by_name.sort_by(|&a, &b| {
            catalog[a]
                .display_name
                .cmp(&catalog[b].display_name)
                .then_with(|| catalog[a].id.cmp(&catalog[b].id))
        });
        let mut order = vec![0u32; catalog.len()];
        for (pos, idx) in by_name.into_iter().enumerate() {
            order[idx] = pos as u32;
        }

        log::debug!(
            "entity store loaded: {} entities, units {}..={}",
            catalog.len(),
            first_unit,
            last_unit
        );

        Ok(Self {
            entities: catalog,
            index,
            order,
            rows,
            first_unit,
            last_unit,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// First and last loaded unit (inclusive).
    #[inline]
    pub fn unit_bounds(&self) -> (i32, i32) {
        (self.first_unit, self.last_unit)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.index.get(id).map(|&i| &self.entities[i])
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn entity_at(&self, idx: usize) -> &Entity {
        &self.entities[idx]
    }

    pub(crate) fn order_at(&self, idx: usize) -> u32 {
        self.order[idx]
    }

    /// Running sum through `unit` inclusive. Zero for unknown ids and units before the data.
    pub fn cumulative_value(&self, id: &str, unit: i32) -> f64 {
        self.index_of(id)
            .map(|i| self.cumulative_at(i, unit))
            .unwrap_or(0.0)
    }

    /// Raw value of `unit` alone. Zero for unknown ids and units outside the data.
    pub fn raw_value(&self, id: &str, unit: i32) -> f64 {
        self.index_of(id)
            .map(|i| self.raw_at(i, unit))
            .unwrap_or(0.0)
    }

    pub(crate) fn cumulative_at(&self, idx: usize, unit: i32) -> f64 {
        if unit < self.first_unit {
            return 0.0;
        }
        let row = &self.rows[idx].cumulative;
        let slot = (i64::from(unit) - i64::from(self.first_unit)) as usize;
        let slot = slot.min(row.len() - 1);
        row[slot]
    }

    pub(crate) fn raw_at(&self, idx: usize, unit: i32) -> f64 {
        if unit < self.first_unit || unit > self.last_unit {
            return 0.0;
        }
        self.rows[idx].raw[(i64::from(unit) - i64::from(self.first_unit)) as usize]
    }
}
