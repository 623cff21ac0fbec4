//! Input data model: the entity catalog and the raw per-unit value source.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::RaceError;
use crate::ids::EntityId;

/// One rankable entity. Immutable once loaded for a parameter set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub display_name: String,
    #[serde(default)]
    pub color_ref: Option<String>,
    #[serde(default)]
    pub logo_ref: Option<String>,
    #[serde(default)]
    pub category_tags: Vec<String>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            color_ref: None,
            logo_ref: None,
            category_tags: Vec::new(),
        }
    }

    pub fn with_tags<'a>(mut self, tags: impl IntoIterator<Item = &'a str>) -> Self {
        self.category_tags = tags.into_iter().map(str::to_string).collect();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color_ref = Some(color.into());
        self
    }

    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo_ref = Some(logo.into());
        self
    }

    #[inline]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.category_tags.iter().any(|t| t == tag)
    }
}

/// Pull-based access to raw values, supplied by the data layer.
///
/// `None` means "no entry" and is treated as zero by the store.
pub trait ValueSource {
    fn raw_value(&self, entity: &EntityId, unit: i32) -> Option<f64>;
}

impl<F> ValueSource for F
where
    F: Fn(&EntityId, i32) -> Option<f64>,
{
    fn raw_value(&self, entity: &EntityId, unit: i32) -> Option<f64> {
        self(entity, unit)
    }
}

/// Self-contained raw table, loadable from JSON:
///
/// ```json
/// { "units": [2021, 2022],
///   "entities": [{ "id": "A", "display_name": "Alpha" }],
///   "values": { "A": { "2021": 3, "2022": 4 } } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub units: Vec<i32>,
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub values: HashMap<EntityId, BTreeMap<i32, f64>>,
}

impl RawTable {
    pub fn new(units: impl IntoIterator<Item = i32>) -> Self {
        Self {
            units: units.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, RaceError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Add an entity with values for consecutive units starting at `units[0]`.
    pub fn push_series(&mut self, entity: Entity, series: &[f64]) {
        let row: BTreeMap<i32, f64> = self
            .units
            .iter()
            .copied()
            .zip(series.iter().copied())
            .collect();
        self.values.insert(entity.id.clone(), row);
        self.entities.push(entity);
    }

    pub fn set(&mut self, entity: &EntityId, unit: i32, value: f64) {
        self.values
            .entry(entity.clone())
            .or_default()
            .insert(unit, value);
    }
}

impl ValueSource for RawTable {
    fn raw_value(&self, entity: &EntityId, unit: i32) -> Option<f64> {
        self.values.get(entity).and_then(|row| row.get(&unit)).copied()
    }
}
