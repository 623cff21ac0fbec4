//! Engine configuration and per-race parameters.

use serde::{Deserialize, Serialize};

use crate::error::RaceError;
use crate::filter::Filter;

/// Speed profile applied on top of the nominal playback speed.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed across the whole range.
    Linear,
    /// Half-sine profile over range progress, peaking mid-range.
    /// `floor` is the multiplier at both ends and keeps playback from stalling there.
    Sine { floor: f64 },
}

impl Default for Easing {
    fn default() -> Self {
        Self::Sine { floor: 0.35 }
    }
}

/// What an entity contributes to a bracketing snapshot it is absent from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSidePolicy {
    /// The absent side counts as zero, so entering bars grow from nothing
    /// and leaving bars shrink away.
    #[default]
    Zero,
    /// The absent side repeats the value from the side where the entity is ranked.
    HoldLast,
}

/// Which per-unit quantity is ranked.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMode {
    /// Running sum up to and including the unit.
    #[default]
    Cumulative,
    /// The raw value of the unit alone.
    PerUnit,
}

/// Engine-wide settings. Missing JSON fields fall back to defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Time units advanced per second of wall-clock time before easing.
    pub default_speed: f64,
    pub easing: Easing,
    /// Upper bound on the elapsed time a single tick may apply.
    pub max_tick_ms: f64,
    /// Distance from an integer below which a time counts as that integer.
    /// Capped at `interp::functions::MAX_TIME_TOLERANCE` when used.
    pub time_tolerance: f64,
    pub missing_side: MissingSidePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_speed: 1.0,
            easing: Easing::default(),
            max_tick_ms: 250.0,
            time_tolerance: 1e-6,
            missing_side: MissingSidePolicy::Zero,
        }
    }
}

impl Config {
    pub fn from_json(raw: &str) -> Result<Self, RaceError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Largest number of integer units a store or race may span.
pub const MAX_UNITS: usize = 100_000;

/// Number of integer units in `start..=end`, computed without overflow.
/// `None` when the bounds are reversed or the span exceeds [`MAX_UNITS`].
pub fn unit_span(start: i32, end: i32) -> Option<usize> {
    let span = i64::from(end) - i64::from(start) + 1;
    (1..=MAX_UNITS as i64).contains(&span).then_some(span as usize)
}

/// Parameters that define one race. Changing any of them rebuilds the engine state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaceParams {
    pub range_start: i32,
    pub range_end: i32,
    #[serde(default)]
    pub filter: Filter,
    pub top_n: usize,
    #[serde(default)]
    pub value_mode: ValueMode,
}

impl RaceParams {
    pub fn new(range_start: i32, range_end: i32, top_n: usize) -> Self {
        Self {
            range_start,
            range_end,
            filter: Filter::All,
            top_n,
            value_mode: ValueMode::Cumulative,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_value_mode(mut self, mode: ValueMode) -> Self {
        self.value_mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), RaceError> {
        if unit_span(self.range_start, self.range_end).is_none() {
            return Err(RaceError::InvalidRange {
                start: self.range_start,
                end: self.range_end,
            });
        }
        if self.top_n == 0 {
            return Err(RaceError::InvalidTopN);
        }
        Ok(())
    }

    /// Number of integer units in the range, saturated at [`MAX_UNITS`].
    pub fn unit_count(&self) -> usize {
        let span = i64::from(self.range_end) - i64::from(self.range_start) + 1;
        span.clamp(0, MAX_UNITS as i64) as usize
    }

    /// Inclusive iterator over the integer units of the range.
    pub fn units(&self) -> impl Iterator<Item = i32> {
        self.range_start..=self.range_end
    }
}
