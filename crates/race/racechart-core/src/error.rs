//! Error types for the ranked-timeline engine

use serde::{Deserialize, Serialize};

/// Errors surfaced by configuration and player control calls.
///
/// Nothing in this enum is ever raised from inside a tick: precondition
/// violations are reported at the call that violates them.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RaceError {
    /// The raw table has no entities or no time units
    #[error("Raw table is empty")]
    EmptyTable,

    /// A declared time unit has no value for any entity
    #[error("Time unit {unit} has no values for any entity")]
    MissingTimeUnit { unit: i32 },

    /// Range bounds are reversed or span more than `MAX_UNITS` units
    #[error("Invalid range {start}..={end}: reversed or too wide")]
    InvalidRange { start: i32, end: i32 },

    /// Raw values must be finite and non-negative
    #[error("Invalid raw value {value} for entity {entity} at unit {unit}")]
    NegativeValue { entity: String, unit: i32, value: f64 },

    /// The entity catalog declares the same id twice
    #[error("Duplicate entity id: {id}")]
    DuplicateEntity { id: String },

    /// top_n must be at least one
    #[error("top_n must be greater than zero")]
    InvalidTopN,

    /// Speed must be finite and strictly positive
    #[error("Invalid speed: {speed}")]
    InvalidSpeed { speed: f64 },

    /// `configure()` was called before any dataset was loaded
    #[error("No dataset loaded")]
    NoData,

    /// A player operation was attempted before `configure()`
    #[error("Engine has not been configured")]
    NotConfigured,

    /// The player was disposed and accepts no further commands
    #[error("Player has been disposed")]
    Disposed,

    /// Seeking is rejected while the player is running
    #[error("Cannot seek while playing; pause first")]
    SeekWhilePlaying,

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl RaceError {
    /// Input data errors are fatal to `configure()` and never retried.
    #[inline]
    pub fn is_data_error(&self) -> bool {
        self.category() == "data"
    }

    /// Whether the caller can correct the call and try again.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidSpeed { .. } | Self::SeekWhilePlaying | Self::NotConfigured
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyTable
            | Self::MissingTimeUnit { .. }
            | Self::InvalidRange { .. }
            | Self::NegativeValue { .. }
            | Self::DuplicateEntity { .. } => "data",
            Self::InvalidTopN | Self::InvalidSpeed { .. } => "validation",
            Self::NoData | Self::NotConfigured | Self::Disposed | Self::SeekWhilePlaying => {
                "player"
            }
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for RaceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
