//! Output contracts from the engine.
//!
//! A `FrameOutput` carries the interpolated frame, its keyed diff against the
//! previously produced frame, and the semantic events raised since then.
//! Adapters (wasm, native UIs) render the diff and transport the events.

use serde::{Deserialize, Serialize};

use crate::diff::FrameDiff;
use crate::interp::InterpolatedFrame;
use crate::player::PlaybackState;

/// Discrete semantic signals raised by engine calls and ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum CoreEvent {
    Configured {
        range_start: i32,
        range_end: i32,
        top_n: usize,
    },
    /// Filter and range produced no ranked entity; render an empty state.
    EmptyResult,
    PlaybackStarted {
        time: f64,
    },
    PlaybackPaused {
        time: f64,
    },
    PlaybackFinished {
        time: f64,
    },
    TimeChanged {
        old_time: f64,
        new_time: f64,
    },
    /// A seek target was outside the range and was clamped.
    SeekClamped {
        requested: f64,
        applied: f64,
    },
    /// A speed change arrived mid-playback and will apply on the next `play()`.
    SpeedDeferred {
        speed: f64,
    },
    Disposed,
}

/// What subscribers and `current_frame()` receive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    pub frame: InterpolatedFrame,
    pub diff: FrameDiff,
    pub state: PlaybackState,
    /// Position of the frame within the range, in [0, 1].
    pub progress: f64,
    #[serde(default)]
    pub events: Vec<CoreEvent>,
}

/// Result of a successful `configure()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigureReport {
    pub units: usize,
    /// True when nothing ranks anywhere in the range (the empty-state warning).
    pub empty: bool,
    /// Largest value over the whole race, for a fixed axis.
    pub max_value: f64,
}
