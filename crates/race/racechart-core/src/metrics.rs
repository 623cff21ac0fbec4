//! Playback counters exposed through `Engine::metrics`.

use serde::{Deserialize, Serialize};

/// Counters for playback and frame production
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackMetrics {
    /// Ticks that advanced the player
    pub ticks_applied: u64,
    /// Ticks ignored because their token was stale or the player was not playing
    pub stale_ticks: u64,
    /// Frame callbacks requested from the host
    pub frames_requested: u64,
    /// Elapsed time applied by the most recent tick, after clamping
    pub last_elapsed_ms: f64,
    /// Frames built by the interpolator
    pub frames_computed: u64,
    /// Frame requests answered from the interpolator's memo
    pub cache_hits: u64,
}

impl PlaybackMetrics {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}
