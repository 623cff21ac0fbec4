//! Racechart Core (renderer-agnostic)
//!
//! Turns a time-indexed dataset into a sequence of ranked, interpolated frames:
//! an entity store with running sums, per-unit top-N snapshots precomputed for
//! the whole range, fractional-time interpolation between snapshots, a
//! frame-driven playback clock with easing, and a keyed enter/update/exit diff
//! between consecutive frames. Hosts supply frames through [`FrameScheduler`]
//! and render [`FrameDiff`]s however they like.

pub mod config;
pub mod data;
pub mod diff;
pub mod engine;
pub mod error;
pub mod filter;
pub mod ids;
pub mod interp;
pub mod metrics;
pub mod outputs;
pub mod player;
pub mod ranking;
pub mod scheduler;
pub mod store;
pub mod subscribe;

// Re-exports for consumers (adapters)
pub use config::{unit_span, Config, Easing, MissingSidePolicy, RaceParams, ValueMode, MAX_UNITS};
pub use data::{Entity, RawTable, ValueSource};
pub use diff::{diff_frames, DiffEntry, ExitEntry, FrameDiff};
pub use engine::{Engine, PlayerControls};
pub use error::RaceError;
pub use filter::Filter;
pub use ids::{EntityId, FrameToken, SubscriptionId};
pub use interp::{FrameEntry, InterpolatedFrame, Interpolator};
pub use metrics::PlaybackMetrics;
pub use outputs::{ConfigureReport, CoreEvent, FrameOutput};
pub use player::{PlaybackState, Player};
pub use ranking::{compute_all, rank_cmp, Snapshot, SnapshotTable, Standing};
pub use scheduler::{FrameScheduler, ManualFrames, PolledFrames};
pub use store::EntityStore;
pub use subscribe::{FrameDispatcher, FrameListener};

/// Racechart result type
pub type Result<T> = core::result::Result<T, RaceError>;
