//! Playback scheduler: a cooperative, frame-driven clock over the race range.
//!
//! The player never runs on its own. It asks the host for a frame through a
//! [`FrameScheduler`] and advances only when that exact frame is delivered to
//! [`Player::tick`]. At most one frame is pending at any time.

use serde::{Deserialize, Serialize};

use crate::config::{Config, Easing};
use crate::error::RaceError;
use crate::ids::{FrameToken, IdAllocator};
use crate::interp::functions::ease_multiplier;
use crate::metrics::PlaybackMetrics;
use crate::outputs::CoreEvent;
use crate::scheduler::FrameScheduler;

/// Playback state of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Created, never played
    Idle,
    /// Advancing on every delivered frame
    Playing,
    /// Stopped by `pause()` or moved by a seek
    Paused,
    /// Reached the end of the range
    Finished,
    /// Transient state held only inside `seek()`
    Seeking,
    /// Discarded; accepts no further commands
    Disposed,
}

impl PlaybackState {
    /// Get the name of this playback state
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Finished => "finished",
            Self::Seeking => "seeking",
            Self::Disposed => "disposed",
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Check if the player accepts a seek right now
    #[inline]
    pub fn can_seek(&self) -> bool {
        matches!(self, Self::Idle | Self::Paused | Self::Finished)
    }
}

/// Clock and state machine for one configured race.
#[derive(Debug)]
pub struct Player {
    range_start: f64,
    range_end: f64,
    current_time: f64,
    state: PlaybackState,
    speed: f64,
    deferred_speed: Option<f64>,
    easing: Easing,
    max_tick_ms: f64,
    pending: Option<FrameToken>,
    last_tick_ms: Option<f64>,
    ids: IdAllocator,
    metrics: PlaybackMetrics,
}

impl Player {
    pub fn new(range_start: i32, range_end: i32, cfg: &Config) -> Self {
        let speed = if cfg.default_speed.is_finite() && cfg.default_speed > 0.0 {
            cfg.default_speed
        } else {
            1.0
        };
        Self {
            range_start: range_start as f64,
            range_end: range_end as f64,
            current_time: range_start as f64,
            state: PlaybackState::Idle,
            speed,
            deferred_speed: None,
            easing: cfg.easing,
            max_tick_ms: cfg.max_tick_ms.max(0.0),
            pending: None,
            last_tick_ms: None,
            ids: IdAllocator::new(),
            metrics: PlaybackMetrics::new(),
        }
    }

    /// Number tokens from `first` on, so a successor never reissues a predecessor's token.
    pub fn with_first_token(mut self, first: u64) -> Self {
        self.ids = IdAllocator::starting_at(first);
        self
    }

    /// Token the next frame request will carry.
    #[inline]
    pub fn next_token(&self) -> FrameToken {
        self.ids.peek_frame()
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Speed in units per second that the running (or next) playback uses.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// A speed set mid-playback, waiting for the next `play()`.
    #[inline]
    pub fn deferred_speed(&self) -> Option<f64> {
        self.deferred_speed
    }

    #[inline]
    pub fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[inline]
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.pending
    }

    pub fn metrics(&self) -> &PlaybackMetrics {
        &self.metrics
    }

    /// Position within the range in [0, 1]. A zero-length range reports 1.
    pub fn progress(&self) -> f64 {
        let span = self.range_end - self.range_start;
        if span <= 0.0 {
            return 1.0;
        }
        ((self.current_time - self.range_start) / span).clamp(0.0, 1.0)
    }

    fn ensure_live(&self) -> Result<(), RaceError> {
        if self.state == PlaybackState::Disposed {
            return Err(RaceError::Disposed);
        }
        Ok(())
    }

    fn request(&mut self, host: &mut dyn FrameScheduler) {
        let token = self.ids.alloc_frame();
        self.pending = Some(token);
        self.metrics.frames_requested += 1;
        host.request_frame(token);
    }

    fn cancel(&mut self, host: &mut dyn FrameScheduler) {
        if let Some(token) = self.pending.take() {
            host.cancel_frame(token);
        }
    }

    fn set_time(&mut self, t: f64, events: &mut Vec<CoreEvent>) {
        if t != self.current_time {
            events.push(CoreEvent::TimeChanged {
                old_time: self.current_time,
                new_time: t,
            });
            self.current_time = t;
        }
    }

    /// Start or resume. Restarts from the range start when already at the end.
    pub fn play(
        &mut self,
        host: &mut dyn FrameScheduler,
        events: &mut Vec<CoreEvent>,
    ) -> Result<(), RaceError> {
        self.ensure_live()?;
        if self.state == PlaybackState::Playing {
            return Ok(());
        }
        if self.current_time >= self.range_end {
            self.set_time(self.range_start, events);
        }
        if let Some(speed) = self.deferred_speed.take() {
            self.speed = speed;
        }
        self.state = PlaybackState::Playing;
        self.last_tick_ms = None;
        events.push(CoreEvent::PlaybackStarted {
            time: self.current_time,
        });
        log::debug!(
            "playback started at {} ({} units/s)",
            self.current_time,
            self.speed
        );
        self.request(host);
        Ok(())
    }

    /// Stop advancing and drop the pending frame. Idempotent.
    pub fn pause(&mut self, host: &mut dyn FrameScheduler, events: &mut Vec<CoreEvent>) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.cancel(host);
        self.state = PlaybackState::Paused;
        self.last_tick_ms = None;
        events.push(CoreEvent::PlaybackPaused {
            time: self.current_time,
        });
        log::debug!("playback paused at {}", self.current_time);
    }

    /// Jump to `t`, clamped to the range. Rejected while playing; never changes
    /// whether the player is running. Returns the applied time.
    pub fn seek(&mut self, t: f64, events: &mut Vec<CoreEvent>) -> Result<f64, RaceError> {
        self.ensure_live()?;
        if self.state == PlaybackState::Playing {
            return Err(RaceError::SeekWhilePlaying);
        }
        let previous = self.state;
        self.state = PlaybackState::Seeking;

        let applied = if t.is_nan() {
            self.range_start
        } else {
            t.clamp(self.range_start, self.range_end)
        };
        if applied != t {
            log::debug!("seek to {t} clamped to {applied}");
            events.push(CoreEvent::SeekClamped {
                requested: t,
                applied,
            });
        }
        self.set_time(applied, events);

        self.state = match previous {
            PlaybackState::Finished if applied < self.range_end => PlaybackState::Paused,
            other => other,
        };
        Ok(applied)
    }

    /// Set speed in units per second. Mid-playback changes wait for the next `play()`.
    pub fn set_speed(&mut self, speed: f64, events: &mut Vec<CoreEvent>) -> Result<(), RaceError> {
        self.ensure_live()?;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(RaceError::InvalidSpeed { speed });
        }
        if self.state == PlaybackState::Playing {
            self.deferred_speed = Some(speed);
            events.push(CoreEvent::SpeedDeferred { speed });
        } else {
            self.speed = speed;
            self.deferred_speed = None;
        }
        Ok(())
    }

    /// Deliver a frame. Returns false, without touching any state other than
    /// the stale counter, unless `token` is the pending frame of a playing player.
    pub fn tick(
        &mut self,
        token: FrameToken,
        now_ms: f64,
        host: &mut dyn FrameScheduler,
        events: &mut Vec<CoreEvent>,
    ) -> bool {
        if self.state != PlaybackState::Playing || self.pending != Some(token) {
            self.metrics.stale_ticks += 1;
            log::trace!("ignoring stale frame {:?}", token);
            return false;
        }
        self.pending = None;

        let elapsed_ms = match self.last_tick_ms {
            Some(last) if now_ms.is_finite() => (now_ms - last).clamp(0.0, self.max_tick_ms),
            _ => 0.0,
        };
        if now_ms.is_finite() {
            self.last_tick_ms = Some(now_ms);
        }

        let multiplier = ease_multiplier(self.easing, self.progress());
        let delta = elapsed_ms / 1000.0 * self.speed * multiplier;
        let next = (self.current_time + delta).min(self.range_end);
        log::trace!("tick +{elapsed_ms}ms x{multiplier:.3} -> {next}");
        self.set_time(next, events);

        self.metrics.ticks_applied += 1;
        self.metrics.last_elapsed_ms = elapsed_ms;

        if self.current_time >= self.range_end {
            self.state = PlaybackState::Finished;
            self.last_tick_ms = None;
            events.push(CoreEvent::PlaybackFinished {
                time: self.current_time,
            });
            log::debug!("playback finished at {}", self.current_time);
        } else {
            self.request(host);
        }
        true
    }

    /// Cancel any pending frame and refuse all further commands.
    pub fn dispose(&mut self, host: &mut dyn FrameScheduler) {
        if self.state == PlaybackState::Disposed {
            return;
        }
        self.cancel(host);
        self.state = PlaybackState::Disposed;
        log::debug!("player disposed");
    }
}
