//! Engine: data ownership and the public API.
//!
//! Methods:
//! - load_table / load (entity store), configure (rankings + interpolator + player)
//! - player (play/pause/seek/set_speed/dispose), tick (host frame delivery)
//! - current_frame (poll), subscribe/unsubscribe (push), dispose

use std::fmt;

use crate::config::{Config, RaceParams};
use crate::data::{Entity, RawTable, ValueSource};
use crate::diff::diff_frames;
use crate::error::RaceError;
use crate::ids::{FrameToken, SubscriptionId};
use crate::interp::{InterpolatedFrame, Interpolator};
use crate::metrics::PlaybackMetrics;
use crate::outputs::{ConfigureReport, CoreEvent, FrameOutput};
use crate::player::{PlaybackState, Player};
use crate::ranking::{compute_all, SnapshotTable};
use crate::scheduler::{FrameScheduler, PolledFrames};
use crate::store::EntityStore;
use crate::subscribe::{FrameDispatcher, FrameListener};

/// Everything derived from one `configure()` call. Rebuilt wholesale on the next one.
#[derive(Debug)]
struct Race {
    params: RaceParams,
    interp: Interpolator,
    player: Player,
}

/// Ranked-timeline engine. Single-threaded; the host drives it frame by frame.
pub struct Engine {
    cfg: Config,
    store: Option<EntityStore>,
    race: Option<Race>,
    host: Box<dyn FrameScheduler>,
    dispatcher: FrameDispatcher,
    events: Vec<CoreEvent>,
    /// Frame most recently handed out, the baseline for the next diff.
    last_frame: Option<InterpolatedFrame>,
    /// First token the next player may issue.
    next_token: u64,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("cfg", &self.cfg)
            .field("store", &self.store)
            .field("race", &self.race)
            .field("dispatcher", &self.dispatcher)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

fn produce_frame(
    race: &mut Race,
    events: &mut Vec<CoreEvent>,
    last_frame: &mut Option<InterpolatedFrame>,
) -> FrameOutput {
    let frame = race.interp.at(race.player.current_time()).clone();
    let diff = diff_frames(last_frame.as_ref(), &frame);
    *last_frame = Some(frame.clone());
    FrameOutput {
        frame,
        diff,
        state: race.player.state(),
        progress: race.player.progress(),
        events: std::mem::take(events),
    }
}

impl Engine {
    /// Create an engine for a host that polls [`Engine::pending_frame`] each frame.
    pub fn new(cfg: Config) -> Self {
        Self::with_scheduler(cfg, Box::new(PolledFrames))
    }

    pub fn with_scheduler(cfg: Config, host: Box<dyn FrameScheduler>) -> Self {
        Self {
            cfg,
            store: None,
            race: None,
            host,
            dispatcher: FrameDispatcher::new(),
            events: Vec::new(),
            last_frame: None,
            next_token: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Load a self-contained raw table. Any configured race is discarded.
    pub fn load_table(&mut self, table: &RawTable) -> Result<(), RaceError> {
        let store = EntityStore::from_table(table)?;
        self.install_store(store);
        Ok(())
    }

    /// Load `catalog` × `units` from a pull-based source. Any configured race is discarded.
    pub fn load(
        &mut self,
        catalog: Vec<Entity>,
        units: &[i32],
        source: &dyn ValueSource,
    ) -> Result<(), RaceError> {
        let store = EntityStore::load(catalog, units, source)?;
        self.install_store(store);
        Ok(())
    }

    fn install_store(&mut self, store: EntityStore) {
        self.teardown_race();
        self.store = Some(store);
    }

    fn teardown_race(&mut self) {
        if let Some(mut race) = self.race.take() {
            race.player.dispose(self.host.as_mut());
            self.next_token = race.player.next_token().0;
        }
        self.last_frame = None;
    }

    /// (Re)build rankings, interpolator and player for `params`.
    ///
    /// The previous player is disposed first, so none of its pending frames can
    /// land. An empty result is reported, not failed.
    pub fn configure(&mut self, params: RaceParams) -> Result<ConfigureReport, RaceError> {
        let store = self.store.as_ref().ok_or(RaceError::NoData)?;
        params.validate()?;

        let table = compute_all(store, &params);
        let report = ConfigureReport {
            units: params.unit_count(),
            empty: table.is_empty(),
            max_value: table.max_value(),
        };

        self.teardown_race();
        let player = Player::new(params.range_start, params.range_end, &self.cfg)
            .with_first_token(self.next_token);
        let interp = Interpolator::new(table, self.cfg.missing_side, self.cfg.time_tolerance);

        self.events.push(CoreEvent::Configured {
            range_start: params.range_start,
            range_end: params.range_end,
            top_n: params.top_n,
        });
        if report.empty {
            log::warn!(
                "no entity ranks in {}..={} with filter {:?}",
                params.range_start,
                params.range_end,
                params.filter
            );
            self.events.push(CoreEvent::EmptyResult);
        }
        log::debug!(
            "configured race {}..={} top {} ({} units)",
            params.range_start,
            params.range_end,
            params.top_n,
            report.units
        );

        self.race = Some(Race {
            params,
            interp,
            player,
        });
        Ok(report)
    }

    /// Control surface of the configured player.
    pub fn player(&mut self) -> Result<PlayerControls<'_>, RaceError> {
        let Engine {
            race,
            host,
            dispatcher,
            events,
            last_frame,
            ..
        } = self;
        let race = race.as_mut().ok_or(RaceError::NotConfigured)?;
        Ok(PlayerControls {
            race,
            host,
            dispatcher,
            events,
            last_frame,
        })
    }

    /// Deliver the frame identified by `token` at host time `now_ms`.
    ///
    /// Returns the produced output (also pushed to subscribers), or `None` when
    /// the token is stale, the player is not running, or nothing is configured.
    pub fn tick(&mut self, token: FrameToken, now_ms: f64) -> Option<FrameOutput> {
        let race = self.race.as_mut()?;
        if !race
            .player
            .tick(token, now_ms, self.host.as_mut(), &mut self.events)
        {
            return None;
        }
        let out = produce_frame(race, &mut self.events, &mut self.last_frame);
        self.dispatcher.dispatch(&out);
        Some(out)
    }

    /// Frame the player is waiting on, for hosts that poll instead of scheduling.
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.race.as_ref().and_then(|r| r.player.pending_frame())
    }

    /// Frame at the current time, diffed against the previously produced frame.
    pub fn current_frame(&mut self) -> Result<FrameOutput, RaceError> {
        let race = self.race.as_mut().ok_or(RaceError::NotConfigured)?;
        Ok(produce_frame(race, &mut self.events, &mut self.last_frame))
    }

    /// Pause if playing, then seek. Returns the applied time.
    pub fn scrub(&mut self, t: f64) -> Result<f64, RaceError> {
        let mut player = self.player()?;
        player.pause();
        player.seek(t)
    }

    /// Register a listener invoked once per applied tick and once per seek.
    pub fn subscribe(&mut self, listener: impl FrameListener + 'static) -> SubscriptionId {
        self.dispatcher.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Stop the player for good and drop every listener. Configure again to start over.
    pub fn dispose(&mut self) {
        if let Some(race) = self.race.as_mut() {
            if race.player.state() != PlaybackState::Disposed {
                race.player.dispose(self.host.as_mut());
                self.events.push(CoreEvent::Disposed);
            }
        }
        self.dispatcher.clear();
    }

    /// Take the events raised since the last produced frame.
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn store(&self) -> Option<&EntityStore> {
        self.store.as_ref()
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.store.as_ref().and_then(|s| s.entity(id))
    }

    pub fn params(&self) -> Option<&RaceParams> {
        self.race.as_ref().map(|r| &r.params)
    }

    pub fn snapshots(&self) -> Option<&SnapshotTable> {
        self.race.as_ref().map(|r| r.interp.table())
    }

    pub fn state(&self) -> Option<PlaybackState> {
        self.race.as_ref().map(|r| r.player.state())
    }

    pub fn metrics(&self) -> Option<PlaybackMetrics> {
        self.race.as_ref().map(|r| {
            let mut m = r.player.metrics().clone();
            m.frames_computed = r.interp.frames_computed();
            m.cache_hits = r.interp.cache_hits();
            m
        })
    }
}

/// Borrowed control surface returned by [`Engine::player`].
pub struct PlayerControls<'a> {
    race: &'a mut Race,
    host: &'a mut Box<dyn FrameScheduler>,
    dispatcher: &'a mut FrameDispatcher,
    events: &'a mut Vec<CoreEvent>,
    last_frame: &'a mut Option<InterpolatedFrame>,
}

impl PlayerControls<'_> {
    pub fn play(&mut self) -> Result<(), RaceError> {
        self.race.player.play(self.host.as_mut(), self.events)
    }

    pub fn pause(&mut self) {
        self.race.player.pause(self.host.as_mut(), self.events)
    }

    /// Seek (clamped) and push the resulting frame to subscribers.
    pub fn seek(&mut self, t: f64) -> Result<f64, RaceError> {
        let applied = self.race.player.seek(t, self.events)?;
        let out = produce_frame(self.race, self.events, self.last_frame);
        self.dispatcher.dispatch(&out);
        Ok(applied)
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), RaceError> {
        self.race.player.set_speed(speed, self.events)
    }

    pub fn dispose(&mut self) {
        if self.race.player.state() != PlaybackState::Disposed {
            self.race.player.dispose(self.host.as_mut());
            self.events.push(CoreEvent::Disposed);
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.race.player.state()
    }

    pub fn current_time(&self) -> f64 {
        self.race.player.current_time()
    }

    pub fn is_playing(&self) -> bool {
        self.race.player.is_playing()
    }

    pub fn speed(&self) -> f64 {
        self.race.player.speed()
    }

    pub fn progress(&self) -> f64 {
        self.race.player.progress()
    }
}
