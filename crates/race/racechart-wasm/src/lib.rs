use js_sys::{Function, JSON};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use web_sys::console;

use racechart_core::{
    Config, Engine, FrameListener, FrameOutput, FrameScheduler, FrameToken, RaceError,
    RaceParams, RawTable, SubscriptionId,
};

#[wasm_bindgen]
pub struct RaceChart {
    core: Engine,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn warn(msg: &str, err: &JsValue) {
    console::warn_2(&JsValue::from_str(msg), err);
}

fn race_error(op: &str, err: RaceError) -> JsError {
    JsError::new(&format!("{op} {} error: {err}", err.category()))
}

/// Forwards frame requests to JS, typically `requestAnimationFrame` wrappers.
struct JsFrameScheduler {
    request: Function,
    cancel: Function,
}

impl FrameScheduler for JsFrameScheduler {
    fn request_frame(&mut self, token: FrameToken) {
        let arg = JsValue::from_f64(token.0 as f64);
        // A throwing host simply never delivers the frame.
        if let Err(err) = self.request.call1(&JsValue::UNDEFINED, &arg) {
            warn("racechart: request_frame callback threw", &err);
        }
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        let arg = JsValue::from_f64(token.0 as f64);
        if let Err(err) = self.cancel.call1(&JsValue::UNDEFINED, &arg) {
            warn("racechart: cancel_frame callback threw", &err);
        }
    }
}

/// Subscriber backed by a JS callback `(output) => void`.
///
/// The callback runs while the chart is borrowed, so it must not call back
/// into the same `RaceChart`; such calls throw and are logged here.
struct JsListener {
    f: Function,
}

impl FrameListener for JsListener {
    fn on_frame(&mut self, output: &FrameOutput) {
        let val = match swb::to_value(output) {
            Ok(val) => val,
            Err(e) => {
                let reason = JsValue::from_str(&e.to_string());
                warn("racechart: frame serialization failed", &reason);
                return;
            }
        };
        if let Err(err) = self.f.call1(&JsValue::UNDEFINED, &val) {
            warn("racechart: subscriber threw", &err);
        }
    }
}

fn parse_config(config: JsValue) -> Result<Config, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        Ok(Config::default())
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))
    }
}

#[wasm_bindgen]
impl RaceChart {
    /// Create an engine driven by polling. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new RaceChart({ default_speed: 2, easing: { kind: "linear" } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<RaceChart, JsError> {
        console_error_panic_hook::set_once();
        Ok(RaceChart {
            core: Engine::new(parse_config(config)?),
        })
    }

    /// Create an engine that asks JS for frames. `request(token)` must eventually
    /// call `tick(token, performance.now())`; `cancel(token)` must stop that call.
    #[wasm_bindgen(js_name = withFrameCallbacks)]
    pub fn with_frame_callbacks(
        config: JsValue,
        request: Function,
        cancel: Function,
    ) -> Result<RaceChart, JsError> {
        console_error_panic_hook::set_once();
        let host = JsFrameScheduler { request, cancel };
        Ok(RaceChart {
            core: Engine::with_scheduler(parse_config(config)?, Box::new(host)),
        })
    }

    /// Load a raw table `{ units, entities, values }`. Discards any configured race.
    #[wasm_bindgen(js_name = load_table)]
    pub fn load_table(&mut self, table: JsValue) -> Result<(), JsError> {
        if jsvalue_is_undefined_or_null(&table) {
            return Err(JsError::new("load_table: table is null/undefined"));
        }
        // Unit keys arrive as object property strings; the core JSON parser handles them.
        let s = JSON::stringify(&table)
            .map_err(|e| JsError::new(&format!("load_table stringify error: {:?}", e)))?
            .as_string()
            .ok_or_else(|| JsError::new("load_table: stringify produced non-string"))?;
        let raw = RawTable::from_json(&s).map_err(|e| race_error("load_table", e))?;
        self.core
            .load_table(&raw)
            .map_err(|e| race_error("load_table", e))
    }

    /// Build rankings for `{ range_start, range_end, top_n, filter?, value_mode? }`.
    /// Returns `{ units, empty, max_value }`.
    #[wasm_bindgen]
    pub fn configure(&mut self, params: JsValue) -> Result<JsValue, JsError> {
        let params: RaceParams =
            swb::from_value(params).map_err(|e| JsError::new(&format!("params error: {e}")))?;
        let report = self
            .core
            .configure(params)
            .map_err(|e| race_error("configure", e))?;
        swb::to_value(&report).map_err(|e| JsError::new(&format!("report error: {e}")))
    }

    #[wasm_bindgen]
    pub fn play(&mut self) -> Result<(), JsError> {
        let mut player = self.core.player().map_err(|e| race_error("play", e))?;
        player.play().map_err(|e| race_error("play", e))
    }

    #[wasm_bindgen]
    pub fn pause(&mut self) -> Result<(), JsError> {
        let mut player = self.core.player().map_err(|e| race_error("pause", e))?;
        player.pause();
        Ok(())
    }

    /// Seek while stopped. Returns the applied (clamped) time.
    #[wasm_bindgen]
    pub fn seek(&mut self, t: f64) -> Result<f64, JsError> {
        let mut player = self.core.player().map_err(|e| race_error("seek", e))?;
        player.seek(t).map_err(|e| race_error("seek", e))
    }

    /// Pause if needed, then seek. Meant for timeline sliders.
    #[wasm_bindgen]
    pub fn scrub(&mut self, t: f64) -> Result<f64, JsError> {
        self.core.scrub(t).map_err(|e| race_error("scrub", e))
    }

    #[wasm_bindgen(js_name = set_speed)]
    pub fn set_speed(&mut self, speed: f64) -> Result<(), JsError> {
        let mut player = self.core.player().map_err(|e| race_error("set_speed", e))?;
        player.set_speed(speed).map_err(|e| race_error("set_speed", e))
    }

    /// Deliver a frame. Returns the frame output, or undefined when the token is stale.
    #[wasm_bindgen]
    pub fn tick(&mut self, token: f64, now_ms: f64) -> Result<JsValue, JsError> {
        if !(token.is_finite() && token >= 0.0) {
            return Ok(JsValue::UNDEFINED);
        }
        match self.core.tick(FrameToken(token as u64), now_ms) {
            Some(out) => {
                swb::to_value(&out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
            }
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Token of the frame the player waits on, for hosts that poll.
    #[wasm_bindgen(js_name = pending_frame)]
    pub fn pending_frame(&self) -> Option<f64> {
        self.core.pending_frame().map(|t| t.0 as f64)
    }

    /// Frame at the current time, diffed against the previous output.
    #[wasm_bindgen(js_name = current_frame)]
    pub fn current_frame(&mut self) -> Result<JsValue, JsError> {
        let out = self
            .core
            .current_frame()
            .map_err(|e| race_error("current_frame", e))?;
        swb::to_value(&out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Register `callback(output)` for every tick and seek. Returns a subscription id.
    /// The callback must not call back into this chart; defer control calls
    /// (e.g. with `queueMicrotask`) instead. Errors it throws are logged to the console.
    #[wasm_bindgen]
    pub fn subscribe(&mut self, callback: Function) -> u32 {
        self.core.subscribe(JsListener { f: callback }).0
    }

    #[wasm_bindgen]
    pub fn unsubscribe(&mut self, id: u32) -> bool {
        self.core.unsubscribe(SubscriptionId(id))
    }

    /// Playback state name, or "unconfigured".
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        self.core
            .state()
            .map(|s| s.name().to_string())
            .unwrap_or_else(|| "unconfigured".to_string())
    }

    /// Events raised since the last produced frame.
    #[wasm_bindgen(js_name = drain_events)]
    pub fn drain_events(&mut self) -> Result<JsValue, JsError> {
        let events = self.core.drain_events();
        swb::to_value(&events).map_err(|e| JsError::new(&format!("events error: {e}")))
    }

    #[wasm_bindgen]
    pub fn metrics(&self) -> Result<JsValue, JsError> {
        match self.core.metrics() {
            Some(m) => swb::to_value(&m).map_err(|e| JsError::new(&format!("metrics error: {e}"))),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Stop for good and drop every subscriber.
    #[wasm_bindgen]
    pub fn dispose(&mut self) {
        self.core.dispose();
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
