use js_sys::Function;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use seca_counter_core::{Config, CounterBoard, VisibilityTrigger};

mod mount;

pub use mount::{mount, CounterMount};

/// Counter board driven from JS: the caller owns the frame loop and the
/// visibility observer and applies the returned changes itself.
#[wasm_bindgen]
pub struct SecaCounters {
    core: CounterBoard,
}

pub(crate) fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Partial config objects fall back to defaults field by field.
pub(crate) fn config_from_js(config: JsValue) -> Result<Config, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        Ok(Config::default())
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))
    }
}

/// Visibility trigger backed by optional JS callbacks.
struct JsTrigger<'a> {
    observe: Option<&'a Function>,
    unobserve: Option<&'a Function>,
}

impl VisibilityTrigger for JsTrigger<'_> {
    fn observe(&mut self, sink: &str, threshold: f32) {
        if let Some(f) = self.observe {
            let res = f.call2(
                &JsValue::UNDEFINED,
                &JsValue::from_str(sink),
                &JsValue::from_f64(f64::from(threshold)),
            );
            if let Err(e) = res {
                log::warn!("observe callback failed for {sink}: {e:?}");
            }
        }
    }

    fn unobserve(&mut self, sink: &str) {
        if let Some(f) = self.unobserve {
            if let Err(e) = f.call1(&JsValue::UNDEFINED, &JsValue::from_str(sink)) {
                log::warn!("unobserve callback failed for {sink}: {e:?}");
            }
        }
    }
}

#[wasm_bindgen]
impl SecaCounters {
    /// Create a board. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new SecaCounters({ distance_unit: "mi" })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<SecaCounters, JsError> {
        console_error_panic_hook::set_once();
        Ok(SecaCounters {
            core: CounterBoard::new(config_from_js(config)?),
        })
    }

    /// Register a stat sink by handle with its initial label text.
    #[wasm_bindgen(js_name = register_stat)]
    pub fn register_stat(&mut self, sink: String, label: String) -> bool {
        self.core.register_stat(&sink, &label)
    }

    /// Register a magnitude sink by handle with its raw `data-count` value.
    #[wasm_bindgen(js_name = register_magnitude)]
    pub fn register_magnitude(&mut self, sink: String, count: String) -> bool {
        self.core.register_magnitude(&sink, &count)
    }

    /// Call `observe(sink, threshold)` for every sink awaiting activation.
    #[wasm_bindgen]
    pub fn attach(&mut self, observe: Function) {
        let mut trigger = JsTrigger {
            observe: Some(&observe),
            unobserve: None,
        };
        self.core.attach(&mut trigger);
    }

    /// Report a sink visible. Starts its run on the first report and calls
    /// `unobserve(sink)`; returns the run id, or undefined when nothing started.
    #[wasm_bindgen(js_name = on_visible)]
    pub fn on_visible(&mut self, sink: String, unobserve: Option<Function>) -> Option<u32> {
        let mut trigger = JsTrigger {
            observe: None,
            unobserve: unobserve.as_ref(),
        };
        self.core.on_visible(&sink, &mut trigger).map(|id| id.0)
    }

    /// Advance to `now` (a `performance.now()` timestamp). Returns Outputs JSON.
    #[wasm_bindgen]
    pub fn update(&mut self, now: f64) -> Result<JsValue, JsError> {
        let out = self.core.update(now);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// True when no run needs another frame.
    #[wasm_bindgen(js_name = is_idle)]
    pub fn is_idle(&self) -> bool {
        self.core.is_idle()
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
