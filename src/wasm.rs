//! WebAssembly bindings for Ether Fluid.
//!
//! The JS worker owns one `WasmFluid`, forwards host messages to
//! `postMessage`, calls `frame` from its animation callback and composites
//! from `velocityData`.

use wasm_bindgen::prelude::*;

use crate::{
    compute::FieldStats,
    runtime::{NullCompositor, SimulationLoop},
    schema::{Command, FluidConfig},
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// WebAssembly wrapper for the simulation loop.
#[wasm_bindgen]
pub struct WasmFluid {
    sim: SimulationLoop<NullCompositor>,
}

#[wasm_bindgen]
impl WasmFluid {
    /// Create from an optional JSON configuration; missing keys take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmFluid, JsValue> {
        let config = match config_json {
            Some(json) => serde_json::from_str::<FluidConfig>(&json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?,
            None => FluidConfig::default(),
        };
        Ok(WasmFluid {
            sim: SimulationLoop::new(NullCompositor, config),
        })
    }

    /// Queue a host command object (`{ type: "...", ... }`).
    #[wasm_bindgen(js_name = postMessage)]
    pub fn post_message(&mut self, message: JsValue) -> Result<(), JsValue> {
        let command: Command = serde_wasm_bindgen::from_value(message)
            .map_err(|e| JsValue::from_str(&format!("Invalid command: {e}")))?;
        self.sim
            .post(command)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Apply queued commands and advance one frame. Returns whether a frame
    /// was produced.
    #[wasm_bindgen]
    pub fn frame(&mut self, now_ms: f64) -> bool {
        self.sim.tick(now_ms)
    }

    /// Outbound events since the last call, as an array of objects.
    #[wasm_bindgen(js_name = takeEvents)]
    pub fn take_events(&mut self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.sim.take_events())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Interleaved `[vx, vy, ...]` velocity, row-major from the bottom row.
    /// Empty before init.
    #[wasm_bindgen(js_name = velocityData)]
    pub fn velocity_data(&self) -> js_sys::Float32Array {
        match self.sim.state() {
            Some(state) => {
                let flat: &[f32] = bytemuck::cast_slice(state.solver.velocity().as_slice());
                js_sys::Float32Array::from(flat)
            }
            None => js_sys::Float32Array::new_with_length(0),
        }
    }

    /// Current grid width in cells (0 before init).
    #[wasm_bindgen(js_name = gridWidth)]
    pub fn grid_width(&self) -> usize {
        self.sim.state().map_or(0, |s| s.solver.grid().width)
    }

    /// Current grid height in cells (0 before init).
    #[wasm_bindgen(js_name = gridHeight)]
    pub fn grid_height(&self) -> usize {
        self.sim.state().map_or(0, |s| s.solver.grid().height)
    }

    /// Palette stops as `[[r, g, b], ...]` in `[0, 1]`.
    #[wasm_bindgen(js_name = getPalette)]
    pub fn get_palette(&self) -> Result<JsValue, JsValue> {
        let stops: Vec<[f32; 3]> = self.sim.palette().stops().iter().map(|c| c.to_unit()).collect();
        serde_wasm_bindgen::to_value(&stops)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Velocity statistics for the current frame.
    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        let stats = match self.sim.state() {
            Some(state) => FieldStats::compute(state.solver.velocity(), self.sim.config().boundary_mode()),
            None => FieldStats::default(),
        };
        serde_wasm_bindgen::to_value(&stats)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Whether `frame` will advance the simulation.
    #[wasm_bindgen(js_name = isScheduled)]
    pub fn is_scheduled(&self) -> bool {
        self.sim.is_scheduled()
    }
}
