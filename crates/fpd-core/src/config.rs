//! Engine configuration.
//!
//! Defaults reproduce the panel editor's stock behavior; a host may load
//! overrides from JSON, where every missing field keeps its default.

use serde::{Deserialize, Serialize};

/// Tunables for the interaction engine and its camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Smallest zoom factor the camera accepts. Default: **0.5**.
    pub min_zoom: f64,

    /// Largest zoom factor the camera accepts. Default: **10**.
    pub max_zoom: f64,

    /// Zoom applied when a document is first shown. Default: **0.93**.
    pub initial_zoom: f64,

    /// Initial margin as a fraction of the panel size. Default: **0.039**.
    pub initial_margin: f64,

    /// Upper bound on the decoration scale so handles and the cross
    /// marker stay small at high zoom. Default: **2**.
    pub decoration_scale_cap: f64,

    /// Extra grab distance around resize handles, in screen pixels.
    /// Default: **4**.
    pub handle_slop_px: f64,

    /// Close the readiness gate after every emitted commit, so the next
    /// gesture waits for the host to persist and acknowledge. Default: **true**.
    pub gate_on_commit: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 10.0,
            initial_zoom: 0.93,
            initial_margin: 0.039,
            decoration_scale_cap: 2.0,
            handle_slop_px: 4.0,
            gate_on_commit: true,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON override document.
    ///
    /// # Errors
    /// Returns the `serde_json` error when the input is not a valid config object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Clamp a zoom factor to `[min_zoom, max_zoom]`.
    pub fn clamp_zoom(&self, k: f64) -> f64 {
        k.clamp(self.min_zoom, self.max_zoom)
    }
}
