use serde::Deserialize;

/// Timing and spatial constants for the interaction engine.
///
/// Read from the optional `[engine]` table of a world file; any field left out
/// keeps its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tick_ms: u64,
    pub hold_delay_ms: u64,
    pub selection_window_ms: u64,
    pub settle_ms: u64,
    pub cue_gap_ms: u64,
    pub choice_retry_ms: u64,
    /// Distance covered per tick while the device reports motion.
    pub move_step: f64,
    pub listener_divisor: f64,
    pub listener_scale: f64,
    pub listener_z: f64,
    pub sound_root: String,
    /// Number cues preloaded at startup, at least. The manifest adds more
    /// when the world allows a longer menu.
    pub number_cues: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tick_ms: 100,
            hold_delay_ms: 2000,
            selection_window_ms: 4000,
            settle_ms: 500,
            cue_gap_ms: 600,
            choice_retry_ms: 500,
            move_step: 10.0,
            listener_divisor: 400.0,
            listener_scale: 40.0,
            listener_z: 2.0,
            sound_root: "world/sounds".to_string(),
            number_cues: 5,
        }
    }
}
