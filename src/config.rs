use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which register the shift instructions (8XY6 and 8XYE) read their operand from. CHIP-8
/// interpreters have disagreed on this since the COSMAC VIP, so it's a knob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftSource {
    /// shift VX in place, ignoring VY
    Vx,
    /// shift VY and store the result in VX
    Vy,
}

impl Default for ShiftSource {
    fn default() -> Self {
        ShiftSource::Vx
    }
}

/// Behavioural knobs for the interpreter. Every field has a default, so a partial JSON
/// document such as `{"shift_source": "vy"}` is a valid configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shift_source: ShiftSource,

    /// FX55 and FX65 leave I pointing one past the last register stored/loaded
    pub load_store_increments_index: bool,

    /// FX1E sets VF to 1 when I + VX leaves the 12 bit address space, and to 0 otherwise
    pub index_overflow_sets_flag: bool,

    /// wall clock milliseconds between two timer ticks
    pub timer_interval_ms: u64,

    /// the most a single tick takes off the delay and sound timers
    pub timer_step: u8,

    /// seed for CXNN. None seeds from the OS
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            shift_source: ShiftSource::default(),
            load_store_increments_index: true,
            index_overflow_sets_flag: true,
            timer_interval_ms: 1000,
            timer_step: 60,
            rng_seed: None,
        }
    }
}

impl Config {
    /// Parse a configuration from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
