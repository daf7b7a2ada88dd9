use serde::{Deserialize, Serialize};

use crate::buhlmann::NUM_COMPARTMENTS;

/// Default cap on ascent timesteps (10 000 minutes at 0.1 min per step).
pub const DEFAULT_ASCENT_STEP_LIMIT: u32 = 100_000;

/// Input parameters for a single planning run.
///
/// Gradient factors and oxygen content are percentages, as entered by the
/// diver. They are converted to fractions by [`DiveParameters::validate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiveParameters {
    /// Target (maximum) depth in metres
    pub depth_m: f64,
    /// Time spent at target depth in minutes
    pub bottom_time_min: f64,
    /// Ascent rate in metres per minute
    pub ascent_rate_m_min: f64,
    /// Surface air consumption in litres per minute
    pub sac_l_min: f64,
    /// Tank water volume in litres
    pub tank_volume_l: f64,
    /// Tank pressure at the start of the dive (bar)
    pub start_pressure_bar: f64,
    /// Gradient factor low (percent)
    pub gf_low: f64,
    /// Gradient factor high (percent)
    pub gf_high: f64,
    /// Bottom gas oxygen content (percent)
    pub bottom_o2_percent: f64,
    /// Deco gas oxygen content (percent), if a deco gas is carried
    pub deco_o2_percent: Option<f64>,
    /// Maximum number of ascent timesteps before giving up
    pub ascent_step_limit: u32,
}

impl Default for DiveParameters {
    fn default() -> Self {
        DiveParameters {
            depth_m: 40.0,
            bottom_time_min: 20.0,
            ascent_rate_m_min: 10.0,
            sac_l_min: 19.0,
            tank_volume_l: 15.0,
            start_pressure_bar: 200.0,
            gf_low: 30.0,
            gf_high: 70.0,
            bottom_o2_percent: 32.0,
            deco_o2_percent: None,
            ascent_step_limit: DEFAULT_ASCENT_STEP_LIMIT,
        }
    }
}

/// Phase of the simulated dive. Phases only ever advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Descent,
    Bottom,
    Ascent,
}

/// One timestep of the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogSample {
    /// Elapsed time in minutes
    pub time_min: f64,
    /// Depth in metres
    pub depth_m: f64,
    pub phase: Phase,
    /// Oxygen fraction of the gas breathed during this step
    pub o2_fraction: f64,
    /// Inspired oxygen partial pressure (bar)
    pub ppo2_bar: f64,
    /// Unrounded decompression ceiling (metres), ascent samples only
    pub ceiling_m: Option<f64>,
    /// Inert gas pressure of each compartment after this step (bar)
    pub tissues: Vec<f64>,
}

/// Complete output of one planning run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiveLog {
    pub samples: Vec<LogSample>,
    /// Gas consumed over the whole dive, in surface litres
    pub gas_consumed_l: f64,
    /// Non-fatal configuration warnings
    pub warnings: Vec<String>,
}

impl DiveLog {
    /// Elapsed time of the last sample, or zero for an empty log.
    pub fn total_time_min(&self) -> f64 {
        self.samples.last().map(|s| s.time_min).unwrap_or(0.0)
    }

    /// Highest PPO2 seen over the dive.
    pub fn max_ppo2(&self) -> f64 {
        self.samples.iter().map(|s| s.ppo2_bar).fold(0.0, f64::max)
    }

    pub fn max_depth_m(&self) -> f64 {
        self.samples.iter().map(|s| s.depth_m).fold(0.0, f64::max)
    }

    /// Iterate the samples of a single phase.
    pub fn phase_samples(&self, phase: Phase) -> impl Iterator<Item = &LogSample> {
        self.samples.iter().filter(move |s| s.phase == phase)
    }

    /// Pressure series for one compartment, suitable for charting.
    pub fn compartment_series(&self, index: usize) -> Vec<f64> {
        if index >= NUM_COMPARTMENTS {
            return Vec::new();
        }
        self.samples.iter().map(|s| s.tissues[index]).collect()
    }
}
