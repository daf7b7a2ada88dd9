//! Summary figures derived from a finished dive log.
//!
//! Pure functions over plain data: the log produced by the planner and the
//! parameters it was run with.

use serde::{Deserialize, Serialize};

use crate::consumption::remaining_pressure_bar;
use crate::gas::GasMix;
use crate::models::{DiveLog, DiveParameters, LogSample, Phase};
use crate::planner::TIME_STEP_MIN;

/// A staged hold during the ascent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoStop {
    /// Stop depth in metres
    pub depth_m: f64,
    /// Time spent at the stop in minutes
    pub duration_min: f64,
}

/// Summary of a planned dive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiveSummary {
    /// Runtime up to the last sample (minutes)
    pub total_time_min: f64,
    /// Time from leaving the bottom to surfacing (minutes)
    pub ascent_time_min: f64,
    /// Ascent time spent with a positive ceiling (minutes)
    pub deco_time_min: f64,
    /// Maximum depth reached
    pub max_depth_m: f64,
    /// Gas consumed over the dive, in surface litres
    pub gas_consumed_l: f64,
    /// Tank pressure left at the end of the dive (bar)
    pub final_pressure_bar: f64,
    /// Highest PPO2 over the dive (bar)
    pub max_ppo2_bar: f64,
    /// Maximum operating depth of the bottom gas
    pub bottom_mod_m: f64,
    /// Switch depth of the deco gas, if one is carried
    pub switch_depth_m: Option<f64>,
    /// Runtime at which the deco gas was first breathed
    pub gas_switch_time_min: Option<f64>,
    /// Staged stops, deepest first
    pub stops: Vec<DecoStop>,
}

impl DiveSummary {
    /// Compute the summary of `log`, planned from `params`.
    pub fn compute(params: &DiveParameters, log: &DiveLog) -> Self {
        let bottom = GasMix::from_percent(params.bottom_o2_percent);
        let deco = params.deco_o2_percent.map(GasMix::from_percent);

        let ascent: Vec<&LogSample> = log.phase_samples(Phase::Ascent).collect();
        let ascent_time_min = ascent.len() as f64 * TIME_STEP_MIN;
        let deco_time_min = ascent
            .iter()
            .filter(|s| s.ceiling_m.is_some_and(|c| c > 0.0))
            .count() as f64
            * TIME_STEP_MIN;

        let gas_switch_time_min = deco.and_then(|deco| {
            ascent
                .iter()
                .find(|s| s.o2_fraction == deco.o2_fraction && deco != bottom)
                .map(|s| s.time_min)
        });

        let max_depth_m = log.max_depth_m();

        DiveSummary {
            total_time_min: log.total_time_min(),
            ascent_time_min,
            deco_time_min,
            max_depth_m,
            gas_consumed_l: log.gas_consumed_l,
            final_pressure_bar: remaining_pressure_bar(
                params.start_pressure_bar,
                params.tank_volume_l,
                log.gas_consumed_l,
            ),
            max_ppo2_bar: log.max_ppo2(),
            bottom_mod_m: bottom.mod_m(),
            switch_depth_m: deco.map(|d| d.mod_m()),
            gas_switch_time_min,
            stops: extract_stops(&ascent),
        }
    }
}

/// Group consecutive ascent samples held at the same depth into stops.
///
/// A run of a single sample is ordinary travel, not a stop; surface samples
/// are never stops.
pub fn extract_stops(ascent: &[&LogSample]) -> Vec<DecoStop> {
    let mut stops = Vec::new();
    let mut i = 0;
    while i < ascent.len() {
        let depth = ascent[i].depth_m;
        let run = ascent[i..]
            .iter()
            .take_while(|s| s.depth_m == depth)
            .count();
        if run > 1 && depth > 0.0 {
            stops.push(DecoStop {
                depth_m: depth,
                duration_min: run as f64 * TIME_STEP_MIN,
            });
        }
        i += run;
    }
    stops
}
