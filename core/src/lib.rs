pub mod buhlmann;
pub mod consumption;
pub mod error;
pub mod gas;
pub mod metrics;
pub mod models;
pub mod planner;

uniffi::include_scaffolding!("decoplan");

pub use error::DecoError;
pub use gas::{maximum_operating_depth, parse_gas_mix, GasMix, GasPlan};
pub use metrics::{DecoStop, DiveSummary};
pub use models::{DiveLog, DiveParameters, LogSample, Phase};

/// Simulate the dive described by `params` and return its full log.
pub fn plan_dive(params: DiveParameters) -> Result<DiveLog, DecoError> {
    planner::plan(&params)
}

/// Summary figures (runtime, stops, tank pressure, max PPO2) for a planned dive.
pub fn summarize_dive(params: DiveParameters, log: DiveLog) -> DiveSummary {
    DiveSummary::compute(&params, &log)
}

/// Default parameters, for callers that start from the reference plan.
pub fn default_parameters() -> DiveParameters {
    DiveParameters::default()
}
