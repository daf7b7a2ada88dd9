//! Phase simulator: descent, bottom and ceiling-controlled ascent.
//!
//! A run validates its [`DiveParameters`], then steps a private simulation
//! context through the three phases at a fixed timestep. Every step breathes
//! the active gas for one timestep, updates consumption and tissues, and
//! appends one [`LogSample`]. Nothing outlives the run except the returned
//! [`DiveLog`].

use tracing::{debug, trace, warn};

use crate::buhlmann::{ambient_pressure, next_stop_depth, GradientFactors, TissueState};
use crate::consumption::ConsumptionTracker;
use crate::error::DecoError;
use crate::gas::{GasMix, GasPlan};
use crate::models::{DiveLog, DiveParameters, LogSample, Phase};

/// Simulation timestep in minutes.
pub const TIME_STEP_MIN: f64 = 0.1;

/// Descent rate in metres per minute.
pub const DESCENT_RATE_M_MIN: f64 = 15.0;

/// Longest accepted bottom time in minutes.
pub const MAX_BOTTOM_TIME_MIN: f64 = 24.0 * 60.0;

/// Slack when comparing the target depth against the bottom gas MOD.
const MOD_TOLERANCE_M: f64 = 1e-9;

// ============================================================================
// Validated settings
// ============================================================================

/// Parameters checked and converted to the units the engine works in.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSettings {
    pub depth_m: f64,
    pub bottom_time_min: f64,
    pub ascent_rate_m_min: f64,
    pub sac_l_min: f64,
    pub gradient_factors: GradientFactors,
    pub gases: GasPlan,
    pub ascent_step_limit: u32,
    /// Conditions worth reporting that do not stop the run
    pub warnings: Vec<String>,
}

fn positive(field: &'static str, value: f64) -> Result<f64, DecoError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(DecoError::invalid(field, value, "must be positive"))
    }
}

fn percentage(field: &'static str, value: f64) -> Result<f64, DecoError> {
    if value > 0.0 && value <= 100.0 {
        Ok(value / 100.0)
    } else {
        Err(DecoError::invalid(field, value, "must be within (0, 100]"))
    }
}

impl PlanSettings {
    /// Validate `params`. Configuration errors are fatal; a deco gas that
    /// cannot change anything only produces a warning.
    pub fn from_parameters(params: &DiveParameters) -> Result<Self, DecoError> {
        let depth_m = positive("depth_m", params.depth_m)?;
        if !(params.bottom_time_min >= 0.0) {
            return Err(DecoError::invalid(
                "bottom_time_min",
                params.bottom_time_min,
                "must not be negative",
            ));
        }
        if params.bottom_time_min > MAX_BOTTOM_TIME_MIN {
            return Err(DecoError::invalid(
                "bottom_time_min",
                params.bottom_time_min,
                "must not exceed 1440 minutes",
            ));
        }
        let ascent_rate_m_min = positive("ascent_rate_m_min", params.ascent_rate_m_min)?;
        let sac_l_min = positive("sac_l_min", params.sac_l_min)?;
        positive("tank_volume_l", params.tank_volume_l)?;
        positive("start_pressure_bar", params.start_pressure_bar)?;
        if params.ascent_step_limit == 0 {
            return Err(DecoError::invalid(
                "ascent_step_limit",
                0.0,
                "must be at least one step",
            ));
        }

        let gf_low = percentage("gf_low", params.gf_low)?;
        let gf_high = percentage("gf_high", params.gf_high)?;
        if gf_low > gf_high {
            return Err(DecoError::GradientFactorOrder {
                gf_low: params.gf_low,
                gf_high: params.gf_high,
            });
        }

        let bottom = GasMix {
            o2_fraction: percentage("bottom_o2_percent", params.bottom_o2_percent)?,
        };
        let deco = params
            .deco_o2_percent
            .map(|percent| percentage("deco_o2_percent", percent))
            .transpose()?
            .map(|o2_fraction| GasMix { o2_fraction });

        let mod_m = bottom.mod_m();
        if depth_m > mod_m + MOD_TOLERANCE_M {
            return Err(DecoError::DepthExceedsMod { depth_m, mod_m });
        }

        let gases = GasPlan::new(bottom, deco);
        let mut warnings = Vec::new();
        if let Some(deco) = deco {
            if gases.switch_depth_m() >= depth_m {
                warnings.push(format!(
                    "{} switch depth {:.1} m is not shallower than the dive depth {} m; it is breathed for the whole ascent",
                    deco.label(),
                    gases.switch_depth_m(),
                    depth_m
                ));
            }
            if deco.o2_fraction <= bottom.o2_fraction {
                warnings.push(format!(
                    "deco gas {} is not richer than bottom gas {}",
                    deco.label(),
                    bottom.label()
                ));
            }
        }

        Ok(PlanSettings {
            depth_m,
            bottom_time_min: params.bottom_time_min,
            ascent_rate_m_min,
            sac_l_min,
            gradient_factors: GradientFactors {
                low: gf_low,
                high: gf_high,
            },
            gases,
            ascent_step_limit: params.ascent_step_limit,
            warnings,
        })
    }
}

// ============================================================================
// Simulation context
// ============================================================================

/// State owned by a single run.
struct Simulation<'a> {
    settings: &'a PlanSettings,
    tissues: TissueState,
    tracker: ConsumptionTracker,
    samples: Vec<LogSample>,
    step: u64,
}

impl<'a> Simulation<'a> {
    fn new(settings: &'a PlanSettings) -> Self {
        Simulation {
            settings,
            tissues: TissueState::surface_equilibrium(),
            tracker: ConsumptionTracker::new(settings.sac_l_min),
            samples: Vec::new(),
            step: 0,
        }
    }

    /// Elapsed time at the start of the current step.
    fn elapsed_min(&self) -> f64 {
        self.step as f64 * TIME_STEP_MIN
    }

    /// Breathe the active gas at `depth_m` for one timestep and log it.
    fn record(&mut self, depth_m: f64, phase: Phase, ceiling_m: Option<f64>) -> GasMix {
        let gas = self.settings.gases.active_gas(depth_m, phase);
        let ambient = ambient_pressure(depth_m);
        let ppo2_bar = self.tracker.record(ambient, gas.o2_fraction, TIME_STEP_MIN);
        self.tissues.update(ambient, gas.inert_fraction(), TIME_STEP_MIN);
        self.samples.push(LogSample {
            time_min: self.elapsed_min(),
            depth_m,
            phase,
            o2_fraction: gas.o2_fraction,
            ppo2_bar,
            ceiling_m,
            tissues: self.tissues.pressures().to_vec(),
        });
        self.step += 1;
        gas
    }

    fn descend(&mut self) {
        let step_m = DESCENT_RATE_M_MIN * TIME_STEP_MIN;
        let mut n: u64 = 0;
        loop {
            let depth_m = n as f64 * step_m;
            if depth_m >= self.settings.depth_m {
                break;
            }
            self.record(depth_m, Phase::Descent, None);
            n += 1;
        }
        debug!(time_min = self.elapsed_min(), steps = n, "descent complete");
    }

    fn hold_bottom(&mut self) {
        let steps = (self.settings.bottom_time_min / TIME_STEP_MIN).round() as u64;
        for _ in 0..steps {
            self.record(self.settings.depth_m, Phase::Bottom, None);
        }
        debug!(time_min = self.elapsed_min(), steps, "bottom phase complete");
    }

    fn ascend(&mut self) -> Result<(), DecoError> {
        self.ascend_from(self.settings.depth_m)
    }

    /// Ascend from `start_depth_m` under the ceiling until the surface is
    /// reached with no remaining obligation, or the step limit runs out.
    fn ascend_from(&mut self, start_depth_m: f64) -> Result<(), DecoError> {
        let max_depth_m = self.settings.depth_m;
        let gf = self.settings.gradient_factors;
        let travel_m = self.settings.ascent_rate_m_min * TIME_STEP_MIN;

        let mut depth_m = start_depth_m;
        let mut gas = self.settings.gases.bottom;
        let mut current_stop: Option<f64> = None;

        for _ in 0..self.settings.ascent_step_limit {
            let ceiling = self.tissues.ceiling(depth_m, max_depth_m, gf);
            let next_stop = next_stop_depth(ceiling.depth_m);

            // Never go shallower than the next stop; never descend.
            if depth_m > next_stop {
                depth_m = (depth_m - travel_m).max(next_stop);
            }

            if next_stop > 0.0 && depth_m == next_stop && current_stop != Some(next_stop) {
                trace!(
                    stop_m = next_stop,
                    ceiling_m = ceiling.depth_m,
                    leading_compartment = ceiling.leading_compartment,
                    time_min = self.elapsed_min(),
                    "reached stop"
                );
                current_stop = Some(next_stop);
            }

            let breathed = self.record(depth_m, Phase::Ascent, Some(ceiling.depth_m));
            if breathed != gas {
                debug!(
                    depth_m,
                    time_min = self.elapsed_min(),
                    gas = %breathed.label(),
                    "gas switch"
                );
                gas = breathed;
            }

            if depth_m <= 0.0 && self.tissues.ceiling(0.0, max_depth_m, gf).depth_m <= 0.0 {
                debug!(time_min = self.elapsed_min(), "surfaced");
                return Ok(());
            }
        }

        let ceiling_m = self.tissues.ceiling(depth_m, max_depth_m, gf).depth_m;
        warn!(
            elapsed_min = self.elapsed_min(),
            depth_m,
            ceiling_m,
            "ascent step limit reached before decompression completed"
        );
        Err(DecoError::IncompleteDecompression {
            elapsed_min: self.elapsed_min(),
            depth_m,
            ceiling_m,
        })
    }

    fn finish(self) -> DiveLog {
        DiveLog {
            samples: self.samples,
            gas_consumed_l: self.tracker.consumed_l(),
            warnings: self.settings.warnings.clone(),
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Simulate a complete dive and return its log.
///
/// Deterministic: the same parameters always give the same log.
pub fn plan(params: &DiveParameters) -> Result<DiveLog, DecoError> {
    let settings = PlanSettings::from_parameters(params)?;
    for warning in &settings.warnings {
        warn!("{}", warning);
    }

    let mut sim = Simulation::new(&settings);
    sim.descend();
    sim.hold_bottom();
    sim.ascend()?;
    Ok(sim.finish())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buhlmann::NUM_COMPARTMENTS;

    fn params(depth_m: f64, bottom_time_min: f64) -> DiveParameters {
        DiveParameters {
            depth_m,
            bottom_time_min,
            bottom_o2_percent: 21.0,
            ..Default::default()
        }
    }

    fn ascent(log: &DiveLog) -> Vec<&LogSample> {
        log.phase_samples(Phase::Ascent).collect()
    }

    #[test]
    fn test_time_axis_and_sample_shape() {
        let cases = [
            params(18.0, 20.0),
            params(40.0, 25.0),
            DiveParameters {
                deco_o2_percent: Some(50.0),
                ..params(45.0, 20.0)
            },
            DiveParameters::default(),
        ];
        for p in &cases {
            let log = plan(p).unwrap();
            assert!(!log.samples.is_empty());
            for (i, s) in log.samples.iter().enumerate() {
                assert_eq!(s.time_min, i as f64 * TIME_STEP_MIN);
                assert_eq!(s.tissues.len(), NUM_COMPARTMENTS);
                assert!(s.depth_m >= 0.0, "negative depth at sample {i}");
            }
            for pair in log.samples.windows(2) {
                assert!(pair[1].time_min > pair[0].time_min);
            }
        }
    }

    #[test]
    fn test_phases_are_ordered() {
        let log = plan(&params(30.0, 15.0)).unwrap();
        let order = |p: Phase| match p {
            Phase::Descent => 0,
            Phase::Bottom => 1,
            Phase::Ascent => 2,
        };
        for pair in log.samples.windows(2) {
            assert!(order(pair[0].phase) <= order(pair[1].phase));
        }
        assert_eq!(log.samples[0].phase, Phase::Descent);
        assert_eq!(log.samples[0].depth_m, 0.0);
        assert_eq!(log.samples.last().unwrap().phase, Phase::Ascent);
        assert_eq!(log.samples.last().unwrap().depth_m, 0.0);
    }

    #[test]
    fn test_descent_and_bottom_steps() {
        let log = plan(&params(30.0, 15.0)).unwrap();
        // 30 m at 1.5 m per step: depths 0.0 .. 28.5
        assert_eq!(log.phase_samples(Phase::Descent).count(), 20);
        assert_eq!(log.phase_samples(Phase::Bottom).count(), 150);
        assert!(log
            .phase_samples(Phase::Bottom)
            .all(|s| s.depth_m == 30.0 && s.ceiling_m.is_none()));
        assert!(log.phase_samples(Phase::Ascent).all(|s| s.ceiling_m.is_some()));
    }

    #[test]
    fn test_zero_bottom_time() {
        let log = plan(&params(20.0, 0.0)).unwrap();
        assert_eq!(log.phase_samples(Phase::Bottom).count(), 0);
        assert_eq!(log.samples.last().unwrap().depth_m, 0.0);
    }

    #[test]
    fn test_deterministic() {
        let p = DiveParameters {
            deco_o2_percent: Some(50.0),
            ..params(45.0, 25.0)
        };
        let a = plan(&p).unwrap();
        let b = plan(&p).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_consumption_increases_with_bottom_time_and_depth() {
        let short = plan(&params(30.0, 20.0)).unwrap().gas_consumed_l;
        let long = plan(&params(30.0, 30.0)).unwrap().gas_consumed_l;
        assert!(long > short, "long={long}, short={short}");

        let shallow = plan(&params(20.0, 20.0)).unwrap().gas_consumed_l;
        let deep = plan(&params(30.0, 20.0)).unwrap().gas_consumed_l;
        assert!(deep > shallow, "deep={deep}, shallow={shallow}");
    }

    #[test]
    fn test_gas_switch_at_mod() {
        let p = DiveParameters {
            deco_o2_percent: Some(50.0),
            ..params(40.0, 25.0)
        };
        let settings = PlanSettings::from_parameters(&p).unwrap();
        let switch_depth = settings.gases.switch_depth_m();
        assert!((switch_depth - 22.0).abs() < 1e-9);

        let log = plan(&p).unwrap();
        let ascent = ascent(&log);
        for s in &ascent {
            let expected = if s.depth_m <= switch_depth { 0.5 } else { 0.21 };
            assert_eq!(
                s.o2_fraction, expected,
                "wrong gas at {} m (t={})",
                s.depth_m, s.time_min
            );
        }
        let first_deco = ascent.iter().position(|s| s.o2_fraction == 0.5).unwrap();
        assert!(first_deco > 0);
        assert!(ascent[first_deco - 1].depth_m > switch_depth);
        assert!(ascent[first_deco].depth_m <= switch_depth);

        // Bottom gas only before the ascent
        assert!(log
            .samples
            .iter()
            .filter(|s| s.phase != Phase::Ascent)
            .all(|s| s.o2_fraction == 0.21));
    }

    #[test]
    fn test_ppo2_follows_active_gas() {
        let p = DiveParameters {
            deco_o2_percent: Some(50.0),
            ..params(40.0, 25.0)
        };
        let log = plan(&p).unwrap();
        for s in &log.samples {
            let expected = ambient_pressure(s.depth_m) * s.o2_fraction;
            assert!((s.ppo2_bar - expected).abs() < 1e-12);
        }
        // 22 m on EAN50 is exactly the 1.6 bar limit
        assert!((log.max_ppo2() - 1.6).abs() < 1e-9, "max ppo2 {}", log.max_ppo2());
    }

    #[test]
    fn test_no_stop_dive() {
        let p = DiveParameters {
            depth_m: 18.0,
            bottom_time_min: 20.0,
            gf_low: 30.0,
            gf_high: 70.0,
            bottom_o2_percent: 21.0,
            ..Default::default()
        };
        let log = plan(&p).unwrap();
        let ascent = ascent(&log);
        for pair in ascent.windows(2) {
            if pair[1].depth_m > 3.0 {
                assert!(
                    pair[1].depth_m < pair[0].depth_m,
                    "unexpected hold at {} m",
                    pair[1].depth_m
                );
            }
        }
        // Surfaces within a few minutes of leaving the bottom
        let ascent_time = ascent.len() as f64 * TIME_STEP_MIN;
        assert!(ascent_time < 10.0, "ascent took {ascent_time} min");
    }

    #[test]
    fn test_deco_dive_holds_at_stops() {
        let log = plan(&params(45.0, 30.0)).unwrap();
        let ascent = ascent(&log);
        let held_deeper_than_3m = ascent
            .windows(2)
            .any(|pair| pair[0].depth_m == pair[1].depth_m && pair[1].depth_m > 3.0);
        assert!(held_deeper_than_3m, "45 m / 30 min on air needs staged stops");
    }

    #[test]
    fn test_ascent_respects_ceiling() {
        let log = plan(&params(45.0, 30.0)).unwrap();
        let ascent = ascent(&log);
        let mut previous = 45.0;
        for s in &ascent {
            assert!(s.depth_m <= previous, "ascent must never descend");
            if s.depth_m < previous {
                let stop = next_stop_depth(s.ceiling_m.unwrap());
                assert!(
                    s.depth_m >= stop,
                    "moved to {} m above stop {} m",
                    s.depth_m,
                    stop
                );
            }
            previous = s.depth_m;
        }
    }

    #[test]
    fn test_stops_land_on_three_metre_grid() {
        let log = plan(&params(45.0, 30.0)).unwrap();
        let ascent = ascent(&log);
        for pair in ascent.windows(2) {
            if pair[0].depth_m == pair[1].depth_m {
                let depth = pair[1].depth_m;
                assert_eq!(depth, (depth / 3.0).round() * 3.0, "hold at {depth} m");
            }
        }
    }

    #[test]
    fn test_surfaces_clear() {
        let p = DiveParameters {
            deco_o2_percent: Some(50.0),
            ..params(50.0, 30.0)
        };
        let settings = PlanSettings::from_parameters(&p).unwrap();
        let log = plan(&p).unwrap();
        let last = log.samples.last().unwrap();
        assert_eq!(last.depth_m, 0.0);

        let mut tissues = TissueState::surface_equilibrium();
        for s in &log.samples {
            let gas = settings.gases.active_gas(s.depth_m, s.phase);
            tissues.update(ambient_pressure(s.depth_m), gas.inert_fraction(), TIME_STEP_MIN);
        }
        assert_eq!(tissues.pressures().to_vec(), last.tissues);
        assert_eq!(
            tissues
                .ceiling(0.0, p.depth_m, settings.gradient_factors)
                .depth_m,
            0.0
        );
    }

    #[test]
    fn test_deco_gas_shortens_ascent() {
        let air_only = plan(&params(45.0, 30.0)).unwrap();
        let with_deco = plan(&DiveParameters {
            deco_o2_percent: Some(50.0),
            ..params(45.0, 30.0)
        })
        .unwrap();
        assert!(with_deco.total_time_min() < air_only.total_time_min());
    }

    fn assert_ascent_follows_stops(log: &DiveLog) {
        let ascent = ascent(log);
        assert!(!ascent.is_empty());
        for s in &ascent {
            let stop = next_stop_depth(s.ceiling_m.unwrap());
            assert!(
                s.depth_m >= stop,
                "{} m is shallower than stop {} m (t={})",
                s.depth_m,
                stop,
                s.time_min
            );
        }
        for pair in ascent.windows(2) {
            if pair[0].depth_m == pair[1].depth_m {
                let depth = pair[1].depth_m;
                assert_eq!(depth % 3.0, 0.0, "hold off the 3 m grid at {depth} m");
            }
        }
        assert_eq!(ascent.last().unwrap().depth_m, 0.0);
    }

    #[test]
    fn test_uneven_ascent_rates_snap_to_stops() {
        for rate in [9.0, 7.0] {
            let p = DiveParameters {
                ascent_rate_m_min: rate,
                ..params(45.0, 30.0)
            };
            let log = plan(&p).unwrap();
            assert_ascent_follows_stops(&log);

            let ascent = ascent(&log);
            let travel = rate * TIME_STEP_MIN;
            // At least one stop is reached by a step shorter than the full travel
            let snapped = ascent.windows(2).any(|pair| {
                let moved = pair[0].depth_m - pair[1].depth_m;
                moved > 0.0
                    && moved < travel - 1e-9
                    && pair[1].depth_m > 0.0
                    && pair[1].depth_m % 3.0 == 0.0
            });
            assert!(snapped, "no shortened step onto a stop at {rate} m/min");
            let held = ascent
                .windows(2)
                .any(|pair| pair[0].depth_m == pair[1].depth_m && pair[1].depth_m > 3.0);
            assert!(held, "45 m / 30 min at {rate} m/min needs staged stops");
        }
    }

    #[test]
    fn test_holds_when_stop_is_deeper_than_current_depth() {
        let p = DiveParameters {
            ascent_step_limit: 20,
            ..params(30.0, 0.0)
        };
        let settings = PlanSettings::from_parameters(&p).unwrap();
        let mut sim = Simulation::new(&settings);
        // Saturate every compartment at about 8 bar
        sim.tissues.update(ambient_pressure(92.0), 0.79, 10_000.0);
        let ceiling = sim.tissues.ceiling(30.0, 30.0, settings.gradient_factors);
        assert!(next_stop_depth(ceiling.depth_m) > 30.0, "{ceiling:?}");

        let result = sim.ascend();
        assert!(matches!(
            result,
            Err(DecoError::IncompleteDecompression { depth_m, .. }) if depth_m == 30.0
        ));
        assert_eq!(sim.samples.len(), 20);
        assert!(sim.samples.iter().all(|s| s.depth_m == 30.0));
    }

    #[test]
    fn test_holds_at_surface_until_ceiling_clears() {
        let settings = PlanSettings::from_parameters(&params(18.0, 0.0)).unwrap();
        let gf = settings.gradient_factors;
        let mut sim = Simulation::new(&settings);
        // Saturated at 7 m: residual surface ceiling of about 1 m
        sim.tissues.update(ambient_pressure(7.0), 0.79, 10_000.0);
        assert!(sim.tissues.ceiling(0.0, 18.0, gf).depth_m > 0.0);

        sim.ascend_from(0.0).unwrap();
        assert!(sim.samples.len() > 1);
        assert!(sim.samples.iter().all(|s| s.depth_m == 0.0));
        // Every sample but the last still had an obligation before its step
        let last = sim.samples.last().unwrap();
        assert!(sim.samples[..sim.samples.len() - 1]
            .iter()
            .all(|s| s.ceiling_m.unwrap() > 0.0));
        assert_eq!(sim.tissues.ceiling(0.0, 18.0, gf).depth_m, 0.0);
        assert_eq!(last.phase, Phase::Ascent);
    }

    #[test]
    fn test_step_limit_reports_incomplete_decompression() {
        let p = DiveParameters {
            ascent_step_limit: 50,
            ..params(45.0, 30.0)
        };
        match plan(&p) {
            Err(DecoError::IncompleteDecompression {
                elapsed_min,
                depth_m,
                ceiling_m,
            }) => {
                assert!(elapsed_min > 30.0);
                assert!(depth_m > 0.0);
                assert!(ceiling_m > 0.0);
            }
            other => panic!("expected incomplete decompression, got {other:?}"),
        }
    }

    #[test]
    fn test_default_limit_terminates_long_dive() {
        let p = DiveParameters {
            gf_low: 10.0,
            gf_high: 30.0,
            ..params(60.0, 60.0)
        };
        let log = plan(&p).unwrap();
        let ascent_steps = log.phase_samples(Phase::Ascent).count();
        assert!(ascent_steps <= p.ascent_step_limit as usize);
        assert_eq!(log.samples.last().unwrap().depth_m, 0.0);
    }

    #[test]
    fn test_bottom_time_bound() {
        let longest = DiveParameters {
            bottom_time_min: MAX_BOTTOM_TIME_MIN,
            ..params(10.0, 0.0)
        };
        let settings = PlanSettings::from_parameters(&longest).unwrap();
        assert_eq!(settings.bottom_time_min, 1440.0);

        let err = PlanSettings::from_parameters(&DiveParameters {
            bottom_time_min: 1e15,
            ..longest
        })
        .unwrap_err();
        assert!(matches!(
            err,
            DecoError::InvalidParameter { field: "bottom_time_min", .. }
        ));
    }

    #[test]
    fn test_validation_errors() {
        let base = DiveParameters::default();
        let invalid = [
            DiveParameters { depth_m: 0.0, ..base.clone() },
            DiveParameters { depth_m: f64::NAN, ..base.clone() },
            DiveParameters { bottom_time_min: -1.0, ..base.clone() },
            DiveParameters { bottom_time_min: f64::INFINITY, ..base.clone() },
            DiveParameters { bottom_time_min: 1e15, ..base.clone() },
            DiveParameters { bottom_time_min: MAX_BOTTOM_TIME_MIN + 0.1, ..base.clone() },
            DiveParameters { ascent_rate_m_min: 0.0, ..base.clone() },
            DiveParameters { sac_l_min: -3.0, ..base.clone() },
            DiveParameters { tank_volume_l: 0.0, ..base.clone() },
            DiveParameters { start_pressure_bar: 0.0, ..base.clone() },
            DiveParameters { gf_low: 0.0, ..base.clone() },
            DiveParameters { gf_high: 120.0, ..base.clone() },
            DiveParameters { bottom_o2_percent: 0.0, ..base.clone() },
            DiveParameters { deco_o2_percent: Some(101.0), ..base.clone() },
            DiveParameters { ascent_step_limit: 0, ..base.clone() },
        ];
        for p in &invalid {
            assert!(
                matches!(plan(p), Err(DecoError::InvalidParameter { .. })),
                "expected invalid parameter for {p:?}"
            );
        }

        let reversed = DiveParameters {
            gf_low: 80.0,
            gf_high: 30.0,
            ..base.clone()
        };
        assert!(matches!(
            plan(&reversed),
            Err(DecoError::GradientFactorOrder { .. })
        ));

        let too_deep = DiveParameters {
            depth_m: 45.0,
            bottom_o2_percent: 32.0,
            ..base
        };
        assert!(matches!(
            plan(&too_deep),
            Err(DecoError::DepthExceedsMod { .. })
        ));
    }

    #[test]
    fn test_depth_at_mod_is_allowed() {
        // EAN32 has a MOD of exactly 40 m
        let log = plan(&DiveParameters::default()).unwrap();
        assert_eq!(log.max_depth_m(), 40.0);
    }

    #[test]
    fn test_deco_gas_warnings() {
        let deep_switch = DiveParameters {
            deco_o2_percent: Some(32.0),
            ..params(30.0, 20.0)
        };
        let log = plan(&deep_switch).unwrap();
        assert_eq!(log.warnings.len(), 1);
        assert!(log.warnings[0].contains("EAN32"));
        // Switch depth is deeper than the dive, so the whole ascent is on deco gas
        assert!(log.phase_samples(Phase::Ascent).all(|s| s.o2_fraction == 0.32));

        let lean = DiveParameters {
            bottom_o2_percent: 32.0,
            deco_o2_percent: Some(28.0),
            ..params(30.0, 20.0)
        };
        let settings = PlanSettings::from_parameters(&lean).unwrap();
        assert_eq!(settings.warnings.len(), 2);
        assert!(settings.warnings[1].contains("not richer"));

        let none = PlanSettings::from_parameters(&params(30.0, 20.0)).unwrap();
        assert!(none.warnings.is_empty());
    }

    #[test]
    fn test_runs_are_independent_across_threads() {
        let shallow = params(20.0, 30.0);
        let deep = DiveParameters {
            deco_o2_percent: Some(50.0),
            ..params(45.0, 25.0)
        };
        let expected_shallow = plan(&shallow).unwrap();
        let expected_deep = plan(&deep).unwrap();

        let handles = [shallow, deep].map(|p| std::thread::spawn(move || plan(&p).unwrap()));
        let [a, b] = handles.map(|h| h.join().unwrap());
        assert_eq!(a, expected_shallow);
        assert_eq!(b, expected_deep);
    }
}
