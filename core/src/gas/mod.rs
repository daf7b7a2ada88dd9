//! Breathing gases and gas selection.
//!
//! A dive carries a bottom gas and, optionally, a richer deco gas. The deco
//! gas becomes active during the ascent once the diver is at or above its
//! maximum operating depth.
//!
//! # Example
//!
//! ```
//! use decoplan_compute::gas::{maximum_operating_depth, parse_gas_mix};
//!
//! let ean50 = parse_gas_mix("EAN50").expect("valid label");
//! assert!((maximum_operating_depth(ean50.o2_fraction) - 22.0).abs() < 1e-9);
//! ```

pub mod parser;

pub use parser::parse_gas_mix;

use serde::{Deserialize, Serialize};

use crate::buhlmann::depth_at_pressure;
use crate::models::Phase;

/// Highest tolerated oxygen partial pressure (bar).
pub const PPO2_LIMIT: f64 = 1.6;

/// Oxygen content of air, in percent.
pub const AIR_O2_PERCENT: f64 = 21.0;

/// Maximum operating depth (metres) of a gas with oxygen fraction `o2_fraction`.
pub fn maximum_operating_depth(o2_fraction: f64) -> f64 {
    depth_at_pressure(PPO2_LIMIT / o2_fraction)
}

/// A nitrogen/oxygen breathing gas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasMix {
    /// Fraction of O2 (0.0–1.0)
    pub o2_fraction: f64,
}

impl GasMix {
    pub fn from_percent(o2_percent: f64) -> Self {
        GasMix {
            o2_fraction: o2_percent / 100.0,
        }
    }

    pub fn air() -> Self {
        Self::from_percent(AIR_O2_PERCENT)
    }

    /// Inert (nitrogen) fraction; oxygen and inert gas always sum to one.
    pub fn inert_fraction(&self) -> f64 {
        1.0 - self.o2_fraction
    }

    pub fn mod_m(&self) -> f64 {
        maximum_operating_depth(self.o2_fraction)
    }

    /// Oxygen partial pressure at the given absolute ambient pressure.
    pub fn ppo2(&self, ambient_bar: f64) -> f64 {
        ambient_bar * self.o2_fraction
    }

    /// Conventional name: "Air", "O2" or "EANnn".
    pub fn label(&self) -> String {
        let percent = (self.o2_fraction * 100.0).round();
        if percent == AIR_O2_PERCENT {
            "Air".to_string()
        } else if percent >= 100.0 {
            "O2".to_string()
        } else {
            format!("EAN{}", percent as u32)
        }
    }
}

/// The gases carried on a dive and the rule for choosing between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasPlan {
    pub bottom: GasMix,
    pub deco: Option<GasMix>,
}

impl GasPlan {
    pub fn new(bottom: GasMix, deco: Option<GasMix>) -> Self {
        GasPlan { bottom, deco }
    }

    /// Depth at or above which the deco gas is breathed during the ascent.
    ///
    /// Without a deco gas this is the bottom gas's own MOD, so switching to
    /// "the deco gas" is a no-op.
    pub fn switch_depth_m(&self) -> f64 {
        self.deco.unwrap_or(self.bottom).mod_m()
    }

    /// Gas breathed at `depth_m` during `phase`.
    pub fn active_gas(&self, depth_m: f64, phase: Phase) -> GasMix {
        match (phase, self.deco) {
            (Phase::Ascent, Some(deco)) if depth_m <= self.switch_depth_m() => deco,
            _ => self.bottom,
        }
    }
}
