//! Bühlmann ZH-L16C tissue model with gradient-factor ceilings.
//!
//! Holds the 16-compartment constant table, the per-run tissue state and the
//! ceiling calculation that bounds every ascent step. Tissues load a single
//! inert gas (nitrogen); the inert fraction is whatever is not oxygen.

// ============================================================================
// Physical Constants
// ============================================================================

/// Water vapour pressure in the lungs (bar).
pub const P_WATER_VAPOR: f64 = 0.0627;

/// Ambient pressure at the surface (bar).
pub const SURFACE_PRESSURE: f64 = 1.0;

/// Metres of seawater per bar.
pub const METERS_PER_BAR: f64 = 10.0;

/// Tissue inert gas pressure (bar) after full equilibration with air at the surface.
pub const INITIAL_TISSUE_PRESSURE: f64 = 0.79;

/// Staged stops are placed on multiples of this depth (metres).
pub const STOP_INCREMENT_M: f64 = 3.0;

// ============================================================================
// ZH-L16C Compartment Table
// ============================================================================

/// Number of tissue compartments.
pub const NUM_COMPARTMENTS: usize = 16;

/// Constants for one tissue compartment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compartment {
    /// Half-time in minutes.
    pub half_life_min: f64,
    /// 'a' coefficient (bar).
    pub a: f64,
    /// 'b' coefficient (dimensionless).
    pub b: f64,
}

impl Compartment {
    const fn new(half_life_min: f64, a: f64, b: f64) -> Self {
        Compartment { half_life_min, a, b }
    }

    /// Fraction of the pressure gradient left after `dt_min` minutes.
    fn decay(&self, dt_min: f64) -> f64 {
        (-std::f64::consts::LN_2 / self.half_life_min * dt_min).exp()
    }

    /// Tolerated ambient pressure (bar) for a tissue pressure under gradient factor `gf`.
    fn tolerated_ambient(&self, tissue_pressure: f64, gf: f64) -> f64 {
        (tissue_pressure - self.a * gf) / (gf / self.b + 1.0 - gf)
    }
}

/// N2 compartments 1–16.
pub const COMPARTMENTS: [Compartment; NUM_COMPARTMENTS] = [
    Compartment::new(4.0, 1.2599, 0.5050),
    Compartment::new(5.0, 1.0000, 0.6314),
    Compartment::new(8.0, 0.8618, 0.7222),
    Compartment::new(12.5, 0.7562, 0.7825),
    Compartment::new(18.5, 0.6667, 0.8126),
    Compartment::new(27.0, 0.5600, 0.8434),
    Compartment::new(38.3, 0.4947, 0.8693),
    Compartment::new(54.3, 0.4500, 0.8910),
    Compartment::new(77.0, 0.4187, 0.9092),
    Compartment::new(109.0, 0.3798, 0.9222),
    Compartment::new(146.0, 0.3497, 0.9319),
    Compartment::new(187.0, 0.3223, 0.9403),
    Compartment::new(239.0, 0.2850, 0.9477),
    Compartment::new(305.0, 0.2737, 0.9544),
    Compartment::new(390.0, 0.2523, 0.9602),
    Compartment::new(498.0, 0.2327, 0.9653),
];

// ============================================================================
// Pressure / depth conversion
// ============================================================================

/// Absolute ambient pressure (bar) at `depth_m`.
pub fn ambient_pressure(depth_m: f64) -> f64 {
    SURFACE_PRESSURE + depth_m / METERS_PER_BAR
}

/// Depth (metres) at which the ambient pressure is `pressure_bar`. May be negative.
pub fn depth_at_pressure(pressure_bar: f64) -> f64 {
    (pressure_bar - SURFACE_PRESSURE) * METERS_PER_BAR
}

/// Round a ceiling up to the next staged-stop depth.
///
/// Zero (or a negative ceiling) stays at the surface; anything in (0, 3] gives
/// 3 m, (3, 6] gives 6 m, and so on.
pub fn next_stop_depth(ceiling_m: f64) -> f64 {
    if ceiling_m <= 0.0 {
        return 0.0;
    }
    (ceiling_m / STOP_INCREMENT_M).ceil() * STOP_INCREMENT_M
}

// ============================================================================
// Gradient Factors
// ============================================================================

/// Gradient factor pair as fractions, `low` applied at the deepest point of
/// the dive and `high` at the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientFactors {
    pub low: f64,
    pub high: f64,
}

impl GradientFactors {
    /// Gradient factor at `depth_m`, linearly interpolated between `high`
    /// at the surface and `low` at `max_depth_m`.
    pub fn at_depth(&self, depth_m: f64, max_depth_m: f64) -> f64 {
        if max_depth_m <= 0.0 {
            return self.high;
        }
        let depth_m = depth_m.clamp(0.0, max_depth_m);
        let slope = (self.high - self.low) / (0.0 - max_depth_m);
        self.high + slope * depth_m
    }
}

// ============================================================================
// Tissue State
// ============================================================================

/// Result of a ceiling evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ceiling {
    /// Shallowest tolerated depth in metres (never negative).
    pub depth_m: f64,
    /// Index (0–15) of the compartment that sets the ceiling.
    pub leading_compartment: usize,
}

/// Inert gas pressure of the 16 tissue compartments.
#[derive(Debug, Clone, PartialEq)]
pub struct TissueState {
    pressures: [f64; NUM_COMPARTMENTS],
}

impl Default for TissueState {
    fn default() -> Self {
        Self::surface_equilibrium()
    }
}

impl TissueState {
    /// Initialise tissues at surface equilibrium (breathing air).
    pub fn surface_equilibrium() -> Self {
        TissueState {
            pressures: [INITIAL_TISSUE_PRESSURE; NUM_COMPARTMENTS],
        }
    }

    pub fn pressures(&self) -> &[f64; NUM_COMPARTMENTS] {
        &self.pressures
    }

    /// Expose all compartments to a breathing gas for `dt_min` minutes.
    ///
    /// `ambient_bar` — absolute ambient pressure.
    /// `inert_fraction` — inert gas fraction of the breathing gas.
    pub fn update(&mut self, ambient_bar: f64, inert_fraction: f64, dt_min: f64) {
        debug_assert!(dt_min >= 0.0, "timestep must not be negative");
        let p_alveolar = (ambient_bar - P_WATER_VAPOR) * inert_fraction;
        for (pressure, compartment) in self.pressures.iter_mut().zip(COMPARTMENTS.iter()) {
            *pressure = p_alveolar + (*pressure - p_alveolar) * compartment.decay(dt_min);
        }
    }

    /// Decompression ceiling at `current_depth_m` for a dive whose deepest
    /// point was `max_depth_m`.
    pub fn ceiling(
        &self,
        current_depth_m: f64,
        max_depth_m: f64,
        gradient_factors: GradientFactors,
    ) -> Ceiling {
        let gf = gradient_factors.at_depth(current_depth_m, max_depth_m);
        let mut max_ambient = f64::NEG_INFINITY;
        let mut leading = 0;
        for (i, (pressure, compartment)) in
            self.pressures.iter().zip(COMPARTMENTS.iter()).enumerate()
        {
            let tolerated = compartment.tolerated_ambient(*pressure, gf);
            if tolerated > max_ambient {
                max_ambient = tolerated;
                leading = i;
            }
        }
        Ceiling {
            depth_m: depth_at_pressure(max_ambient).max(0.0),
            leading_compartment: leading,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
