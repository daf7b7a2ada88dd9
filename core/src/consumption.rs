//! Gas consumption and oxygen exposure accumulated alongside the simulation.

/// Running totals of gas used and PPO2 seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumptionTracker {
    /// Surface air consumption (litres per minute).
    sac_l_min: f64,
    consumed_l: f64,
    max_ppo2_bar: f64,
}

impl ConsumptionTracker {
    pub fn new(sac_l_min: f64) -> Self {
        ConsumptionTracker {
            sac_l_min,
            ..Default::default()
        }
    }

    /// Account for one timestep breathed at `ambient_bar` with oxygen
    /// fraction `o2_fraction`. Returns the PPO2 for the step.
    pub fn record(&mut self, ambient_bar: f64, o2_fraction: f64, dt_min: f64) -> f64 {
        self.consumed_l += self.sac_l_min * ambient_bar * dt_min;
        let ppo2 = ambient_bar * o2_fraction;
        self.max_ppo2_bar = self.max_ppo2_bar.max(ppo2);
        ppo2
    }

    /// Total gas consumed so far, in surface litres.
    pub fn consumed_l(&self) -> f64 {
        self.consumed_l
    }

    pub fn max_ppo2_bar(&self) -> f64 {
        self.max_ppo2_bar
    }
}

/// Tank pressure left after consuming `consumed_l` surface litres.
pub fn remaining_pressure_bar(start_pressure_bar: f64, tank_volume_l: f64, consumed_l: f64) -> f64 {
    start_pressure_bar - consumed_l / tank_volume_l
}
