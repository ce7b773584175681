//! Water heating simulation.
//!
//! The boiler relaxes toward the heater's target while the element is on
//! and toward room temperature while it is off, with a simple hysteresis
//! thermostat. Falling under the cold limit raises `ColdWater`; cutting
//! the supply raises `NoWater` and freezes the temperature.

use crate::core::Problem;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Thermostat switches the element on below this.
pub const MIN_TEMPERATURE: f64 = 90.0;
/// Thermostat switches the element off above this.
pub const MAX_TEMPERATURE: f64 = 96.0;
/// Below this the water is too cold to serve.
pub const COLD_LIMIT: f64 = 80.0;
/// Temperature of fresh water entering the boiler.
pub const RUNNING_WATER_TEMPERATURE: f64 = 60.0;
pub const INITIAL_TEMPERATURE: f64 = 90.1;
/// Temperature the element drives the water toward.
pub const HEATER_TEMPERATURE: f64 = 150.0;
pub const AMBIENT_TEMPERATURE: f64 = 20.0;
/// Fraction of the gap to the target closed per tick: h·A / (c·m).
pub const TRANSFER_RATE: f64 = 100.0 * 0.6 / (4.18 * 2500.0);

/// Fault changes produced by the simulation, applied by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeatingSignal {
    Raised(Problem),
    Cleared(Problem),
}

/// Observable boiler state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatingState {
    pub temperature: f64,
    pub heating: bool,
    pub water_supply: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeatingSystem {
    temperature: f64,
    heating: bool,
    water_supply: bool,
    cold: bool,
}

impl Default for HeatingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl HeatingSystem {
    pub fn new() -> Self {
        Self::with_temperature(INITIAL_TEMPERATURE)
    }

    /// Start from an arbitrary temperature with water running.
    ///
    /// Starting under the cold limit does not emit a signal; the first
    /// update does.
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            temperature,
            heating: false,
            water_supply: true,
            cold: false,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn is_heating(&self) -> bool {
        self.heating
    }

    pub fn is_water_supply_enabled(&self) -> bool {
        self.water_supply
    }

    pub fn is_cold(&self) -> bool {
        self.cold
    }

    pub fn state(&self) -> HeatingState {
        HeatingState {
            temperature: self.temperature,
            heating: self.heating,
            water_supply: self.water_supply,
        }
    }

    /// Advance the simulation by one period. Frozen while the water is cut.
    pub fn tick(&mut self) -> Option<HeatingSignal> {
        if !self.water_supply {
            return None;
        }
        let target = if self.heating {
            HEATER_TEMPERATURE
        } else {
            AMBIENT_TEMPERATURE
        };
        self.temperature += TRANSFER_RATE * (target - self.temperature);
        self.update()
    }

    /// Turn the water supply on or off.
    ///
    /// Restoring water refills the boiler with running water, which is
    /// usually cold enough to raise `ColdWater` right away.
    pub fn set_water_supply(&mut self, enabled: bool) -> Vec<HeatingSignal> {
        let mut signals = Vec::new();
        match (self.water_supply, enabled) {
            (false, true) => {
                info!("Water supply restored");
                self.water_supply = true;
                self.temperature = RUNNING_WATER_TEMPERATURE;
                signals.push(HeatingSignal::Cleared(Problem::NoWater));
                signals.extend(self.update());
            }
            (true, false) => {
                info!("Water supply cut");
                self.water_supply = false;
                signals.push(HeatingSignal::Raised(Problem::NoWater));
            }
            _ => {}
        }
        signals
    }

    /// A cup was filled: a fifth of the boiler is replaced by running water.
    pub fn drink_drawn(&mut self) -> Option<HeatingSignal> {
        if !self.water_supply {
            return None;
        }
        self.temperature = (4.0 * self.temperature + RUNNING_WATER_TEMPERATURE) / 5.0;
        self.update()
    }

    fn update(&mut self) -> Option<HeatingSignal> {
        if self.heating && self.temperature > MAX_TEMPERATURE {
            debug!("Heater off at {:.1}°", self.temperature);
            self.heating = false;
        } else if !self.heating && self.temperature < MIN_TEMPERATURE {
            debug!("Heater on at {:.1}°", self.temperature);
            self.heating = true;
        }

        if self.cold && self.temperature >= COLD_LIMIT {
            self.cold = false;
            Some(HeatingSignal::Cleared(Problem::ColdWater))
        } else if !self.cold && self.temperature < COLD_LIMIT {
            self.cold = true;
            Some(HeatingSignal::Raised(Problem::ColdWater))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_cools_and_switches_heater_on() {
        let mut heating = HeatingSystem::new();
        assert!(!heating.is_heating());

        assert_eq!(heating.tick(), None);
        assert!(heating.temperature() < INITIAL_TEMPERATURE);
        assert!(heating.is_heating());
    }

    #[test]
    fn thermostat_holds_band() {
        let mut heating = HeatingSystem::new();
        for _ in 0..5_000 {
            heating.tick();
            assert!(heating.temperature() > 85.0);
            assert!(heating.temperature() < 100.0);
        }
        assert!(!heating.is_cold());
    }

    #[test]
    fn heater_switches_off_above_max() {
        let mut heating = HeatingSystem::with_temperature(95.9);
        heating.tick(); // cools, but stays above the switch-on threshold
        assert!(!heating.is_heating());

        let mut heating = HeatingSystem::with_temperature(80.5);
        heating.tick();
        assert!(heating.is_heating());
        while heating.temperature() <= MAX_TEMPERATURE {
            heating.tick();
        }
        heating.tick();
        assert!(!heating.is_heating());
    }

    #[test]
    fn cutting_water_freezes_temperature() {
        let mut heating = HeatingSystem::new();
        let signals = heating.set_water_supply(false);
        assert_eq!(signals, vec![HeatingSignal::Raised(Problem::NoWater)]);

        let frozen = heating.temperature();
        for _ in 0..10 {
            assert_eq!(heating.tick(), None);
        }
        assert_eq!(heating.drink_drawn(), None);
        assert_eq!(heating.temperature(), frozen);
    }

    #[test]
    fn restoring_water_refills_with_cold_water() {
        let mut heating = HeatingSystem::new();
        heating.set_water_supply(false);

        let signals = heating.set_water_supply(true);
        assert_eq!(
            signals,
            vec![
                HeatingSignal::Cleared(Problem::NoWater),
                HeatingSignal::Raised(Problem::ColdWater),
            ]
        );
        assert_eq!(heating.temperature(), RUNNING_WATER_TEMPERATURE);
        assert!(heating.is_heating());
    }

    #[test]
    fn cold_water_clears_once_warm() {
        let mut heating = HeatingSystem::new();
        heating.set_water_supply(false);
        heating.set_water_supply(true);

        let mut ticks = 0;
        let cleared = loop {
            ticks += 1;
            if let Some(signal) = heating.tick() {
                break signal;
            }
            assert!(ticks < 1_000, "water never warmed up");
        };
        assert_eq!(cleared, HeatingSignal::Cleared(Problem::ColdWater));
        assert!(heating.temperature() >= COLD_LIMIT);
        assert_eq!(ticks, 44);
    }

    #[test]
    fn repeated_water_toggles_are_idempotent() {
        let mut heating = HeatingSystem::new();
        assert!(heating.set_water_supply(true).is_empty());
        heating.set_water_supply(false);
        assert!(heating.set_water_supply(false).is_empty());
    }

    #[test]
    fn drawing_a_drink_blends_running_water() {
        let mut heating = HeatingSystem::with_temperature(90.0);
        heating.drink_drawn();
        assert!((heating.temperature() - 84.0).abs() < 1e-9);

        let mut heating = HeatingSystem::with_temperature(82.0);
        assert_eq!(
            heating.drink_drawn(),
            Some(HeatingSignal::Raised(Problem::ColdWater))
        );
    }
}
