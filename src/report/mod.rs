//! Operator snapshot of a machine.
//!
//! A [`MachineReport`] captures everything an operator needs to service the
//! machine: state, supplies, coin stock, money waiting in the trays and any
//! change the machine failed to pay. It prints as plain text and encodes to
//! JSON or a compact binary form for shipping elsewhere. It is not meant for
//! restoring a machine.

use crate::catalog::{format_cents, CoinBag, Drink};
use crate::components::{CoinSlot, HeatingState};
use crate::core::{MachineState, Problem, StateHistory};
use crate::machine::{Inconsistency, VendingMachine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod error;

pub use error::ReportError;

/// Version identifier for report format
pub const REPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrinkLevel {
    pub drink: Drink,
    pub available: u32,
}

/// Serializable snapshot of a machine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MachineReport {
    /// Report format version
    pub version: u32,

    /// Unique report identifier
    pub id: String,

    /// When the report was taken
    pub timestamp: DateTime<Utc>,

    pub state: MachineState,

    /// Active problems, oldest first
    pub problems: Vec<Problem>,

    pub amount_inside: u32,
    pub chosen_drink: Option<Drink>,
    pub chosen_sugar: u8,
    pub heating: HeatingState,

    pub drinks: Vec<DrinkLevel>,
    pub coins: Vec<CoinSlot>,
    pub sugar_cubes: u32,
    pub cups: u32,
    pub spoons: u32,

    pub change_out: CoinBag,
    pub stuck_coins: CoinBag,
    pub swallowed_coins: CoinBag,

    /// Change owed to customers that could not be paid
    pub unpaid_change: Vec<Inconsistency>,

    /// Recent displayed-state transitions
    pub history: StateHistory<MachineState>,
}

impl MachineReport {
    pub fn capture(machine: &VendingMachine) -> Self {
        let stock = machine.stock();
        Self {
            version: REPORT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            state: machine.current_state(),
            problems: machine.problems().iter().collect(),
            amount_inside: machine.amount_inside(),
            chosen_drink: machine.chosen_drink().cloned(),
            chosen_sugar: machine.chosen_sugar(),
            heating: machine.heating().state(),
            drinks: machine
                .drinks()
                .iter()
                .map(|drink| DrinkLevel {
                    drink: drink.clone(),
                    available: stock.drink_level(drink),
                })
                .collect(),
            coins: machine.change_machine().slots(),
            sugar_cubes: stock.sugar_cubes(),
            cups: stock.cups(),
            spoons: stock.spoons(),
            change_out: machine.change_out().clone(),
            stuck_coins: machine.stuck_coins().clone(),
            swallowed_coins: machine.swallowed_coins().clone(),
            unpaid_change: machine.inconsistencies().to_vec(),
            history: machine.history().clone(),
        }
    }

    /// Total change owed but not paid, in cents.
    pub fn unpaid_total(&self) -> u64 {
        self.unpaid_change
            .iter()
            .map(|i| u64::from(i.amount))
            .sum()
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ReportError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        let report: Self = serde_json::from_str(json)
            .map_err(|e| ReportError::DeserializationFailed(e.to_string()))?;
        report.check_version()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ReportError> {
        bincode::serialize(self).map_err(|e| ReportError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReportError> {
        let report: Self = bincode::deserialize(bytes)
            .map_err(|e| ReportError::DeserializationFailed(e.to_string()))?;
        report.check_version()
    }

    fn check_version(self) -> Result<Self, ReportError> {
        if self.version != REPORT_VERSION {
            return Err(ReportError::UnsupportedVersion {
                found: self.version,
                supported: REPORT_VERSION,
            });
        }
        Ok(self)
    }
}

impl fmt::Display for MachineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "State: {}", self.state)?;
        writeln!(f)?;
        writeln!(f, "{} inserted.", format_cents(self.amount_inside))?;
        writeln!(
            f,
            "Water at {:.1}°, heater {}{}.",
            self.heating.temperature,
            if self.heating.heating { "on" } else { "off" },
            if self.heating.water_supply {
                ""
            } else {
                ", supply cut"
            }
        )?;

        writeln!(f, "\nDrink(s): ")?;
        for level in &self.drinks {
            writeln!(f, "{}: {} available.", level.drink.name(), level.available)?;
        }

        writeln!(f, "\nCoins:")?;
        for slot in &self.coins {
            let refused = if slot.accepted { "" } else { " (refused)" };
            writeln!(f, "{}: {} available{refused}.", slot.coin, slot.stock)?;
        }

        writeln!(f)?;
        writeln!(f, "{} cup(s) available.", self.cups)?;
        writeln!(f, "{} sugar cube(s) available.", self.sugar_cubes)?;
        write!(f, "{} spoon(s) available.", self.spoons)?;

        if !self.unpaid_change.is_empty() {
            let owed = u32::try_from(self.unpaid_total()).unwrap_or(u32::MAX);
            write!(f, "\n\nUnpaid change: {}.", format_cents(owed))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Coin;
    use crate::config::MachineConfig;

    fn machine() -> VendingMachine {
        let config = MachineConfig {
            seed: Some(3),
            ..MachineConfig::default()
        };
        VendingMachine::new(&config).unwrap()
    }

    #[test]
    fn capture_reflects_machine() {
        let mut machine = machine();
        machine.insert_coin(Coin::EURO_1);
        machine.insert_coin(Coin::CENT_50);

        let report = machine.report();
        assert_eq!(report.version, REPORT_VERSION);
        assert_eq!(report.state, MachineState::Idle);
        assert_eq!(report.amount_inside, 150);
        assert_eq!(report.drinks.len(), 8);
        assert_eq!(report.coins[1].coin, Coin::EURO_1);
        assert_eq!(report.coins[1].stock, 6);
        assert_eq!((report.cups, report.sugar_cubes, report.spoons), (10, 20, 8));
        assert!(report.unpaid_change.is_empty());
    }

    #[test]
    fn reports_have_unique_ids() {
        let machine = machine();
        assert_ne!(machine.report().id, machine.report().id);
    }

    #[test]
    fn text_lists_supplies() {
        let text = machine().report().to_string();

        assert!(text.starts_with("State: Idle\n"));
        assert!(text.contains("0.00 € inserted."));
        assert!(text.contains("Black Coffee: 5 available."));
        assert!(text.contains("2 €: 5 available."));
        assert!(text.contains("10 cup(s) available."));
        assert!(text.ends_with("8 spoon(s) available."));
    }

    #[test]
    fn json_round_trip_keeps_content() {
        let mut machine = machine();
        machine.insert_coin(Coin::CENT_20);
        let report = machine.report();

        let back = MachineReport::from_json(&report.to_json().unwrap()).unwrap();
        assert_eq!(back.id, report.id);
        assert_eq!(back.amount_inside, 20);
        assert_eq!(back.coins, report.coins);
        assert_eq!(back.drinks, report.drinks);
    }

    #[test]
    fn binary_round_trip_keeps_content() {
        let mut machine = machine();
        machine.insert_coin(Coin::EURO_2);
        machine.select_drink(&Drink::new("Tomato Soup", false, 100));
        let report = machine.report();
        assert_eq!(report.state, MachineState::Preparing);

        let back = MachineReport::from_bytes(&report.to_bytes().unwrap()).unwrap();
        assert_eq!(back.state, MachineState::Preparing);
        assert_eq!(back.change_out, report.change_out);
        assert_eq!(back.history.len(), 1);
    }

    #[test]
    fn rejects_other_versions() {
        let mut report = machine().report();
        report.version = REPORT_VERSION + 1;
        let json = report.to_json().unwrap();

        assert!(matches!(
            MachineReport::from_json(&json),
            Err(ReportError::UnsupportedVersion { found, supported })
                if found == REPORT_VERSION + 1 && supported == REPORT_VERSION
        ));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            MachineReport::from_bytes(&[1, 2, 3]),
            Err(ReportError::DeserializationFailed(_))
        ));
    }
}
