//! Notifications from the controller to a front end.

use crate::catalog::CoinBag;
use crate::core::MachineState;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// Receives every observable change, synchronously, at the point of mutation.
///
/// All methods default to no-ops so front ends implement only what they show.
pub trait MachineObserver: Send {
    fn on_state_changed(&mut self, _state: MachineState) {}

    fn on_amount_changed(&mut self, _cents: u32) {}

    /// Short-lived message shown over the default display text.
    fn on_temporary_message(&mut self, _text: &str) {}

    fn on_sugar_changed(&mut self, _sugar: u8) {}

    fn on_change_out_changed(&mut self, _change_out: &CoinBag) {}

    /// Whether coins are waiting in the change tray.
    fn on_change_tray_flag(&mut self, _occupied: bool) {}

    /// Whether a cup is waiting in the cup tray.
    fn on_cup_tray_flag(&mut self, _occupied: bool) {}

    fn on_temperature_changed(&mut self, _temperature: f64) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl MachineObserver for NullObserver {}

/// One observer callback as a value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    StateChanged(MachineState),
    AmountChanged(u32),
    TemporaryMessage(String),
    SugarChanged(u8),
    ChangeOutChanged(CoinBag),
    ChangeTrayFlag(bool),
    CupTrayFlag(bool),
    TemperatureChanged(f64),
}

/// Forwards callbacks over a channel, for front ends running elsewhere.
///
/// A closed receiver is not an error; notifications are dropped.
#[derive(Clone, Debug)]
pub struct ChannelObserver {
    sender: UnboundedSender<Notification>,
}

impl ChannelObserver {
    pub fn new(sender: UnboundedSender<Notification>) -> Self {
        Self { sender }
    }

    fn send(&self, notification: Notification) {
        let _ = self.sender.send(notification);
    }
}

impl MachineObserver for ChannelObserver {
    fn on_state_changed(&mut self, state: MachineState) {
        self.send(Notification::StateChanged(state));
    }

    fn on_amount_changed(&mut self, cents: u32) {
        self.send(Notification::AmountChanged(cents));
    }

    fn on_temporary_message(&mut self, text: &str) {
        self.send(Notification::TemporaryMessage(text.to_string()));
    }

    fn on_sugar_changed(&mut self, sugar: u8) {
        self.send(Notification::SugarChanged(sugar));
    }

    fn on_change_out_changed(&mut self, change_out: &CoinBag) {
        self.send(Notification::ChangeOutChanged(change_out.clone()));
    }

    fn on_change_tray_flag(&mut self, occupied: bool) {
        self.send(Notification::ChangeTrayFlag(occupied));
    }

    fn on_cup_tray_flag(&mut self, occupied: bool) {
        self.send(Notification::CupTrayFlag(occupied));
    }

    fn on_temperature_changed(&mut self, temperature: f64) {
        self.send(Notification::TemperatureChanged(temperature));
    }
}
