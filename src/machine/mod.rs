//! The controller and its interfaces to the outside world.

mod controller;
mod event;
mod observer;

pub use controller::{
    Inconsistency, VendingMachine, MAX_SUGAR, MSG_COIN_NOT_RECOGNIZED, MSG_DRINK_READY,
    MSG_MAX_SUGAR, MSG_NO_CUPS, MSG_NO_EXACT_CHANGE, MSG_WAIT_PREPARATION,
};
pub use event::{BrewTimer, Event, MachineError};
pub use observer::{ChannelObserver, MachineObserver, NullObserver, Notification};
