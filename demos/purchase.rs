//! Purchase Walkthrough
//!
//! This example drives a machine through its tokio event loop the way a
//! front end would.
//!
//! Key concepts:
//! - Building a machine from the factory configuration
//! - Feeding customer actions in as events
//! - Receiving observer notifications over a channel
//! - Brew and heating timers delivered by the runtime
//!
//! Run with: cargo run --example purchase

use std::time::Duration;
use tokio::sync::mpsc;
use vendomat::machine::{ChannelObserver, Notification};
use vendomat::{runtime, Coin, Drink, Event, MachineBuilder, MachineState};

#[tokio::main]
async fn main() {
    println!("=== Vending Machine Purchase ===\n");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let machine = MachineBuilder::new()
        .brew_duration(Duration::from_millis(500))
        .observer(ChannelObserver::new(tx))
        .build()
        .unwrap();
    let (handle, task) = runtime::spawn(machine);

    let cappuccino = Drink::new("Cappuccino", true, 100);
    for event in [
        Event::CoinInserted(Coin::EURO_1),
        Event::CoinInserted(Coin::CENT_50),
        Event::DrinkButton(cappuccino),
        Event::MoreSugar,
        Event::MoreSugar,
        Event::Confirm,
    ] {
        handle.send(event).unwrap();
    }

    while let Some(notification) = rx.recv().await {
        match &notification {
            Notification::StateChanged(state) => println!("State: {state}"),
            Notification::TemporaryMessage(text) => println!("Display: {text}"),
            Notification::SugarChanged(sugar) => println!("Sugar: {sugar}"),
            Notification::ChangeOutChanged(coins) => println!("Change tray: {coins:?}"),
            _ => {}
        }
        if notification == Notification::StateChanged(MachineState::Idle) {
            break;
        }
    }

    handle.send(Event::TakeCup).unwrap();
    handle.send(Event::TakeChange).unwrap();

    let report = handle.report().await.unwrap();
    println!("\n{report}");

    handle.shutdown().unwrap();
    let machine = task.await.unwrap();
    println!("{} cups left", machine.stock().cups());

    println!("\n=== Example Complete ===");
}
