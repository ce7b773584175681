//! Event loop driving a machine in real time.
//!
//! [`spawn`] moves a [`VendingMachine`] into a single tokio task, which makes
//! that task the only writer. The task multiplexes commands from any number
//! of [`MachineHandle`]s, the heating tick and the pending brew deadline, and
//! applies them one at a time.
//!
//! # Example
//!
//! ```
//! use vendomat::builder::MachineBuilder;
//! use vendomat::catalog::Coin;
//! use vendomat::machine::Event;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let machine = MachineBuilder::new().seed(7).build()?;
//! let (handle, task) = vendomat::runtime::spawn(machine);
//!
//! handle.send(Event::CoinInserted(Coin::EURO_1))?;
//! assert_eq!(handle.report().await?.amount_inside, 100);
//!
//! handle.shutdown()?;
//! let machine = task.await?;
//! assert_eq!(machine.amount_inside(), 100);
//! # Ok(())
//! # }
//! ```

use crate::machine::{Event, MachineError, VendingMachine};
use crate::report::MachineReport;
use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("The machine event loop has stopped")]
    Stopped,

    #[error(transparent)]
    Machine(#[from] MachineError),
}

enum Command {
    Event {
        event: Event,
        reply: Option<oneshot::Sender<Result<(), MachineError>>>,
    },
    Report(oneshot::Sender<MachineReport>),
    Shutdown,
}

/// Cloneable handle to a running machine.
#[derive(Clone, Debug)]
pub struct MachineHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl MachineHandle {
    /// Queue an event without waiting for it to be applied.
    pub fn send(&self, event: Event) -> Result<(), RuntimeError> {
        self.commands
            .send(Command::Event { event, reply: None })
            .map_err(|_| RuntimeError::Stopped)
    }

    /// Apply an event and wait for its outcome.
    pub async fn apply(&self, event: Event) -> Result<(), RuntimeError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Event {
                event,
                reply: Some(reply),
            })
            .map_err(|_| RuntimeError::Stopped)?;
        outcome.await.map_err(|_| RuntimeError::Stopped)??;
        Ok(())
    }

    /// Snapshot the machine after every event queued so far.
    pub async fn report(&self) -> Result<MachineReport, RuntimeError> {
        let (reply, report) = oneshot::channel();
        self.commands
            .send(Command::Report(reply))
            .map_err(|_| RuntimeError::Stopped)?;
        report.await.map_err(|_| RuntimeError::Stopped)
    }

    /// Stop the loop once the events already queued are applied.
    pub fn shutdown(&self) -> Result<(), RuntimeError> {
        self.commands
            .send(Command::Shutdown)
            .map_err(|_| RuntimeError::Stopped)
    }
}

/// Run `machine` on its own task. The task returns the machine when stopped.
///
/// Must be called from within a tokio runtime.
pub fn spawn(machine: VendingMachine) -> (MachineHandle, JoinHandle<VendingMachine>) {
    let (commands, receiver) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(machine, receiver));
    (MachineHandle { commands }, task)
}

async fn run(
    mut machine: VendingMachine,
    mut commands: mpsc::UnboundedReceiver<Command>,
) -> VendingMachine {
    let period = machine.timing().heating_tick();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut brew: Option<(u64, Instant)> = None;

    info!("Machine event loop started");
    loop {
        // A newer brew request replaces any pending one.
        if let Some(timer) = machine.take_timer_requests().pop() {
            debug!("Brew #{} due in {:?}", timer.generation, timer.delay);
            brew = Some((timer.generation, Instant::now() + timer.delay));
        }
        let deadline = brew.map_or_else(Instant::now, |(_, at)| at);

        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Event { event, reply }) => {
                    let outcome = machine.handle(event);
                    if let Err(e) = &outcome {
                        warn!("Event rejected: {e}");
                    }
                    if let Some(reply) = reply {
                        let _ = reply.send(outcome);
                    }
                }
                Some(Command::Report(reply)) => {
                    let _ = reply.send(machine.report());
                }
                Some(Command::Shutdown) | None => break,
            },

            _ = ticker.tick() => machine.heating_tick(),

            _ = time::sleep_until(deadline), if brew.is_some() => {
                if let Some((generation, _)) = brew.take() {
                    machine.brew_timer_expired(generation);
                }
            }
        }
    }
    info!("Machine event loop stopped");
    machine
}
