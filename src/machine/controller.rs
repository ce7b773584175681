//! The vending machine controller.
//!
//! [`VendingMachine`] binds the stock ledger, the change machine and the
//! heating system into one state machine. Every operation takes `&mut self`
//! and commits its whole effect before returning, so whoever owns the value
//! is the single writer. Timers are not run here: entering `Preparing`
//! queues a [`BrewTimer`] request and the owner delivers the matching
//! [`Event::BrewTimerExpired`] later.

use super::event::{BrewTimer, Event, MachineError};
use super::observer::{MachineObserver, NullObserver};
use crate::catalog::{format_cents, Coin, CoinBag, Drink};
use crate::components::{
    ChangeMachine, ChangeOutcome, HeatingSignal, HeatingSystem, Stock, StockItem, StockSignal,
};
use crate::config::{ConfigError, MachineConfig, TimingConfig};
use crate::core::{
    Guard, MachineState, Problem, ProblemStack, State, StateHistory, StateTransition,
};
use crate::report::MachineReport;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Most sugar cubes a customer can ask for.
pub const MAX_SUGAR: u8 = 5;

pub const MSG_COIN_NOT_RECOGNIZED: &str = "Coin not recognized by the machine";
pub const MSG_NO_CUPS: &str = "Cups are out of stock. No drink can be ordered";
pub const MSG_NO_EXACT_CHANGE: &str = "Unable to give the exact change";
pub const MSG_WAIT_PREPARATION: &str = "Wait for the end of the preparation...";
pub const MSG_DRINK_READY: &str = "Your drink is ready !";
pub const MSG_MAX_SUGAR: &str = "Maximum 5 sugar chosen";

/// Money the machine owed but could not pay back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inconsistency {
    pub amount: u32,
    pub reason: String,
    pub at: DateTime<Utc>,
}

pub struct VendingMachine {
    drinks: Vec<Drink>,
    stock: Stock,
    change: ChangeMachine,
    heating: HeatingSystem,
    problems: ProblemStack,
    /// Idle, Asking or Preparing; shown whenever no problem is active.
    mode: MachineState,
    displayed: MachineState,
    amount_inside: u32,
    chosen_drink: Option<Drink>,
    chosen_sugar: u8,
    change_out: CoinBag,
    stuck_coins: CoinBag,
    swallowed_coins: CoinBag,
    cup_inside: bool,
    brewing: Option<u64>,
    brew_generation: u64,
    timer_requests: Vec<BrewTimer>,
    history: StateHistory<MachineState>,
    inconsistencies: Vec<Inconsistency>,
    observer: Box<dyn MachineObserver>,
    timing: TimingConfig,
    stuck_coin_probability: f64,
    rng: StdRng,
    purchase: Guard<MachineState>,
    sugar_selection: Guard<MachineState>,
    cancellation: Guard<MachineState>,
}

impl VendingMachine {
    /// Build a machine with no observer attached.
    pub fn new(config: &MachineConfig) -> Result<Self, ConfigError> {
        Self::with_observer(config, Box::new(NullObserver))
    }

    /// Validate `config` and build a machine reporting to `observer`.
    pub fn with_observer(
        config: &MachineConfig,
        observer: Box<dyn MachineObserver>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let drinks = config.drink_table()?;
        let stock = config.stock()?;
        let change = config.change_machine()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut problems = ProblemStack::new();
        if stock.cups() == 0 {
            problems.add(Problem::NoCup);
        }
        let displayed = problems.current_state().unwrap_or(MachineState::Idle);

        info!("Vending machine created with {} drinks", drinks.len());

        Ok(Self {
            drinks,
            stock,
            change,
            heating: HeatingSystem::new(),
            problems,
            mode: MachineState::Idle,
            displayed,
            amount_inside: 0,
            chosen_drink: None,
            chosen_sugar: 0,
            change_out: CoinBag::new(),
            stuck_coins: CoinBag::new(),
            swallowed_coins: CoinBag::new(),
            cup_inside: false,
            brewing: None,
            brew_generation: 0,
            timer_requests: Vec::new(),
            history: StateHistory::with_capacity(config.timing.history_capacity),
            inconsistencies: Vec::new(),
            observer,
            timing: config.timing.clone(),
            stuck_coin_probability: config.stuck_coin_probability,
            rng,
            purchase: Guard::purchase(),
            sugar_selection: Guard::sugar_selection(),
            cancellation: Guard::cancel(),
        })
    }

    /// Apply one event.
    pub fn handle(&mut self, event: Event) -> Result<(), MachineError> {
        match event {
            Event::CoinInserted(coin) => self.insert_coin(coin),
            Event::DrinkButton(drink) => self.select_drink(&drink),
            Event::MoreSugar => self.more_sugar(),
            Event::LessSugar => self.less_sugar(),
            Event::Confirm => self.confirm(),
            Event::Cancel => self.cancel(),
            Event::TakeChange => {
                self.take_change();
            }
            Event::TakeCup => self.take_cup(),
            Event::WaterSupply(enabled) => self.set_water_supply(enabled),
            Event::HeatingTick => self.heating_tick(),
            Event::BrewTimerExpired { generation } => self.brew_timer_expired(generation),
            Event::Restock { item, level } => return self.restock(&item, level),
            Event::AddProblem(problem) => return self.add_problem(problem),
            Event::SolveProblem(problem) => return self.problem_solved(problem),
        }
        Ok(())
    }

    // ----- customer operations -----

    pub fn insert_coin(&mut self, coin: Coin) {
        if self.problems.has_mechanical() {
            warn!("{coin} swallowed while in state {}", self.current_state());
            self.swallowed_coins.add(coin, 1);
            return;
        }

        if !self.change.is_accepted(coin) {
            info!("{coin} inserted but not allowed.");
            self.observer.on_temporary_message(MSG_COIN_NOT_RECOGNIZED);
            self.pay_out(&[(coin, 1)].into_iter().collect());
            return;
        }

        let state = self.current_state();
        if !self.purchase.check(&state) {
            debug!("{coin} returned in state {state}");
            if state.is_busy() {
                self.observer.on_temporary_message(MSG_WAIT_PREPARATION);
            }
            self.pay_out(&[(coin, 1)].into_iter().collect());
            return;
        }

        if self.stuck_coin_probability > 0.0 && self.rng.random_bool(self.stuck_coin_probability)
        {
            warn!("{coin} stuck in the slot");
            self.stuck_coins.add(coin, 1);
            self.raise(Problem::StuckCoin);
            self.sync_state();
            return;
        }

        if let Err(e) = self.change.insert_coin(coin) {
            error!("{e}");
            self.pay_out(&[(coin, 1)].into_iter().collect());
            return;
        }
        self.amount_inside = self.amount_inside.saturating_add(coin.cents());
        info!("{coin} inserted.");
        self.observer.on_temporary_message(&format!("{coin} inserted"));
        self.observer.on_amount_changed(self.amount_inside);
    }

    pub fn select_drink(&mut self, drink: &Drink) {
        let state = self.current_state();
        if !self.purchase.check(&state) {
            if state.is_busy() {
                self.observer.on_temporary_message(MSG_WAIT_PREPARATION);
            }
            debug!("{} button ignored in state {state}", drink.name());
            return;
        }
        if !self.drinks.contains(drink) {
            warn!("{} is not sold by this machine", drink.name());
            return;
        }

        if self.stock.cups() == 0 {
            self.observer.on_temporary_message(MSG_NO_CUPS);
            return;
        }
        if self.stock.drink_level(drink) == 0 {
            self.observer.on_temporary_message(&format!(
                "Drink out of stock (otherwise {})",
                format_cents(drink.price())
            ));
            return;
        }
        if drink.price() > self.amount_inside {
            self.observer
                .on_temporary_message(&format!("Price: {}", format_cents(drink.price())));
            return;
        }
        if self
            .change
            .plan_change(self.amount_inside - drink.price())
            .is_none()
        {
            self.observer.on_temporary_message(MSG_NO_EXACT_CHANGE);
            return;
        }

        self.chosen_drink = Some(drink.clone());
        if drink.has_sugar() {
            self.chosen_sugar = 0;
            self.mode = MachineState::Asking;
            self.observer.on_sugar_changed(0);
        } else {
            self.start_preparation();
        }
        self.sync_state();
    }

    pub fn more_sugar(&mut self) {
        if !self.sugar_selection.check(&self.current_state()) {
            return;
        }
        if self.chosen_sugar >= MAX_SUGAR {
            self.observer.on_temporary_message(MSG_MAX_SUGAR);
            return;
        }
        let wanted = self.chosen_sugar + 1;
        if !self
            .stock
            .is_in_stock(&StockItem::SugarCubes, u32::from(wanted))
        {
            debug!("Only {} sugar cubes left", self.stock.sugar_cubes());
            return;
        }
        self.chosen_sugar = wanted;
        self.observer.on_sugar_changed(wanted);
    }

    pub fn less_sugar(&mut self) {
        if !self.sugar_selection.check(&self.current_state()) || self.chosen_sugar == 0 {
            return;
        }
        self.chosen_sugar -= 1;
        self.observer.on_sugar_changed(self.chosen_sugar);
    }

    pub fn confirm(&mut self) {
        if !self.sugar_selection.check(&self.current_state()) {
            return;
        }
        // The operator may have lowered the sugar level since the gauge was set.
        let available = self.stock.sugar_cubes();
        if u32::from(self.chosen_sugar) > available {
            let clamped = u8::try_from(available).unwrap_or(0);
            info!(
                "Only {available} sugar cubes left, serving {clamped} instead of {}",
                self.chosen_sugar
            );
            self.chosen_sugar = clamped;
            self.observer.on_sugar_changed(clamped);
        }
        self.start_preparation();
        self.sync_state();
    }

    /// Give the credit back and drop the order. Refused while brewing.
    pub fn cancel(&mut self) {
        if !self.cancellation.check(&self.mode) {
            warn!("Cancel refused: a drink is being prepared");
            self.observer.on_temporary_message(MSG_WAIT_PREPARATION);
            return;
        }

        if self.amount_inside > 0 {
            let amount = self.amount_inside;
            match self.change.try_give_change(amount) {
                ChangeOutcome::Dispensed(coins) => {
                    info!("{} refunded", format_cents(amount));
                    self.pay_out(&coins);
                    self.amount_inside = 0;
                    self.observer.on_amount_changed(0);
                }
                ChangeOutcome::Impossible => {
                    // The credit stays spendable, so nothing is owed yet.
                    warn!("Cannot refund {}, credit kept", format_cents(amount));
                    self.observer.on_temporary_message(MSG_NO_EXACT_CHANGE);
                }
            }
        }

        self.chosen_drink = None;
        if self.chosen_sugar != 0 {
            self.chosen_sugar = 0;
            self.observer.on_sugar_changed(0);
        }
        if self.mode == MachineState::Asking {
            self.mode = MachineState::Idle;
        }
        self.sync_state();
    }

    /// Collect everything in the change tray.
    pub fn take_change(&mut self) -> CoinBag {
        let taken = std::mem::take(&mut self.change_out);
        if !taken.is_empty() {
            info!("Change taken.");
            self.observer.on_change_out_changed(&self.change_out);
            self.observer.on_change_tray_flag(false);
        }
        taken
    }

    pub fn take_cup(&mut self) {
        if self.cup_inside {
            info!("Cup taken.");
            self.cup_inside = false;
            self.observer.on_cup_tray_flag(false);
        }
    }

    // ----- environment and timers -----

    pub fn set_water_supply(&mut self, enabled: bool) {
        for signal in self.heating.set_water_supply(enabled) {
            self.apply_heating(signal);
        }
        self.observer
            .on_temperature_changed(self.heating.temperature());
        self.sync_state();
    }

    pub fn heating_tick(&mut self) {
        if let Some(signal) = self.heating.tick() {
            self.apply_heating(signal);
        }
        self.observer
            .on_temperature_changed(self.heating.temperature());
        self.sync_state();
    }

    /// Finish the brew started for `generation`. Stale timers are ignored.
    pub fn brew_timer_expired(&mut self, generation: u64) {
        if self.brewing != Some(generation) {
            debug!("Ignoring stale brew timer #{generation}");
            return;
        }
        self.brewing = None;
        let sugar = std::mem::take(&mut self.chosen_sugar);
        let Some(drink) = self.chosen_drink.take() else {
            error!("Brew #{generation} finished without a chosen drink");
            self.mode = MachineState::Idle;
            self.sync_state();
            return;
        };

        self.cup_inside = true;
        self.observer.on_cup_tray_flag(true);
        self.consume(&StockItem::Cups, 1);
        if drink.has_sugar() {
            // A restock during the brew can leave fewer cubes than were chosen.
            let cubes = u32::from(sugar).min(self.stock.sugar_cubes());
            self.consume(&StockItem::SugarCubes, cubes);
            if self.stock.spoons() > 0 {
                self.consume(&StockItem::Spoons, 1);
            } else {
                warn!("No spoon left, {} served without one", drink.name());
            }
        }
        self.consume(&StockItem::Drink(drink.clone()), 1);

        self.observer.on_temporary_message(MSG_DRINK_READY);
        info!("{} prepared.", drink.name());

        if let Some(signal) = self.heating.drink_drawn() {
            self.apply_heating(signal);
        }
        self.observer
            .on_temperature_changed(self.heating.temperature());
        if sugar != 0 {
            self.observer.on_sugar_changed(0);
        }

        self.mode = MachineState::Idle;
        self.sync_state();
    }

    // ----- operator operations -----

    /// Set a supply to an absolute level.
    pub fn restock(&mut self, item: &StockItem, level: i64) -> Result<(), MachineError> {
        let signal = self.stock.set_level(item, level)?;
        self.apply_stock(signal);
        self.sync_state();
        Ok(())
    }

    /// Report a fault. `NoWater` cuts the water supply.
    pub fn add_problem(&mut self, problem: Problem) -> Result<(), MachineError> {
        match problem {
            Problem::ColdWater => return Err(MachineError::ManagedProblem(problem)),
            Problem::NoWater => self.set_water_supply(false),
            _ => {
                self.raise(problem);
                self.sync_state();
            }
        }
        Ok(())
    }

    /// Resolve a fault wherever it sits on the problem stack.
    ///
    /// `NoWater` restores the water supply. Resolving `StuckCoin` drops the
    /// jammed coins into the change tray. `NoCup` stays active while the cup
    /// stock is empty.
    pub fn problem_solved(&mut self, problem: Problem) -> Result<(), MachineError> {
        match problem {
            Problem::ColdWater => return Err(MachineError::ManagedProblem(problem)),
            Problem::NoWater => {
                self.set_water_supply(true);
                return Ok(());
            }
            Problem::NoCup if self.stock.cups() == 0 => {
                warn!("NoCup kept: no cups in stock");
                return Ok(());
            }
            Problem::StuckCoin => {
                if self.problems.contains(Problem::StuckCoin) {
                    let jammed = std::mem::take(&mut self.stuck_coins);
                    self.pay_out(&jammed);
                }
                self.clear(Problem::StuckCoin);
            }
            _ => self.clear(problem),
        }
        self.sync_state();
        Ok(())
    }

    // ----- queries -----

    /// The state shown to the customer.
    pub fn current_state(&self) -> MachineState {
        self.problems.current_state().unwrap_or(self.mode)
    }

    pub fn problems(&self) -> &ProblemStack {
        &self.problems
    }

    pub fn amount_inside(&self) -> u32 {
        self.amount_inside
    }

    pub fn chosen_drink(&self) -> Option<&Drink> {
        self.chosen_drink.as_ref()
    }

    pub fn chosen_sugar(&self) -> u8 {
        self.chosen_sugar
    }

    pub fn change_out(&self) -> &CoinBag {
        &self.change_out
    }

    /// Coins jammed in the slot until `StuckCoin` is resolved.
    pub fn stuck_coins(&self) -> &CoinBag {
        &self.stuck_coins
    }

    /// Coins inserted while a mechanical fault was active.
    pub fn swallowed_coins(&self) -> &CoinBag {
        &self.swallowed_coins
    }

    pub fn is_cup_inside(&self) -> bool {
        self.cup_inside
    }

    pub fn drinks(&self) -> &[Drink] {
        &self.drinks
    }

    pub fn stock(&self) -> &Stock {
        &self.stock
    }

    pub fn change_machine(&self) -> &ChangeMachine {
        &self.change
    }

    pub fn heating(&self) -> &HeatingSystem {
        &self.heating
    }

    pub fn history(&self) -> &StateHistory<MachineState> {
        &self.history
    }

    pub fn inconsistencies(&self) -> &[Inconsistency] {
        &self.inconsistencies
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Generation of the brew in progress, if any.
    pub fn pending_brew(&self) -> Option<u64> {
        self.brewing
    }

    /// Drain the timer requests queued since the last call.
    pub fn take_timer_requests(&mut self) -> Vec<BrewTimer> {
        std::mem::take(&mut self.timer_requests)
    }

    /// Default text for the display when no temporary message is shown.
    pub fn display_text(&self) -> String {
        match self.current_state() {
            MachineState::Idle if self.amount_inside > 0 => format!(
                "Please make your choice - {} entered",
                format_cents(self.amount_inside)
            ),
            MachineState::Idle => "Please make your choice".to_string(),
            MachineState::Asking => "Choose the amount of sugar, then confirm".to_string(),
            MachineState::Preparing => "Your drink is in preparation...".to_string(),
            MachineState::ColdWater => "Water is heating up, please wait...".to_string(),
            MachineState::NoWater => "No water supply".to_string(),
            MachineState::NoCup => MSG_NO_CUPS.to_string(),
            MachineState::NoSpoon => "No spoon available".to_string(),
            MachineState::StuckCoin => "A coin is stuck, please call the operator".to_string(),
        }
    }

    /// Sugar gauge, shown only while asking.
    pub fn sugar_text(&self) -> String {
        if self.current_state() != MachineState::Asking {
            return String::new();
        }
        let filled = usize::from(self.chosen_sugar);
        let empty = usize::from(MAX_SUGAR - self.chosen_sugar.min(MAX_SUGAR));
        format!("Sugar: {}{}", "■".repeat(filled), "□".repeat(empty))
    }

    pub fn report(&self) -> MachineReport {
        MachineReport::capture(self)
    }

    // ----- internals -----

    fn start_preparation(&mut self) {
        let Some(drink) = self.chosen_drink.clone() else {
            return;
        };

        let due = self.amount_inside.saturating_sub(drink.price());
        match self.change.try_give_change(due) {
            ChangeOutcome::Dispensed(coins) => self.pay_out(&coins),
            ChangeOutcome::Impossible => self.record_inconsistency(due, "change for a purchase"),
        }
        self.amount_inside = 0;
        self.observer.on_amount_changed(0);

        self.brew_generation += 1;
        self.brewing = Some(self.brew_generation);
        self.timer_requests.push(BrewTimer {
            generation: self.brew_generation,
            delay: self.timing.brew_duration(),
        });
        self.mode = MachineState::Preparing;
        info!(
            "Preparing {} with {} sugar (brew #{})",
            drink.name(),
            self.chosen_sugar,
            self.brew_generation
        );
    }

    fn consume(&mut self, item: &StockItem, quantity: u32) {
        match self.stock.remove(item, quantity) {
            Ok(signal) => self.apply_stock(signal),
            Err(e) => error!("Stock ledger out of sync: {e}"),
        }
    }

    fn pay_out(&mut self, coins: &CoinBag) {
        if coins.is_empty() {
            return;
        }
        self.change_out.merge(coins);
        self.observer.on_change_out_changed(&self.change_out);
        self.observer.on_change_tray_flag(true);
    }

    fn record_inconsistency(&mut self, amount: u32, reason: &str) {
        error!(
            "Unable to pay {} back ({reason}); the operator must settle it",
            format_cents(amount)
        );
        self.observer.on_temporary_message(MSG_NO_EXACT_CHANGE);
        self.inconsistencies.push(Inconsistency {
            amount,
            reason: reason.to_string(),
            at: Utc::now(),
        });
    }

    fn raise(&mut self, problem: Problem) {
        if !self.problems.add(problem) {
            return;
        }
        warn!("Problem {problem} raised");
        if self.mode == MachineState::Asking {
            info!("Order abandoned");
            self.mode = MachineState::Idle;
            self.chosen_drink = None;
            if self.chosen_sugar != 0 {
                self.chosen_sugar = 0;
                self.observer.on_sugar_changed(0);
            }
        }
    }

    fn clear(&mut self, problem: Problem) {
        if self.problems.solve(problem) {
            info!("Problem {problem} solved");
        }
    }

    fn apply_stock(&mut self, signal: Option<StockSignal>) {
        match signal {
            Some(StockSignal::CupsDepleted) => self.raise(Problem::NoCup),
            Some(StockSignal::CupsRestored) => self.clear(Problem::NoCup),
            None => {}
        }
    }

    fn apply_heating(&mut self, signal: HeatingSignal) {
        match signal {
            HeatingSignal::Raised(problem) => self.raise(problem),
            HeatingSignal::Cleared(problem) => self.clear(problem),
        }
    }

    /// Record and announce a change of the displayed state.
    fn sync_state(&mut self) {
        let now = self.current_state();
        if now == self.displayed {
            return;
        }
        self.history.record(StateTransition {
            from: self.displayed,
            to: now,
            timestamp: Utc::now(),
        });
        self.displayed = now;
        info!("State {} entered.", now.name());
        self.observer.on_state_changed(now);
    }
}
