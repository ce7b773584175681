//! Property-based tests for the controller and its components.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use vendomat::catalog::{Coin, CoinBag, Drink};
use vendomat::components::{ChangeMachine, ChangeOutcome, CoinSlot, StockItem};
use vendomat::config::{CoinConfig, DrinkConfig, MachineConfig};
use vendomat::core::{Guard, MachineState, Problem, ProblemStack, State};
use vendomat::machine::{VendingMachine, MAX_SUGAR};

prop_compose! {
    fn arbitrary_problem()(index in 0..Problem::ALL.len()) -> Problem {
        Problem::ALL[index]
    }
}

prop_compose! {
    fn arbitrary_slots()(
        stocks in prop::collection::vec(0..6u32, Coin::EURO.len()),
        accepted in prop::collection::vec(prop::bool::weighted(0.8), Coin::EURO.len()),
    ) -> Vec<CoinSlot> {
        Coin::EURO
            .iter()
            .zip(stocks)
            .zip(accepted)
            .map(|((coin, stock), accepted)| CoinSlot { coin: *coin, accepted, stock })
            .collect()
    }
}

#[derive(Clone, Debug)]
enum Action {
    Coin(usize),
    Drink(usize),
    More,
    Less,
    Confirm,
    Cancel,
    TakeChange,
    TakeCup,
    Water(bool),
    Tick,
    FireBrew,
    RestockCups(i64),
    Add(Problem),
    Solve(Problem),
}

fn arbitrary_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        6 => (0..Coin::EURO.len() + 1).prop_map(Action::Coin),
        3 => (0..3usize).prop_map(Action::Drink),
        2 => Just(Action::More),
        1 => Just(Action::Less),
        2 => Just(Action::Confirm),
        1 => Just(Action::Cancel),
        1 => Just(Action::TakeChange),
        1 => Just(Action::TakeCup),
        1 => any::<bool>().prop_map(Action::Water),
        2 => Just(Action::Tick),
        3 => Just(Action::FireBrew),
        1 => (-1..3i64).prop_map(Action::RestockCups),
        1 => arbitrary_problem().prop_map(Action::Add),
        1 => arbitrary_problem().prop_map(Action::Solve),
    ]
}

fn drinks() -> [Drink; 3] {
    [
        Drink::new("Coffee", true, 40),
        Drink::new("Tea", true, 75),
        Drink::new("Broth", false, 120),
    ]
}

fn machine(seed: u64) -> VendingMachine {
    let config = MachineConfig {
        drinks: drinks()
            .iter()
            .map(|d| DrinkConfig::new(d.name(), d.has_sugar(), i64::from(d.price()), 3))
            .collect(),
        coins: Coin::EURO
            .iter()
            .map(|c| CoinConfig::new(i64::from(c.cents()), 2, *c != Coin::EURO_2))
            .collect(),
        sugar_cubes: 6,
        cups: 3,
        spoons: 2,
        stuck_coin_probability: 0.1,
        seed: Some(seed),
        ..MachineConfig::default()
    };
    VendingMachine::new(&config).unwrap()
}

/// Coins physically inserted, and coins the customer took out.
#[derive(Default)]
struct Ledger {
    inserted: u64,
    taken: u64,
}

fn apply(machine: &mut VendingMachine, action: &Action, ledger: &mut Ledger) {
    let drinks = drinks();
    match action {
        Action::Coin(index) => {
            let coin = Coin::EURO.get(*index).copied().unwrap_or(Coin::new(25));
            ledger.inserted += u64::from(coin.cents());
            machine.insert_coin(coin);
        }
        Action::Drink(index) => machine.select_drink(&drinks[*index]),
        Action::More => machine.more_sugar(),
        Action::Less => machine.less_sugar(),
        Action::Confirm => machine.confirm(),
        Action::Cancel => machine.cancel(),
        Action::TakeChange => ledger.taken += machine.take_change().total(),
        Action::TakeCup => machine.take_cup(),
        Action::Water(enabled) => machine.set_water_supply(*enabled),
        Action::Tick => machine.heating_tick(),
        Action::FireBrew => {
            if let Some(generation) = machine.pending_brew() {
                machine.brew_timer_expired(generation);
            }
        }
        Action::RestockCups(level) => {
            let _ = machine.restock(&StockItem::Cups, *level);
        }
        Action::Add(problem) => {
            let _ = machine.add_problem(*problem);
        }
        Action::Solve(problem) => {
            let _ = machine.problem_solved(*problem);
        }
    }
}

fn coins_held(machine: &VendingMachine) -> u64 {
    machine.change_machine().stock_value()
        + machine.change_out().total()
        + machine.stuck_coins().total()
        + machine.swallowed_coins().total()
}

proptest! {
    #[test]
    fn problem_stack_matches_model(
        ops in prop::collection::vec((any::<bool>(), arbitrary_problem()), 0..40)
    ) {
        let mut stack = ProblemStack::new();
        let mut model: Vec<Problem> = Vec::new();

        for (add, problem) in ops {
            if add {
                let added = stack.add(problem);
                prop_assert_eq!(added, !model.contains(&problem));
                if added {
                    model.push(problem);
                }
            } else {
                let solved = stack.solve(problem);
                prop_assert_eq!(solved, model.contains(&problem));
                model.retain(|p| *p != problem);
            }

            prop_assert_eq!(stack.iter().collect::<Vec<_>>(), model.clone());
            prop_assert_eq!(stack.current(), model.last().copied());
            prop_assert!(stack.len() <= Problem::ALL.len());
        }
    }

    #[test]
    fn guards_follow_state_flags(index in 0..Problem::ALL.len()) {
        let state = MachineState::from(Problem::ALL[index]);
        prop_assert!(state.is_fault());
        prop_assert!(!Guard::purchase().check(&state));
        prop_assert!(Guard::cancel().check(&state));
    }

    #[test]
    fn change_plan_sums_to_target(slots in arbitrary_slots(), amount in 0..1_000u32) {
        let machine = ChangeMachine::new(slots.clone());

        if let Some(plan) = machine.plan_change(amount) {
            prop_assert_eq!(plan.total(), u64::from(amount));
            for (coin, count) in plan.iter() {
                let slot = slots.iter().find(|s| s.coin == coin).unwrap();
                prop_assert!(slot.accepted);
                prop_assert!(count <= slot.stock);
            }
        }
    }

    #[test]
    fn give_change_commits_plan_or_nothing(slots in arbitrary_slots(), amount in 0..1_000u32) {
        let mut machine = ChangeMachine::new(slots);
        let before = machine.clone();
        let plan = machine.plan_change(amount);

        match machine.try_give_change(amount) {
            ChangeOutcome::Dispensed(coins) => {
                prop_assert_eq!(Some(&coins), plan.as_ref());
                prop_assert_eq!(
                    machine.stock_value() + coins.total(),
                    before.stock_value()
                );
            }
            ChangeOutcome::Impossible => {
                prop_assert!(plan.is_none());
                prop_assert_eq!(&machine, &before);
            }
        }
    }

    #[test]
    fn zero_change_never_mutates(slots in arbitrary_slots()) {
        let mut machine = ChangeMachine::new(slots);
        let before = machine.clone();

        prop_assert_eq!(machine.try_give_change(0), ChangeOutcome::Dispensed(CoinBag::new()));
        prop_assert_eq!(machine, before);
    }

    #[test]
    fn random_operation_sequences_keep_invariants(
        seed in any::<u64>(),
        actions in prop::collection::vec(arbitrary_action(), 0..80)
    ) {
        let mut machine = machine(seed);
        let initial_coins = coins_held(&machine);
        let mut ledger = Ledger::default();

        for action in &actions {
            apply(&mut machine, action, &mut ledger);

            // Coins never appear or vanish.
            prop_assert_eq!(coins_held(&machine) + ledger.taken, initial_coins + ledger.inserted);

            prop_assert!(machine.chosen_sugar() <= MAX_SUGAR);
            prop_assert!(u32::from(machine.chosen_sugar()) <= machine.stock().sugar_cubes());

            let state = machine.current_state();
            match machine.problems().current_state() {
                Some(fault) => prop_assert_eq!(state, fault),
                None if machine.pending_brew().is_some() => {
                    prop_assert_eq!(state, MachineState::Preparing)
                }
                None => prop_assert!(matches!(state, MachineState::Idle | MachineState::Asking)),
            }

            if machine.pending_brew().is_some() {
                prop_assert_eq!(machine.amount_inside(), 0);
            }
            if machine.stock().cups() == 0 {
                prop_assert!(machine.problems().contains(Problem::NoCup));
            }
            if machine.current_state() == MachineState::Asking {
                prop_assert!(machine.chosen_drink().is_some());
            }
        }
    }

    #[test]
    fn accepted_coins_credit_exactly(
        seed in any::<u64>(),
        actions in prop::collection::vec(arbitrary_action(), 0..30),
        index in 0..Coin::EURO.len(),
    ) {
        let mut machine = machine(seed);
        let mut ledger = Ledger::default();
        for action in &actions {
            apply(&mut machine, action, &mut ledger);
        }

        let coin = Coin::EURO[index];
        let amount = machine.amount_inside();
        let stock = machine.change_machine().coin_stock(coin);
        let idle = machine.current_state() == MachineState::Idle;
        machine.insert_coin(coin);

        if !machine.change_machine().is_accepted(coin) {
            prop_assert_eq!(machine.amount_inside(), amount);
            prop_assert_eq!(machine.change_machine().coin_stock(coin), stock);
        } else if idle && machine.current_state() == MachineState::Idle {
            // Credited unless the coin jammed.
            prop_assert_eq!(machine.amount_inside(), amount + coin.cents());
            prop_assert_eq!(machine.change_machine().coin_stock(coin), stock + 1);
        }
    }
}
