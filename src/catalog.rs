//! Coins and drinks: the immutable values the machine trades in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Longest drink name the front panel can show.
pub const MAX_DRINK_NAME_LEN: usize = 18;

/// Render an amount of cents the way the panel does: `1.50 €`.
pub fn format_cents(cents: u32) -> String {
    format!("{}.{:02} €", cents / 100, cents % 100)
}

/// A coin denomination, in cents.
///
/// Whether the machine accepts a coin is configuration, not a property of
/// the coin, and lives in the change machine.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coin {
    cents: u32,
}

impl Coin {
    pub const EURO_2: Coin = Coin::new(200);
    pub const EURO_1: Coin = Coin::new(100);
    pub const CENT_50: Coin = Coin::new(50);
    pub const CENT_20: Coin = Coin::new(20);
    pub const CENT_10: Coin = Coin::new(10);
    pub const CENT_5: Coin = Coin::new(5);
    pub const CENT_2: Coin = Coin::new(2);
    pub const CENT_1: Coin = Coin::new(1);

    /// The euro coin set, largest first.
    pub const EURO: [Coin; 8] = [
        Coin::EURO_2,
        Coin::EURO_1,
        Coin::CENT_50,
        Coin::CENT_20,
        Coin::CENT_10,
        Coin::CENT_5,
        Coin::CENT_2,
        Coin::CENT_1,
    ];

    pub const fn new(cents: u32) -> Self {
        Self { cents }
    }

    pub const fn cents(self) -> u32 {
        self.cents
    }

    /// Panel label: `2 €` for whole euros, `0.50 €` otherwise.
    pub fn label(self) -> String {
        if self.cents % 100 == 0 {
            format!("{} €", self.cents / 100)
        } else {
            format_cents(self.cents)
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A drink the machine can serve.
///
/// Identity is the full triple (name, sugar flag, price); the stock ledger
/// uses it as a key. Construct through the config layer, which validates
/// the name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Drink {
    name: String,
    sugar: bool,
    price: u32,
}

impl Drink {
    pub fn new(name: impl Into<String>, sugar: bool, price: u32) -> Self {
        Self {
            name: name.into(),
            sugar,
            price,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the drink is served with a sugar choice (and a spoon).
    pub fn has_sugar(&self) -> bool {
        self.sugar
    }

    /// Price in cents.
    pub fn price(&self) -> u32 {
        self.price
    }
}

impl fmt::Display for Drink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, format_cents(self.price))
    }
}

/// A multiset of coins: change waiting in the tray, a dispensing plan, jammed coins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinBag {
    coins: BTreeMap<Coin, u32>,
}

impl CoinBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, coin: Coin, count: u32) {
        if count > 0 {
            *self.coins.entry(coin).or_insert(0) += count;
        }
    }

    pub fn merge(&mut self, other: &CoinBag) {
        for (coin, count) in other.iter() {
            self.add(coin, count);
        }
    }

    pub fn count(&self, coin: Coin) -> u32 {
        self.coins.get(&coin).copied().unwrap_or(0)
    }

    /// Value of all coins, in cents.
    pub fn total(&self) -> u64 {
        self.coins
            .iter()
            .map(|(coin, count)| u64::from(coin.cents()) * u64::from(*count))
            .sum()
    }

    pub fn coin_count(&self) -> u32 {
        self.coins.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn clear(&mut self) {
        self.coins.clear();
    }

    /// Coins with a non-zero count, largest first.
    pub fn iter(&self) -> impl Iterator<Item = (Coin, u32)> + '_ {
        self.coins.iter().rev().map(|(coin, count)| (*coin, *count))
    }
}

impl FromIterator<(Coin, u32)> for CoinBag {
    fn from_iter<I: IntoIterator<Item = (Coin, u32)>>(iter: I) -> Self {
        let mut bag = CoinBag::new();
        for (coin, count) in iter {
            bag.add(coin, count);
        }
        bag
    }
}

impl fmt::Display for CoinBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (coin, count) in self.iter() {
            writeln!(f, "{coin}: {count} coin(s).")?;
        }
        write!(f, "Total: {}.", format_cents(self.total().min(u64::from(u32::MAX)) as u32))
    }
}
