//! Random fact provider
//!
//! Supplies the synthetic names, numbers and commerce strings the generator
//! stores on nodes. The trait lets tests substitute fixed values.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const FIRST_NAMES: [&str; 32] = [
    "Alice", "Bob", "Carlos", "Diana", "Elena", "Frank", "Grace", "Hiro",
    "Isha", "Jake", "Kenji", "Luna", "Miguel", "Nina", "Oscar", "Priya",
    "Qian", "Rafael", "Sara", "Tomasz", "Uma", "Viktor", "Wendy", "Xavier",
    "Yuki", "Zara", "Ana", "Sven", "Zoey", "Chloe", "Derek", "Fatima",
];

const LAST_NAMES: [&str; 32] = [
    "Chen", "Patel", "Kim", "Nguyen", "Garcia", "Muller", "Tanaka", "Singh",
    "Okonkwo", "Williams", "Johansson", "Rossi", "Fernandez", "Kowalski", "Sato", "Ali",
    "Larsen", "Dubois", "Schmidt", "Park", "Jensen", "Costa", "Ito", "Bakker",
    "Novak", "Shah", "Rivera", "Yamamoto", "Andersen", "Gupta", "Mendez", "Petrov",
];

const PRODUCT_ADJECTIVES: [&str; 16] = [
    "Small", "Ergonomic", "Rustic", "Intelligent", "Gorgeous", "Incredible",
    "Fantastic", "Practical", "Sleek", "Awesome", "Enormous", "Mediocre",
    "Synergistic", "Heavy Duty", "Lightweight", "Durable",
];

const PRODUCT_MATERIALS: [&str; 12] = [
    "Steel", "Wooden", "Concrete", "Plastic", "Cotton", "Granite", "Rubber",
    "Leather", "Silk", "Wool", "Linen", "Marble",
];

const PRODUCT_NOUNS: [&str; 16] = [
    "Chair", "Car", "Computer", "Gloves", "Pants", "Shirt", "Table", "Shoes",
    "Hat", "Plate", "Knife", "Bottle", "Coat", "Lamp", "Keyboard", "Clock",
];

/// Source of random attribute values
pub trait FactProvider {
    /// A "First Last" person name
    fn full_name(&mut self) -> String;

    /// A uniformly drawn integer in `min..=max`
    fn number_between(&mut self, min: i64, max: i64) -> i64;

    /// A commerce-style product name, e.g. "Rustic Steel Chair"
    fn product_name(&mut self) -> String;

    /// A price as a decimal string with two fractional digits
    fn price(&mut self) -> String;
}

/// [`FactProvider`] backed by a `rand` generator and built-in word lists
pub struct RandomFacts<R = StdRng> {
    rng: R,
}

impl RandomFacts<StdRng> {
    /// Reproducible provider: the same seed yields the same facts
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Provider seeded from operating-system entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomFacts<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn pick(&mut self, words: &[&'static str]) -> &'static str {
        words.choose(&mut self.rng).copied().unwrap_or_default()
    }
}

impl<R: Rng> FactProvider for RandomFacts<R> {
    fn full_name(&mut self) -> String {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        format!("{first} {last}")
    }

    fn number_between(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    fn product_name(&mut self) -> String {
        let adjective = self.pick(&PRODUCT_ADJECTIVES);
        let material = self.pick(&PRODUCT_MATERIALS);
        let noun = self.pick(&PRODUCT_NOUNS);
        format!("{adjective} {material} {noun}")
    }

    fn price(&mut self) -> String {
        let cents: u32 = self.rng.gen_range(100..=10_000);
        format!("{}.{:02}", cents / 100, cents % 100)
    }
}
