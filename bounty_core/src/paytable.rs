use crate::{
    error::EngineError,
    symbols::{Symbol, REELS_COUNT},
};
use serde::{Deserialize, Serialize};

/// Weight and line payouts of one symbol. Multipliers are per unit of bet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaytableEntry {
    pub symbol: Symbol,
    pub weight: u32,
    pub payout3: u64,
    pub payout4: u64,
    pub payout5: u64,
}

impl PaytableEntry {
    pub const fn new(symbol: Symbol, weight: u32, payout3: u64, payout4: u64, payout5: u64) -> Self {
        Self {
            symbol,
            weight,
            payout3,
            payout4,
            payout5,
        }
    }

    /// Multiplier for a run of `length` matching symbols; zero for lengths
    /// the table does not pay.
    pub fn multiplier(&self, length: usize) -> u64 {
        match length {
            3 => self.payout3,
            4 => self.payout4,
            5 => self.payout5,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paytable(pub Vec<PaytableEntry>);

impl Paytable {
    pub fn bounty_default() -> Self {
        Self(vec![
            PaytableEntry::new(Symbol::Whiskey, 30, 5, 10, 25),
            PaytableEntry::new(Symbol::Boots, 25, 5, 12, 30),
            PaytableEntry::new(Symbol::Badge, 20, 10, 25, 75),
            PaytableEntry::new(Symbol::Gold, 15, 15, 50, 150),
            PaytableEntry::new(Symbol::Wanted, 10, 25, 100, 500),
            PaytableEntry::new(Symbol::Wild, 5, 50, 150, 1000),
            PaytableEntry::new(Symbol::Scatter, 8, 0, 0, 0),
        ])
    }

    pub fn symbol_meta(&self, symbol: Symbol) -> Result<&PaytableEntry, EngineError> {
        self.0
            .iter()
            .find(|e| e.symbol == symbol)
            .ok_or_else(|| EngineError::UnknownSymbol(symbol.id().to_string()))
    }

    pub fn symbol_meta_by_id(&self, id: &str) -> Result<&PaytableEntry, EngineError> {
        self.symbol_meta(id.parse()?)
    }

    /// Every symbol repeated `weight` times, in table order.
    pub fn weighted_pool(&self) -> Vec<Symbol> {
        self.0
            .iter()
            .flat_map(|e| std::iter::repeat(e.symbol).take(e.weight as usize))
            .collect()
    }
}

/// Row index inspected on each reel, left to right.
pub type Payline = [usize; REELS_COUNT];

pub const PAYLINES: [Payline; 10] = [
    [1, 1, 1, 1, 1], // middle
    [0, 0, 0, 0, 0], // top
    [2, 2, 2, 2, 2], // bottom
    [0, 1, 2, 1, 0], // V
    [2, 1, 0, 1, 2], // inverted V
    [0, 0, 1, 2, 2],
    [2, 2, 1, 0, 0],
    [0, 1, 0, 1, 0],
    [1, 0, 1, 0, 1],
    [1, 2, 1, 2, 1],
];
