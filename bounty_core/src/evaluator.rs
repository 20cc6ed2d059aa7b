//! Payline evaluation.
//!
//! Lines pay left to right from reel 0. The anchor of a line is its first
//! non-wild symbol (or WILD when the whole line is wild); a position matches
//! when it shows the anchor or WILD, and the first mismatch ends the run.
//! Scatters never anchor a line; they are counted across the whole grid.

use serde::{Deserialize, Serialize};

use crate::{
    error::EngineError,
    paytable::{Paytable, Payline},
    symbols::{Grid, Symbol, REELS_COUNT, VISIBLE_ROWS},
};

pub const MIN_RUN: usize = 3;
pub const BONUS_SCATTERS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Win {
    pub payline: usize,
    pub symbol: Symbol,
    pub length: usize,
    pub multiplier: u64,
}

/// Result of inspecting a single payline, winning or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEvaluation {
    pub payline: usize,
    pub anchor: Symbol,
    pub run_length: usize,
    pub multiplier: u64,
}

impl LineEvaluation {
    pub fn to_win(&self) -> Option<Win> {
        (self.multiplier > 0).then(|| Win {
            payline: self.payline,
            symbol: self.anchor,
            length: self.run_length,
            multiplier: self.multiplier,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub wins: Vec<Win>,
    pub total_multiplier: u64,
    pub scatter_count: usize,
    pub bonus_triggered: bool,
}

pub fn line_symbols(grid: &Grid, payline: &Payline) -> [Symbol; REELS_COUNT] {
    let mut out = [Symbol::Whiskey; REELS_COUNT];
    for (reel, row) in payline.iter().enumerate() {
        out[reel] = grid[*row][reel];
    }
    out
}

pub fn anchor_symbol(symbols: &[Symbol]) -> Symbol {
    symbols
        .iter()
        .copied()
        .find(|s| *s != Symbol::Wild)
        .unwrap_or(Symbol::Wild)
}

/// Contiguous matches of `anchor` (or WILD) starting at reel 0.
pub fn run_length(symbols: &[Symbol], anchor: Symbol) -> usize {
    symbols
        .iter()
        .take_while(|s| **s == anchor || **s == Symbol::Wild)
        .count()
}

/// `None` when the line is anchored on a scatter and therefore skipped.
pub fn evaluate_payline(
    grid: &Grid,
    index: usize,
    payline: &Payline,
    paytable: &Paytable,
) -> Result<Option<LineEvaluation>, EngineError> {
    if payline.iter().any(|row| *row >= VISIBLE_ROWS) {
        return Err(EngineError::InvalidPayline(index));
    }
    let symbols = line_symbols(grid, payline);
    let anchor = anchor_symbol(&symbols);
    if anchor == Symbol::Scatter {
        return Ok(None);
    }
    let run = run_length(&symbols, anchor);
    let multiplier = if run >= MIN_RUN {
        paytable.symbol_meta(anchor)?.multiplier(run)
    } else {
        0
    };
    Ok(Some(LineEvaluation {
        payline: index,
        anchor,
        run_length: run,
        multiplier,
    }))
}

pub fn scatter_count(grid: &Grid) -> usize {
    grid.iter()
        .flatten()
        .filter(|s| **s == Symbol::Scatter)
        .count()
}

pub fn evaluate(grid: &Grid, paylines: &[Payline], paytable: &Paytable) -> Result<Evaluation, EngineError> {
    let mut wins = Vec::new();
    for (index, payline) in paylines.iter().enumerate() {
        if let Some(win) = evaluate_payline(grid, index, payline, paytable)?.and_then(|l| l.to_win()) {
            wins.push(win);
        }
    }
    let total_multiplier = wins.iter().map(|w| w.multiplier).sum();
    let scatter_count = scatter_count(grid);
    Ok(Evaluation {
        wins,
        total_multiplier,
        scatter_count,
        bonus_triggered: scatter_count >= BONUS_SCATTERS,
    })
}
