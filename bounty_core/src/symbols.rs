use std::{fmt, str::FromStr};

use rand::{rngs::OsRng, seq::SliceRandom, CryptoRng, Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::EngineError, paytable::Paytable};

pub const REELS_COUNT: usize = 5;
pub const VISIBLE_ROWS: usize = 3;
pub const DEFAULT_STRIP_LENGTH: usize = 100;

/// Visible window of one spin, indexed `grid[row][reel]`.
pub type Grid = [[Symbol; REELS_COUNT]; VISIBLE_ROWS];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Symbol {
    Whiskey,
    Boots,
    Badge,
    Gold,
    Wanted,
    Wild,
    Scatter,
}

impl Symbol {
    pub const ALL: [Symbol; 7] = [
        Symbol::Whiskey,
        Symbol::Boots,
        Symbol::Badge,
        Symbol::Gold,
        Symbol::Wanted,
        Symbol::Wild,
        Symbol::Scatter,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Symbol::Whiskey => "WHISKEY",
            Symbol::Boots => "BOOTS",
            Symbol::Badge => "BADGE",
            Symbol::Gold => "GOLD",
            Symbol::Wanted => "WANTED",
            Symbol::Wild => "WILD",
            Symbol::Scatter => "SCATTER",
        }
    }

}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Symbol {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sym| sym.id() == s)
            .ok_or_else(|| EngineError::UnknownSymbol(s.to_string()))
    }
}

/// The physical layout of the five reels. Fixed once at startup; every spin
/// reads its window from these strips. Only built through the constructors
/// below, so there are always `REELS_COUNT` non-empty strips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReelsConfig {
    strips: Vec<Vec<Symbol>>,
}

impl ReelsConfig {
    /// Builds strips by sampling with replacement from the weighted pool of
    /// `paytable`, using the operating system's CSPRNG.
    pub fn from_entropy(paytable: &Paytable, strip_length: usize) -> Result<Self, EngineError> {
        Self::build(paytable, strip_length, &mut OsRng)
    }

    /// Reproducible strips for tests and audits.
    pub fn from_seed(paytable: &Paytable, strip_length: usize, seed: u64) -> Result<Self, EngineError> {
        Self::build(paytable, strip_length, &mut ChaCha20Rng::seed_from_u64(seed))
    }

    pub fn build<R: Rng + CryptoRng>(
        paytable: &Paytable,
        strip_length: usize,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        if strip_length == 0 {
            return Err(EngineError::InvalidReels("strip length must be positive".into()));
        }
        let pool = paytable.weighted_pool();
        if pool.is_empty() {
            return Err(EngineError::InvalidReels("paytable has no weighted symbols".into()));
        }
        let strips = (0..REELS_COUNT)
            .map(|_| {
                (0..strip_length)
                    .filter_map(|_| pool.choose(&mut *rng).copied())
                    .collect::<Vec<_>>()
            })
            .collect();
        info!(strip_length, pool = pool.len(), "built reel strips");
        Ok(Self { strips })
    }

    /// Accepts externally supplied strips (e.g. the ones a server published)
    /// after checking their shape.
    pub fn from_strips(strips: Vec<Vec<Symbol>>) -> Result<Self, EngineError> {
        if strips.len() != REELS_COUNT {
            return Err(EngineError::InvalidReels(format!(
                "expected {REELS_COUNT} strips, got {}",
                strips.len()
            )));
        }
        if strips.iter().any(|s| s.is_empty()) {
            return Err(EngineError::InvalidReels("empty reel strip".into()));
        }
        Ok(Self { strips })
    }

    pub fn strips(&self) -> &[Vec<Symbol>] {
        &self.strips
    }

    pub fn reel_strip(&self, reel: usize) -> Option<&[Symbol]> {
        self.strips.get(reel).map(Vec::as_slice)
    }

    /// Reads the visible window for the given stop positions, wrapping
    /// around each strip's end.
    pub fn window(&self, stops: [usize; REELS_COUNT]) -> Grid {
        let mut grid: Grid = [[Symbol::Whiskey; REELS_COUNT]; VISIBLE_ROWS];
        for (reel, strip) in self.strips.iter().enumerate().take(REELS_COUNT) {
            for (row, line) in grid.iter_mut().enumerate() {
                line[reel] = strip[(stops[reel] + row) % strip.len()];
            }
        }
        grid
    }
}
