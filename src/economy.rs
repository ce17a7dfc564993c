//! Cross-session economy: coins, gems and the best score
//!
//! Survives restarts and resumes. Persisted through a [`KeyValueStore`].

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::persistence::{KeyValueStore, StoreError};

/// Storage keys
pub const COINS_KEY: &str = "runner.coins";
pub const GEMS_KEY: &str = "runner.gems";
pub const HIGH_SCORE_KEY: &str = "runner.high_score";

/// Outcome of settling a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settlement {
    /// Coins credited for score not paid out before
    pub payout: u64,
    pub new_high_score: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Economy {
    pub coins: u64,
    pub gems: u64,
    pub high_score: u64,
}

impl Economy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from storage; missing keys read as zero, negative values clamp to zero
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        let read = |key: &str| -> Result<u64, StoreError> {
            Ok(store.load_int(key)?.map_or(0, |v| v.max(0) as u64))
        };
        let economy = Self {
            coins: read(COINS_KEY)?,
            gems: read(GEMS_KEY)?,
            high_score: read(HIGH_SCORE_KEY)?,
        };
        log::info!(
            "Economy loaded: {} coins, {} gems, best {}",
            economy.coins,
            economy.gems,
            economy.high_score
        );
        Ok(economy)
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        store.store_all(&[
            (COINS_KEY, clamp_i64(self.coins)),
            (GEMS_KEY, clamp_i64(self.gems)),
            (HIGH_SCORE_KEY, clamp_i64(self.high_score)),
        ])?;
        log::debug!("Economy saved");
        Ok(())
    }

    pub fn credit_coins(&mut self, n: u64) {
        self.coins = self.coins.saturating_add(n);
    }

    pub fn credit_gems(&mut self, n: u64) {
        self.gems = self.gems.saturating_add(n);
    }

    /// Spend `price` coins; fails without side effects when short
    pub fn purchase(&mut self, price: u64) -> Result<(), SimError> {
        if self.coins < price {
            return Err(SimError::ResourceExhausted {
                needed: price,
                available: self.coins,
            });
        }
        self.coins -= price;
        Ok(())
    }

    /// Pay out the unsettled part of `score` and record a new best.
    ///
    /// `settled` is the part of the score already paid out (non-zero when a
    /// resumed run kept its score), so the same points are never paid twice.
    pub fn settle_run(&mut self, score: u64, settled: u64, divisor: u64) -> Settlement {
        let divisor = divisor.max(1);
        let payout = (score / divisor).saturating_sub(settled / divisor);
        self.credit_coins(payout);

        let new_high_score = score > self.high_score;
        if new_high_score {
            self.high_score = score;
        }
        Settlement {
            payout,
            new_high_score,
        }
    }
}

fn clamp_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{JsonFileStore, MemoryStore};

    #[test]
    fn test_purchase_rejected_when_short() {
        let mut economy = Economy {
            coins: 40,
            ..Default::default()
        };
        assert_eq!(
            economy.purchase(50),
            Err(SimError::ResourceExhausted {
                needed: 50,
                available: 40
            })
        );
        assert_eq!(economy.coins, 40);
        economy.purchase(40).unwrap();
        assert_eq!(economy.coins, 0);
    }

    #[test]
    fn test_settle_pays_once() {
        let mut economy = Economy::new();
        let first = economy.settle_run(125, 0, 10);
        assert_eq!(first.payout, 12);
        assert!(first.new_high_score);
        assert_eq!(economy.high_score, 125);

        // Resumed run kept its 125 points and reached 180
        let second = economy.settle_run(180, 125, 10);
        assert_eq!(second.payout, 6);
        assert_eq!(economy.coins, 18);

        let third = economy.settle_run(90, 0, 10);
        assert!(!third.new_high_score);
        assert_eq!(economy.high_score, 180);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut store = MemoryStore::new();
        let economy = Economy {
            coins: 7,
            gems: 3,
            high_score: 420,
        };
        economy.save(&mut store).unwrap();
        assert_eq!(Economy::load(&store).unwrap(), economy);
    }

    #[test]
    fn test_failed_save_keeps_previous_progress_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("economy.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        let saved = Economy {
            coins: 7,
            gems: 3,
            high_score: 420,
        };
        saved.save(&mut store).unwrap();

        std::fs::create_dir(path.with_extension("tmp")).unwrap();
        let newer = Economy {
            coins: 70,
            gems: 30,
            high_score: 900,
        };
        assert!(newer.save(&mut store).is_err());
        assert_eq!(Economy::load(&store).unwrap(), saved);
        assert_eq!(Economy::load(&JsonFileStore::open(&path).unwrap()).unwrap(), saved);
    }

    #[test]
    fn test_missing_and_negative_values_load_as_zero() {
        let mut store = MemoryStore::new();
        store.store(COINS_KEY, -5).unwrap();
        let economy = Economy::load(&store).unwrap();
        assert_eq!(economy, Economy::default());
    }
}
