//! Shared handle for serving one pool from many tasks.
//!
//! `SharedLottery` wraps the pool in `Arc<RwLock<..>>` so HTTP handlers can
//! clone it freely. Mutators take the write lock, so entries, draws and
//! resets serialize; readers take the read lock and copy what they need out,
//! so every response reflects one consistent pool state.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::ledger::Ledger;
use crate::randomness::RandomnessSource;

use super::pool::{Entrant, LotteryPool, PoolStats, WinnerRecord};
use super::LotteryResult;

pub struct SharedLottery<L: Ledger, R: RandomnessSource> {
    inner: Arc<RwLock<LotteryPool<L, R>>>,
}

// Manual impl: cloning the handle must not require cloning the pool.
impl<L: Ledger, R: RandomnessSource> Clone for SharedLottery<L, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: Ledger, R: RandomnessSource> SharedLottery<L, R> {
    pub fn new(pool: LotteryPool<L, R>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(pool)),
        }
    }

    // ------------------------------------------------------------------
    // Mutators (write lock)
    // ------------------------------------------------------------------

    pub fn enter(&self, address: &str, stake: u64) -> LotteryResult<usize> {
        self.inner.write().enter(address, stake)
    }

    pub fn pick_winner(&self, caller: &str) -> LotteryResult<WinnerRecord> {
        self.inner.write().pick_winner(caller)
    }

    pub fn reset_game(&self, caller: &str) -> LotteryResult<usize> {
        self.inner.write().reset_game(caller)
    }

    // ------------------------------------------------------------------
    // Readers (read lock)
    // ------------------------------------------------------------------

    pub fn get_balance(&self, caller: &str) -> LotteryResult<u64> {
        self.inner.read().get_balance(caller)
    }

    pub fn get_player(&self, index: usize) -> LotteryResult<Entrant> {
        self.inner.read().get_player(index).cloned()
    }

    pub fn get_player_count(&self) -> usize {
        self.inner.read().get_player_count()
    }

    pub fn get_winner(&self, index: usize) -> LotteryResult<WinnerRecord> {
        self.inner.read().get_winner(index).cloned()
    }

    pub fn winner_count(&self) -> usize {
        self.inner.read().winner_count()
    }

    pub fn stats(&self) -> PoolStats {
        self.inner.read().stats()
    }

    pub fn operator(&self) -> String {
        self.inner.read().operator().to_string()
    }

    pub fn ledger_balance_of(&self, address: &str) -> u64 {
        self.inner.read().ledger().balance_of(address)
    }
}
