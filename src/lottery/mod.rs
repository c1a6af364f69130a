//! Lottery Pool - Staked Entry, Operator Draws, Full-Pot Payout
//!
//! One pool, one operator. Players enter with a positive stake, the pool
//! custodies value through a [`Ledger`](crate::ledger::Ledger) account, and
//! once at least [`MIN_PLAYERS`](pool::MIN_PLAYERS) are in, the operator can
//! draw a uniformly random winner who receives the entire pot. Winning a
//! round resets the entrant list for the next one; winner history only grows.
//!
//! Flow:
//! 1. Player enters -> stake credited to the pool account, entrant appended
//! 2. Operator draws -> winner picked, whole pool balance swept to them
//! 3. Entrants clear, pot returns to zero, history records the round
//!
//! Security rules:
//! - Only the operator can draw a winner, reset, or read the pot
//! - An address can hold at most one entry per round
//! - Ledger moves happen before any pool state changes, so a ledger
//!   failure aborts with the pool untouched

pub mod pool;
pub mod shared;

pub use pool::{Entrant, LotteryPool, PoolStats, WinnerRecord, MIN_PLAYERS};
pub use shared::SharedLottery;

use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum LotteryError {
    #[error("Caller is not the pool operator")]
    Unauthorized,

    #[error("Address {0} already entered this round")]
    DuplicateEntry(String),

    #[error("Not enough players: have {have}, need {need}")]
    InsufficientPlayers { have: usize, need: usize },

    #[error("Stake must be greater than zero")]
    InvalidStake,

    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Ledger failure: {0}")]
    LedgerFailure(#[from] LedgerError),
}

pub type LotteryResult<T> = Result<T, LotteryError>;
