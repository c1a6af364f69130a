//! Lottery Pool Service
//!
//! Staked lottery rounds with operator-controlled draws and full-pot payouts.
//!
//! ## Architecture
//!
//! - **Pool**: single round state machine behind a shared RwLock handle
//! - **Ledger**: pluggable value custody (DashMap-backed in-memory default)
//! - **Randomness**: OS entropy in production, seedable for replays
//! - **Server**: Axum JSON API over a shared pool handle

// Core modules
pub mod ledger;
pub mod lottery;
pub mod randomness;

// ============================================================================
// PUBLIC API
// ============================================================================

// Pool
pub use lottery::{
    Entrant, LotteryError, LotteryPool, LotteryResult, PoolStats, SharedLottery, WinnerRecord,
    MIN_PLAYERS,
};

// Ledger
pub use ledger::{InMemoryLedger, Ledger, LedgerError, LedgerResult};

// Randomness
pub use randomness::{OsRandomness, RandomnessSource, SeededRandomness};
