//! Ledger - Value Custody for the Pool
//!
//! The pool never holds value itself. Every stake is credited to the pool's
//! ledger account at entry time, and the whole pot is moved to the winner in
//! one sweep at draw time. The pool only records who is in and how much the
//! pot should be; the ledger is the custodian.
//!
//! Flow:
//! 1. enter -> credit(pool_account, stake)
//! 2. pick_winner -> debit_all(pool_account, winner)
//! 3. read paths -> balance_of(address)
//!
//! Every transfer is all-or-nothing. A failed call leaves balances exactly
//! as they were, which is what lets the pool treat a ledger error as a
//! clean abort.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum LedgerError {
    #[error("Ledger rejected a zero amount")]
    ZeroAmount,

    #[error("Ledger balance overflow on account {0}")]
    Overflow(String),

    #[error("Ledger backend error: {0}")]
    Backend(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

// ============================================================================
// LEDGER TRAIT
// ============================================================================

/// External custodian of account balances.
///
/// Implementations must be all-or-nothing: when a call returns an error, no
/// balance may have changed.
pub trait Ledger {
    /// Adds `amount` to `address`. Zero amounts are rejected.
    fn credit(&self, address: &str, amount: u64) -> LedgerResult<()>;

    /// Moves the entire balance of `from` to `to` and returns the amount
    /// moved. A zero source balance moves nothing and returns 0.
    fn debit_all(&self, from: &str, to: &str) -> LedgerResult<u64>;

    /// Current balance of `address`; unknown accounts read as 0.
    fn balance_of(&self, address: &str) -> u64;
}

// ============================================================================
// IN-MEMORY LEDGER
// ============================================================================

/// Thread-safe in-memory ledger backed by a concurrent map.
///
/// Accounts are created on first credit. Cloning is cheap and shares the
/// underlying balances.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: Arc<DashMap<String, u64>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            balances: Arc::new(DashMap::new()),
        }
    }

    /// Sum of every account balance. Transfers never change this;
    /// only credits do.
    pub fn total_held(&self) -> u64 {
        self.balances.iter().map(|entry| *entry.value()).sum()
    }

    pub fn account_count(&self) -> usize {
        self.balances.len()
    }
}

impl Ledger for InMemoryLedger {
    fn credit(&self, address: &str, amount: u64) -> LedgerResult<()> {
        if amount == 0 {
            warn!(address = %address, "Rejected zero-amount credit");
            return Err(LedgerError::ZeroAmount);
        }

        let mut balance = self.balances.entry(address.to_string()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(address.to_string()))?;

        info!(
            address = %address,
            amount = amount,
            new_balance = *balance,
            "Ledger credit applied"
        );
        Ok(())
    }

    fn debit_all(&self, from: &str, to: &str) -> LedgerResult<u64> {
        if from == to {
            return Ok(self.balance_of(from));
        }

        // Take the source balance out first so a crashed destination update
        // cannot double-count it.
        let Some((_, amount)) = self.balances.remove(from) else {
            return Ok(0);
        };
        if amount == 0 {
            return Ok(0);
        }

        let mut destination = self.balances.entry(to.to_string()).or_insert(0);
        match destination.checked_add(amount) {
            Some(updated) => {
                *destination = updated;
            }
            None => {
                // Put the source balance back before reporting failure.
                drop(destination);
                self.balances.insert(from.to_string(), amount);
                return Err(LedgerError::Overflow(to.to_string()));
            }
        }

        info!(
            from = %from,
            to = %to,
            amount = amount,
            "Ledger swept full balance"
        );
        Ok(amount)
    }

    fn balance_of(&self, address: &str) -> u64 {
        self.balances.get(address).map(|b| *b).unwrap_or(0)
    }
}
