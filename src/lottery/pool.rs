//! Core pool state machine: entries, draws, resets, reads.
//!
//! `LotteryPool` owns the round state and is generic over its two
//! collaborators, the ledger that custodies value and the randomness source
//! that picks draw indices. All methods validate first and mutate last; the
//! ledger call in `enter` and `pick_winner` happens before any field is
//! touched, so a failed transfer leaves the pool exactly as it was.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use crate::ledger::Ledger;
use crate::randomness::RandomnessSource;

use super::{LotteryError, LotteryResult};

// ============================================================================
// CONSTANTS & TYPES
// ============================================================================

/// Smallest entrant count that allows a draw.
pub const MIN_PLAYERS: usize = 3;

/// One entry in the current round, in entry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    pub address: String,
    pub stake: u64,
}

/// Settled round, appended to history when a winner is paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    /// Round number; equals this record's index in the winner history.
    pub round: u64,
    pub address: String,
    /// Pot paid to the winner.
    pub amount: u64,
    /// Entrant count the winner was drawn from.
    pub entrants: usize,
    pub settled_at: u64,
}

/// Point-in-time counters for the stats endpoint.
/// The pot amount is deliberately absent; reading it is operator-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStats {
    pub current_players: usize,
    pub rounds_completed: u64,
    pub total_paid_out: u64,
    pub min_players: usize,
}

// ============================================================================
// LOTTERY POOL
// ============================================================================

/// Single-operator lottery pool.
///
/// The pool tracks entrants and the pot for the running round plus the
/// full winner history. Value lives in the ledger under `account`; the
/// `pot` field mirrors what that account should hold for this round.
pub struct LotteryPool<L: Ledger, R: RandomnessSource> {
    operator: String,
    account: String,
    entrants: Vec<Entrant>,
    pot: u64,
    winners: Vec<WinnerRecord>,
    total_paid_out: u64,
    ledger: L,
    randomness: R,
}

impl<L: Ledger, R: RandomnessSource> LotteryPool<L, R> {
    pub fn new(
        operator: impl Into<String>,
        account: impl Into<String>,
        ledger: L,
        randomness: R,
    ) -> Self {
        Self {
            operator: operator.into(),
            account: account.into(),
            entrants: Vec::new(),
            pot: 0,
            winners: Vec::new(),
            total_paid_out: 0,
            ledger,
            randomness,
        }
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Enters `address` into the current round with `stake`.
    ///
    /// The stake is credited to the pool account before the entrant list
    /// changes. Returns the entrant's position in the round (0-based).
    pub fn enter(&mut self, address: &str, stake: u64) -> LotteryResult<usize> {
        if stake == 0 {
            return Err(LotteryError::InvalidStake);
        }
        if self.entrants.iter().any(|e| e.address == address) {
            return Err(LotteryError::DuplicateEntry(address.to_string()));
        }

        // Move value first. If the credit fails the round is untouched.
        self.ledger.credit(&self.account, stake)?;

        self.entrants.push(Entrant {
            address: address.to_string(),
            stake,
        });
        self.pot += stake;
        self.debug_check_pot();

        let position = self.entrants.len() - 1;
        info!(
            address = %address,
            stake = stake,
            position = position,
            pot = self.pot,
            "Player entered the pool"
        );
        Ok(position)
    }

    /// Draws a winner uniformly over the current entrants and sweeps the
    /// whole pool balance to them. Operator only.
    ///
    /// On success the entrant list clears and the pot returns to zero;
    /// the settled round is appended to the winner history.
    pub fn pick_winner(&mut self, caller: &str) -> LotteryResult<WinnerRecord> {
        self.require_operator(caller)?;
        if self.entrants.len() < MIN_PLAYERS {
            return Err(LotteryError::InsufficientPlayers {
                have: self.entrants.len(),
                need: MIN_PLAYERS,
            });
        }

        let index = self.randomness.draw(self.entrants.len());
        let winner = self.entrants[index].address.clone();

        // Pay out before recording anything. A failed sweep aborts the
        // draw with the round still open.
        let paid = self.ledger.debit_all(&self.account, &winner)?;
        if paid != self.pot {
            // The recorded pot stays authoritative for the history entry.
            warn!(
                expected = self.pot,
                paid = paid,
                account = %self.account,
                "Pool account balance drifted from the recorded pot"
            );
        }

        let record = WinnerRecord {
            round: self.winners.len() as u64,
            address: winner,
            amount: self.pot,
            entrants: self.entrants.len(),
            settled_at: current_timestamp(),
        };

        info!(
            round = record.round,
            winner = %record.address,
            amount = record.amount,
            entrants = record.entrants,
            "Winner drawn and paid"
        );

        self.winners.push(record.clone());
        // Lifetime counter; pots can recirculate, so the sum may not fit.
        self.total_paid_out = self.total_paid_out.saturating_add(record.amount);
        self.entrants.clear();
        self.pot = 0;
        self.debug_check_pot();

        Ok(record)
    }

    /// Abandons the current round without a draw. Operator only.
    ///
    /// Clears the entrant list and the recorded pot. Stakes already moved
    /// to the pool account stay there; they are swept to the next winner.
    /// Returns the number of entries discarded.
    pub fn reset_game(&mut self, caller: &str) -> LotteryResult<usize> {
        self.require_operator(caller)?;

        let discarded = self.entrants.len();
        self.entrants.clear();
        self.pot = 0;
        self.debug_check_pot();

        if discarded > 0 {
            warn!(discarded = discarded, "Round reset discarded entries without payout");
        } else {
            info!("Round reset by operator");
        }
        Ok(discarded)
    }

    // ------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------

    /// Current pot. Operator only.
    pub fn get_balance(&self, caller: &str) -> LotteryResult<u64> {
        self.require_operator(caller)?;
        Ok(self.pot)
    }

    pub fn get_player(&self, index: usize) -> LotteryResult<&Entrant> {
        self.entrants
            .get(index)
            .ok_or(LotteryError::IndexOutOfRange {
                index,
                len: self.entrants.len(),
            })
    }

    pub fn get_player_count(&self) -> usize {
        self.entrants.len()
    }

    pub fn get_winner(&self, index: usize) -> LotteryResult<&WinnerRecord> {
        self.winners
            .get(index)
            .ok_or(LotteryError::IndexOutOfRange {
                index,
                len: self.winners.len(),
            })
    }

    pub fn winner_count(&self) -> usize {
        self.winners.len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            current_players: self.entrants.len(),
            rounds_completed: self.winners.len() as u64,
            total_paid_out: self.total_paid_out,
            min_players: MIN_PLAYERS,
        }
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Whether the pot equals the sum of entrant stakes. Holds after every
    /// operation; exposed so tests can assert it directly.
    pub fn pot_consistent(&self) -> bool {
        self.pot == self.entrants.iter().map(|e| e.stake).sum::<u64>()
    }

    // ------------------------------------------------------------------
    // Internal
    // ------------------------------------------------------------------

    fn require_operator(&self, caller: &str) -> LotteryResult<()> {
        if caller != self.operator {
            warn!(caller = %caller, "Rejected non-operator call");
            return Err(LotteryError::Unauthorized);
        }
        Ok(())
    }

    fn debug_check_pot(&self) {
        debug_assert!(self.pot_consistent(), "pot diverged from entrant stakes");
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
