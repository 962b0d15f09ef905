//! # Claim Ledger
//!
//! Last successful claim per account. Records are created on first claim,
//! overwritten on every later one and never removed.
//!
//! The ledger itself is not locked; the engine keeps it inside its state
//! mutex so the check and the record happen under one lock.

use std::collections::HashMap;

use alloy_primitives::Address;
use creamery_shared::{Timestamp, CLAIM_COOLDOWN_SECS};

use crate::error::{RewardError, RewardResult};

/// Per-account cooldown gate.
#[derive(Clone, Debug)]
pub struct ClaimLedger {
    last_claims: HashMap<Address, Timestamp>,
    cooldown_secs: u64,
}

impl Default for ClaimLedger {
    fn default() -> Self {
        Self::new(CLAIM_COOLDOWN_SECS)
    }
}

impl ClaimLedger {
    /// Creates an empty ledger with the given cooldown.
    #[must_use]
    pub fn new(cooldown_secs: u64) -> Self {
        Self {
            last_claims: HashMap::new(),
            cooldown_secs,
        }
    }

    /// Cooldown between two claims of one account.
    #[inline]
    #[must_use]
    pub const fn cooldown_secs(&self) -> u64 {
        self.cooldown_secs
    }

    /// Last successful claim of `account`.
    #[must_use]
    pub fn last_claim(&self, account: Address) -> Option<Timestamp> {
        self.last_claims.get(&account).copied()
    }

    /// Earliest time `account` may claim again. `None` if it never claimed.
    #[must_use]
    pub fn next_claim_at(&self, account: Address) -> Option<Timestamp> {
        self.last_claim(account)
            .map(|last| last.saturating_add(self.cooldown_secs))
    }

    /// True if `account` never claimed or its cooldown has elapsed at `now`.
    ///
    /// A `now` earlier than the recorded claim counts as zero elapsed time.
    #[must_use]
    pub fn can_claim(&self, account: Address, now: Timestamp) -> bool {
        self.last_claim(account)
            .map_or(true, |last| now.saturating_sub(last) >= self.cooldown_secs)
    }

    /// Fails with `ClaimTooSoon` unless [`Self::can_claim`] holds.
    ///
    /// # Errors
    ///
    /// `ClaimTooSoon` with the last claim and the earliest retry time.
    pub fn ensure_can_claim(&self, account: Address, now: Timestamp) -> RewardResult<()> {
        match self.last_claim(account) {
            Some(last_claim) if !self.can_claim(account, now) => Err(RewardError::ClaimTooSoon {
                account,
                last_claim,
                next_claim_at: last_claim.saturating_add(self.cooldown_secs),
            }),
            _ => Ok(()),
        }
    }

    /// Records a successful claim at `now`.
    pub fn record_claim(&mut self, account: Address, now: Timestamp) {
        self.last_claims.insert(account, now);
    }

    /// Number of accounts that ever claimed.
    #[must_use]
    pub fn claimant_count(&self) -> usize {
        self.last_claims.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;
    const T0: Timestamp = 1_700_000_000;

    #[test]
    fn test_first_claim_always_allowed() {
        let ledger = ClaimLedger::default();
        let account = Address::repeat_byte(1);
        assert!(ledger.can_claim(account, 0));
        assert!(ledger.can_claim(account, T0));
        assert_eq!(ledger.last_claim(account), None);
        assert_eq!(ledger.next_claim_at(account), None);
    }

    #[test]
    fn test_cooldown_boundary() {
        let mut ledger = ClaimLedger::default();
        let account = Address::repeat_byte(1);
        ledger.record_claim(account, T0);

        assert!(!ledger.can_claim(account, T0));
        assert!(!ledger.can_claim(account, T0 + DAY / 2));
        assert!(!ledger.can_claim(account, T0 + DAY - 1));
        assert!(ledger.can_claim(account, T0 + DAY));
        assert!(ledger.can_claim(account, T0 + DAY + 1));
        assert_eq!(ledger.next_claim_at(account), Some(T0 + DAY));
    }

    #[test]
    fn test_clock_going_backwards_is_too_soon() {
        let mut ledger = ClaimLedger::default();
        let account = Address::repeat_byte(1);
        ledger.record_claim(account, T0);
        assert!(!ledger.can_claim(account, T0 - 10));
    }

    #[test]
    fn test_ensure_reports_retry_time() {
        let mut ledger = ClaimLedger::new(60);
        let account = Address::repeat_byte(2);
        ledger.record_claim(account, 1_000);

        let err = ledger.ensure_can_claim(account, 1_030).unwrap_err();
        assert_eq!(
            err,
            RewardError::ClaimTooSoon {
                account,
                last_claim: 1_000,
                next_claim_at: 1_060,
            }
        );
        assert_eq!(err.to_string(), "Claimed in the last 24 hours");
        assert!(ledger.ensure_can_claim(account, 1_060).is_ok());
    }

    #[test]
    fn test_accounts_are_independent() {
        let mut ledger = ClaimLedger::default();
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        ledger.record_claim(a, T0);
        assert!(ledger.can_claim(b, T0));
        ledger.record_claim(b, T0 + 5);
        assert_eq!(ledger.claimant_count(), 2);
        assert_eq!(ledger.last_claim(a), Some(T0));
    }
}
