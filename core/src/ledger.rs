//! Resource ledger — the player's timber stock and current accrual rate.
//!
//! RULE: timber never drops below zero. A debit larger than the stock is
//! rejected whole; there is no partial spend.

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLedger {
    timber: f64,
    /// Timber per accrual period. Derived, never persisted.
    rate: f64,
}

impl ResourceLedger {
    pub fn new(timber: f64) -> Self {
        Self { timber: timber.max(0.0), rate: 0.0 }
    }

    pub fn current(&self) -> f64 {
        self.timber
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub(crate) fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    pub fn can_afford(&self, amount: f64) -> bool {
        amount <= self.timber
    }

    /// Negative credits are ignored.
    pub fn credit(&mut self, amount: f64) {
        if amount > 0.0 {
            self.timber += amount;
        }
    }

    pub fn debit(&mut self, amount: f64) -> SimResult<()> {
        if !self.can_afford(amount) {
            return Err(SimError::InsufficientResources {
                needed:    amount,
                available: self.timber,
            });
        }
        self.timber -= amount.max(0.0);
        Ok(())
    }
}
