//! Money and lives bookkeeping.

use defense_zone_core::{InsufficientFunds, LedgerSnapshot};

/// Tracks the player's money and remaining lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceLedger {
    money: u32,
    lives: u32,
}

impl ResourceLedger {
    /// Creates a ledger holding the provided money and lives.
    #[must_use]
    pub const fn new(money: u32, lives: u32) -> Self {
        Self { money, lives }
    }

    /// Money available to spend.
    #[must_use]
    pub const fn money(&self) -> u32 {
        self.money
    }

    /// Lives left before the game is over.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Reports whether `amount` can be spent.
    #[must_use]
    pub const fn can_afford(&self, amount: u32) -> bool {
        self.money >= amount
    }

    /// Debits `amount`, returning `false` and leaving the ledger untouched when
    /// it would drive money negative.
    pub fn spend(&mut self, amount: u32) -> bool {
        self.try_spend(amount).is_ok()
    }

    /// Debits `amount`, reporting the shortfall when it cannot be covered.
    pub fn try_spend(&mut self, amount: u32) -> Result<(), InsufficientFunds> {
        if !self.can_afford(amount) {
            return Err(InsufficientFunds {
                required: amount,
                available: self.money,
            });
        }
        self.money -= amount;
        Ok(())
    }

    /// Credits `amount`.
    pub fn earn(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Removes one life, returning `true` when none are left.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.lives == 0
    }

    /// Captures the current balances.
    #[must_use]
    pub const fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            money: self.money,
            lives: self.lives,
        }
    }
}
