//! Treasury accounting.
//!
//! `balance` tracks the tokens the pool owns; `reserved` is the sum of
//! winning rewards promised to Active sessions. Only `balance - reserved`
//! can back a new reservation or an owner withdrawal, so a session that
//! started can always be paid.
//!
//! A reservation is held until its session ends. Nothing reaps abandoned
//! sessions, so a player who starts and walks away keeps
//! `winning_reward - entry_fee` of pool liquidity locked (0.006 on HARD)
//! until they reveal or `forfeit`. That locked amount is unavailable to
//! new `start` calls and to `owner_withdraw`.

use soroban_sdk::{contracttype, token::TokenClient, Address, Env};

use crate::{MinesweeperError, StorageKey};

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TreasuryState {
    pub balance: i128,
    pub reserved: i128,
}

impl TreasuryState {
    pub fn available(&self) -> i128 {
        self.balance - self.reserved
    }

    pub fn deposit(&mut self, amount: i128) -> Result<(), MinesweeperError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(MinesweeperError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn reserve(&mut self, amount: i128) -> Result<(), MinesweeperError> {
        if amount > self.available() {
            return Err(MinesweeperError::InsufficientTreasury);
        }
        self.reserved = self
            .reserved
            .checked_add(amount)
            .ok_or(MinesweeperError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn release(&mut self, amount: i128) -> Result<(), MinesweeperError> {
        // Unreachable while every release matches an earlier reserve.
        if amount > self.reserved {
            return Err(MinesweeperError::ArithmeticOverflow);
        }
        self.reserved -= amount;
        Ok(())
    }

    /// Pays out of the whole balance. Never pays partially.
    pub fn payout(&mut self, amount: i128) -> Result<(), MinesweeperError> {
        if amount > self.balance {
            return Err(MinesweeperError::InsufficientTreasury);
        }
        self.balance -= amount;
        Ok(())
    }

    /// Owner skim, limited to unreserved funds.
    pub fn withdraw(&mut self, amount: i128) -> Result<(), MinesweeperError> {
        if amount > self.available() {
            return Err(MinesweeperError::InsufficientTreasury);
        }
        self.balance -= amount;
        Ok(())
    }
}

pub fn load(env: &Env) -> TreasuryState {
    env.storage()
        .instance()
        .get(&StorageKey::Treasury)
        .unwrap_or_default()
}

pub fn save(env: &Env, state: &TreasuryState) {
    env.storage().instance().set(&StorageKey::Treasury, state);
}

// ─── Token movements ──────────────────────────────────────────────────────────

pub fn collect(env: &Env, token: &Address, from: &Address, amount: i128) {
    if amount > 0 {
        let escrow = env.current_contract_address();
        TokenClient::new(env, token).transfer(from, &escrow, &amount);
    }
}

pub fn disburse(env: &Env, token: &Address, to: &Address, amount: i128) {
    if amount > 0 {
        let escrow = env.current_contract_address();
        TokenClient::new(env, token).transfer(&escrow, to, &amount);
    }
}
