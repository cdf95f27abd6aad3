//! # Reward Token Contract
//!
//! Fungible balance ledger for the Student Reward Token (SRT) — the
//! ERC-20-shaped currency of the achievement platform. Balances, spending
//! allowances, and total supply live here; minting is gated behind an
//! owner-managed set of authorized minters.
//!
//! ## Security Model
//!
//! - **Mint gating**: only accounts in the authorized-minter set may create
//!   new supply. The contract owner is always a minter and cannot be removed.
//! - **Caller identity is a trusted input**: the platform runs in-process
//!   with a single writer, so callers are identified by opaque address
//!   strings, not signatures.
//! - **Supply tracking**: total supply equals the sum of all balances after
//!   every operation. Every guard is checked before any state is touched,
//!   and supply arithmetic is overflow-checked.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::Address;

/// Display name of the reward token.
pub const TOKEN_NAME: &str = "Student Reward Token";

/// Ticker symbol of the reward token.
pub const TOKEN_SYMBOL: &str = "SRT";

/// Decimal precision, matching the ERC-20 convention.
pub const TOKEN_DECIMALS: u8 = 18;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during reward token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The caller is not in the authorized-minter set.
    #[error("unauthorized: {account} is not an authorized minter")]
    Unauthorized {
        /// The account that attempted to mint.
        account: Address,
    },

    /// The caller is not the contract owner.
    #[error("unauthorized: only the owner can manage minters, not {caller}")]
    NotOwner {
        /// The account that attempted the owner-only operation.
        caller: Address,
    },

    /// A zero or otherwise unusable amount was supplied.
    #[error("invalid amount: {amount} (must be positive)")]
    InvalidAmount {
        /// The rejected amount.
        amount: u64,
    },

    /// The account does not hold enough tokens.
    #[error("insufficient balance: account has {balance}, needs {amount}")]
    InsufficientBalance {
        /// Current balance of the account.
        balance: u64,
        /// Amount the operation required.
        amount: u64,
    },

    /// A delegated transfer exceeds the spender's allowance.
    #[error("amount exceeds allowance: allowed {allowed}, requested {requested}")]
    ExceedsAllowance {
        /// The spender's current allowance.
        allowed: u64,
        /// Amount the spender tried to move.
        requested: u64,
    },

    /// Minting would overflow the total supply.
    #[error("supply overflow: minting {amount} would exceed u64::MAX")]
    SupplyOverflow {
        /// The amount that was attempted.
        amount: u64,
    },

    /// The owner must always remain a minter.
    #[error("cannot remove owner as minter")]
    OwnerIsMinter,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// The reward token ledger — balances, allowances, and the minter set for
/// a single fungible asset.
///
/// In production this state would sit behind a durable store; the in-memory
/// representation carries all of the validation logic and is what the
/// orchestration layer and tests run against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardToken {
    /// The contract owner. Set at construction, never changes.
    owner: Address,
    /// Total token supply. Always equals the sum of all balances.
    total_supply: u64,
    /// Per-account balances. Absent key means balance 0.
    balances: HashMap<Address, u64>,
    /// Spending allowances: `owner -> (spender -> amount)`.
    allowances: HashMap<Address, HashMap<Address, u64>>,
    /// Accounts permitted to mint new supply.
    authorized_minters: HashSet<Address>,
}

impl RewardToken {
    /// Creates the reward token ledger with the given owner.
    ///
    /// The owner is seeded as the sole authorized minter. Construction is
    /// the one-time initialization step; there is no way to re-initialize
    /// an existing ledger.
    pub fn new(owner: impl Into<Address>) -> Self {
        let owner = owner.into();
        let mut authorized_minters = HashSet::new();
        authorized_minters.insert(owner.clone());
        Self {
            owner,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            authorized_minters,
        }
    }

    /// Returns the contract owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the total token supply.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Returns the balance of `account`, or 0 for unknown accounts.
    pub fn balance_of(&self, account: &str) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Returns the allowance `spender` holds over `owner`'s balance, or 0.
    pub fn allowance_of(&self, owner: &str, spender: &str) -> u64 {
        self.allowances
            .get(owner)
            .and_then(|per_spender| per_spender.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Returns an iterator over every account that has ever held a balance,
    /// paired with its current balance. Iteration order is unspecified.
    pub fn balances(&self) -> impl Iterator<Item = (&str, u64)> {
        self.balances.iter().map(|(a, b)| (a.as_str(), *b))
    }

    /// Mints `amount` new tokens to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Unauthorized`] if `minter` is not in the
    /// authorized-minter set.
    /// Returns [`TokenError::InvalidAmount`] if `amount` is zero.
    /// Returns [`TokenError::SupplyOverflow`] if the mint would overflow.
    pub fn mint(&mut self, minter: &str, recipient: &str, amount: u64) -> Result<(), TokenError> {
        if !self.authorized_minters.contains(minter) {
            return Err(TokenError::Unauthorized {
                account: minter.to_string(),
            });
        }
        if amount == 0 {
            return Err(TokenError::InvalidAmount { amount });
        }

        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow { amount })?;

        self.total_supply = new_supply;
        // Sum of balances equals total supply, so this cannot overflow once
        // the supply check has passed.
        *self.balances.entry(recipient.to_string()).or_insert(0) += amount;

        Ok(())
    }

    /// Burns `amount` tokens from `account`, reducing total supply.
    ///
    /// Burning zero is a legal no-op: only the balance guard applies.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InsufficientBalance`] if `account` holds less
    /// than `amount`.
    pub fn burn(&mut self, account: &str, amount: u64) -> Result<(), TokenError> {
        let balance = self.balance_of(account);
        if balance < amount {
            return Err(TokenError::InsufficientBalance { balance, amount });
        }

        *self.balances.entry(account.to_string()).or_insert(0) -= amount;
        self.total_supply -= amount;

        Ok(())
    }

    /// Transfers `amount` from `sender` to `recipient`.
    ///
    /// Both balance updates happen after all guards have passed, so a
    /// failed transfer changes neither account.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidAmount`] if `amount` is zero.
    /// Returns [`TokenError::InsufficientBalance`] if `sender` holds less
    /// than `amount`.
    pub fn transfer(&mut self, sender: &str, recipient: &str, amount: u64) -> Result<(), TokenError> {
        if amount == 0 {
            return Err(TokenError::InvalidAmount { amount });
        }
        let balance = self.balance_of(sender);
        if balance < amount {
            return Err(TokenError::InsufficientBalance { balance, amount });
        }

        *self.balances.entry(sender.to_string()).or_insert(0) -= amount;
        *self.balances.entry(recipient.to_string()).or_insert(0) += amount;

        Ok(())
    }

    /// Sets `spender`'s allowance over `owner`'s balance to exactly `amount`.
    ///
    /// Overwrite semantics: repeated approvals replace, never accumulate.
    pub fn approve(&mut self, owner: &str, spender: &str, amount: u64) {
        self.allowances
            .entry(owner.to_string())
            .or_default()
            .insert(spender.to_string(), amount);
    }

    /// Moves `amount` from `owner` to `recipient` on behalf of `spender`,
    /// consuming that much of the spender's allowance.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ExceedsAllowance`] if `amount` exceeds the
    /// spender's allowance.
    /// Returns [`TokenError::InsufficientBalance`] if `owner` holds less
    /// than `amount`.
    pub fn transfer_from(
        &mut self,
        spender: &str,
        owner: &str,
        recipient: &str,
        amount: u64,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance_of(owner, spender);
        if amount > allowed {
            return Err(TokenError::ExceedsAllowance {
                allowed,
                requested: amount,
            });
        }
        let balance = self.balance_of(owner);
        if balance < amount {
            return Err(TokenError::InsufficientBalance { balance, amount });
        }

        *self.balances.entry(owner.to_string()).or_insert(0) -= amount;
        *self.balances.entry(recipient.to_string()).or_insert(0) += amount;
        self.allowances
            .entry(owner.to_string())
            .or_default()
            .insert(spender.to_string(), allowed - amount);

        Ok(())
    }

    /// Adds `new_minter` to the authorized-minter set. Owner only.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::NotOwner`] if `caller` is not the owner.
    pub fn add_minter(&mut self, caller: &str, new_minter: &str) -> Result<(), TokenError> {
        if caller != self.owner {
            return Err(TokenError::NotOwner {
                caller: caller.to_string(),
            });
        }
        self.authorized_minters.insert(new_minter.to_string());
        Ok(())
    }

    /// Removes `minter` from the authorized-minter set. Owner only.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::NotOwner`] if `caller` is not the owner.
    /// Returns [`TokenError::OwnerIsMinter`] if `minter` is the owner —
    /// the owner's minting right is permanent.
    pub fn remove_minter(&mut self, caller: &str, minter: &str) -> Result<(), TokenError> {
        if caller != self.owner {
            return Err(TokenError::NotOwner {
                caller: caller.to_string(),
            });
        }
        if minter == self.owner {
            return Err(TokenError::OwnerIsMinter);
        }
        self.authorized_minters.remove(minter);
        Ok(())
    }

    /// Returns whether `account` is an authorized minter. Never errors.
    pub fn is_minter(&self, account: &str) -> bool {
        self.authorized_minters.contains(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_increases_balance_and_supply() {
        let mut token = RewardToken::new("owner");
        token.mint("owner", "alice", 100).unwrap();
        assert_eq!(token.balance_of("alice"), 100);
        assert_eq!(token.total_supply(), 100);
    }

    #[test]
    fn mint_by_non_minter_rejected() {
        let mut token = RewardToken::new("owner");
        let result = token.mint("mallory", "mallory", 100);
        assert!(matches!(result, Err(TokenError::Unauthorized { .. })));
        assert_eq!(token.total_supply(), 0);
    }

    #[test]
    fn mint_zero_rejected() {
        let mut token = RewardToken::new("owner");
        let result = token.mint("owner", "alice", 0);
        assert!(matches!(result, Err(TokenError::InvalidAmount { .. })));
    }

    #[test]
    fn mint_overflow_rejected() {
        let mut token = RewardToken::new("owner");
        token.mint("owner", "alice", u64::MAX).unwrap();
        let result = token.mint("owner", "bob", 1);
        assert!(matches!(result, Err(TokenError::SupplyOverflow { .. })));
        assert_eq!(token.balance_of("bob"), 0);
    }

    #[test]
    fn transfer_moves_funds() {
        let mut token = RewardToken::new("owner");
        token.mint("owner", "alice", 100).unwrap();
        token.transfer("alice", "bob", 40).unwrap();
        assert_eq!(token.balance_of("alice"), 60);
        assert_eq!(token.balance_of("bob"), 40);
        assert_eq!(token.total_supply(), 100);
    }

    #[test]
    fn transfer_insufficient_balance_changes_nothing() {
        let mut token = RewardToken::new("owner");
        token.mint("owner", "alice", 10).unwrap();
        let result = token.transfer("alice", "bob", 11);
        assert!(matches!(
            result,
            Err(TokenError::InsufficientBalance {
                balance: 10,
                amount: 11
            })
        ));
        assert_eq!(token.balance_of("alice"), 10);
        assert_eq!(token.balance_of("bob"), 0);
    }

    #[test]
    fn transfer_zero_rejected() {
        let mut token = RewardToken::new("owner");
        token.mint("owner", "alice", 10).unwrap();
        assert!(token.transfer("alice", "bob", 0).is_err());
    }

    #[test]
    fn self_transfer_is_a_net_noop() {
        let mut token = RewardToken::new("owner");
        token.mint("owner", "alice", 50).unwrap();
        token.transfer("alice", "alice", 20).unwrap();
        assert_eq!(token.balance_of("alice"), 50);
        assert_eq!(token.total_supply(), 50);
    }

    #[test]
    fn burn_reduces_balance_and_supply() {
        let mut token = RewardToken::new("owner");
        token.mint("owner", "alice", 100).unwrap();
        token.burn("alice", 30).unwrap();
        assert_eq!(token.balance_of("alice"), 70);
        assert_eq!(token.total_supply(), 70);
    }

    #[test]
    fn burn_zero_is_legal() {
        let mut token = RewardToken::new("owner");
        token.burn("nobody", 0).unwrap();
        assert_eq!(token.total_supply(), 0);
    }

    #[test]
    fn burn_more_than_balance_rejected() {
        let mut token = RewardToken::new("owner");
        token.mint("owner", "alice", 10).unwrap();
        assert!(token.burn("alice", 11).is_err());
        assert_eq!(token.balance_of("alice"), 10);
    }

    #[test]
    fn approve_overwrites_allowance() {
        let mut token = RewardToken::new("owner");
        token.approve("alice", "carol", 30);
        token.approve("alice", "carol", 10);
        assert_eq!(token.allowance_of("alice", "carol"), 10);
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let mut token = RewardToken::new("owner");
        token.mint("owner", "alice", 100).unwrap();
        token.approve("alice", "carol", 30);
        token.transfer_from("carol", "alice", "bob", 20).unwrap();
        assert_eq!(token.balance_of("alice"), 80);
        assert_eq!(token.balance_of("bob"), 20);
        assert_eq!(token.allowance_of("alice", "carol"), 10);
    }

    #[test]
    fn transfer_from_beyond_allowance_rejected() {
        let mut token = RewardToken::new("owner");
        token.mint("owner", "alice", 100).unwrap();
        token.approve("alice", "carol", 30);
        let result = token.transfer_from("carol", "alice", "bob", 50);
        assert!(matches!(
            result,
            Err(TokenError::ExceedsAllowance {
                allowed: 30,
                requested: 50
            })
        ));
        assert_eq!(token.balance_of("alice"), 100);
    }

    #[test]
    fn transfer_from_beyond_balance_rejected() {
        let mut token = RewardToken::new("owner");
        token.mint("owner", "alice", 10).unwrap();
        token.approve("alice", "carol", 100);
        let result = token.transfer_from("carol", "alice", "bob", 50);
        assert!(matches!(result, Err(TokenError::InsufficientBalance { .. })));
        assert_eq!(token.allowance_of("alice", "carol"), 100);
    }

    #[test]
    fn owner_manages_minters() {
        let mut token = RewardToken::new("owner");
        token.add_minter("owner", "registrar").unwrap();
        assert!(token.is_minter("registrar"));

        token.remove_minter("owner", "registrar").unwrap();
        assert!(!token.is_minter("registrar"));
    }

    #[test]
    fn non_owner_cannot_manage_minters() {
        let mut token = RewardToken::new("owner");
        assert!(matches!(
            token.add_minter("mallory", "mallory"),
            Err(TokenError::NotOwner { .. })
        ));
        assert!(matches!(
            token.remove_minter("mallory", "owner"),
            Err(TokenError::NotOwner { .. })
        ));
    }

    #[test]
    fn owner_cannot_be_removed_as_minter() {
        let mut token = RewardToken::new("owner");
        let result = token.remove_minter("owner", "owner");
        assert!(matches!(result, Err(TokenError::OwnerIsMinter)));
        assert!(token.is_minter("owner"));
    }

    #[test]
    fn supply_equals_sum_of_balances_across_operation_mix() {
        let mut token = RewardToken::new("owner");
        token.mint("owner", "alice", 500).unwrap();
        token.mint("owner", "bob", 250).unwrap();
        token.transfer("alice", "carol", 125).unwrap();
        token.burn("bob", 50).unwrap();
        token.approve("alice", "dave", 100);
        token.transfer_from("dave", "alice", "bob", 75).unwrap();

        let sum: u64 = token.balances().map(|(_, b)| b).sum();
        assert_eq!(token.total_supply(), sum);
        assert_eq!(token.total_supply(), 700);
    }
}
