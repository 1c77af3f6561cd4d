//! Persistence port for wallets, savings goals and the ledger.
//!
//! Both implementations apply a [`SavingsTransfer`] as one unit: the wallet
//! balance, the goal amount and the ledger row change together or not at all.

mod memory;
mod pg;

pub use memory::MemorySavingsStore;
#[cfg(test)]
pub(crate) use memory::WriteStep;
pub use pg::PgSavingsStore;

use campus_shared::errors::{AppError, ErrorCode};
use campus_shared::{AppResult, Money};
use uuid::Uuid;

use crate::models::{LedgerTransaction, NewSavingsGoal, SavingsGoal, SavingsTransfer, TransferReceipt, Wallet};

pub trait SavingsStore: Send + Sync {
    fn ping(&self) -> AppResult<()>;

    /// Creates an empty wallet unless the user already has one.
    fn open_wallet(&self, user_id: Uuid) -> AppResult<Wallet>;

    fn get_wallet(&self, user_id: Uuid) -> AppResult<Option<Wallet>>;

    /// Adds `amount` to the balance and appends a `wallet_credit` ledger row.
    fn credit_wallet(&self, user_id: Uuid, amount: Money, description: &str) -> AppResult<(Wallet, LedgerTransaction)>;

    fn insert_goal(&self, goal: NewSavingsGoal) -> AppResult<SavingsGoal>;

    /// The user's goals, oldest first.
    fn goals_for(&self, user_id: Uuid) -> AppResult<Vec<SavingsGoal>>;

    /// The goal, only if it belongs to `user_id`.
    fn find_goal(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Option<SavingsGoal>>;

    /// Moves money between the wallet and a goal and records it in the ledger.
    ///
    /// Fails with `GoalNotFound`, `WalletNotFound`, `InsufficientFunds` or
    /// `InsufficientGoalFunds` without writing anything.
    fn transfer(&self, transfer: &SavingsTransfer) -> AppResult<TransferReceipt>;

    /// Ledger rows newest first, with the total row count.
    fn transactions(&self, user_id: Uuid, offset: i64, limit: i64) -> AppResult<(Vec<LedgerTransaction>, u64)>;
}

fn insufficient_funds(balance: Money, amount: Money) -> AppError {
    AppError::with_details(
        ErrorCode::InsufficientFunds,
        format!("insufficient wallet balance: {balance} available, {amount} requested"),
        serde_json::json!({ "available": balance, "requested": amount }),
    )
}

fn insufficient_goal_funds(saved: Money, amount: Money) -> AppError {
    AppError::with_details(
        ErrorCode::InsufficientGoalFunds,
        format!("insufficient savings: {saved} saved, {amount} requested"),
        serde_json::json!({ "available": saved, "requested": amount }),
    )
}
