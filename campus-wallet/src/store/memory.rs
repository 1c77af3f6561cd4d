use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use campus_shared::errors::{AppError, ErrorCode};
use campus_shared::{AppResult, Money};

use crate::models::{
    LedgerKind, LedgerTransaction, NewLedgerTransaction, NewSavingsGoal, SavingsGoal, SavingsTransfer,
    TransferDirection, TransferReceipt, Wallet,
};

use super::{insufficient_funds, insufficient_goal_funds, SavingsStore};

/// Write steps of a money movement, in the order the Postgres store runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteStep {
    GoalUpdate,
    LedgerInsert,
}

#[derive(Default)]
struct Tables {
    wallets: HashMap<Uuid, Wallet>,
    goals: HashMap<Uuid, SavingsGoal>,
    ledger: Vec<LedgerTransaction>,
    #[cfg(test)]
    fail_at: Option<WriteStep>,
}

impl Tables {
    fn reach(&self, step: WriteStep) -> AppResult<()> {
        #[cfg(test)]
        {
            if self.fail_at == Some(step) {
                return Err(AppError::internal(format!("{step:?} failed")));
            }
        }
        #[cfg(not(test))]
        let _ = step;
        Ok(())
    }

    /// Stages a ledger row; nothing is stored until the caller commits it.
    fn stage_ledger(&self, entry: NewLedgerTransaction) -> AppResult<LedgerTransaction> {
        self.reach(WriteStep::LedgerInsert)?;
        Ok(LedgerTransaction {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            kind: entry.kind,
            amount: entry.amount,
            description: entry.description,
            reference_id: entry.reference_id,
            created_at: Utc::now(),
        })
    }
}

/// In-process store. Every method holds the lock for its whole duration and
/// computes new rows before storing any of them, so a failing step leaves
/// every table untouched.
#[derive(Default)]
pub struct MemorySavingsStore {
    tables: Mutex<Tables>,
}

impl MemorySavingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later movement fail at `step`, or clears the failure.
    #[cfg(test)]
    pub(crate) fn fail_at(&self, step: Option<WriteStep>) {
        self.lock().fail_at = step;
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn overflow() -> AppError {
    AppError::new(ErrorCode::InvalidAmount, "amount is out of range")
}

impl SavingsStore for MemorySavingsStore {
    fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    fn open_wallet(&self, user_id: Uuid) -> AppResult<Wallet> {
        let mut tables = self.lock();
        let now = Utc::now();
        let wallet = tables.wallets.entry(user_id).or_insert_with(|| Wallet {
            user_id,
            balance: Money::ZERO,
            currency: "ZAR".into(),
            created_at: now,
            updated_at: now,
        });
        Ok(wallet.clone())
    }

    fn get_wallet(&self, user_id: Uuid) -> AppResult<Option<Wallet>> {
        Ok(self.lock().wallets.get(&user_id).cloned())
    }

    fn credit_wallet(&self, user_id: Uuid, amount: Money, description: &str) -> AppResult<(Wallet, LedgerTransaction)> {
        let mut tables = self.lock();
        let mut wallet = tables
            .wallets
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::new(ErrorCode::WalletNotFound, "wallet not found"))?;

        wallet.balance = wallet.balance.checked_add(amount).ok_or_else(overflow)?;
        wallet.updated_at = Utc::now();
        let entry = tables.stage_ledger(NewLedgerTransaction {
            user_id,
            kind: LedgerKind::WalletCredit,
            amount,
            description: description.to_string(),
            reference_id: None,
        })?;

        tables.wallets.insert(user_id, wallet.clone());
        tables.ledger.push(entry.clone());
        Ok((wallet, entry))
    }

    fn insert_goal(&self, goal: NewSavingsGoal) -> AppResult<SavingsGoal> {
        let mut tables = self.lock();
        let now = Utc::now();
        let stored = SavingsGoal {
            id: Uuid::new_v4(),
            user_id: goal.user_id,
            name: goal.name,
            target_amount: goal.target_amount,
            current_amount: Money::ZERO,
            deadline: goal.deadline,
            created_at: now,
            updated_at: now,
        };
        tables.goals.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn goals_for(&self, user_id: Uuid) -> AppResult<Vec<SavingsGoal>> {
        let tables = self.lock();
        let mut goals: Vec<SavingsGoal> = tables
            .goals
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        goals.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(goals)
    }

    fn find_goal(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Option<SavingsGoal>> {
        Ok(self
            .lock()
            .goals
            .get(&goal_id)
            .filter(|g| g.user_id == user_id)
            .cloned())
    }

    fn transfer(&self, transfer: &SavingsTransfer) -> AppResult<TransferReceipt> {
        let mut tables = self.lock();
        let amount = transfer.amount;

        let mut goal = tables
            .goals
            .get(&transfer.goal_id)
            .filter(|g| g.user_id == transfer.user_id)
            .cloned()
            .ok_or_else(|| AppError::new(ErrorCode::GoalNotFound, "savings goal not found"))?;
        let mut wallet = tables
            .wallets
            .get(&transfer.user_id)
            .cloned()
            .ok_or_else(|| AppError::new(ErrorCode::WalletNotFound, "wallet not found"))?;

        match transfer.direction {
            TransferDirection::Deposit => {
                wallet.balance = wallet
                    .balance
                    .checked_sub(amount)
                    .filter(|left| *left >= Money::ZERO)
                    .ok_or_else(|| insufficient_funds(wallet.balance, amount))?;
                goal.current_amount = goal.current_amount.checked_add(amount).ok_or_else(overflow)?;
            }
            TransferDirection::Withdraw => {
                goal.current_amount = goal
                    .current_amount
                    .checked_sub(amount)
                    .filter(|left| *left >= Money::ZERO)
                    .ok_or_else(|| insufficient_goal_funds(goal.current_amount, amount))?;
                wallet.balance = wallet.balance.checked_add(amount).ok_or_else(overflow)?;
            }
        }

        let now = Utc::now();
        wallet.updated_at = now;
        tables.reach(WriteStep::GoalUpdate)?;
        goal.updated_at = now;
        let transaction = tables.stage_ledger(transfer.ledger_entry(&goal))?;

        tables.wallets.insert(wallet.user_id, wallet.clone());
        tables.goals.insert(goal.id, goal.clone());
        tables.ledger.push(transaction.clone());

        Ok(TransferReceipt { wallet, goal, transaction })
    }

    fn transactions(&self, user_id: Uuid, offset: i64, limit: i64) -> AppResult<(Vec<LedgerTransaction>, u64)> {
        let tables = self.lock();
        // Ledger is append-only, so reverse insertion order is newest first.
        let mine: Vec<&LedgerTransaction> = tables.ledger.iter().rev().filter(|t| t.user_id == user_id).collect();
        let total = mine.len() as u64;
        let page = mine
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }
}
