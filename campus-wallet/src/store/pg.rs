use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use campus_shared::clients::db::{checkout, DbPool};
use campus_shared::errors::{AppError, ErrorCode};
use campus_shared::{AppResult, Money};

use crate::models::{
    LedgerKind, LedgerTransaction, NewLedgerTransaction, NewSavingsGoal, NewWallet, SavingsGoal, SavingsTransfer,
    TransferDirection, TransferReceipt, Wallet,
};
use crate::schema::{ledger_transactions, savings_goals, wallets};

use super::{insufficient_funds, insufficient_goal_funds, SavingsStore};

pub struct PgSavingsStore {
    pool: DbPool,
}

impl PgSavingsStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SavingsStore for PgSavingsStore {
    fn ping(&self) -> AppResult<()> {
        let mut conn = checkout(&self.pool)?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }

    fn open_wallet(&self, user_id: Uuid) -> AppResult<Wallet> {
        let mut conn = checkout(&self.pool)?;

        diesel::insert_into(wallets::table)
            .values(&NewWallet { user_id })
            .on_conflict(wallets::user_id)
            .do_nothing()
            .execute(&mut conn)?;

        let wallet = wallets::table.find(user_id).first::<Wallet>(&mut conn)?;
        Ok(wallet)
    }

    fn get_wallet(&self, user_id: Uuid) -> AppResult<Option<Wallet>> {
        let mut conn = checkout(&self.pool)?;

        let wallet = wallets::table
            .find(user_id)
            .first::<Wallet>(&mut conn)
            .optional()?;

        Ok(wallet)
    }

    fn credit_wallet(&self, user_id: Uuid, amount: Money, description: &str) -> AppResult<(Wallet, LedgerTransaction)> {
        let mut conn = checkout(&self.pool)?;

        conn.transaction::<_, AppError, _>(|conn| {
            let wallet = diesel::update(wallets::table.find(user_id))
                .set((
                    wallets::balance.eq(wallets::balance + amount),
                    wallets::updated_at.eq(Utc::now()),
                ))
                .get_result::<Wallet>(conn)
                .optional()?
                .ok_or_else(|| AppError::new(ErrorCode::WalletNotFound, "wallet not found"))?;

            let entry = diesel::insert_into(ledger_transactions::table)
                .values(&NewLedgerTransaction {
                    user_id,
                    kind: LedgerKind::WalletCredit,
                    amount,
                    description: description.to_string(),
                    reference_id: None,
                })
                .get_result::<LedgerTransaction>(conn)?;

            Ok((wallet, entry))
        })
    }

    fn insert_goal(&self, goal: NewSavingsGoal) -> AppResult<SavingsGoal> {
        let mut conn = checkout(&self.pool)?;

        let stored = diesel::insert_into(savings_goals::table)
            .values(&goal)
            .get_result::<SavingsGoal>(&mut conn)?;

        Ok(stored)
    }

    fn goals_for(&self, user_id: Uuid) -> AppResult<Vec<SavingsGoal>> {
        let mut conn = checkout(&self.pool)?;

        let goals = savings_goals::table
            .filter(savings_goals::user_id.eq(user_id))
            .order((savings_goals::created_at.asc(), savings_goals::id.asc()))
            .load::<SavingsGoal>(&mut conn)?;

        Ok(goals)
    }

    fn find_goal(&self, user_id: Uuid, goal_id: Uuid) -> AppResult<Option<SavingsGoal>> {
        let mut conn = checkout(&self.pool)?;

        let goal = savings_goals::table
            .filter(savings_goals::id.eq(goal_id))
            .filter(savings_goals::user_id.eq(user_id))
            .first::<SavingsGoal>(&mut conn)
            .optional()?;

        Ok(goal)
    }

    fn transfer(&self, transfer: &SavingsTransfer) -> AppResult<TransferReceipt> {
        let mut conn = checkout(&self.pool)?;
        let amount = transfer.amount;

        // Rows are locked goal first, then wallet, in every transfer.
        conn.transaction::<_, AppError, _>(|conn| {
            let goal = savings_goals::table
                .filter(savings_goals::id.eq(transfer.goal_id))
                .filter(savings_goals::user_id.eq(transfer.user_id))
                .for_update()
                .first::<SavingsGoal>(conn)
                .optional()?
                .ok_or_else(|| AppError::new(ErrorCode::GoalNotFound, "savings goal not found"))?;

            let wallet = wallets::table
                .find(transfer.user_id)
                .for_update()
                .first::<Wallet>(conn)
                .optional()?
                .ok_or_else(|| AppError::new(ErrorCode::WalletNotFound, "wallet not found"))?;

            let now = Utc::now();
            let (wallet, goal) = match transfer.direction {
                TransferDirection::Deposit => {
                    if wallet.balance < amount {
                        return Err(insufficient_funds(wallet.balance, amount));
                    }
                    let wallet = diesel::update(wallets::table.find(transfer.user_id))
                        .set((wallets::balance.eq(wallets::balance - amount), wallets::updated_at.eq(now)))
                        .get_result::<Wallet>(conn)?;
                    let goal = diesel::update(savings_goals::table.find(goal.id))
                        .set((
                            savings_goals::current_amount.eq(savings_goals::current_amount + amount),
                            savings_goals::updated_at.eq(now),
                        ))
                        .get_result::<SavingsGoal>(conn)?;
                    (wallet, goal)
                }
                TransferDirection::Withdraw => {
                    if goal.current_amount < amount {
                        return Err(insufficient_goal_funds(goal.current_amount, amount));
                    }
                    let goal = diesel::update(savings_goals::table.find(goal.id))
                        .set((
                            savings_goals::current_amount.eq(savings_goals::current_amount - amount),
                            savings_goals::updated_at.eq(now),
                        ))
                        .get_result::<SavingsGoal>(conn)?;
                    let wallet = diesel::update(wallets::table.find(transfer.user_id))
                        .set((wallets::balance.eq(wallets::balance + amount), wallets::updated_at.eq(now)))
                        .get_result::<Wallet>(conn)?;
                    (wallet, goal)
                }
            };

            let transaction = diesel::insert_into(ledger_transactions::table)
                .values(&transfer.ledger_entry(&goal))
                .get_result::<LedgerTransaction>(conn)?;

            Ok(TransferReceipt { wallet, goal, transaction })
        })
    }

    fn transactions(&self, user_id: Uuid, offset: i64, limit: i64) -> AppResult<(Vec<LedgerTransaction>, u64)> {
        let mut conn = checkout(&self.pool)?;

        let total: i64 = ledger_transactions::table
            .filter(ledger_transactions::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)?;

        let rows = ledger_transactions::table
            .filter(ledger_transactions::user_id.eq(user_id))
            .order((ledger_transactions::created_at.desc(), ledger_transactions::id.desc()))
            .offset(offset)
            .limit(limit)
            .load::<LedgerTransaction>(&mut conn)?;

        Ok((rows, total.max(0) as u64))
    }
}
