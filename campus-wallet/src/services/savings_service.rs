use chrono::{NaiveDate, Utc};
use metrics::counter;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use campus_shared::clients::events::EventSink;
use campus_shared::errors::{AppError, AppResult, ErrorCode};
use campus_shared::types::{Paginated, PaginationParams};
use campus_shared::Money;

use crate::events::publisher;
use crate::models::{
    LedgerTransaction, NewSavingsGoal, SavingsGoal, SavingsTransfer, TransferDirection, TransferReceipt, Wallet,
};
use crate::store::SavingsStore;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    pub target_amount: String,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: String,
}

/// Parses a user-supplied decimal amount that must be strictly positive.
pub fn parse_amount(raw: &str) -> AppResult<Money> {
    let amount: Money = raw
        .parse()
        .map_err(|e| AppError::new(ErrorCode::InvalidAmount, format!("invalid amount: {e}")))?;
    if !amount.is_positive() {
        return Err(AppError::new(ErrorCode::InvalidAmount, "amount must be greater than zero"));
    }
    Ok(amount)
}

pub fn open_wallet(store: &dyn SavingsStore, user_id: Uuid) -> AppResult<Wallet> {
    let wallet = store.open_wallet(user_id)?;
    tracing::debug!(user_id = %user_id, "wallet opened");
    Ok(wallet)
}

pub fn balance(store: &dyn SavingsStore, user_id: Uuid) -> AppResult<Wallet> {
    store
        .get_wallet(user_id)?
        .ok_or_else(|| AppError::new(ErrorCode::WalletNotFound, "wallet not found"))
}

/// Tops a wallet up, e.g. after a settled payment.
pub fn credit(
    store: &dyn SavingsStore,
    user_id: Uuid,
    raw_amount: &str,
    description: &str,
) -> AppResult<(Wallet, LedgerTransaction)> {
    let amount = parse_amount(raw_amount)?;
    let description = match description.trim() {
        "" => "Wallet top-up",
        d => d,
    };

    let (wallet, entry) = store.credit_wallet(user_id, amount, description)?;
    tracing::info!(user_id = %user_id, amount = %amount, balance = %wallet.balance, "wallet credited");
    Ok((wallet, entry))
}

pub async fn create_goal(
    store: &dyn SavingsStore,
    events: &dyn EventSink,
    user_id: Uuid,
    req: CreateGoalRequest,
) -> AppResult<SavingsGoal> {
    req.validate()?;

    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be blank".into()));
    }
    let target_amount = parse_amount(&req.target_amount)?;
    if req.deadline.is_some_and(|d| d < Utc::now().date_naive()) {
        return Err(AppError::Validation("deadline cannot be in the past".into()));
    }
    // Goals hang off the wallet row.
    balance(store, user_id)?;

    let goal = store.insert_goal(NewSavingsGoal {
        user_id,
        name,
        target_amount,
        deadline: req.deadline,
    })?;

    tracing::info!(user_id = %user_id, goal_id = %goal.id, target = %goal.target_amount, "savings goal created");
    publisher::publish_goal_created(events, &goal).await;

    Ok(goal)
}

pub fn list_goals(store: &dyn SavingsStore, user_id: Uuid) -> AppResult<Vec<SavingsGoal>> {
    store.goals_for(user_id)
}

/// Moves `raw_amount` from the wallet into the goal.
///
/// The debit, the credit and the ledger row commit together; when any of
/// them fails the wallet keeps its balance.
pub async fn deposit(
    store: &dyn SavingsStore,
    events: &dyn EventSink,
    user_id: Uuid,
    goal_id: Uuid,
    raw_amount: &str,
) -> AppResult<TransferReceipt> {
    let receipt = transfer(store, events, user_id, goal_id, raw_amount, TransferDirection::Deposit).await?;

    counter!("savings_deposits_total").increment(1);
    if receipt.goal.is_reached() {
        tracing::info!(user_id = %user_id, goal_id = %goal_id, "savings goal reached");
    }
    Ok(receipt)
}

/// Moves `raw_amount` from the goal back into the wallet, bounded by what the goal holds.
pub async fn withdraw(
    store: &dyn SavingsStore,
    events: &dyn EventSink,
    user_id: Uuid,
    goal_id: Uuid,
    raw_amount: &str,
) -> AppResult<TransferReceipt> {
    transfer(store, events, user_id, goal_id, raw_amount, TransferDirection::Withdraw).await
}

async fn transfer(
    store: &dyn SavingsStore,
    events: &dyn EventSink,
    user_id: Uuid,
    goal_id: Uuid,
    raw_amount: &str,
    direction: TransferDirection,
) -> AppResult<TransferReceipt> {
    let amount = parse_amount(raw_amount)?;

    let receipt = store.transfer(&SavingsTransfer {
        user_id,
        goal_id,
        amount,
        direction,
    })?;

    tracing::info!(
        user_id = %user_id,
        goal_id = %goal_id,
        direction = ?direction,
        amount = %amount,
        balance = %receipt.wallet.balance,
        saved = %receipt.goal.current_amount,
        "savings transfer committed"
    );
    publisher::publish_savings_moved(events, direction, &receipt).await;

    Ok(receipt)
}

pub fn transactions(
    store: &dyn SavingsStore,
    user_id: Uuid,
    params: &PaginationParams,
) -> AppResult<Paginated<LedgerTransaction>> {
    let (items, total) = store.transactions(user_id, params.offset(), params.limit() as i64)?;
    Ok(Paginated::new(items, total, params))
}
