use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use serde::Serialize;
use uuid::Uuid;

use campus_shared::Money;

use crate::schema::{ledger_transactions, savings_goals, wallets};

// --- Wallet ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = wallets, primary_key(user_id))]
pub struct Wallet {
    pub user_id: Uuid,
    pub balance: Money,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = wallets)]
pub struct NewWallet {
    pub user_id: Uuid,
}

// --- SavingsGoal ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = savings_goals)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub target_amount: Money,
    pub current_amount: Money,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavingsGoal {
    pub fn is_reached(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = savings_goals)]
pub struct NewSavingsGoal {
    pub user_id: Uuid,
    pub name: String,
    pub target_amount: Money,
    pub deadline: Option<NaiveDate>,
}

// --- Ledger ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    WalletCredit,
    SavingsDeposit,
    SavingsWithdrawal,
}

impl LedgerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WalletCredit => "wallet_credit",
            Self::SavingsDeposit => "savings_deposit",
            Self::SavingsWithdrawal => "savings_withdrawal",
        }
    }
}

impl FromStr for LedgerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wallet_credit" => Ok(Self::WalletCredit),
            "savings_deposit" => Ok(Self::SavingsDeposit),
            "savings_withdrawal" => Ok(Self::SavingsWithdrawal),
            other => Err(format!("unknown ledger kind: {other}")),
        }
    }
}

impl ToSql<Text, Pg> for LedgerKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        <str as ToSql<Text, Pg>>::to_sql(self.as_str(), out)
    }
}

impl FromSql<Text, Pg> for LedgerKind {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        Ok(raw.parse()?)
    }
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = ledger_transactions)]
pub struct LedgerTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: LedgerKind,
    pub amount: Money,
    pub description: String,
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ledger_transactions)]
pub struct NewLedgerTransaction {
    pub user_id: Uuid,
    pub kind: LedgerKind,
    pub amount: Money,
    pub description: String,
    pub reference_id: Option<Uuid>,
}

// --- Transfers between wallet and goal ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    /// Wallet to goal.
    Deposit,
    /// Goal to wallet.
    Withdraw,
}

#[derive(Debug, Clone, Copy)]
pub struct SavingsTransfer {
    pub user_id: Uuid,
    pub goal_id: Uuid,
    pub amount: Money,
    pub direction: TransferDirection,
}

impl SavingsTransfer {
    /// Ledger row recorded for this transfer against `goal`.
    pub fn ledger_entry(&self, goal: &SavingsGoal) -> NewLedgerTransaction {
        let (kind, description) = match self.direction {
            TransferDirection::Deposit => (LedgerKind::SavingsDeposit, format!("Deposit to {}", goal.name)),
            TransferDirection::Withdraw => (LedgerKind::SavingsWithdrawal, format!("Withdrawal from {}", goal.name)),
        };
        NewLedgerTransaction {
            user_id: self.user_id,
            kind,
            amount: self.amount,
            description,
            reference_id: Some(goal.id),
        }
    }
}

/// State after a committed transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    pub wallet: Wallet,
    pub goal: SavingsGoal,
    pub transaction: LedgerTransaction,
}
