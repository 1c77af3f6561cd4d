use campus_shared::clients::events::{emit, EventSink};
use campus_shared::types::event::{payloads, routing_keys};

use crate::models::{SavingsGoal, TransferDirection, TransferReceipt};

const SOURCE: &str = "campus-wallet";

pub async fn publish_goal_created(events: &dyn EventSink, goal: &SavingsGoal) {
    emit(
        events,
        SOURCE,
        routing_keys::WALLET_GOAL_CREATED,
        goal.user_id,
        payloads::GoalCreated {
            goal_id: goal.id,
            user_id: goal.user_id,
            name: goal.name.clone(),
            target_cents: goal.target_amount.cents(),
        },
    )
    .await;
}

/// Sent after the transfer has committed.
pub async fn publish_savings_moved(events: &dyn EventSink, direction: TransferDirection, receipt: &TransferReceipt) {
    let routing_key = match direction {
        TransferDirection::Deposit => routing_keys::WALLET_SAVINGS_DEPOSITED,
        TransferDirection::Withdraw => routing_keys::WALLET_SAVINGS_WITHDRAWN,
    };

    emit(
        events,
        SOURCE,
        routing_key,
        receipt.wallet.user_id,
        payloads::SavingsMoved {
            transaction_id: receipt.transaction.id,
            goal_id: receipt.goal.id,
            user_id: receipt.wallet.user_id,
            amount_cents: receipt.transaction.amount.cents(),
            wallet_balance_cents: receipt.wallet.balance.cents(),
            goal_amount_cents: receipt.goal.current_amount.cents(),
        },
    )
    .await;
}
