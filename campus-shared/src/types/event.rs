use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ Event envelope wrapping all domain events.
///
/// Routing key format: `campus.{domain}.{entity}.{action}`
/// Example: `campus.dating.match.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    // Dating events
    pub const DATING_SWIPE_RECORDED: &str = "campus.dating.swipe.recorded";
    pub const DATING_MATCH_CREATED: &str = "campus.dating.match.created";

    // Wallet events
    pub const WALLET_GOAL_CREATED: &str = "campus.wallet.goal.created";
    pub const WALLET_SAVINGS_DEPOSITED: &str = "campus.wallet.savings.deposited";
    pub const WALLET_SAVINGS_WITHDRAWN: &str = "campus.wallet.savings.withdrawn";
}

/// Common event data payloads
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SwipeRecorded {
        pub swipe_id: Uuid,
        pub swiper_id: Uuid,
        pub swiped_id: Uuid,
        pub is_like: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub user1_id: Uuid,
        pub user2_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct GoalCreated {
        pub goal_id: Uuid,
        pub user_id: Uuid,
        pub name: String,
        pub target_cents: i64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SavingsMoved {
        pub transaction_id: Uuid,
        pub goal_id: Uuid,
        pub user_id: Uuid,
        pub amount_cents: i64,
        pub wallet_balance_cents: i64,
        pub goal_amount_cents: i64,
    }
}
