use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

use campus_shared::errors::AppResult;
use campus_shared::types::auth::AuthUser;
use campus_shared::types::ApiResponse;

use crate::models::{SavingsGoal, TransferReceipt};
use crate::services::savings_service::{self, AmountRequest, CreateGoalRequest};
use crate::AppState;

/// POST /savings/goals
pub async fn create_goal(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateGoalRequest>,
) -> AppResult<Json<ApiResponse<SavingsGoal>>> {
    let goal = savings_service::create_goal(state.store.as_ref(), state.events.as_ref(), user.id, req).await?;
    Ok(Json(ApiResponse::ok(goal)))
}

/// GET /savings/goals
pub async fn list_goals(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<SavingsGoal>>>> {
    let goals = savings_service::list_goals(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(goals)))
}

/// POST /savings/goals/:id/deposit - wallet to goal
pub async fn deposit(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(goal_id): Path<Uuid>,
    Json(req): Json<AmountRequest>,
) -> AppResult<Json<ApiResponse<TransferReceipt>>> {
    let receipt =
        savings_service::deposit(state.store.as_ref(), state.events.as_ref(), user.id, goal_id, &req.amount).await?;
    Ok(Json(ApiResponse::ok(receipt)))
}

/// POST /savings/goals/:id/withdraw - goal to wallet
pub async fn withdraw(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(goal_id): Path<Uuid>,
    Json(req): Json<AmountRequest>,
) -> AppResult<Json<ApiResponse<TransferReceipt>>> {
    let receipt =
        savings_service::withdraw(state.store.as_ref(), state.events.as_ref(), user.id, goal_id, &req.amount).await?;
    Ok(Json(ApiResponse::ok(receipt)))
}
