//! Trainer Payment API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::api::parse_record_id;
use crate::core::ServerState;
use crate::db::models::{TrainerPayment, TrainerPaymentCreate};
use crate::db::repository::{TrainerPaymentRepository, TrainerRepository};
use crate::utils::validation::validate_amount;
use crate::utils::{AppError, AppResult};

/// POST /api/trainer-payments - 记一笔实发
///
/// 与 [`crate::salary`] 的测算互不对账，金额以录入为准
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TrainerPaymentCreate>,
) -> AppResult<Json<TrainerPayment>> {
    validate_amount(payload.amount, "amount")?;
    if payload.amount <= 0.0 {
        return Err(AppError::validation("amount must be positive"));
    }

    let trainer = TrainerRepository::new(state.db.clone())
        .find_by_id(&payload.trainer)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| AppError::not_found(format!("Trainer {} not found", payload.trainer)))?;

    let payment = TrainerPaymentRepository::new(state.db.clone())
        .create(payload)
        .await?;
    tracing::info!(
        trainer = %trainer.trainer_id,
        amount = payment.amount,
        "Trainer payout recorded"
    );
    Ok(Json(payment))
}

#[derive(Deserialize)]
pub struct ListQuery {
    /// 教练记录 ID ("trainer:xxx" 或裸 key)
    pub trainer_id: Option<String>,
}

/// GET /api/trainer-payments?trainer_id=xxx - 实发流水
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<TrainerPayment>>> {
    let trainer = match &query.trainer_id {
        Some(raw) => Some(parse_record_id("trainer", raw)?),
        None => None,
    };
    let payments = TrainerPaymentRepository::new(state.db.clone())
        .find_filtered(trainer)
        .await?;
    Ok(Json(payments))
}
