//! Payment API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::api::parse_record_id;
use crate::core::ServerState;
use crate::db::models::{Member, Payment, PaymentCategory, PaymentCreate, PaymentUpdate};
use crate::db::repository::PaymentRepository;
use crate::db::repository::payment::PaymentFilter;
use crate::ledger::{LedgerWrite, PaymentProcessor};
use crate::utils::time::{day_start_millis, parse_date};
use crate::utils::{AppError, AppResult};

#[derive(Deserialize)]
pub struct ListQuery {
    /// 会员记录 ID ("member:xxx" 或裸 key)
    pub member_id: Option<String>,
    /// 起始日 YYYY-MM-DD (含当日)
    pub from: Option<String>,
    /// 截止日 YYYY-MM-DD (含当日)
    pub to: Option<String>,
    pub category: Option<PaymentCategory>,
}

/// GET /api/payments - 付款流水 (新→旧)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Payment>>> {
    let tz = state.config.timezone;
    let mut filter = PaymentFilter {
        category: query.category,
        ..PaymentFilter::default()
    };
    if let Some(raw) = &query.member_id {
        filter.member = Some(parse_record_id("member", raw)?);
    }
    if let Some(from) = &query.from {
        filter.from = Some(day_start_millis(parse_date(from)?, tz));
    }
    if let Some(to) = &query.to {
        // 截止日含当日，上界取次日零点
        let next = parse_date(to)?
            .succ_opt()
            .ok_or_else(|| AppError::validation(format!("Invalid to date: {}", to)))?;
        filter.to = Some(day_start_millis(next, tz));
    }

    let payments = PaymentRepository::new(state.db.clone())
        .find_filtered(filter)
        .await?;
    Ok(Json(payments))
}

/// GET /api/payments/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Payment>> {
    let rid = parse_record_id("payment", &id)?;
    let payment = PaymentRepository::new(state.db.clone())
        .find_by_id(&rid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Payment {} not found", id)))?;
    Ok(Json(payment))
}

/// POST /api/payments - 收款 (开卡/续费在此触发)
///
/// 响应同时带回对账后的会员，前端无需二次拉取
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PaymentCreate>,
) -> AppResult<Json<LedgerWrite>> {
    let processor = PaymentProcessor::new(state.db.clone(), state.config.timezone);
    let write = processor.create_payment(payload).await?;
    tracing::info!(
        receipt = %write.payment.receipt_number,
        member = %write.member.member_id,
        amount = write.payment.amount,
        "Payment recorded"
    );
    Ok(Json(write))
}

/// PUT /api/payments/:id - 修订金额/日期/类别，触发会员账本全量重算
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PaymentUpdate>,
) -> AppResult<Json<LedgerWrite>> {
    let rid = parse_record_id("payment", &id)?;
    let processor = PaymentProcessor::new(state.db.clone(), state.config.timezone);
    let write = processor.update_payment(&rid, payload).await?;
    tracing::info!(payment = %id, member = %write.member.member_id, "Payment revised");
    Ok(Json(write))
}

/// 删除响应：被删流水 ID + 重算后的会员
#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: String,
    pub member: Member,
}

/// DELETE /api/payments/:id - 物理删除流水并重算会员账本
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let rid = parse_record_id("payment", &id)?;
    let processor = PaymentProcessor::new(state.db.clone(), state.config.timezone);
    let member = processor.delete_payment(&rid).await?;
    tracing::info!(payment = %id, member = %member.member_id, "Payment deleted");
    Ok(Json(DeleteResponse {
        deleted: rid.to_string(),
        member,
    }))
}
