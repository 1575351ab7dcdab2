//! Plan API Handlers
//!
//! 改价不回溯：已分配会员持有分配当时的价格快照

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::parse_record_id;
use crate::core::ServerState;
use crate::db::models::{Plan, PlanCreate, PlanUpdate};
use crate::db::repository::PlanRepository;
use crate::utils::validation::{self, validate_amount, validate_required_text};
use crate::utils::{AppError, AppResult};

/// GET /api/plans - 在售套餐 (按价格升序)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Plan>>> {
    let plans = PlanRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(plans))
}

/// GET /api/plans/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Plan>> {
    let rid = parse_record_id("plan", &id)?;
    let plan = PlanRepository::new(state.db.clone())
        .find_by_id(&rid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Plan {} not found", id)))?;
    Ok(Json(plan))
}

/// POST /api/plans
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PlanCreate>,
) -> AppResult<Json<Plan>> {
    validate_required_text(&payload.name, "name", validation::MAX_NAME_LEN)?;
    validate_amount(payload.price, "price")?;
    if payload.duration_months == 0 {
        return Err(AppError::validation("duration_months must be at least 1"));
    }
    let created = PlanRepository::new(state.db.clone()).create(payload).await?;
    Ok(Json(created))
}

/// PUT /api/plans/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PlanUpdate>,
) -> AppResult<Json<Plan>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", validation::MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_amount(price, "price")?;
    }
    if payload.duration_months == Some(0) {
        return Err(AppError::validation("duration_months must be at least 1"));
    }
    let rid = parse_record_id("plan", &id)?;
    let updated = PlanRepository::new(state.db.clone())
        .update(&rid, payload)
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/plans/:id - 下架 (已分配会员不受影响)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let rid = parse_record_id("plan", &id)?;
    let deleted = PlanRepository::new(state.db.clone()).soft_delete(&rid).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Plan {} not found", id)));
    }
    Ok(Json(true))
}
