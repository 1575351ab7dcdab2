//! PT Plan API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::parse_record_id;
use crate::core::ServerState;
use crate::db::models::{PtPlan, PtPlanCreate, PtPlanUpdate};
use crate::db::repository::PtPlanRepository;
use crate::utils::validation::{self, validate_amount, validate_required_text};
use crate::utils::{AppError, AppResult};

/// GET /api/pt-plans - 在售私教套餐 (按价格升序)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<PtPlan>>> {
    let plans = PtPlanRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(plans))
}

/// GET /api/pt-plans/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<PtPlan>> {
    let rid = parse_record_id("pt_plan", &id)?;
    let plan = PtPlanRepository::new(state.db.clone())
        .find_by_id(&rid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("PT plan {} not found", id)))?;
    Ok(Json(plan))
}

/// POST /api/pt-plans
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PtPlanCreate>,
) -> AppResult<Json<PtPlan>> {
    validate_required_text(&payload.name, "name", validation::MAX_NAME_LEN)?;
    validate_amount(payload.price, "price")?;
    let created = PtPlanRepository::new(state.db.clone())
        .create(payload)
        .await?;
    Ok(Json(created))
}

/// PUT /api/pt-plans/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PtPlanUpdate>,
) -> AppResult<Json<PtPlan>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", validation::MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_amount(price, "price")?;
    }
    let rid = parse_record_id("pt_plan", &id)?;
    let updated = PtPlanRepository::new(state.db.clone())
        .update(&rid, payload)
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/pt-plans/:id - 下架
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let rid = parse_record_id("pt_plan", &id)?;
    let deleted = PtPlanRepository::new(state.db.clone())
        .soft_delete(&rid)
        .await?;
    if !deleted {
        return Err(AppError::not_found(format!("PT plan {} not found", id)));
    }
    Ok(Json(true))
}
