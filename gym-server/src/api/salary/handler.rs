//! Salary API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::parse_record_id;
use crate::core::ServerState;
use crate::salary::{SalaryBreakdown, SalaryCalculator};
use crate::utils::AppResult;

/// GET /api/salary - 全体教练的工资测算
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<SalaryBreakdown>>> {
    let breakdowns = SalaryCalculator::new(state.db.clone()).for_all().await?;
    Ok(Json(breakdowns))
}

/// GET /api/salary/:id - 单个教练的工资测算
pub async fn get_by_trainer(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<SalaryBreakdown>> {
    let rid = parse_record_id("trainer", &id)?;
    let breakdown = SalaryCalculator::new(state.db.clone())
        .for_trainer(&rid)
        .await?;
    Ok(Json(breakdown))
}
