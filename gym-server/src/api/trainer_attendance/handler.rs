//! Trainer Attendance API Handlers
//!
//! 按 (trainer, day) 每天一条记录，与通用考勤分开存储。

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use surrealdb::RecordId;

use crate::api::parse_record_id;
use crate::attendance::AttendanceEngine;
use crate::core::ServerState;
use crate::db::models::{TrainerAttendance, UserKind};
use crate::db::repository::TrainerAttendanceRepository;
use crate::utils::time::{day_bucket_millis, day_start_millis, now_millis, parse_date};
use crate::utils::{AppError, AppResult};

#[derive(Deserialize)]
pub struct DayRequest {
    /// 教练记录 ID ("trainer:xxx" 或裸 key)
    pub trainer_id: Option<String>,
    /// 自由文本标识符 (TRN 编号 / 手机号 / 姓名)
    pub identifier: Option<String>,
    pub photo: Option<String>,
}

async fn resolve_trainer(state: &ServerState, payload: &DayRequest) -> AppResult<RecordId> {
    if let Some(raw) = &payload.trainer_id {
        return Ok(parse_record_id("trainer", raw)?);
    }
    if let Some(identifier) = &payload.identifier {
        let engine = AttendanceEngine::new(state.db.clone(), state.config.timezone);
        let resolved = engine.resolve(identifier).await?;
        if resolved.kind != UserKind::Trainer {
            return Err(AppError::validation(format!(
                "'{}' resolves to a member, not a trainer",
                identifier
            )));
        }
        return Ok(resolved.user_id()?);
    }
    Err(AppError::validation("trainer_id or identifier is required"))
}

/// POST /api/trainer-attendance/check-in - 当日签到 (当天第一条才创建)
pub async fn check_in(
    State(state): State<ServerState>,
    Json(payload): Json<DayRequest>,
) -> AppResult<Json<TrainerAttendance>> {
    let trainer = resolve_trainer(&state, &payload).await?;
    let now = now_millis();
    let day = day_bucket_millis(now, state.config.timezone);

    let record = TrainerAttendanceRepository::new(state.db.clone())
        .check_in(&trainer, day, now, payload.photo)
        .await?;
    tracing::info!(trainer = %record.trainer, "Trainer checked in");
    Ok(Json(record))
}

/// POST /api/trainer-attendance/check-out - 当日签退
pub async fn check_out(
    State(state): State<ServerState>,
    Json(payload): Json<DayRequest>,
) -> AppResult<Json<TrainerAttendance>> {
    let trainer = resolve_trainer(&state, &payload).await?;
    let now = now_millis();
    let day = day_bucket_millis(now, state.config.timezone);

    let record = TrainerAttendanceRepository::new(state.db.clone())
        .check_out(&trainer, day, now, payload.photo)
        .await?;
    tracing::info!(
        trainer = %record.trainer,
        duration = ?record.duration_minutes,
        "Trainer checked out"
    );
    Ok(Json(record))
}

#[derive(Deserialize)]
pub struct ListQuery {
    /// YYYY-MM-DD，缺省为全部
    pub date: Option<String>,
}

/// GET /api/trainer-attendance?date=YYYY-MM-DD - 教练考勤列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<TrainerAttendance>>> {
    let day = match &query.date {
        Some(date) => Some(day_start_millis(parse_date(date)?, state.config.timezone)),
        None => None,
    };
    let records = TrainerAttendanceRepository::new(state.db.clone())
        .find_by_day(day)
        .await?;
    Ok(Json(records))
}
