//! Trainer API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::parse_record_id;
use crate::core::ServerState;
use crate::db::models::{Member, Trainer, TrainerCreate, TrainerUpdate};
use crate::db::repository::{
    CounterRepository, MemberRepository, TrainerRepository, format_code,
};
use crate::utils::validation::{
    self, validate_amount, validate_optional_text, validate_phone, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// GET /api/trainers - 获取所有在册教练
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Trainer>>> {
    let trainers = TrainerRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(trainers))
}

/// GET /api/trainers/:id - 获取单个教练
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Trainer>> {
    let rid = parse_record_id("trainer", &id)?;
    let trainer = TrainerRepository::new(state.db.clone())
        .find_by_id(&rid)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| AppError::not_found(format!("Trainer {} not found", id)))?;
    Ok(Json(trainer))
}

/// POST /api/trainers - 注册教练 (铸造 TRN###)
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<TrainerCreate>,
) -> AppResult<Json<Trainer>> {
    validate_required_text(&payload.name, "name", validation::MAX_NAME_LEN)?;
    validate_phone(&payload.phone, "phone")?;
    validate_optional_text(&payload.email, "email", validation::MAX_EMAIL_LEN)?;
    if let Some(salary) = payload.base_salary {
        validate_amount(salary, "base_salary")?;
    }
    if let Some(value) = payload.commission_value {
        validate_amount(value, "commission_value")?;
    }

    let seq = CounterRepository::new(state.db.clone())
        .next("trainer")
        .await?;
    let trainer_id = format_code("TRN", seq);

    let created = TrainerRepository::new(state.db.clone())
        .create(trainer_id, payload)
        .await?;
    tracing::info!(trainer_id = %created.trainer_id, "Trainer registered");
    Ok(Json(created))
}

/// PUT /api/trainers/:id - 更新教练档案和分成参数
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<TrainerUpdate>,
) -> AppResult<Json<Trainer>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", validation::MAX_NAME_LEN)?;
    }
    if let Some(phone) = &payload.phone {
        validate_phone(phone, "phone")?;
    }
    if let Some(salary) = payload.base_salary {
        validate_amount(salary, "base_salary")?;
    }
    if let Some(value) = payload.commission_value {
        validate_amount(value, "commission_value")?;
    }

    let rid = parse_record_id("trainer", &id)?;
    let updated = TrainerRepository::new(state.db.clone())
        .update(&rid, payload)
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/trainers/:id - 软删除
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let rid = parse_record_id("trainer", &id)?;
    let deleted = TrainerRepository::new(state.db.clone())
        .soft_delete(&rid)
        .await?;
    if !deleted {
        return Err(AppError::not_found(format!("Trainer {} not found", id)));
    }
    tracing::info!(trainer = %id, "Trainer soft-deleted");
    Ok(Json(true))
}

/// GET /api/trainers/:id/clients - 在册私教会员
pub async fn clients(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Member>>> {
    let rid = parse_record_id("trainer", &id)?;
    TrainerRepository::new(state.db.clone())
        .find_by_id(&rid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Trainer {} not found", id)))?;
    let clients = MemberRepository::new(state.db.clone())
        .find_active_pt_clients(&rid)
        .await?;
    Ok(Json(clients))
}
