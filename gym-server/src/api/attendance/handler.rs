//! Attendance API Handlers

use axum::{
    Json,
    extract::{Multipart, Query, State},
};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::api::parse_record_id;
use crate::attendance::{AttendanceEngine, AttendanceView, LookupResult};
use crate::attendance::engine::AttendanceQuery;
use crate::core::ServerState;
use crate::db::models::{Attendance, AttendanceStatus, UserKind};
use crate::utils::time::parse_date;
use crate::utils::{AppError, AppResult};

fn engine(state: &ServerState) -> AttendanceEngine {
    AttendanceEngine::new(state.db.clone(), state.config.timezone)
}

fn user_table(kind: UserKind) -> &'static str {
    match kind {
        UserKind::Member => "member",
        UserKind::Trainer => "trainer",
    }
}

/// 前台代签请求：identifier 或 (user_id + kind) 二选一
#[derive(Deserialize)]
pub struct CheckInRequest {
    pub identifier: Option<String>,
    pub user_id: Option<String>,
    pub kind: Option<UserKind>,
    /// 已上传照片的 URL (可选)
    pub photo: Option<String>,
}

/// 前台签退请求：attendance_id 优先，否则按用户找活动记录
#[derive(Deserialize)]
pub struct CheckOutRequest {
    pub attendance_id: Option<String>,
    pub identifier: Option<String>,
    pub user_id: Option<String>,
    pub kind: Option<UserKind>,
    pub photo: Option<String>,
}

async fn resolve_target(
    engine: &AttendanceEngine,
    identifier: Option<&str>,
    user_id: Option<&str>,
    kind: Option<UserKind>,
) -> AppResult<(RecordId, UserKind)> {
    if let Some(raw) = user_id {
        let kind = kind.ok_or_else(|| {
            AppError::validation("kind (member|trainer) is required with user_id")
        })?;
        return Ok((parse_record_id(user_table(kind), raw)?, kind));
    }
    if let Some(identifier) = identifier {
        let resolved = engine.resolve(identifier).await?;
        let user = resolved.user_id()?;
        return Ok((user, resolved.kind));
    }
    Err(AppError::validation("identifier or user_id is required"))
}

/// POST /api/attendance/check-in - 前台代签
///
/// 只拦活动记录 (跨天也算)，不做按日去重；照片可选
pub async fn check_in(
    State(state): State<ServerState>,
    Json(payload): Json<CheckInRequest>,
) -> AppResult<Json<Attendance>> {
    let engine = engine(&state);
    let (user, kind) = resolve_target(
        &engine,
        payload.identifier.as_deref(),
        payload.user_id.as_deref(),
        payload.kind,
    )
    .await?;

    let record = engine.check_in(user, kind, payload.photo, false).await?;
    tracing::info!(user = %record.user, "Checked in");
    Ok(Json(record))
}

/// POST /api/attendance/check-out - 前台签退
pub async fn check_out(
    State(state): State<ServerState>,
    Json(payload): Json<CheckOutRequest>,
) -> AppResult<Json<Attendance>> {
    let engine = engine(&state);

    let record = if let Some(raw) = &payload.attendance_id {
        let rid = parse_record_id("attendance", raw)?;
        engine.check_out_record(&rid, payload.photo).await?
    } else {
        let (user, _) = resolve_target(
            &engine,
            payload.identifier.as_deref(),
            payload.user_id.as_deref(),
            payload.kind,
        )
        .await?;
        engine.check_out_user(&user, payload.photo).await?
    };
    tracing::info!(user = %record.user, duration = ?record.duration_minutes, "Checked out");
    Ok(Json(record))
}

/// multipart 自助表单：identifier 文本 + photo 文件
async fn read_self_service_form(mut multipart: Multipart) -> AppResult<(String, Vec<u8>)> {
    let mut identifier: Option<String> = None;
    let mut photo: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("identifier") => {
                identifier = Some(field.text().await?);
            }
            Some("photo") => {
                photo = Some(field.bytes().await?.to_vec());
            }
            _ => {}
        }
    }

    let identifier =
        identifier.ok_or_else(|| AppError::validation("identifier field is required"))?;
    // 照片是硬性要求，缺照片不落任何记录
    let photo = photo.ok_or_else(|| AppError::validation("photo is required for self-service"))?;
    Ok((identifier, photo))
}

/// POST /api/attendance/self/check-in - 自助签到 (会员)
///
/// 照片必填且先落盘；按日去重：今天已有记录 (无论状态) 即拒绝
pub async fn self_check_in(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<Json<Attendance>> {
    let (identifier, photo_bytes) = read_self_service_form(multipart).await?;

    let engine = engine(&state);
    let resolved = engine.resolve(&identifier).await?;
    if resolved.kind != UserKind::Member {
        return Err(AppError::validation(
            "Self-service check-in is for members; trainers use the daily check-in",
        ));
    }
    let user = resolved.user_id()?;

    let photo_url = state.photos.store(&photo_bytes)?;
    let record = engine
        .check_in(user, UserKind::Member, Some(photo_url), true)
        .await?;
    tracing::info!(user = %record.user, "Self-service check-in");
    Ok(Json(record))
}

/// POST /api/attendance/self/check-out - 自助签退 (照片同样必填)
pub async fn self_check_out(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<Json<Attendance>> {
    let (identifier, photo_bytes) = read_self_service_form(multipart).await?;

    let engine = engine(&state);
    let resolved = engine.resolve(&identifier).await?;
    if resolved.kind != UserKind::Member {
        return Err(AppError::validation(
            "Self-service check-out is for members; trainers use the daily check-in",
        ));
    }
    let user = resolved.user_id()?;

    let photo_url = state.photos.store(&photo_bytes)?;
    let record = engine.check_out_user(&user, Some(photo_url)).await?;
    tracing::info!(user = %record.user, duration = ?record.duration_minutes, "Self-service check-out");
    Ok(Json(record))
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub identifier: String,
}

/// GET /api/attendance/lookup?identifier=xxx - 签到现场查询
pub async fn lookup(
    State(state): State<ServerState>,
    Query(query): Query<LookupQuery>,
) -> AppResult<Json<LookupResult>> {
    let result = engine(&state).lookup(&query.identifier).await?;
    Ok(Json(result))
}

#[derive(Deserialize)]
pub struct ListQuery {
    /// 单日 YYYY-MM-DD
    pub date: Option<String>,
    /// 区间起始日 (含)
    pub from: Option<String>,
    /// 区间截止日 (含)
    pub to: Option<String>,
    pub user_id: Option<String>,
    pub kind: Option<UserKind>,
    pub status: Option<AttendanceStatus>,
}

/// GET /api/attendance - 考勤列表，活动记录带实时时长投影
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<AttendanceView>>> {
    let mut filter = AttendanceQuery {
        status: query.status,
        ..AttendanceQuery::default()
    };
    if let Some(date) = &query.date {
        filter.date = Some(parse_date(date)?);
    }
    if let Some(from) = &query.from {
        filter.from = Some(parse_date(from)?);
    }
    if let Some(to) = &query.to {
        filter.to = Some(parse_date(to)?);
    }
    if let Some(raw) = &query.user_id {
        let kind = query
            .kind
            .ok_or_else(|| AppError::validation("kind (member|trainer) is required with user_id"))?;
        filter.user = Some(parse_record_id(user_table(kind), raw)?);
    }

    let views = engine(&state).list(filter).await?;
    Ok(Json(views))
}

/// 手动触发批量签退的结果
#[derive(Serialize)]
pub struct AutoCheckoutResponse {
    pub closed: usize,
}

/// POST /api/attendance/auto-checkout - 手动触发批量签退
///
/// 与定时扫描同一实现；重复调用第二次 closed = 0
pub async fn auto_checkout(
    State(state): State<ServerState>,
) -> AppResult<Json<AutoCheckoutResponse>> {
    let closed = engine(&state).auto_checkout().await?;
    Ok(Json(AutoCheckoutResponse { closed }))
}
