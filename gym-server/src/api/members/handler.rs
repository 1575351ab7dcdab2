//! Member API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::parse_record_id;
use crate::core::ServerState;
use crate::db::models::{Member, MemberRegister, MemberStatus, MemberUpdate, Payment};
use crate::db::repository::{
    CounterRepository, MemberRepository, PaymentRepository, PlanRepository, format_code,
};
use crate::ledger;
use crate::utils::time::{add_months_millis, now_millis};
use crate::utils::validation::{
    self, validate_amount, validate_optional_text, validate_phone, validate_required_text,
};
use crate::utils::{AppError, AppResult};

#[derive(serde::Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// GET /api/members - 获取所有在册会员
///
/// 列表前先跑一次被动过期扫描，过期会员不会以 Active 展示
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Member>>> {
    let repo = MemberRepository::new(state.db.clone());
    let expired = repo.expire_lapsed(now_millis()).await?;
    if expired > 0 {
        tracing::info!(count = expired, "Members marked expired");
    }
    Ok(Json(repo.find_all().await?))
}

/// GET /api/members/search?q=xxx - 按编号/手机号/姓名搜索
pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Member>>> {
    let repo = MemberRepository::new(state.db.clone());
    Ok(Json(repo.search(query.q.trim()).await?))
}

/// GET /api/members/:id - 获取单个会员
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Member>> {
    let rid = parse_record_id("member", &id)?;
    let member = MemberRepository::new(state.db.clone())
        .find_by_id(&rid)
        .await?
        .filter(|m| m.is_active)
        .ok_or_else(|| AppError::not_found(format!("Member {} not found", id)))?;
    Ok(Json(member))
}

/// POST /api/members - 注册会员
///
/// 编号从计数器铸造 (MEM001, MEM002, ...)。`activate = true` 时注册即开卡：
/// 快照套餐价、设定周期起止、置 Active；应缴照常走付款流程结清。
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<MemberRegister>,
) -> AppResult<Json<Member>> {
    validate_required_text(&payload.name, "name", validation::MAX_NAME_LEN)?;
    validate_phone(&payload.phone, "phone")?;
    validate_optional_text(&payload.email, "email", validation::MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.address, "address", validation::MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.notes, "notes", validation::MAX_NOTE_LEN)?;

    let now = now_millis();
    let join_date = payload.join_date.unwrap_or(now);
    let admission_fee = payload.admission_fee.unwrap_or(0.0);
    validate_amount(admission_fee, "admission_fee")?;

    let seq = CounterRepository::new(state.db.clone()).next("member").await?;
    let member_id = format_code("MEM", seq);

    let (status, membership_start, membership_end, total_plan_price, cycle_seq) =
        if payload.activate {
            let plan_id = payload
                .plan
                .clone()
                .ok_or_else(|| AppError::validation("Membership activation requires a plan"))?;
            let plan = PlanRepository::new(state.db.clone())
                .find_by_id(&plan_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Plan {} not found", plan_id)))?;
            let end = add_months_millis(join_date, plan.duration_months, state.config.timezone);
            (
                MemberStatus::Active,
                Some(join_date),
                Some(end),
                plan.price,
                1,
            )
        } else {
            (MemberStatus::Pending, None, None, 0.0, 0)
        };

    let member = Member {
        id: None,
        member_id,
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        address: payload.address,
        photo: payload.photo,
        join_date,
        status,
        plan: payload.plan,
        trainer: payload.trainer,
        pt_plan: payload.pt_plan,
        discount: payload.discount,
        membership_start,
        membership_end,
        total_plan_price,
        admission_fee,
        total_paid: 0.0,
        payment_status: ledger::payment_status(total_plan_price, 0.0, admission_fee),
        last_payment_date: None,
        last_payment_amount: None,
        cycle_seq,
        version: 0,
        is_active: true,
        notes: payload.notes,
        created_at: now,
        updated_at: now,
    };

    let created = MemberRepository::new(state.db.clone()).create(member).await?;
    tracing::info!(member_id = %created.member_id, activated = payload.activate, "Member registered");
    Ok(Json(created))
}

/// PUT /api/members/:id - 更新联系信息和教练分配
///
/// 账本字段 (total_paid / payment_status / 周期) 不在此路径，只随付款流程变化
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MemberUpdate>,
) -> AppResult<Json<Member>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", validation::MAX_NAME_LEN)?;
    }
    if let Some(phone) = &payload.phone {
        validate_phone(phone, "phone")?;
    }
    validate_optional_text(&payload.email, "email", validation::MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.notes, "notes", validation::MAX_NOTE_LEN)?;

    let rid = parse_record_id("member", &id)?;
    let updated = MemberRepository::new(state.db.clone())
        .update_profile(&rid, payload)
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/members/:id - 软删除 (档案保留，从列表与查找消失)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let rid = parse_record_id("member", &id)?;
    let deleted = MemberRepository::new(state.db.clone())
        .soft_delete(&rid)
        .await?;
    if !deleted {
        return Err(AppError::not_found(format!("Member {} not found", id)));
    }
    tracing::info!(member = %id, "Member soft-deleted");
    Ok(Json(true))
}

/// GET /api/members/:id/payments - 会员付款流水 (新→旧)
pub async fn payment_history(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Payment>>> {
    let rid = parse_record_id("member", &id)?;
    MemberRepository::new(state.db.clone())
        .find_by_id(&rid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {} not found", id)))?;
    let payments = PaymentRepository::new(state.db.clone())
        .find_by_member(&rid)
        .await?;
    Ok(Json(payments))
}

/// 当前周期的欠费视图
#[derive(serde::Serialize)]
pub struct BalanceResponse {
    pub member_id: String,
    pub total_plan_price: f64,
    pub admission_fee: f64,
    pub total_paid: f64,
    pub payment_status: crate::db::models::PaymentStatusTag,
    pub balance: f64,
}

/// GET /api/members/:id/balance - 当前周期应缴/已缴/欠费
pub async fn balance(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<BalanceResponse>> {
    let rid = parse_record_id("member", &id)?;
    let member = MemberRepository::new(state.db.clone())
        .find_by_id(&rid)
        .await?
        .filter(|m| m.is_active)
        .ok_or_else(|| AppError::not_found(format!("Member {} not found", id)))?;
    Ok(Json(BalanceResponse {
        member_id: member.member_id,
        total_plan_price: member.total_plan_price,
        admission_fee: member.admission_fee,
        total_paid: member.total_paid,
        payment_status: member.payment_status,
        balance: ledger::balance(member.total_plan_price, member.total_paid, member.admission_fee),
    }))
}
