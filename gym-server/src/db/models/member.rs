//! Member Model
//!
//! 会员财务状态 (total_plan_price / total_paid / payment_status) 只能由
//! [`crate::ledger`] 的对账流程写入，handler 不得直接改动。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::plan::{PlanId, PtPlanId};
use super::serde_helpers;
use super::trainer::TrainerId;

/// Member ID type
pub type MemberId = RecordId;

/// 会员状态
///
/// Pending: 已注册未激活；Active: 周期内；Expired: 周期已过
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Active,
    Expired,
    Pending,
}

/// 缴费状态 — 始终由 [`crate::ledger::payment_status`] 推导，禁止手工赋值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatusTag {
    Paid,
    Partial,
    Unpaid,
}

/// Member model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<MemberId>,
    /// 业务编号 MEM001 (计数器铸造，唯一索引)
    pub member_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    /// 会员照片 URL (注册时可选)
    pub photo: Option<String>,
    pub join_date: i64,
    pub status: MemberStatus,
    /// 当前会员套餐
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub plan: Option<PlanId>,
    /// 私教教练
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub trainer: Option<TrainerId>,
    /// 私教套餐
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub pt_plan: Option<PtPlanId>,
    /// 折扣引用 (外部实体，仅存引用)
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub discount: Option<RecordId>,
    pub membership_start: Option<i64>,
    pub membership_end: Option<i64>,
    /// 当前周期套餐价快照 (Plan 之后改价不影响已分配会员)
    pub total_plan_price: f64,
    /// 入会费 (仅首个周期计入应缴；续费周期清零)
    pub admission_fee: f64,
    /// 当前周期已缴合计 (completed 付款之和)
    pub total_paid: f64,
    pub payment_status: PaymentStatusTag,
    pub last_payment_date: Option<i64>,
    pub last_payment_amount: Option<f64>,
    /// 会员周期号，续费 +1；付款记录按此归属周期
    pub cycle_seq: i64,
    /// 乐观并发版本号，任何账本写入 +1
    pub version: i64,
    /// 软删除标记；status 只表达会员周期状态
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Register member payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRegister {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub photo: Option<String>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub plan: Option<PlanId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub trainer: Option<TrainerId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub pt_plan: Option<PtPlanId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub discount: Option<RecordId>,
    /// 缺省为当前时间
    pub join_date: Option<i64>,
    /// 缺省为 0
    pub admission_fee: Option<f64>,
    /// 注册即开卡：需要 plan，设置周期起止并置 Active (应缴照常，走付款流程结清)
    #[serde(default)]
    pub activate: bool,
    pub notes: Option<String>,
}

/// Update member payload (联系信息和教练分配；账本字段走付款流程)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub trainer: Option<TrainerId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub pt_plan: Option<PtPlanId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
