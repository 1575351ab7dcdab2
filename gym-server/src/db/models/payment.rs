//! Payment Model
//!
//! 付款记录 append-only 创建；改/删必须经 [`crate::ledger`] 的全量重算流程。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::member::MemberId;
use super::serde_helpers;

/// Payment ID type
pub type PaymentId = RecordId;

/// 付款类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentCategory {
    Plan,
    Trainer,
    AdmissionFee,
    Other,
}

/// 套餐类型：会员套餐 vs 私教套餐
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    Membership,
    Pt,
}

/// 会员动作标记：本次付款是否开启/续订会员周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipAction {
    New,
    Renewal,
    None,
}

/// 付款记录状态 — 对账只统计 completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Completed,
    Pending,
    Cancelled,
}

/// Payment model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<PaymentId>,
    #[serde(with = "serde_helpers::record_id")]
    pub member: MemberId,
    pub amount: f64,
    pub date: i64,
    /// 支付方式 (cash / card / upi ...)
    pub mode: String,
    pub category: PaymentCategory,
    pub plan_kind: PlanKind,
    /// 关联套餐 (plan 或 pt_plan 记录)
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub plan: Option<RecordId>,
    pub membership_action: MembershipAction,
    /// 收据号 (前缀 + 紧凑日期 + 5 位随机数字，唯一索引)
    pub receipt_number: String,
    pub status: PaymentState,
    /// 归属的会员周期号，对账按当前周期过滤
    pub cycle_seq: i64,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreate {
    #[serde(with = "serde_helpers::record_id")]
    pub member: MemberId,
    pub amount: f64,
    /// 缺省为当前时间
    pub date: Option<i64>,
    /// 缺省 "cash"
    pub mode: Option<String>,
    /// 缺省 plan
    pub category: Option<PaymentCategory>,
    /// 缺省 membership
    pub plan_kind: Option<PlanKind>,
    /// 会员套餐付款时指定的套餐
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub plan: Option<RecordId>,
    /// 缺省 none；renewal 触发周期重置
    pub membership_action: Option<MembershipAction>,
    /// 续费换购的套餐 (优先于 plan / 会员现有套餐)
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub renewal_plan: Option<RecordId>,
    /// Pending 会员首次激活标记 (配合会员类付款)
    #[serde(default)]
    pub activate_membership: bool,
    /// 协商价，覆盖套餐价快照
    pub custom_price: Option<f64>,
    /// 周期起期覆盖，缺省为当前时间
    pub membership_start: Option<i64>,
    pub notes: Option<String>,
}

/// Update payment payload — 任何字段变化都会触发会员账本全量重算
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<PaymentCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
