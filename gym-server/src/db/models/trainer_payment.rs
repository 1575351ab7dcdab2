//! Trainer Payment Model
//!
//! 教练实发工资的独立流水，append-only。
//! 不与 [`crate::salary`] 的计算结果自动对账 — 计算器只做参考。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;
use super::trainer::TrainerId;

/// Trainer payment ID type
pub type TrainerPaymentId = RecordId;

/// Trainer payment model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerPayment {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<TrainerPaymentId>,
    #[serde(with = "serde_helpers::record_id")]
    pub trainer: TrainerId,
    pub amount: f64,
    pub date: i64,
    /// 支付方式 (cash / bank ...)
    pub mode: String,
    /// 发薪月 "YYYY-MM" (可选)
    pub month: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
}

/// Create trainer payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerPaymentCreate {
    #[serde(with = "serde_helpers::record_id")]
    pub trainer: TrainerId,
    pub amount: f64,
    /// 缺省为当前时间
    pub date: Option<i64>,
    /// 缺省 "cash"
    pub mode: Option<String>,
    pub month: Option<String>,
    pub notes: Option<String>,
}
