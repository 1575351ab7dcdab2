//! Plan Models — 会员套餐和私教套餐
//!
//! 参考数据：会员分配时快照价格/时长，之后改价不回溯。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Plan ID type
pub type PlanId = RecordId;

/// PT Plan ID type
pub type PtPlanId = RecordId;

/// 会员套餐
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<PlanId>,
    pub name: String,
    pub price: f64,
    /// 会员周期时长 (月)
    pub duration_months: u32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create plan payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCreate {
    pub name: String,
    pub price: f64,
    pub duration_months: u32,
    pub features: Option<Vec<String>>,
}

/// Update plan payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// 私教套餐
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PtPlan {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<PtPlanId>,
    pub name: String,
    pub price: f64,
    /// 课时数
    pub sessions: Option<u32>,
    pub duration_months: Option<u32>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create PT plan payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PtPlanCreate {
    pub name: String,
    pub price: f64,
    pub sessions: Option<u32>,
    pub duration_months: Option<u32>,
}

/// Update PT plan payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PtPlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
