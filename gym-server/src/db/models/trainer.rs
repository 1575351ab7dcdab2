//! Trainer Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Trainer ID type
pub type TrainerId = RecordId;

/// 提成模式
///
/// fixed: 每名在册私教会员固定金额; percentage: 私教套餐营收百分比
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionType {
    Fixed,
    Percentage,
}

/// Trainer model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trainer {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<TrainerId>,
    /// 业务编号 TRN001 (计数器铸造，唯一索引)
    pub trainer_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub specialization: Option<String>,
    pub join_date: i64,
    /// 月底薪
    pub base_salary: f64,
    pub commission_type: CommissionType,
    /// fixed: 每人金额; percentage: 百分比数值
    pub commission_value: f64,
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

/// Create trainer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerCreate {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub specialization: Option<String>,
    pub join_date: Option<i64>,
    pub base_salary: Option<f64>,
    pub commission_type: Option<CommissionType>,
    pub commission_value: Option<f64>,
}

/// Update trainer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_type: Option<CommissionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
