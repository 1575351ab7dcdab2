//! Attendance Model — 会员/教练通用签到记录
//!
//! 状态机: NONE → checked_in → checked_out (当日终态)。
//! 全库不变量: 每个 user 同时最多一条 checked_in 记录。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Attendance ID type
pub type AttendanceId = RecordId;

/// 签到状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    CheckedIn,
    CheckedOut,
}

/// 用户类型标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    Member,
    Trainer,
}

/// Attendance model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AttendanceId>,
    /// member:xxx 或 trainer:xxx
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub user_kind: UserKind,
    /// 本地日 00:00 的 day bucket (业务时区)
    pub date: i64,
    pub check_in_time: i64,
    pub check_out_time: Option<i64>,
    pub status: AttendanceStatus,
    /// 签退时计算，四舍五入到分钟
    pub duration_minutes: Option<i64>,
    pub check_in_photo: Option<String>,
    pub check_out_photo: Option<String>,
    /// 自助签到 (拍照必填) or 前台代签
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub self_service: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
