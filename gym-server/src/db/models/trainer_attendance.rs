//! Trainer Attendance Model — 教练每日考勤
//!
//! 与通用 [`super::Attendance`] 分开：按 (trainer, day) 每天一条，
//! 由唯一索引兜底并发重复签到。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;
use super::trainer::TrainerId;

/// Trainer attendance ID type
pub type TrainerAttendanceId = RecordId;

/// 教练当日出勤状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainerDayStatus {
    Present,
    Absent,
    Leave,
}

/// Trainer attendance model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerAttendance {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<TrainerAttendanceId>,
    #[serde(with = "serde_helpers::record_id")]
    pub trainer: TrainerId,
    /// 本地日 00:00 的 day bucket (业务时区)
    pub day: i64,
    pub check_in_time: Option<i64>,
    pub check_out_time: Option<i64>,
    /// 签退时计算，四舍五入到分钟
    pub duration_minutes: Option<i64>,
    pub status: TrainerDayStatus,
    pub check_in_photo: Option<String>,
    pub check_out_photo: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
