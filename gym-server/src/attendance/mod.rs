//! Attendance — 签到状态机
//!
//! 状态机 NONE → checked_in → checked_out，原子写入在
//! [`crate::db::repository::AttendanceRepository`]，这里是业务编排：
//!
//! - [`lookup`] — 自由文本标识符 → 唯一用户的解析阶梯 (纯函数部分)
//! - [`engine`] — 签到/签退/查找/列表编排，含时区换算和照片门槛
//! - [`sweeper`] — 日终自动签退后台任务

pub mod engine;
pub mod lookup;
pub mod sweeper;

pub use engine::{AttendanceEngine, AttendanceView, LookupResult};
pub use sweeper::AutoCheckoutSweeper;
