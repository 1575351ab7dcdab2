//! HTTP API 层
//!
//! 每个资源一个子模块：`mod.rs` 挂路由，`handler.rs` 写处理器。
//! 成功响应直接返回 `Json(data)`，错误统一走 [`crate::utils::AppError`]。

pub mod analytics;
pub mod attendance;
pub mod health;
pub mod members;
pub mod payments;
pub mod photos;
pub mod plans;
pub mod pt_plans;
pub mod salary;
pub mod trainer_attendance;
pub mod trainer_payments;
pub mod trainers;

use surrealdb::RecordId;

use crate::utils::error::AppError;

/// 路径参数 → RecordId
///
/// 接受完整 `table:id` 或裸 key；表名不匹配按坏参数处理
pub(crate) fn parse_record_id(table: &str, raw: &str) -> Result<RecordId, AppError> {
    if raw.contains(':') {
        let rid: RecordId = raw
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid {} id: {}", table, raw)))?;
        if rid.table() != table {
            return Err(AppError::validation(format!(
                "Invalid {} id: {}",
                table, raw
            )));
        }
        Ok(rid)
    } else {
        Ok(RecordId::from_table_key(table, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_full_and_bare_ids() {
        let full = parse_record_id("member", "member:abc123").unwrap();
        assert_eq!(full.table(), "member");

        let bare = parse_record_id("member", "abc123").unwrap();
        assert_eq!(bare.table(), "member");
        assert_eq!(full, bare);
    }

    #[test]
    fn parse_rejects_wrong_table() {
        assert!(parse_record_id("member", "trainer:abc").is_err());
    }
}
