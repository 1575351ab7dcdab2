//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables using Graph DB patterns.

// People
pub mod member;
pub mod trainer;

// Reference data
pub mod plan;
pub mod pt_plan;

// Finance
pub mod payment;
pub mod trainer_payment;

// Attendance
pub mod attendance;
pub mod trainer_attendance;

// System
pub mod counter;

// Re-exports
pub use attendance::AttendanceRepository;
pub use counter::{CounterRepository, format_code};
pub use member::MemberRepository;
pub use payment::PaymentRepository;
pub use plan::PlanRepository;
pub use pt_plan::PtPlanRepository;
pub use trainer::TrainerRepository;
pub use trainer_attendance::TrainerAttendanceRepository;
pub use trainer_payment::TrainerPaymentRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Stale read: {0}")]
    /// 乐观并发失败 (version 不匹配)；调用方在有限次数内重试
    Stale(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl RepoError {
    /// 是否为乐观并发冲突 (可重试)
    pub fn is_stale(&self) -> bool {
        matches!(self, RepoError::Stale(_))
    }
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        if is_unique_violation(&err) {
            return RepoError::Conflict(err.to_string());
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "member:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("member", "abc");
//   - 获取表名: id.table()
//   - 获取纯ID: id.key().to_string()
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId
//
// 业务编号 (MEM001 / TRN001) 是 member_id / trainer_id 字段，不是 RecordId。

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// 唯一索引冲突判定
///
/// SurrealDB 不给唯一索引冲突专门的错误类型，靠错误文本识别。
pub(crate) fn is_unique_violation(err: &surrealdb::Error) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("unique") || msg.contains("already exists") || msg.contains("duplicate")
}
