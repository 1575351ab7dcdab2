//! Database Module
//!
//! Embedded SurrealDB (RocksDB backend) connection and schema definition

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "gym";
const DATABASE: &str = "gym";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the embedded database and apply the schema
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        tracing::info!("Database connection established (SurrealDB RocksDB)");

        define_schema(&db).await?;
        tracing::info!("Database schema applied");

        Ok(Self { db })
    }
}

/// 表结构与唯一索引
///
/// SCHEMALESS 表 + 唯一索引：
/// - member_id / trainer_id / receipt_number 全局唯一 (并发注册由计数器 + 索引兜底)
/// - trainer_attendance 按 (trainer, day) 每天一条
pub async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS member SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS member_id_unique ON TABLE member COLUMNS member_id UNIQUE;

        DEFINE TABLE IF NOT EXISTS trainer SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS trainer_id_unique ON TABLE trainer COLUMNS trainer_id UNIQUE;

        DEFINE TABLE IF NOT EXISTS plan SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS pt_plan SCHEMALESS;

        DEFINE TABLE IF NOT EXISTS payment SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS receipt_unique ON TABLE payment COLUMNS receipt_number UNIQUE;
        DEFINE INDEX IF NOT EXISTS payment_member_cycle ON TABLE payment COLUMNS member, cycle_seq;
        DEFINE INDEX IF NOT EXISTS payment_date ON TABLE payment COLUMNS date;

        DEFINE TABLE IF NOT EXISTS attendance SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS attendance_user_status ON TABLE attendance COLUMNS user, status;
        DEFINE INDEX IF NOT EXISTS attendance_user_date ON TABLE attendance COLUMNS user, date;
        DEFINE TABLE IF NOT EXISTS trainer_attendance SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS trainer_day_unique ON TABLE trainer_attendance COLUMNS trainer, day UNIQUE;

        DEFINE TABLE IF NOT EXISTS trainer_payment SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS counter SCHEMALESS;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?
    .check()
    .map_err(|e| AppError::database(format!("Schema definition failed: {e}")))?;

    Ok(())
}
