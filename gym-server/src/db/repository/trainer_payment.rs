//! Trainer Payment Repository — append-only 发薪流水

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{TrainerPayment, TrainerPaymentCreate};
use crate::utils::time::now_millis;

#[derive(Clone)]
pub struct TrainerPaymentRepository {
    base: BaseRepository,
}

impl TrainerPaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: TrainerPaymentCreate) -> RepoResult<TrainerPayment> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE ONLY trainer_payment SET
                    trainer = $trainer,
                    amount = $amount,
                    date = $date,
                    mode = $mode,
                    month = $month,
                    notes = $notes,
                    created_at = $now"#,
            )
            .bind(("trainer", data.trainer))
            .bind(("amount", data.amount))
            .bind(("date", data.date.unwrap_or(now)))
            .bind(("mode", data.mode.unwrap_or_else(|| "cash".to_string())))
            .bind(("month", data.month))
            .bind(("notes", data.notes))
            .bind(("now", now))
            .await?;

        let created: Option<TrainerPayment> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create trainer payment".to_string()))
    }

    /// 列表，可按教练过滤，时间倒序
    pub async fn find_filtered(&self, trainer: Option<RecordId>) -> RepoResult<Vec<TrainerPayment>> {
        let payments: Vec<TrainerPayment> = self
            .base
            .db()
            .query(
                "SELECT * FROM trainer_payment \
                 WHERE ($trainer = NONE OR trainer = $trainer) ORDER BY date DESC",
            )
            .bind(("trainer", trainer))
            .await?
            .take(0)?;
        Ok(payments)
    }
}
