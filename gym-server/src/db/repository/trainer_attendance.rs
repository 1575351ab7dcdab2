//! Trainer Attendance Repository
//!
//! 每人每天一条记录，(trainer, day) 唯一索引兜底并发重复签到。

use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::TrainerAttendance;
use crate::utils::time::now_millis;

/// 签退事务结果
#[derive(Debug, Deserialize)]
struct DayCheckOutOutcome {
    found: bool,
    already: bool,
    record: Option<TrainerAttendance>,
}

#[derive(Clone)]
pub struct TrainerAttendanceRepository {
    base: BaseRepository,
}

impl TrainerAttendanceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 当日签到
    ///
    /// 先查再建给出可读的冲突信息；并发竞争由 (trainer, day)
    /// 唯一索引兜底，同样映射为 Conflict。
    pub async fn check_in(
        &self,
        trainer: &RecordId,
        day: i64,
        time: i64,
        photo: Option<String>,
    ) -> RepoResult<TrainerAttendance> {
        if self.find_by_trainer_and_day(trainer, day).await?.is_some() {
            return Err(RepoError::Conflict(
                "Trainer already checked in today".to_string(),
            ));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE ONLY trainer_attendance SET
                    trainer = $trainer,
                    day = $day,
                    check_in_time = $time,
                    check_out_time = NONE,
                    duration_minutes = NONE,
                    status = 'present',
                    check_in_photo = $photo,
                    check_out_photo = NONE,
                    created_at = $now,
                    updated_at = $now"#,
            )
            .bind(("trainer", trainer.clone()))
            .bind(("day", day))
            .bind(("time", time))
            .bind(("photo", photo))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<TrainerAttendance> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create attendance".to_string()))
    }

    /// 当日签退 — 未签到 NotFound，重复签退 Conflict
    pub async fn check_out(
        &self,
        trainer: &RecordId,
        day: i64,
        time: i64,
        photo: Option<String>,
    ) -> RepoResult<TrainerAttendance> {
        let mut result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                LET $rec = (SELECT * FROM trainer_attendance
                    WHERE trainer = $trainer AND day = $day LIMIT 1)[0];
                LET $found = $rec != NONE AND $rec.check_in_time != NONE;
                LET $already = $found AND $rec.check_out_time != NONE;
                LET $after = IF $found AND !$already {
                    (UPDATE ONLY $rec.id SET
                        check_out_time = $time,
                        duration_minutes = <int> math::max([math::round(($time - check_in_time) / 60000), 0]),
                        check_out_photo = $photo OR check_out_photo,
                        updated_at = $now)
                } ELSE { NONE };
                RETURN { found: $found, already: $already, record: $after };
                COMMIT TRANSACTION;"#,
            )
            .bind(("trainer", trainer.clone()))
            .bind(("day", day))
            .bind(("time", time))
            .bind(("photo", photo))
            .bind(("now", now_millis()))
            .await?;

        let outcome: Option<DayCheckOutOutcome> = result.take(0)?;
        let outcome = outcome
            .ok_or_else(|| RepoError::Database("Check-out returned no result".to_string()))?;

        if !outcome.found {
            return Err(RepoError::NotFound(
                "Trainer not checked in today".to_string(),
            ));
        }
        if outcome.already {
            return Err(RepoError::Conflict("Already checked out".to_string()));
        }
        outcome
            .record
            .ok_or_else(|| RepoError::Database("Check-out record missing".to_string()))
    }

    /// 当日记录
    pub async fn find_by_trainer_and_day(
        &self,
        trainer: &RecordId,
        day: i64,
    ) -> RepoResult<Option<TrainerAttendance>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM trainer_attendance WHERE trainer = $trainer AND day = $day LIMIT 1")
            .bind(("trainer", trainer.clone()))
            .bind(("day", day))
            .await?;
        let records: Vec<TrainerAttendance> = result.take(0)?;
        Ok(records.into_iter().next())
    }

    /// 按日列表 (缺省全量，时间倒序)
    pub async fn find_by_day(&self, day: Option<i64>) -> RepoResult<Vec<TrainerAttendance>> {
        let records: Vec<TrainerAttendance> = self
            .base
            .db()
            .query(
                "SELECT * FROM trainer_attendance WHERE ($day = NONE OR day = $day) \
                 ORDER BY day DESC, check_in_time DESC",
            )
            .bind(("day", day))
            .await?
            .take(0)?;
        Ok(records)
    }
}
