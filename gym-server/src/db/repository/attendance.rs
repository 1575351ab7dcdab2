//! Attendance Repository
//!
//! 签到/签退的原子写入。并发控制全部在单条事务里完成：
//! 条件不满足时事务照常提交但不写任何记录，由返回的 outcome 对象
//! 区分冲突原因，避免解析错误文本。

use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Attendance, AttendanceStatus, UserKind};
use crate::utils::time::now_millis;

/// 签到写入参数 (day bucket 和照片由引擎层准备好)
#[derive(Debug, Clone)]
pub struct AttendanceCheckIn {
    pub user: RecordId,
    pub user_kind: UserKind,
    /// 本地日 00:00 (业务时区)
    pub date: i64,
    pub time: i64,
    pub photo: Option<String>,
    pub self_service: bool,
}

/// 签到事务结果：冲突标记 + 条件创建的记录
#[derive(Debug, Deserialize)]
struct CheckInOutcome {
    blocked_active: bool,
    blocked_today: bool,
    record: Option<Attendance>,
}

/// 签退事务结果
#[derive(Debug, Deserialize)]
struct CheckOutOutcome {
    found: bool,
    record: Option<Attendance>,
}

#[derive(Clone)]
pub struct AttendanceRepository {
    base: BaseRepository,
}

impl AttendanceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 原子签到
    ///
    /// 拦截规则：任何日期的 checked_in 记录都拦 (一人同时最多一条活动记录)；
    /// `once_per_day` 额外拦当日任意记录 (自助模式)。
    pub async fn check_in(
        &self,
        req: AttendanceCheckIn,
        once_per_day: bool,
    ) -> RepoResult<Attendance> {
        let mut result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                LET $active = (SELECT VALUE id FROM attendance
                    WHERE user = $user AND status = 'checked_in');
                LET $today = (SELECT VALUE id FROM attendance
                    WHERE user = $user AND date = $date);
                LET $blocked_active = array::len($active) > 0;
                LET $blocked_today = $once AND array::len($today) > 0;
                LET $rec = IF !$blocked_active AND !$blocked_today {
                    (CREATE ONLY attendance SET
                        user = $user,
                        user_kind = $user_kind,
                        date = $date,
                        check_in_time = $time,
                        check_out_time = NONE,
                        status = 'checked_in',
                        duration_minutes = NONE,
                        check_in_photo = $photo,
                        check_out_photo = NONE,
                        self_service = $self_service,
                        created_at = $now,
                        updated_at = $now)
                } ELSE { NONE };
                RETURN {
                    blocked_active: $blocked_active,
                    blocked_today: $blocked_today,
                    record: $rec
                };
                COMMIT TRANSACTION;"#,
            )
            .bind(("user", req.user))
            .bind(("user_kind", req.user_kind))
            .bind(("date", req.date))
            .bind(("time", req.time))
            .bind(("photo", req.photo))
            .bind(("self_service", req.self_service))
            .bind(("once", once_per_day))
            .bind(("now", now_millis()))
            .await?;

        let outcome: Option<CheckInOutcome> = result.take(0)?;
        let outcome =
            outcome.ok_or_else(|| RepoError::Database("Check-in returned no result".to_string()))?;

        if outcome.blocked_active {
            return Err(RepoError::Conflict(
                "User already has an active check-in".to_string(),
            ));
        }
        if outcome.blocked_today {
            return Err(RepoError::Conflict(
                "Already checked in today".to_string(),
            ));
        }
        outcome
            .record
            .ok_or_else(|| RepoError::Database("Check-in record missing".to_string()))
    }

    /// 按记录号签退 — 只有 checked_in 记录可以翻转，重复签退报冲突
    pub async fn check_out(
        &self,
        id: &RecordId,
        time: i64,
        photo: Option<String>,
    ) -> RepoResult<Attendance> {
        let mut result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                LET $rec = (SELECT * FROM ONLY $id);
                LET $found = $rec != NONE;
                LET $after = IF $found AND $rec.status = 'checked_in' {
                    (UPDATE ONLY $id SET
                        check_out_time = $time,
                        status = 'checked_out',
                        duration_minutes = <int> math::max([math::round(($time - check_in_time) / 60000), 0]),
                        check_out_photo = $photo OR check_out_photo,
                        updated_at = $now)
                } ELSE { NONE };
                RETURN { found: $found, record: $after };
                COMMIT TRANSACTION;"#,
            )
            .bind(("id", id.clone()))
            .bind(("time", time))
            .bind(("photo", photo))
            .bind(("now", now_millis()))
            .await?;

        let outcome: Option<CheckOutOutcome> = result.take(0)?;
        let outcome = outcome
            .ok_or_else(|| RepoError::Database("Check-out returned no result".to_string()))?;

        if !outcome.found {
            return Err(RepoError::NotFound(format!(
                "Attendance record {} not found",
                id
            )));
        }
        outcome
            .record
            .ok_or_else(|| RepoError::Conflict("Already checked out".to_string()))
    }

    /// 按用户签退当前活动记录 — 无活动记录时 NotFound
    pub async fn check_out_active(
        &self,
        user: &RecordId,
        time: i64,
        photo: Option<String>,
    ) -> RepoResult<Attendance> {
        let mut result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                LET $rec = (SELECT * FROM attendance
                    WHERE user = $user AND status = 'checked_in'
                    ORDER BY check_in_time DESC LIMIT 1)[0];
                LET $found = $rec != NONE;
                LET $after = IF $found {
                    (UPDATE ONLY $rec.id SET
                        check_out_time = $time,
                        status = 'checked_out',
                        duration_minutes = <int> math::max([math::round(($time - check_in_time) / 60000), 0]),
                        check_out_photo = $photo OR check_out_photo,
                        updated_at = $now)
                } ELSE { NONE };
                RETURN { found: $found, record: $after };
                COMMIT TRANSACTION;"#,
            )
            .bind(("user", user.clone()))
            .bind(("time", time))
            .bind(("photo", photo))
            .bind(("now", now_millis()))
            .await?;

        let outcome: Option<CheckOutOutcome> = result.take(0)?;
        let outcome = outcome
            .ok_or_else(|| RepoError::Database("Check-out returned no result".to_string()))?;

        if !outcome.found {
            return Err(RepoError::NotFound(
                "No active check-in for user".to_string(),
            ));
        }
        outcome
            .record
            .ok_or_else(|| RepoError::Database("Check-out record missing".to_string()))
    }

    /// 批量闭合所有活动记录 (日终扫描)
    ///
    /// 幂等：没有活动记录时更新 0 条。与手工签退并发时
    /// 输掉的一方匹配不到 checked_in 行，自然空操作。
    pub async fn close_all_active(&self, close_time: i64) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE attendance SET
                    check_out_time = $close,
                    status = 'checked_out',
                    duration_minutes = <int> math::max([math::round(($close - check_in_time) / 60000), 0]),
                    updated_at = $now
                WHERE status = 'checked_in'
                RETURN AFTER"#,
            )
            .bind(("close", close_time))
            .bind(("now", now_millis()))
            .await?;
        let closed: Vec<Attendance> = result.take(0)?;
        Ok(closed.len())
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Attendance>> {
        let record: Option<Attendance> = self.base.db().select(id.clone()).await?;
        Ok(record)
    }

    /// 用户当前的活动记录 (全库唯一)
    pub async fn find_active_by_user(&self, user: &RecordId) -> RepoResult<Option<Attendance>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM attendance \
                 WHERE user = $user AND status = 'checked_in' \
                 ORDER BY check_in_time DESC LIMIT 1",
            )
            .bind(("user", user.clone()))
            .await?;
        let records: Vec<Attendance> = result.take(0)?;
        Ok(records.into_iter().next())
    }

    /// 用户当日的全部记录
    pub async fn find_by_user_and_date(
        &self,
        user: &RecordId,
        date: i64,
    ) -> RepoResult<Vec<Attendance>> {
        let records: Vec<Attendance> = self
            .base
            .db()
            .query(
                "SELECT * FROM attendance WHERE user = $user AND date = $date \
                 ORDER BY check_in_time",
            )
            .bind(("user", user.clone()))
            .bind(("date", date))
            .await?
            .take(0)?;
        Ok(records)
    }

    /// 过滤列表：日期 / 用户 / 状态
    /// `from`/`to` 过滤 day bucket 的闭区间
    pub async fn find_filtered(
        &self,
        date: Option<i64>,
        from: Option<i64>,
        to: Option<i64>,
        user: Option<RecordId>,
        status: Option<AttendanceStatus>,
    ) -> RepoResult<Vec<Attendance>> {
        let records: Vec<Attendance> = self
            .base
            .db()
            .query(
                "SELECT * FROM attendance WHERE \
                    ($date = NONE OR date = $date) \
                    AND ($from = NONE OR date >= $from) \
                    AND ($to = NONE OR date <= $to) \
                    AND ($user = NONE OR user = $user) \
                    AND ($status = NONE OR status = $status) \
                 ORDER BY check_in_time DESC",
            )
            .bind(("date", date))
            .bind(("from", from))
            .bind(("to", to))
            .bind(("user", user))
            .bind(("status", status))
            .await?
            .take(0)?;
        Ok(records)
    }
}
