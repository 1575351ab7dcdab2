//! Attendance Engine — 签到业务编排
//!
//! 时间换算 (业务时区 day bucket)、标识符解析和照片门槛在这一层；
//! 原子性在 repository 的事务里。前台代签只拦活动记录 (跨天也算)，
//! 自助签到额外按日去重 — 两套拦截范围是有意不同的。

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;

use super::lookup;
use crate::db::models::{
    Attendance, AttendanceStatus, Member, MemberStatus, Trainer, UserKind,
};
use crate::db::repository::attendance::AttendanceCheckIn;
use crate::db::repository::{
    AttendanceRepository, MemberRepository, RepoError, RepoResult, TrainerRepository,
};
use crate::utils::time::{
    day_bucket_millis, day_close_millis, day_start_millis, days_until, minutes_between,
    now_millis, today_local,
};

/// 解析出的唯一用户 (member 和 trainer 恰有一个)
#[derive(Debug, Clone)]
pub struct ResolvedUser {
    pub kind: UserKind,
    pub member: Option<Member>,
    pub trainer: Option<Trainer>,
}

impl ResolvedUser {
    fn member(member: Member) -> Self {
        Self {
            kind: UserKind::Member,
            member: Some(member),
            trainer: None,
        }
    }

    fn trainer(trainer: Trainer) -> Self {
        Self {
            kind: UserKind::Trainer,
            member: None,
            trainer: Some(trainer),
        }
    }

    /// 底层记录 ID
    pub fn user_id(&self) -> RepoResult<RecordId> {
        self.member
            .as_ref()
            .and_then(|m| m.id.clone())
            .or_else(|| self.trainer.as_ref().and_then(|t| t.id.clone()))
            .ok_or_else(|| RepoError::Database("Resolved user has no record id".to_string()))
    }
}

/// 标识符查找的完整响应
#[derive(Debug, Serialize)]
pub struct LookupResult {
    pub kind: UserKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer: Option<Trainer>,
    pub currently_checked_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_record: Option<Attendance>,
    /// 今日是否已有记录 (无论状态) — 自助流程的去重依据
    pub has_record_today: bool,
    /// 距会员到期天数，按天向上取整；过期为负
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_expired: Option<bool>,
}

/// 列表视图：记录 + 活动中记录的实时时长投影
#[derive(Debug, Serialize)]
pub struct AttendanceView {
    #[serde(flatten)]
    pub record: Attendance,
    /// 读取时计算，从不落库
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_duration_minutes: Option<i64>,
}

impl AttendanceView {
    fn project(record: Attendance, now: i64) -> Self {
        let current_duration_minutes = match record.status {
            AttendanceStatus::CheckedIn => Some(minutes_between(record.check_in_time, now)),
            AttendanceStatus::CheckedOut => None,
        };
        Self {
            record,
            current_duration_minutes,
        }
    }
}

/// 列表过滤参数 (日期都是业务时区的日历日)
#[derive(Debug, Default)]
pub struct AttendanceQuery {
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub user: Option<RecordId>,
    pub status: Option<AttendanceStatus>,
}

pub struct AttendanceEngine {
    members: MemberRepository,
    trainers: TrainerRepository,
    attendance: AttendanceRepository,
    timezone: Tz,
}

impl AttendanceEngine {
    pub fn new(db: Surreal<Db>, timezone: Tz) -> Self {
        Self {
            members: MemberRepository::new(db.clone()),
            trainers: TrainerRepository::new(db.clone()),
            attendance: AttendanceRepository::new(db),
            timezone,
        }
    }

    /// 自由文本 → 唯一用户
    ///
    /// 数字输入走编号阶梯再试手机号；其他输入依次试精确编号、
    /// 精确手机号、姓名子串。会员整体优先于教练。
    pub async fn resolve(&self, identifier: &str) -> RepoResult<ResolvedUser> {
        let id = identifier.trim();
        if id.is_empty() {
            return Err(RepoError::Validation(
                "Identifier must not be empty".to_string(),
            ));
        }

        if lookup::is_numeric(id) {
            for code in lookup::candidate_codes(id, "MEM") {
                if let Some(member) = self.members.find_by_code(&code).await? {
                    return Ok(ResolvedUser::member(member));
                }
            }
            if let Some(member) = self.members.find_by_phone(id).await? {
                return Ok(ResolvedUser::member(member));
            }
            for code in lookup::candidate_codes(id, "TRN") {
                if let Some(trainer) = self.trainers.find_by_code(&code).await? {
                    return Ok(ResolvedUser::trainer(trainer));
                }
            }
            if let Some(trainer) = self.trainers.find_by_phone(id).await? {
                return Ok(ResolvedUser::trainer(trainer));
            }
        } else {
            let code = id.to_uppercase();
            if let Some(member) = self.members.find_by_code(&code).await? {
                return Ok(ResolvedUser::member(member));
            }
            if let Some(member) = self.members.find_by_phone(id).await? {
                return Ok(ResolvedUser::member(member));
            }
            if let Some(member) = self.members.find_by_name_contains(id).await? {
                return Ok(ResolvedUser::member(member));
            }
            if let Some(trainer) = self.trainers.find_by_code(&code).await? {
                return Ok(ResolvedUser::trainer(trainer));
            }
            if let Some(trainer) = self.trainers.find_by_phone(id).await? {
                return Ok(ResolvedUser::trainer(trainer));
            }
            if let Some(trainer) = self.trainers.find_by_name_contains(id).await? {
                return Ok(ResolvedUser::trainer(trainer));
            }
        }

        Err(RepoError::NotFound(format!(
            "No member or trainer matches '{}'",
            id
        )))
    }

    /// 解析 + 签到现场需要的全部状态
    pub async fn lookup(&self, identifier: &str) -> RepoResult<LookupResult> {
        let resolved = self.resolve(identifier).await?;
        let user_id = resolved.user_id()?;
        let now = now_millis();

        let active = self.attendance.find_active_by_user(&user_id).await?;
        let today = day_bucket_millis(now, self.timezone);
        let today_records = self
            .attendance
            .find_by_user_and_date(&user_id, today)
            .await?;

        let (days_until_expiry, membership_expired) = match &resolved.member {
            Some(m) => {
                let days = m.membership_end.map(|end| days_until(end, now));
                let expired = m.status == MemberStatus::Expired || days.is_some_and(|d| d < 0);
                (days, Some(expired))
            }
            None => (None, None),
        };

        Ok(LookupResult {
            kind: resolved.kind,
            currently_checked_in: active.is_some(),
            active_record: active,
            has_record_today: !today_records.is_empty(),
            days_until_expiry,
            membership_expired,
            member: resolved.member,
            trainer: resolved.trainer,
        })
    }

    /// 签到 — `self_service` 同时决定存储标记和按日去重
    pub async fn check_in(
        &self,
        user: RecordId,
        kind: UserKind,
        photo: Option<String>,
        self_service: bool,
    ) -> RepoResult<Attendance> {
        let now = now_millis();
        let req = AttendanceCheckIn {
            user,
            user_kind: kind,
            date: day_bucket_millis(now, self.timezone),
            time: now,
            photo,
            self_service,
        };
        self.attendance.check_in(req, self_service).await
    }

    pub async fn check_out_record(
        &self,
        id: &RecordId,
        photo: Option<String>,
    ) -> RepoResult<Attendance> {
        self.attendance.check_out(id, now_millis(), photo).await
    }

    pub async fn check_out_user(
        &self,
        user: &RecordId,
        photo: Option<String>,
    ) -> RepoResult<Attendance> {
        self.attendance
            .check_out_active(user, now_millis(), photo)
            .await
    }

    /// 闭合全部活动记录，签退时间统一打当日 23:59:59.999 (业务时区)
    pub async fn auto_checkout(&self) -> RepoResult<usize> {
        let today = today_local(self.timezone);
        let close = day_close_millis(today, self.timezone);
        let closed = self.attendance.close_all_active(close).await?;
        if closed > 0 {
            tracing::info!(count = closed, "Auto-checkout closed active records");
        }
        Ok(closed)
    }

    pub async fn list(&self, query: AttendanceQuery) -> RepoResult<Vec<AttendanceView>> {
        let date = query.date.map(|d| day_start_millis(d, self.timezone));
        let from = query.from.map(|d| day_start_millis(d, self.timezone));
        let to = query.to.map(|d| day_start_millis(d, self.timezone));
        let records = self
            .attendance
            .find_filtered(date, from, to, query.user, query.status)
            .await?;
        let now = now_millis();
        Ok(records
            .into_iter()
            .map(|r| AttendanceView::project(r, now))
            .collect())
    }
}
