//! Payment Repository
//!
//! 只读查询。创建/修改/删除付款必须走 [`crate::ledger::PaymentProcessor`]
//! 的事务，保持会员账本与付款记录一致。

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoResult};
use crate::db::models::{Payment, PaymentCategory};

/// 付款列表过滤条件
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub member: Option<RecordId>,
    /// 闭区间下界 (毫秒)
    pub from: Option<i64>,
    /// 开区间上界 (毫秒)
    pub to: Option<i64>,
    pub category: Option<PaymentCategory>,
}

#[derive(Clone)]
pub struct PaymentRepository {
    base: BaseRepository,
}

impl PaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Payment>> {
        let payment: Option<Payment> = self.base.db().select(id.clone()).await?;
        Ok(payment)
    }

    /// 过滤列表，时间倒序
    pub async fn find_filtered(&self, filter: PaymentFilter) -> RepoResult<Vec<Payment>> {
        let payments: Vec<Payment> = self
            .base
            .db()
            .query(
                "SELECT * FROM payment WHERE \
                    ($member = NONE OR member = $member) \
                    AND ($from = NONE OR date >= $from) \
                    AND ($to = NONE OR date < $to) \
                    AND ($category = NONE OR category = $category) \
                 ORDER BY date DESC",
            )
            .bind(("member", filter.member))
            .bind(("from", filter.from))
            .bind(("to", filter.to))
            .bind(("category", filter.category))
            .await?
            .take(0)?;
        Ok(payments)
    }

    /// 会员的全部付款历史 (跨周期)，时间倒序
    pub async fn find_by_member(&self, member: &RecordId) -> RepoResult<Vec<Payment>> {
        let payments: Vec<Payment> = self
            .base
            .db()
            .query("SELECT * FROM payment WHERE member = $member ORDER BY date DESC")
            .bind(("member", member.clone()))
            .await?
            .take(0)?;
        Ok(payments)
    }

    /// 对账读取：当前周期的 completed 付款
    pub async fn completed_in_cycle(
        &self,
        member: &RecordId,
        cycle_seq: i64,
    ) -> RepoResult<Vec<Payment>> {
        let payments: Vec<Payment> = self
            .base
            .db()
            .query(
                "SELECT * FROM payment \
                 WHERE member = $member AND cycle_seq = $cycle AND status = 'completed' \
                 ORDER BY date",
            )
            .bind(("member", member.clone()))
            .bind(("cycle", cycle_seq))
            .await?
            .take(0)?;
        Ok(payments)
    }
}
