//! Payment Processor — 付款写入与会员账本的事务化对账
//!
//! 每次付款变动都在一条数据库事务里同时落付款记录和会员账本，
//! 用 member.version 做乐观并发检查：版本不符时事务不写任何东西，
//! 由 Rust 侧重读重算后有限次重试。改/删付款一律全量重算当前周期
//! (completed 之和)，绝不增量加减。

use chrono::DateTime;
use chrono_tz::Tz;
use rand::Rng;
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{
    Member, MemberStatus, MembershipAction, Payment, PaymentCategory, PaymentCreate, PaymentState,
    PaymentUpdate, PlanKind,
};
use crate::db::repository::{
    MemberRepository, PaymentRepository, PlanRepository, RepoError, RepoResult,
};
use crate::ledger::status::payment_status;
use crate::utils::money;
use crate::utils::time::{add_months_millis, now_millis};

/// 乐观并发重试上限
const MAX_ATTEMPTS: usize = 3;

/// 一次账本写入的结果：付款记录 + 对账后的会员
#[derive(Debug, Clone, serde::Serialize)]
pub struct LedgerWrite {
    pub payment: Payment,
    pub member: Member,
}

/// 事务返回的 outcome 对象
///
/// 事务总是提交；条件不满足时所有写入被跳过，由这里的标记区分原因。
#[derive(Debug, Deserialize)]
struct LedgerOutcome {
    found: bool,
    stale: bool,
    payment: Option<Payment>,
    member: Option<Member>,
}

#[derive(Debug, Deserialize)]
struct DeleteOutcome {
    found: bool,
    stale: bool,
    member: Option<Member>,
}

/// 本次付款对会员周期字段的决定
///
/// 开启新周期时带新套餐快照和新窗口；否则原样保留，
/// 事务里无条件回写同值，避免 SQL 分支。
struct CycleDecision {
    opens_cycle: bool,
    cycle_seq: i64,
    plan: Option<surrealdb::RecordId>,
    total_plan_price: f64,
    admission_fee: f64,
    membership_start: Option<i64>,
    membership_end: Option<i64>,
}

impl CycleDecision {
    fn keep(member: &Member) -> Self {
        Self {
            opens_cycle: false,
            cycle_seq: member.cycle_seq,
            plan: member.plan.clone(),
            total_plan_price: member.total_plan_price,
            admission_fee: member.admission_fee,
            membership_start: member.membership_start,
            membership_end: member.membership_end,
        }
    }
}

pub struct PaymentProcessor {
    db: Surreal<Db>,
    members: MemberRepository,
    payments: PaymentRepository,
    plans: PlanRepository,
    timezone: Tz,
}

impl PaymentProcessor {
    pub fn new(db: Surreal<Db>, timezone: Tz) -> Self {
        Self {
            members: MemberRepository::new(db.clone()),
            payments: PaymentRepository::new(db.clone()),
            plans: PlanRepository::new(db.clone()),
            db,
            timezone,
        }
    }

    /// 创建付款
    ///
    /// 续费/激活类付款先重置周期 (total_paid 清零、cycle_seq +1、
    /// 快照新套餐价、重开窗口)，再计入本次金额。
    pub async fn create_payment(&self, data: PaymentCreate) -> RepoResult<LedgerWrite> {
        if !data.amount.is_finite() || data.amount <= 0.0 {
            return Err(RepoError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }

        let now = now_millis();
        let date = data.date.unwrap_or(now);
        let mode = data.mode.clone().unwrap_or_else(|| "cash".to_string());
        let category = data.category.unwrap_or(PaymentCategory::Plan);
        let plan_kind = data.plan_kind.unwrap_or(PlanKind::Membership);
        let action = data.membership_action.unwrap_or(MembershipAction::None);

        let opens_cycle = matches!(action, MembershipAction::New | MembershipAction::Renewal)
            || (data.activate_membership
                && category == PaymentCategory::Plan
                && plan_kind == PlanKind::Membership);

        let mut receipt = self.generate_receipt(now);
        let mut receipt_retried = false;
        let mut attempt = 0;

        loop {
            let member = self
                .members
                .find_by_id(&data.member)
                .await?
                .filter(|m| m.is_active)
                .ok_or_else(|| RepoError::NotFound(format!("Member {} not found", data.member)))?;

            let decision = if opens_cycle {
                self.open_cycle(&member, &data, now).await?
            } else {
                CycleDecision::keep(&member)
            };

            // 周期重置后才计入本次金额
            let base = if decision.opens_cycle {
                0.0
            } else {
                member.total_paid
            };
            let new_total_paid = money::sum([base, data.amount].into_iter());
            let new_pay_status = payment_status(
                decision.total_plan_price,
                new_total_paid,
                decision.admission_fee,
            );
            let member_status = if decision.opens_cycle {
                MemberStatus::Active
            } else {
                member.status
            };
            let pay_plan = if decision.opens_cycle {
                decision.plan.clone()
            } else {
                data.plan.clone()
            };

            let result = self
                .db
                .query(
                    r#"BEGIN TRANSACTION;
                    LET $m = (SELECT * FROM ONLY $member);
                    LET $found = $m != NONE;
                    LET $fresh = $found AND $m.version = $version;
                    LET $pay = IF $fresh {
                        (CREATE ONLY payment SET
                            member = $member,
                            amount = $amount,
                            date = $date,
                            mode = $mode,
                            category = $category,
                            plan_kind = $plan_kind,
                            plan = $pay_plan,
                            membership_action = $action,
                            receipt_number = $receipt,
                            status = 'completed',
                            cycle_seq = $cycle,
                            notes = $notes,
                            created_at = $now,
                            updated_at = $now)
                    } ELSE { NONE };
                    LET $after = IF $fresh {
                        (UPDATE ONLY $member SET
                            status = $m_status,
                            plan = $m_plan,
                            membership_start = $m_start,
                            membership_end = $m_end,
                            total_plan_price = $m_price,
                            admission_fee = $m_fee,
                            cycle_seq = $cycle,
                            total_paid = $total_paid,
                            payment_status = $pay_status,
                            last_payment_date = $date,
                            last_payment_amount = $amount,
                            version = version + 1,
                            updated_at = $now)
                    } ELSE { NONE };
                    RETURN {
                        found: $found,
                        stale: $found AND !$fresh,
                        payment: $pay,
                        member: $after
                    };
                    COMMIT TRANSACTION;"#,
                )
                .bind(("member", data.member.clone()))
                .bind(("version", member.version))
                .bind(("amount", data.amount))
                .bind(("date", date))
                .bind(("mode", mode.clone()))
                .bind(("category", category))
                .bind(("plan_kind", plan_kind))
                .bind(("pay_plan", pay_plan))
                .bind(("action", action))
                .bind(("receipt", receipt.clone()))
                .bind(("cycle", decision.cycle_seq))
                .bind(("notes", data.notes.clone()))
                .bind(("m_status", member_status))
                .bind(("m_plan", decision.plan.clone()))
                .bind(("m_start", decision.membership_start))
                .bind(("m_end", decision.membership_end))
                .bind(("m_price", decision.total_plan_price))
                .bind(("m_fee", decision.admission_fee))
                .bind(("total_paid", new_total_paid))
                .bind(("pay_status", new_pay_status))
                .bind(("now", now))
                .await?;

            match Self::unpack_write(result) {
                Ok(write) => {
                    if decision.opens_cycle {
                        tracing::info!(
                            member = %write.member.member_id,
                            cycle = write.member.cycle_seq,
                            "Membership cycle opened"
                        );
                    }
                    return Ok(write);
                }
                Err(e) if e.is_stale() => {
                    attempt += 1;
                    if attempt >= MAX_ATTEMPTS {
                        return Err(e);
                    }
                    tracing::warn!(member = %data.member, attempt, "Ledger version conflict, retrying");
                }
                Err(RepoError::Conflict(msg)) if !receipt_retried => {
                    // 本事务唯一会撞的索引就是收据号，换号重试一次
                    receipt_retried = true;
                    receipt = self.generate_receipt(now_millis());
                    tracing::warn!(%msg, "Receipt number collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 修改付款 — 同一事务里全量重算当前周期
    ///
    /// last_payment_date / last_payment_amount 保持不动：
    /// 它们记录的是最近一次收款动作，不随历史修订回滚。
    pub async fn update_payment(
        &self,
        id: &surrealdb::RecordId,
        data: PaymentUpdate,
    ) -> RepoResult<LedgerWrite> {
        let mut attempt = 0;

        loop {
            let payment = self
                .payments
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Payment {} not found", id)))?;
            let member = self
                .members
                .find_by_id(&payment.member)
                .await?
                .ok_or_else(|| {
                    RepoError::NotFound(format!("Member {} not found", payment.member))
                })?;

            let new_amount = data.amount.unwrap_or(payment.amount);
            if !new_amount.is_finite() || new_amount <= 0.0 {
                return Err(RepoError::Validation(
                    "Payment amount must be positive".to_string(),
                ));
            }
            let new_date = data.date.unwrap_or(payment.date);
            let new_mode = data.mode.clone().unwrap_or_else(|| payment.mode.clone());
            let new_category = data.category.unwrap_or(payment.category);
            let new_state = data.status.unwrap_or(payment.status);
            let new_notes = data.notes.clone().or_else(|| payment.notes.clone());

            let new_total_paid = self
                .resum_cycle(&member, &payment, Some((new_amount, new_state)))
                .await?;
            let new_pay_status = payment_status(
                member.total_plan_price,
                new_total_paid,
                member.admission_fee,
            );
            let now = now_millis();

            let result = self
                .db
                .query(
                    r#"BEGIN TRANSACTION;
                    LET $m = (SELECT * FROM ONLY $member);
                    LET $p = (SELECT * FROM ONLY $payment);
                    LET $found = $m != NONE AND $p != NONE;
                    LET $fresh = $found AND $m.version = $version;
                    LET $after_p = IF $fresh {
                        (UPDATE ONLY $payment SET
                            amount = $amount,
                            date = $date,
                            mode = $mode,
                            category = $category,
                            status = $p_status,
                            notes = $p_notes,
                            updated_at = $now)
                    } ELSE { NONE };
                    LET $after_m = IF $fresh {
                        (UPDATE ONLY $member SET
                            total_paid = $total_paid,
                            payment_status = $pay_status,
                            version = version + 1,
                            updated_at = $now)
                    } ELSE { NONE };
                    RETURN {
                        found: $found,
                        stale: $found AND !$fresh,
                        payment: $after_p,
                        member: $after_m
                    };
                    COMMIT TRANSACTION;"#,
                )
                .bind(("member", payment.member.clone()))
                .bind(("payment", id.clone()))
                .bind(("version", member.version))
                .bind(("amount", new_amount))
                .bind(("date", new_date))
                .bind(("mode", new_mode))
                .bind(("category", new_category))
                .bind(("p_status", new_state))
                .bind(("p_notes", new_notes))
                .bind(("total_paid", new_total_paid))
                .bind(("pay_status", new_pay_status))
                .bind(("now", now))
                .await?;

            match Self::unpack_write(result) {
                Ok(write) => return Ok(write),
                Err(e) if e.is_stale() => {
                    attempt += 1;
                    if attempt >= MAX_ATTEMPTS {
                        return Err(e);
                    }
                    tracing::warn!(payment = %id, attempt, "Ledger version conflict, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 删除付款 — 同一事务里删记录并全量重算当前周期
    pub async fn delete_payment(&self, id: &surrealdb::RecordId) -> RepoResult<Member> {
        let mut attempt = 0;

        loop {
            let payment = self
                .payments
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Payment {} not found", id)))?;
            let member = self
                .members
                .find_by_id(&payment.member)
                .await?
                .ok_or_else(|| {
                    RepoError::NotFound(format!("Member {} not found", payment.member))
                })?;

            let new_total_paid = self.resum_cycle(&member, &payment, None).await?;
            let new_pay_status = payment_status(
                member.total_plan_price,
                new_total_paid,
                member.admission_fee,
            );
            let now = now_millis();

            let mut result = self
                .db
                .query(
                    r#"BEGIN TRANSACTION;
                    LET $m = (SELECT * FROM ONLY $member);
                    LET $p = (SELECT * FROM ONLY $payment);
                    LET $found = $m != NONE AND $p != NONE;
                    LET $fresh = $found AND $m.version = $version;
                    LET $del = IF $fresh { (DELETE $payment RETURN NONE) } ELSE { NONE };
                    LET $after_m = IF $fresh {
                        (UPDATE ONLY $member SET
                            total_paid = $total_paid,
                            payment_status = $pay_status,
                            version = version + 1,
                            updated_at = $now)
                    } ELSE { NONE };
                    RETURN { found: $found, stale: $found AND !$fresh, member: $after_m };
                    COMMIT TRANSACTION;"#,
                )
                .bind(("member", payment.member.clone()))
                .bind(("payment", id.clone()))
                .bind(("version", member.version))
                .bind(("total_paid", new_total_paid))
                .bind(("pay_status", new_pay_status))
                .bind(("now", now))
                .await?;

            let outcome: Option<DeleteOutcome> = result.take(0)?;
            let outcome = outcome
                .ok_or_else(|| RepoError::Database("Ledger write returned no result".to_string()))?;

            if !outcome.found {
                return Err(RepoError::NotFound(format!("Payment {} not found", id)));
            }
            if outcome.stale {
                attempt += 1;
                if attempt >= MAX_ATTEMPTS {
                    return Err(RepoError::Stale(format!(
                        "Member {} changed concurrently",
                        payment.member
                    )));
                }
                tracing::warn!(payment = %id, attempt, "Ledger version conflict, retrying");
                continue;
            }
            return outcome
                .member
                .ok_or_else(|| RepoError::Database("Ledger write returned no member".to_string()));
        }
    }

    /// 当前周期 completed 付款全量求和
    ///
    /// `change` 是被编辑记录的 (新金额, 新状态)；None 表示该记录将被删除。
    /// 版本检查保证求和读取与事务写入之间没有别的账本写入。
    async fn resum_cycle(
        &self,
        member: &Member,
        mutated: &Payment,
        change: Option<(f64, PaymentState)>,
    ) -> RepoResult<f64> {
        let cycle = self
            .payments
            .completed_in_cycle(&mutated.member, member.cycle_seq)
            .await?;
        let others = cycle
            .iter()
            .filter(|p| p.id != mutated.id)
            .map(|p| p.amount);

        let total = match change {
            Some((new_amount, PaymentState::Completed))
                if mutated.cycle_seq == member.cycle_seq =>
            {
                money::sum(others.chain(std::iter::once(new_amount)))
            }
            _ => money::sum(others),
        };
        Ok(total)
    }

    /// 解析续费/激活的目标套餐并固化周期参数
    async fn open_cycle(
        &self,
        member: &Member,
        data: &PaymentCreate,
        now: i64,
    ) -> RepoResult<CycleDecision> {
        let plan_id = data
            .renewal_plan
            .clone()
            .or_else(|| data.plan.clone())
            .or_else(|| member.plan.clone())
            .ok_or_else(|| {
                RepoError::Validation(
                    "No plan to assign for membership activation".to_string(),
                )
            })?;
        let plan = self
            .plans
            .find_by_id(&plan_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Plan {} not found", plan_id)))?;

        let price = data.custom_price.unwrap_or(plan.price);
        if !price.is_finite() || price < 0.0 {
            return Err(RepoError::Validation(
                "Plan price must be non-negative".to_string(),
            ));
        }

        let start = data.membership_start.unwrap_or(now);
        let end = add_months_millis(start, plan.duration_months, self.timezone);
        // 入会费只计入首个周期；续费周期应缴里不再出现
        let admission_fee = if member.cycle_seq >= 1 {
            0.0
        } else {
            member.admission_fee
        };

        Ok(CycleDecision {
            opens_cycle: true,
            cycle_seq: member.cycle_seq + 1,
            plan: Some(plan_id),
            total_plan_price: price,
            admission_fee,
            membership_start: Some(start),
            membership_end: Some(end),
        })
    }

    fn unpack_write(mut result: surrealdb::Response) -> RepoResult<LedgerWrite> {
        let outcome: Option<LedgerOutcome> = result.take(0)?;
        let outcome = outcome
            .ok_or_else(|| RepoError::Database("Ledger write returned no result".to_string()))?;

        if !outcome.found {
            return Err(RepoError::NotFound("Record not found".to_string()));
        }
        if outcome.stale {
            return Err(RepoError::Stale(
                "Member version changed concurrently".to_string(),
            ));
        }
        match (outcome.payment, outcome.member) {
            (Some(payment), Some(member)) => Ok(LedgerWrite { payment, member }),
            _ => Err(RepoError::Database(
                "Ledger write returned incomplete result".to_string(),
            )),
        }
    }

    /// 收据号: RCP + 业务时区紧凑日期 + 5 位随机数字 (唯一索引兜底)
    fn generate_receipt(&self, now: i64) -> String {
        let day = DateTime::from_timestamp_millis(now)
            .map(|dt| dt.with_timezone(&self.timezone).format("%Y%m%d").to_string())
            .unwrap_or_else(|| "00000000".to_string());
        let suffix: u32 = rand::thread_rng().gen_range(0..100_000);
        format!("RCP{}{:05}", day, suffix)
    }
}
