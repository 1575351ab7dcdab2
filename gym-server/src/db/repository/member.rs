//! Member Repository
//!
//! 会员档案 CRUD + 标识符查找。账本字段 (total_paid / payment_status / version)
//! 只在 [`crate::ledger::PaymentProcessor`] 的事务里写入，这里不提供入口。

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Member, MemberUpdate};
use crate::utils::time::now_millis;

#[derive(Clone)]
pub struct MemberRepository {
    base: BaseRepository,
}

impl MemberRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 新建会员档案 — member_id 由调用方通过计数器铸造
    pub async fn create(&self, member: Member) -> RepoResult<Member> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE ONLY member SET
                    member_id = $member_id,
                    name = $name,
                    phone = $phone,
                    email = $email,
                    address = $address,
                    photo = $photo,
                    join_date = $join_date,
                    status = $status,
                    plan = $plan,
                    trainer = $trainer,
                    pt_plan = $pt_plan,
                    discount = $discount,
                    membership_start = $membership_start,
                    membership_end = $membership_end,
                    total_plan_price = $total_plan_price,
                    admission_fee = $admission_fee,
                    total_paid = $total_paid,
                    payment_status = $payment_status,
                    last_payment_date = NONE,
                    last_payment_amount = NONE,
                    cycle_seq = $cycle_seq,
                    version = $version,
                    is_active = true,
                    notes = $notes,
                    created_at = $now,
                    updated_at = $now"#,
            )
            .bind(("member_id", member.member_id))
            .bind(("name", member.name))
            .bind(("phone", member.phone))
            .bind(("email", member.email))
            .bind(("address", member.address))
            .bind(("photo", member.photo))
            .bind(("join_date", member.join_date))
            .bind(("status", member.status))
            .bind(("plan", member.plan))
            .bind(("trainer", member.trainer))
            .bind(("pt_plan", member.pt_plan))
            .bind(("discount", member.discount))
            .bind(("membership_start", member.membership_start))
            .bind(("membership_end", member.membership_end))
            .bind(("total_plan_price", member.total_plan_price))
            .bind(("admission_fee", member.admission_fee))
            .bind(("total_paid", member.total_paid))
            .bind(("payment_status", member.payment_status))
            .bind(("cycle_seq", member.cycle_seq))
            .bind(("version", member.version))
            .bind(("notes", member.notes))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<Member> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create member".to_string()))
    }

    /// 所有在册会员 (不含软删除)
    pub async fn find_all(&self) -> RepoResult<Vec<Member>> {
        let members: Vec<Member> = self
            .base
            .db()
            .query("SELECT * FROM member WHERE is_active = true ORDER BY member_id")
            .await?
            .take(0)?;
        Ok(members)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Member>> {
        let member: Option<Member> = self.base.db().select(id.clone()).await?;
        Ok(member)
    }

    /// 按业务编号精确查找 (MEM001)
    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<Member>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM member WHERE member_id = $code AND is_active = true LIMIT 1")
            .bind(("code", code.to_string()))
            .await?;
        let members: Vec<Member> = result.take(0)?;
        Ok(members.into_iter().next())
    }

    /// 按手机号精确查找
    pub async fn find_by_phone(&self, phone: &str) -> RepoResult<Option<Member>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM member WHERE phone = $phone AND is_active = true LIMIT 1")
            .bind(("phone", phone.to_string()))
            .await?;
        let members: Vec<Member> = result.take(0)?;
        Ok(members.into_iter().next())
    }

    /// 姓名大小写不敏感子串匹配，取第一个命中
    pub async fn find_by_name_contains(&self, fragment: &str) -> RepoResult<Option<Member>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM member \
                 WHERE is_active = true AND string::contains(string::lowercase(name), $frag) \
                 ORDER BY member_id LIMIT 1",
            )
            .bind(("frag", fragment.to_lowercase()))
            .await?;
        let members: Vec<Member> = result.take(0)?;
        Ok(members.into_iter().next())
    }

    /// 列表搜索：编号 / 手机 / 姓名子串
    pub async fn search(&self, query: &str) -> RepoResult<Vec<Member>> {
        let needle = query.to_lowercase();
        let members: Vec<Member> = self
            .base
            .db()
            .query(
                "SELECT * FROM member WHERE is_active = true AND ( \
                    string::contains(string::lowercase(member_id), $q) \
                    OR string::contains(phone, $q) \
                    OR string::contains(string::lowercase(name), $q) \
                 ) ORDER BY member_id",
            )
            .bind(("q", needle))
            .await?
            .take(0)?;
        Ok(members)
    }

    /// 更新联系信息和教练分配 — 账本字段不可达
    pub async fn update_profile(&self, id: &RecordId, data: MemberUpdate) -> RepoResult<Member> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $id SET
                    name = $name OR name,
                    phone = $phone OR phone,
                    email = $email OR email,
                    address = $address OR address,
                    photo = $photo OR photo,
                    trainer = IF $has_trainer THEN $trainer ELSE trainer END,
                    pt_plan = IF $has_pt_plan THEN $pt_plan ELSE pt_plan END,
                    notes = $notes OR notes,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("id", id.clone()))
            .bind(("name", data.name))
            .bind(("phone", data.phone))
            .bind(("email", data.email))
            .bind(("address", data.address))
            .bind(("photo", data.photo))
            .bind(("has_trainer", data.trainer.is_some()))
            .bind(("trainer", data.trainer))
            .bind(("has_pt_plan", data.pt_plan.is_some()))
            .bind(("pt_plan", data.pt_plan))
            .bind(("notes", data.notes))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Member>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Member {} not found", id)))
    }

    /// 软删除：is_active = false，档案保留
    pub async fn soft_delete(&self, id: &RecordId) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET is_active = false, updated_at = $now \
                 WHERE is_active = true RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("now", now_millis()))
            .await?;
        let updated: Vec<Member> = result.take(0)?;
        Ok(!updated.is_empty())
    }

    /// 惰性过期扫描：列表读取前调用
    ///
    /// 周期止期已过的 Active 会员翻转为 Expired。激活/续费总会写入
    /// membership_end，所以扫描只看止期字段。
    pub async fn expire_lapsed(&self, now: i64) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE member SET status = 'Expired', updated_at = $now \
                 WHERE is_active = true AND status = 'Active' \
                   AND membership_end != NONE AND membership_end < $now \
                 RETURN AFTER",
            )
            .bind(("now", now))
            .await?;
        let flipped: Vec<Member> = result.take(0)?;
        Ok(flipped.len())
    }

    /// 教练名下有私教套餐的 Active 会员 (工资计算输入)
    pub async fn find_active_pt_clients(&self, trainer: &RecordId) -> RepoResult<Vec<Member>> {
        let members: Vec<Member> = self
            .base
            .db()
            .query(
                "SELECT * FROM member \
                 WHERE is_active = true AND status = 'Active' \
                   AND trainer = $trainer AND pt_plan != NONE",
            )
            .bind(("trainer", trainer.clone()))
            .await?
            .take(0)?;
        Ok(members)
    }

    /// 在册私教会员的套餐价格列表 (record link 遍历取价)
    pub async fn pt_client_prices(&self, trainer: &RecordId) -> RepoResult<Vec<f64>> {
        let prices: Vec<Option<f64>> = self
            .base
            .db()
            .query(
                "SELECT VALUE pt_plan.price FROM member \
                 WHERE is_active = true AND status = 'Active' \
                   AND trainer = $trainer AND pt_plan != NONE",
            )
            .bind(("trainer", trainer.clone()))
            .await?
            .take(0)?;
        Ok(prices.into_iter().flatten().collect())
    }
}
