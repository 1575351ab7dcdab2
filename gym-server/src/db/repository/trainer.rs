//! Trainer Repository

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Trainer, TrainerCreate, TrainerUpdate};
use crate::utils::time::now_millis;

#[derive(Clone)]
pub struct TrainerRepository {
    base: BaseRepository,
}

impl TrainerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 新建教练 — trainer_id 由调用方通过计数器铸造
    pub async fn create(&self, trainer_id: String, data: TrainerCreate) -> RepoResult<Trainer> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE ONLY trainer SET
                    trainer_id = $trainer_id,
                    name = $name,
                    phone = $phone,
                    email = $email,
                    photo = $photo,
                    specialization = $specialization,
                    join_date = $join_date,
                    base_salary = $base_salary,
                    commission_type = $commission_type,
                    commission_value = $commission_value,
                    is_active = true,
                    created_at = $now,
                    updated_at = $now"#,
            )
            .bind(("trainer_id", trainer_id))
            .bind(("name", data.name))
            .bind(("phone", data.phone))
            .bind(("email", data.email))
            .bind(("photo", data.photo))
            .bind(("specialization", data.specialization))
            .bind(("join_date", data.join_date.unwrap_or(now)))
            .bind(("base_salary", data.base_salary.unwrap_or(0.0)))
            .bind((
                "commission_type",
                data.commission_type
                    .unwrap_or(crate::db::models::CommissionType::Fixed),
            ))
            .bind(("commission_value", data.commission_value.unwrap_or(0.0)))
            .bind(("now", now))
            .await?;

        let created: Option<Trainer> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create trainer".to_string()))
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Trainer>> {
        let trainers: Vec<Trainer> = self
            .base
            .db()
            .query("SELECT * FROM trainer WHERE is_active = true ORDER BY trainer_id")
            .await?
            .take(0)?;
        Ok(trainers)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Trainer>> {
        let trainer: Option<Trainer> = self.base.db().select(id.clone()).await?;
        Ok(trainer)
    }

    /// 按业务编号精确查找 (TRN001)
    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<Trainer>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM trainer WHERE trainer_id = $code AND is_active = true LIMIT 1")
            .bind(("code", code.to_string()))
            .await?;
        let trainers: Vec<Trainer> = result.take(0)?;
        Ok(trainers.into_iter().next())
    }

    pub async fn find_by_phone(&self, phone: &str) -> RepoResult<Option<Trainer>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM trainer WHERE phone = $phone AND is_active = true LIMIT 1")
            .bind(("phone", phone.to_string()))
            .await?;
        let trainers: Vec<Trainer> = result.take(0)?;
        Ok(trainers.into_iter().next())
    }

    pub async fn find_by_name_contains(&self, fragment: &str) -> RepoResult<Option<Trainer>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM trainer \
                 WHERE is_active = true AND string::contains(string::lowercase(name), $frag) \
                 ORDER BY trainer_id LIMIT 1",
            )
            .bind(("frag", fragment.to_lowercase()))
            .await?;
        let trainers: Vec<Trainer> = result.take(0)?;
        Ok(trainers.into_iter().next())
    }

    pub async fn update(&self, id: &RecordId, data: TrainerUpdate) -> RepoResult<Trainer> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $id SET
                    name = $name OR name,
                    phone = $phone OR phone,
                    email = $email OR email,
                    photo = $photo OR photo,
                    specialization = $specialization OR specialization,
                    base_salary = IF $has_base THEN $base_salary ELSE base_salary END,
                    commission_type = IF $has_ct THEN $commission_type ELSE commission_type END,
                    commission_value = IF $has_cv THEN $commission_value ELSE commission_value END,
                    is_active = IF $has_active THEN $is_active ELSE is_active END,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("id", id.clone()))
            .bind(("name", data.name))
            .bind(("phone", data.phone))
            .bind(("email", data.email))
            .bind(("photo", data.photo))
            .bind(("specialization", data.specialization))
            .bind(("has_base", data.base_salary.is_some()))
            .bind(("base_salary", data.base_salary))
            .bind(("has_ct", data.commission_type.is_some()))
            .bind(("commission_type", data.commission_type))
            .bind(("has_cv", data.commission_value.is_some()))
            .bind(("commission_value", data.commission_value))
            .bind(("has_active", data.is_active.is_some()))
            .bind(("is_active", data.is_active))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Trainer>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Trainer {} not found", id)))
    }

    /// 软删除：不再出现在列表和查找中，历史考勤与工资记录保留
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
        let updated: Vec<Trainer> = result.take(0)?;
        Ok(!updated.is_empty())
    }
}
