//! PT Plan Repository — 私教套餐参考数据

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{PtPlan, PtPlanCreate, PtPlanUpdate};
use crate::utils::time::now_millis;

#[derive(Clone)]
pub struct PtPlanRepository {
    base: BaseRepository,
}

impl PtPlanRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: PtPlanCreate) -> RepoResult<PtPlan> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE ONLY pt_plan SET
                    name = $name,
                    price = $price,
                    sessions = $sessions,
                    duration_months = $duration_months,
                    is_active = true,
                    created_at = $now,
                    updated_at = $now"#,
            )
            .bind(("name", data.name))
            .bind(("price", data.price))
            .bind(("sessions", data.sessions))
            .bind(("duration_months", data.duration_months))
            .bind(("now", now))
            .await?;

        let created: Option<PtPlan> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create PT plan".to_string()))
    }

    pub async fn find_all(&self) -> RepoResult<Vec<PtPlan>> {
        let plans: Vec<PtPlan> = self
            .base
            .db()
            .query("SELECT * FROM pt_plan WHERE is_active = true ORDER BY price")
            .await?
            .take(0)?;
        Ok(plans)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<PtPlan>> {
        let plan: Option<PtPlan> = self.base.db().select(id.clone()).await?;
        Ok(plan)
    }

    pub async fn update(&self, id: &RecordId, data: PtPlanUpdate) -> RepoResult<PtPlan> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $id SET
                    name = $name OR name,
                    price = IF $has_price THEN $price ELSE price END,
                    sessions = IF $has_sessions THEN $sessions ELSE sessions END,
                    duration_months = IF $has_duration THEN $duration_months ELSE duration_months END,
                    is_active = IF $has_active THEN $is_active ELSE is_active END,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("id", id.clone()))
            .bind(("name", data.name))
            .bind(("has_price", data.price.is_some()))
            .bind(("price", data.price))
            .bind(("has_sessions", data.sessions.is_some()))
            .bind(("sessions", data.sessions))
            .bind(("has_duration", data.duration_months.is_some()))
            .bind(("duration_months", data.duration_months))
            .bind(("has_active", data.is_active.is_some()))
            .bind(("is_active", data.is_active))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<PtPlan>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("PT plan {} not found", id)))
    }

    /// 软删除：工资计算按会员档案上的 pt_plan 引用取价，历史不受影响
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
        let updated: Vec<PtPlan> = result.take(0)?;
        Ok(!updated.is_empty())
    }
}
