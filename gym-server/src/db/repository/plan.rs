//! Membership Plan Repository
//!
//! 参考数据。价格/时长在会员分配时快照，这里的修改不回溯已分配会员。

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Plan, PlanCreate, PlanUpdate};
use crate::utils::time::now_millis;

#[derive(Clone)]
pub struct PlanRepository {
    base: BaseRepository,
}

impl PlanRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: PlanCreate) -> RepoResult<Plan> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE ONLY plan SET
                    name = $name,
                    price = $price,
                    duration_months = $duration_months,
                    features = $features,
                    is_active = true,
                    created_at = $now,
                    updated_at = $now"#,
            )
            .bind(("name", data.name))
            .bind(("price", data.price))
            .bind(("duration_months", data.duration_months))
            .bind(("features", data.features.unwrap_or_default()))
            .bind(("now", now))
            .await?;

        let created: Option<Plan> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create plan".to_string()))
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Plan>> {
        let plans: Vec<Plan> = self
            .base
            .db()
            .query("SELECT * FROM plan WHERE is_active = true ORDER BY price")
            .await?
            .take(0)?;
        Ok(plans)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Plan>> {
        let plan: Option<Plan> = self.base.db().select(id.clone()).await?;
        Ok(plan)
    }

    pub async fn update(&self, id: &RecordId, data: PlanUpdate) -> RepoResult<Plan> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $id SET
                    name = $name OR name,
                    price = IF $has_price THEN $price ELSE price END,
                    duration_months = IF $has_duration THEN $duration_months ELSE duration_months END,
                    features = IF $has_features THEN $features ELSE features END,
                    is_active = IF $has_active THEN $is_active ELSE is_active END,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("id", id.clone()))
            .bind(("name", data.name))
            .bind(("has_price", data.price.is_some()))
            .bind(("price", data.price))
            .bind(("has_duration", data.duration_months.is_some()))
            .bind(("duration_months", data.duration_months))
            .bind(("has_features", data.features.is_some()))
            .bind(("features", data.features))
            .bind(("has_active", data.is_active.is_some()))
            .bind(("is_active", data.is_active))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Plan>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Plan {} not found", id)))
    }

    /// 软删除：已分配会员持有价格快照，不受影响
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
        let updated: Vec<Plan> = result.take(0)?;
        Ok(!updated.is_empty())
    }
}
