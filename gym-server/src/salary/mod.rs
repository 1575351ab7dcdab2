//! Salary Calculator — 教练工资测算
//!
//! 只读推导，无持久状态：每次请求按当前在册私教会员现算。
//! 实发记录走 trainer_payment 追加流水，与测算互不对账。

pub mod commission;

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;

use crate::db::models::{CommissionType, Trainer};
use crate::db::repository::{MemberRepository, RepoError, RepoResult, TrainerRepository};

/// 单个教练的工资测算
#[derive(Debug, Serialize)]
pub struct SalaryBreakdown {
    pub trainer_id: String,
    pub name: String,
    pub base_salary: f64,
    pub commission_type: CommissionType,
    pub commission_value: f64,
    /// 在册私教会员数 (Active 且已指派私教套餐)
    pub client_count: usize,
    pub commission: f64,
    pub total_payable: f64,
}

pub struct SalaryCalculator {
    trainers: TrainerRepository,
    members: MemberRepository,
}

impl SalaryCalculator {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            trainers: TrainerRepository::new(db.clone()),
            members: MemberRepository::new(db),
        }
    }

    pub async fn for_trainer(&self, id: &RecordId) -> RepoResult<SalaryBreakdown> {
        let trainer = self
            .trainers
            .find_by_id(id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| RepoError::NotFound(format!("Trainer {} not found", id)))?;
        self.breakdown(&trainer).await
    }

    pub async fn for_all(&self) -> RepoResult<Vec<SalaryBreakdown>> {
        let trainers = self.trainers.find_all().await?;
        let mut result = Vec::with_capacity(trainers.len());
        for trainer in &trainers {
            result.push(self.breakdown(trainer).await?);
        }
        Ok(result)
    }

    async fn breakdown(&self, trainer: &Trainer) -> RepoResult<SalaryBreakdown> {
        let trainer_rid = trainer
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Trainer record has no id".to_string()))?;
        let prices = self.members.pt_client_prices(&trainer_rid).await?;

        let commission = commission::commission(
            trainer.commission_type,
            trainer.commission_value,
            prices.len(),
            &prices,
        );
        Ok(SalaryBreakdown {
            trainer_id: trainer.trainer_id.clone(),
            name: trainer.name.clone(),
            base_salary: trainer.base_salary,
            commission_type: trainer.commission_type,
            commission_value: trainer.commission_value,
            client_count: prices.len(),
            commission,
            total_payable: commission::total_payable(trainer.base_salary, commission),
        })
    }
}
