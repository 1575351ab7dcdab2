//! Analytics — 财务汇总 + AI 评述
//!
//! 汇总只统计窗口内 completed 付款。评述文本来自外部 AI 服务；
//! 服务未配置时返回明确标注的降级摘要，运行期失败则原样上抛。

pub mod insights;

pub use insights::InsightsClient;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::PaymentCategory;
use crate::db::repository::RepoResult;

/// 按付款类别的小计
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryRow {
    pub category: PaymentCategory,
    pub total: f64,
    pub count: i64,
}

/// 按支付方式的小计
#[derive(Debug, Serialize, Deserialize)]
pub struct ModeRow {
    pub mode: String,
    pub total: f64,
    pub count: i64,
}

/// 窗口 [from, to) 的财务汇总
#[derive(Debug, Serialize)]
pub struct FinanceSummary {
    pub from: i64,
    pub to: i64,
    pub total_revenue: f64,
    pub payment_count: i64,
    /// 窗口内开启的会员周期数 (new + renewal)
    pub cycles_opened: i64,
    pub active_members: i64,
    pub by_category: Vec<CategoryRow>,
    pub by_mode: Vec<ModeRow>,
}

/// 评述文本来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentarySource {
    Ai,
    Fallback,
}

/// 分析接口的完整响应
#[derive(Debug, Serialize)]
pub struct Commentary {
    pub summary: FinanceSummary,
    pub commentary: String,
    pub source: CommentarySource,
}

pub struct FinanceAnalytics {
    db: Surreal<Db>,
    timezone: Tz,
}

impl FinanceAnalytics {
    pub fn new(db: Surreal<Db>, timezone: Tz) -> Self {
        Self { db, timezone }
    }

    /// 聚合窗口 [from, to) 内的 completed 付款
    pub async fn summarize(&self, from: i64, to: i64) -> RepoResult<FinanceSummary> {
        let mut totals = self
            .db
            .query(
                "SELECT math::sum(amount) AS total, count() FROM payment \
                 WHERE status = 'completed' AND date >= $from AND date < $to GROUP ALL",
            )
            .bind(("from", from))
            .bind(("to", to))
            .await?;
        let total_revenue: Option<f64> = totals.take((0, "total"))?;
        let payment_count: Option<i64> = totals.take((0, "count"))?;

        let mut by_category: Vec<CategoryRow> = self
            .db
            .query(
                "SELECT category, math::sum(amount) AS total, count() FROM payment \
                 WHERE status = 'completed' AND date >= $from AND date < $to \
                 GROUP BY category",
            )
            .bind(("from", from))
            .bind(("to", to))
            .await?
            .take(0)?;
        by_category.sort_by(|a, b| b.total.total_cmp(&a.total));

        let mut by_mode: Vec<ModeRow> = self
            .db
            .query(
                "SELECT mode, math::sum(amount) AS total, count() FROM payment \
                 WHERE status = 'completed' AND date >= $from AND date < $to \
                 GROUP BY mode",
            )
            .bind(("from", from))
            .bind(("to", to))
            .await?
            .take(0)?;
        by_mode.sort_by(|a, b| b.total.total_cmp(&a.total));

        let cycles_opened: Option<i64> = self
            .db
            .query(
                "SELECT count() FROM payment \
                 WHERE status = 'completed' AND date >= $from AND date < $to \
                   AND membership_action != 'none' GROUP ALL",
            )
            .bind(("from", from))
            .bind(("to", to))
            .await?
            .take((0, "count"))?;

        let active_members: Option<i64> = self
            .db
            .query(
                "SELECT count() FROM member \
                 WHERE is_active = true AND status = 'Active' GROUP ALL",
            )
            .await?
            .take((0, "count"))?;

        Ok(FinanceSummary {
            from,
            to,
            total_revenue: total_revenue.unwrap_or(0.0),
            payment_count: payment_count.unwrap_or(0),
            cycles_opened: cycles_opened.unwrap_or(0),
            active_members: active_members.unwrap_or(0),
            by_category,
            by_mode,
        })
    }

    /// AI 提示词：窗口数据的结构化铺陈
    pub fn build_prompt(&self, summary: &FinanceSummary) -> String {
        let mut prompt = format!(
            "You are the finance assistant of a gym. Write a short commentary \
             (3-5 sentences) on the following period, in plain language for the \
             gym owner. Mention the overall revenue trend, the strongest revenue \
             category, and anything noteworthy. Do not invent numbers.\n\n\
             Period: {} to {}\n\
             Completed payments: {}\n\
             Total revenue: {:.2}\n\
             Membership cycles opened (new + renewal): {}\n\
             Currently active members: {}\n",
            self.format_day(summary.from),
            self.format_day(summary.to - 1),
            summary.payment_count,
            summary.total_revenue,
            summary.cycles_opened,
            summary.active_members,
        );
        if !summary.by_category.is_empty() {
            prompt.push_str("Revenue by category:\n");
            for row in &summary.by_category {
                prompt.push_str(&format!(
                    "  {}: {:.2} ({} payments)\n",
                    category_label(row.category),
                    row.total,
                    row.count
                ));
            }
        }
        if !summary.by_mode.is_empty() {
            prompt.push_str("Revenue by payment mode:\n");
            for row in &summary.by_mode {
                prompt.push_str(&format!(
                    "  {}: {:.2} ({} payments)\n",
                    row.mode, row.total, row.count
                ));
            }
        }
        prompt
    }

    /// 未配置 AI 时的降级摘要，明确标注来源
    pub fn fallback_commentary(&self, summary: &FinanceSummary) -> String {
        let top_category = summary
            .by_category
            .first()
            .map(|row| format!(", led by {}", category_label(row.category)))
            .unwrap_or_default();
        format!(
            "[Automated summary; AI commentary is not configured] \
             Between {} and {} the gym recorded {} completed payment(s) \
             totalling {:.2}{}. {} membership cycle(s) were opened and {} \
             member(s) are currently active.",
            self.format_day(summary.from),
            self.format_day(summary.to - 1),
            summary.payment_count,
            summary.total_revenue,
            top_category,
            summary.cycles_opened,
            summary.active_members,
        )
    }

    fn format_day(&self, millis: i64) -> String {
        DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.with_timezone(&self.timezone).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| millis.to_string())
    }
}

fn category_label(category: PaymentCategory) -> &'static str {
    match category {
        PaymentCategory::Plan => "membership plans",
        PaymentCategory::Trainer => "personal training",
        PaymentCategory::AdmissionFee => "admission fees",
        PaymentCategory::Other => "other",
    }
}
