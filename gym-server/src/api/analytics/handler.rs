//! Analytics API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Days;
use serde::Deserialize;

use crate::analytics::{Commentary, CommentarySource, FinanceAnalytics, FinanceSummary};
use crate::core::ServerState;
use crate::utils::time::{day_start_millis, parse_date, today_local};
use crate::utils::{AppError, AppResult};

#[derive(Deserialize)]
pub struct PeriodQuery {
    /// 起始日 YYYY-MM-DD (含)；缺省为截止日前 29 天
    pub start: Option<String>,
    /// 截止日 YYYY-MM-DD (含)；缺省为今天
    pub end: Option<String>,
}

/// 查询参数 → [from, to) 毫秒窗口
fn resolve_period(state: &ServerState, query: &PeriodQuery) -> AppResult<(i64, i64)> {
    let tz = state.config.timezone;

    let end = match &query.end {
        Some(raw) => parse_date(raw)?,
        None => today_local(tz),
    };
    let start = match &query.start {
        Some(raw) => parse_date(raw)?,
        None => end
            .checked_sub_days(Days::new(29))
            .ok_or_else(|| AppError::validation("Period start out of range"))?,
    };
    if start > end {
        return Err(AppError::validation("start must not be after end"));
    }

    let from = day_start_millis(start, tz);
    let to_day = end
        .succ_opt()
        .ok_or_else(|| AppError::validation("Period end out of range"))?;
    Ok((from, day_start_millis(to_day, tz)))
}

/// GET /api/analytics/summary - 财务汇总 (无 AI 调用)
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<FinanceSummary>> {
    let (from, to) = resolve_period(&state, &query)?;
    let analytics = FinanceAnalytics::new(state.db.clone(), state.config.timezone);
    Ok(Json(analytics.summarize(from, to).await?))
}

/// GET /api/analytics/commentary - 财务汇总 + AI 评述
///
/// AI 未配置走标注过的降级文案；运行期失败原样上抛 (504/502)
pub async fn commentary(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<Commentary>> {
    let (from, to) = resolve_period(&state, &query)?;
    let analytics = FinanceAnalytics::new(state.db.clone(), state.config.timezone);
    let summary = analytics.summarize(from, to).await?;

    let (commentary, source) = if state.insights.is_configured() {
        let prompt = analytics.build_prompt(&summary);
        let text = state.insights.generate(&prompt).await?;
        (text, CommentarySource::Ai)
    } else {
        (analytics.fallback_commentary(&summary), CommentarySource::Fallback)
    };

    Ok(Json(Commentary {
        summary,
        commentary,
        source,
    }))
}
