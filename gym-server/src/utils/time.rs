//! 时间工具函数 — 业务时区转换
//!
//! 所有日期→时间戳转换统一在 handler/引擎层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::{DateTime, Months, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

pub const MINUTE_MS: i64 = 60_000;
pub const DAY_MS: i64 = 86_400_000;

/// 当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 验证日期不在未来 (业务时区)
pub fn validate_not_future(date: NaiveDate, tz: Tz) -> AppResult<()> {
    let today = chrono::Utc::now().with_timezone(&tz).date_naive();
    if date > today {
        return Err(AppError::validation(format!(
            "Date {} is in the future (today is {})",
            date, today
        )));
    }
    Ok(())
}

/// 日期 + 时分秒毫秒 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn date_hms_to_millis(date: NaiveDate, hour: u32, min: u32, sec: u32, milli: u32, tz: Tz) -> i64 {
    let naive = date
        .and_hms_milli_opt(hour, min, sec, milli)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN));
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
///
/// 考勤 `date` 字段的 day bucket 值。
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_hms_to_millis(date, 0, 0, 0, 0, tz)
}

/// 日期结束 → 次日 00:00:00 的 Unix millis (业务时区)
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    date_hms_to_millis(next_day, 0, 0, 0, 0, tz)
}

/// 当日最后一刻 (23:59:59.999) → Unix millis (业务时区)
///
/// 自动签退给滞留记录打的签退时间点。
pub fn day_close_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_hms_to_millis(date, 23, 59, 59, 999, tz)
}

/// 时间戳 → 所在本地日的 00:00 Unix millis (day bucket 归一化)
pub fn day_bucket_millis(ts: i64, tz: Tz) -> i64 {
    let date = DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.with_timezone(&tz).date_naive())
        .unwrap_or_else(|| today_local(tz));
    day_start_millis(date, tz)
}

/// 今天的日期 (业务时区)
pub fn today_local(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// 解析自动签退时间字符串 (HH:MM)
pub fn parse_cutoff(cutoff: &str) -> NaiveTime {
    NaiveTime::parse_from_str(cutoff, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse auto checkout time '{}': {}, falling back to 23:59",
            cutoff,
            e
        );
        NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
    })
}

/// 起始时间 + n 个月 → Unix millis (业务时区)
///
/// 会员周期止期 = 起期 + 套餐月数。月末溢出按 chrono 规则截断 (1-31 + 1月 = 2-28)。
pub fn add_months_millis(start_ms: i64, months: u32, tz: Tz) -> i64 {
    DateTime::from_timestamp_millis(start_ms)
        .map(|dt| dt.with_timezone(&tz))
        .and_then(|dt| dt.checked_add_months(Months::new(months)))
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(start_ms)
}

/// 签到→签退的分钟数，四舍五入到最近分钟，不为负
pub fn minutes_between(check_in_ms: i64, check_out_ms: i64) -> i64 {
    let diff = (check_out_ms - check_in_ms).max(0);
    (diff + MINUTE_MS / 2) / MINUTE_MS
}

/// 距会员到期的天数，按天向上取整
///
/// 过期后为负；刚过期不足一天时为 0。
pub fn days_until(end_ms: i64, now_ms: i64) -> i64 {
    ceil_div(end_ms - now_ms, DAY_MS)
}

fn ceil_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b > 0 { q + 1 } else { q }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_between_rounds_to_nearest() {
        // 10:00:00 -> 11:30:00
        assert_eq!(minutes_between(0, 90 * MINUTE_MS), 90);
        // 29.4 minutes rounds down
        assert_eq!(minutes_between(0, 29 * MINUTE_MS + 24_000), 29);
        // 29.5 minutes rounds up
        assert_eq!(minutes_between(0, 29 * MINUTE_MS + 30_000), 30);
        // sub-minute visit
        assert_eq!(minutes_between(0, 20_000), 0);
        assert_eq!(minutes_between(0, 40_000), 1);
    }

    #[test]
    fn minutes_between_clamps_negative() {
        // clock skew: checkout timestamp before checkin
        assert_eq!(minutes_between(1_000_000, 0), 0);
    }

    #[test]
    fn days_until_ceils_partial_days() {
        assert_eq!(days_until(DAY_MS, 0), 1);
        assert_eq!(days_until(DAY_MS + 1, 0), 2);
        assert_eq!(days_until(3 * DAY_MS, 0), 3);
    }

    #[test]
    fn days_until_just_expired_is_zero() {
        // less than a full day past the end date still reports 0, not -1
        assert_eq!(days_until(0, 1), 0);
        assert_eq!(days_until(0, DAY_MS - 1), 0);
        assert_eq!(days_until(0, DAY_MS + 1), -1);
    }

    #[test]
    fn parse_cutoff_accepts_hh_mm_only() {
        assert_eq!(parse_cutoff("06:00"), NaiveTime::from_hms_opt(6, 0, 0).unwrap());
        assert_eq!(parse_cutoff("22:30"), NaiveTime::from_hms_opt(22, 30, 0).unwrap());
        // invalid input falls back to the default sweep time
        assert_eq!(parse_cutoff("25:00"), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
        assert_eq!(parse_cutoff("abc"), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
    }

    #[test]
    fn add_months_handles_month_end_overflow() {
        let tz = chrono_tz::UTC;
        // 2025-01-31 + 1 month clamps to 2025-02-28
        let start = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let start_ms = day_start_millis(start, tz);
        let end_ms = add_months_millis(start_ms, 1, tz);
        let end = DateTime::from_timestamp_millis(end_ms).unwrap().date_naive();
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }
}
