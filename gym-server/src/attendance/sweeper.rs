//! 自动签退调度器
//!
//! 在 `auto_checkout_time` 时间点闭合所有仍在 `checked_in` 的记录，
//! 签退时间统一打当日 23:59:59.999 (业务时区)。启动时先扫一次，
//! 补上停机期间漏掉的触发。

use chrono::NaiveTime;
use chrono_tz::Tz;
use tokio_util::sync::CancellationToken;

use crate::attendance::AttendanceEngine;
use crate::core::ServerState;

/// 自动签退调度器
///
/// 在 `Server::run()` 中作为后台任务启动。
pub struct AutoCheckoutSweeper {
    state: ServerState,
    shutdown: CancellationToken,
}

impl AutoCheckoutSweeper {
    pub fn new(state: ServerState, shutdown: CancellationToken) -> Self {
        Self { state, shutdown }
    }

    /// 主循环：启动扫描 + 定点触发
    pub async fn run(self) {
        tracing::info!("Auto-checkout sweeper started");

        // 启动时立即扫描一次
        self.sweep().await;

        loop {
            let cutoff_time = self.state.config.auto_checkout_time;
            let tz = self.state.config.timezone;
            let sleep_duration = Self::duration_until_next_cutoff(cutoff_time, tz);

            tracing::info!(
                "Next auto-checkout sweep in {} minutes (cutoff={})",
                sleep_duration.as_secs() / 60,
                cutoff_time.format("%H:%M")
            );

            tokio::select! {
                // 等到下次 cutoff 时间点
                _ = tokio::time::sleep(sleep_duration) => {
                    self.sweep().await;
                }
                // 关机信号
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Auto-checkout sweeper received shutdown signal");
                    return;
                }
            }
        }
    }

    /// 闭合活动记录；重复执行无副作用
    async fn sweep(&self) {
        let engine = AttendanceEngine::new(self.state.db.clone(), self.state.config.timezone);
        match engine.auto_checkout().await {
            Ok(0) => {
                tracing::debug!("No active check-ins to close");
            }
            Ok(count) => {
                tracing::info!("Auto-checkout closed {} active record(s)", count);
            }
            Err(e) => {
                tracing::error!("Auto-checkout sweep failed: {}", e);
            }
        }
    }

    /// 计算距离下一次 cutoff 的 Duration
    fn duration_until_next_cutoff(cutoff_time: NaiveTime, tz: Tz) -> std::time::Duration {
        let now = chrono::Utc::now().with_timezone(&tz);
        let today = now.date_naive();

        let target_date = if now.time() >= cutoff_time {
            // 今天的 cutoff 已过，等明天
            today + chrono::Duration::days(1)
        } else {
            today
        };

        let target_datetime = target_date
            .and_time(cutoff_time)
            .and_local_timezone(tz)
            .single()
            .unwrap_or_else(|| {
                // DST edge case: fallback to +1 min
                (target_date.and_time(cutoff_time) + chrono::Duration::minutes(1))
                    .and_local_timezone(tz)
                    .latest()
                    .unwrap_or_else(|| {
                        // Ultimate fallback: use current time + 1 hour
                        tracing::error!(
                            "Cannot resolve local time for auto-checkout, using fallback"
                        );
                        now + chrono::Duration::hours(1)
                    })
            });

        let duration = target_datetime.signed_duration_since(now);
        if duration.num_seconds() <= 0 {
            // Safety: 不应该发生，但以防万一用 1 分钟兜底
            std::time::Duration::from_secs(60)
        } else {
            duration
                .to_std()
                .unwrap_or(std::time::Duration::from_secs(60))
        }
    }
}
