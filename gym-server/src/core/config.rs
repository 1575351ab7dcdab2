use std::path::PathBuf;

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::utils::time::parse_cutoff;

/// 服务器配置 - 健身房后台的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/gym/server | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | Asia/Kolkata | 营业时区 (考勤日界、自动签退用) |
/// | AUTO_CHECKOUT_TIME | 23:59 | 每日自动签退扫描时间 (HH:MM) |
/// | UPSTREAM_TIMEOUT_MS | 30000 | 外部 AI 调用超时(毫秒) |
/// | AI_API_URL | (空 = 未配置) | AI 文本服务地址 |
/// | AI_API_KEY | (空) | AI 文本服务密钥 |
/// | AI_MODEL | gemini-1.5-flash | AI 模型名 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/gym HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、照片、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 营业时区，决定"今天"的日界和自动签退的时间戳
    pub timezone: Tz,
    /// 每日自动签退扫描时间 (本地时区)
    pub auto_checkout_time: NaiveTime,
    /// 外部 AI 调用的硬超时 (毫秒)，超时后放弃本次调用
    pub upstream_timeout_ms: u64,
    /// AI 文本服务地址，空串表示未配置 (分析接口走标注过的降级文案)
    pub ai_api_url: String,
    /// AI 文本服务密钥
    pub ai_api_key: String,
    /// AI 模型名
    pub ai_model: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/gym/server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(chrono_tz::Asia::Kolkata),
            auto_checkout_time: std::env::var("AUTO_CHECKOUT_TIME")
                .ok()
                .map(|t| parse_cutoff(&t))
                .unwrap_or_else(default_auto_checkout_time),
            upstream_timeout_ms: std::env::var("UPSTREAM_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            ai_api_url: std::env::var("AI_API_URL").unwrap_or_default(),
            ai_api_key: std::env::var("AI_API_KEY").unwrap_or_default(),
            ai_model: std::env::var("AI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".into()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库目录: {work_dir}/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 照片目录: {work_dir}/photos
    pub fn photos_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("photos")
    }

    /// 日志目录: {work_dir}/logs
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 创建工作目录结构
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.photos_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// AI 能力是否已配置
    pub fn ai_configured(&self) -> bool {
        !self.ai_api_url.is_empty()
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn default_auto_checkout_time() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
