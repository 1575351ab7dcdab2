//! Gym Server - 健身房管理系统后台服务
//!
//! # 架构概述
//!
//! 本模块是 Gym Server 的主入口，提供以下核心功能：
//!
//! - **会员账本** (`ledger`): 付款处理与会员财务状态对账
//! - **考勤** (`attendance`): 签到/签退状态机、自助拍照签到、自动签退
//! - **工资** (`salary`): 教练底薪 + 提成计算
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **分析** (`analytics`): 财务汇总 + AI 报告生成
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! gym-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (模型 + 仓储)
//! ├── ledger/        # 付款对账核心
//! ├── attendance/    # 考勤状态机
//! ├── salary/        # 工资/提成计算
//! ├── analytics/     # 财务汇总和 AI 报告
//! ├── services/      # 照片存储等辅助服务
//! └── utils/         # 工具函数
//! ```

pub mod analytics;
pub mod api;
pub mod attendance;
pub mod core;
pub mod db;
pub mod ledger;
pub mod salary;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv, 工作目录, 日志)
///
/// 必须在 [`Config::from_env`] 之前调用，保证 .env 已加载
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_level = std::env::var("RUST_LOG").ok();
    let log_dir = config.log_dir();
    utils::logger::init_logger_with_file(log_level.as_deref(), None, log_dir.to_str());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______
  / ____/_  ______ ___
 / / __/ / / / __ `__ \
/ /_/ / /_/ / / / / / /
\____/\__, /_/ /_/ /_/
     /____/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}
