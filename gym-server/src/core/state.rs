use std::path::PathBuf;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::analytics::InsightsClient;
use crate::core::Config;
use crate::db::DbService;
use crate::services::PhotoStore;

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是整个后台的核心数据结构，经 axum `State` 注入到每个 handler。
/// 所有字段都是浅拷贝 (Arc 或等价物)，Clone 成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | photos | PhotoStore | 自助签到照片存储 |
/// | insights | InsightsClient | AI 报告客户端 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 照片存储 (自助签到/签退的照片凭证)
    pub photos: PhotoStore,
    /// AI 报告客户端 (未配置时走标注过的降级文案)
    pub insights: InsightsClient,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`Self::initialize`] 代替
    pub fn new(config: Config, db: Surreal<Db>, photos: PhotoStore, insights: InsightsClient) -> Self {
        Self {
            config,
            db,
            photos,
            insights,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/gym.db) + 表结构
    /// 3. 照片存储、AI 客户端
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB
        let db_path = config.database_dir().join("gym.db");
        let db_path_str = db_path.to_string_lossy();

        let db_service = DbService::new(&db_path_str)
            .await
            .expect("Failed to initialize database");
        let db = db_service.db;

        // 2. Initialize services
        let photos = PhotoStore::new(config.photos_dir());
        let insights = InsightsClient::new(config);

        Self::new(config.clone(), db, photos, insights)
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}
