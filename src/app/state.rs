// ==========================================
// 选矿厂生产数据对比系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{ComparisonApi, ImportApi};
use crate::config::config_manager::ConfigManager;
use crate::repository::RecordRepository;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "PLANT_COMPARE_DB_PATH";

/// 应用状态
///
/// 所有仓储共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 对比API
    pub comparison_api: Arc<ComparisonApi>,

    /// 导入API
    pub import_api: Arc<ImportApi>,

    /// 配置管理器（方案维护）
    pub config_manager: Arc<ConfigManager>,

    /// 生产记录仓储
    pub record_repo: Arc<RecordRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动建库建表）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_and_migrate(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let record_repo = Arc::new(RecordRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法初始化配置管理器: {}", e))?,
        );

        let comparison_api = Arc::new(ComparisonApi::new(
            record_repo.clone(),
            config_manager.clone(),
        ));
        let import_api = Arc::new(ImportApi::new(record_repo.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            comparison_api,
            import_api,
            config_manager,
            record_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: PLANT_COMPARE_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./plant_compare.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        let dir = if cfg!(debug_assertions) {
            data_dir.join("mineral-plant-compare-dev")
        } else {
            data_dir.join("mineral-plant-compare")
        };

        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("plant_compare.db");
        }
    }

    path.to_string_lossy().to_string()
}
