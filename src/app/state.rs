// ==========================================
// 托盘装载优化系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 启动时显式构建,不使用全局单例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{PalletOptimizerApi, PalletValidationApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::events::{OptionalReadinessNotifier, ReadinessNotifier};
use crate::engine::pallet_validator::PalletValidator;
use crate::repository::{
    DeliveryRepository, PalletOptimizationRepository, PalletTypeRepository,
    ProfileDepthRepository,
};

/// 环境变量: 显式指定数据库路径
pub const DB_PATH_ENV: &str = "PALLET_LOADING_DB";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 托盘优化API
    pub optimizer_api: Arc<PalletOptimizerApi>,

    /// 托盘校验API
    pub validation_api: Arc<PalletValidationApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例（不接入就绪度聚合器）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::build(db_path, OptionalReadinessNotifier::none())
    }

    /// 创建AppState并接入就绪度聚合器
    pub fn with_notifier(
        db_path: String,
        notifier: Arc<dyn ReadinessNotifier>,
    ) -> Result<Self, String> {
        Self::build(db_path, OptionalReadinessNotifier::with_notifier(notifier))
    }

    fn build(db_path: String, readiness_notifier: OptionalReadinessNotifier) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库表初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let delivery_repo = Arc::new(DeliveryRepository::new(conn.clone()));
        let pallet_type_repo = Arc::new(PalletTypeRepository::new(conn.clone()));
        let profile_depth_repo = Arc::new(ProfileDepthRepository::new(conn.clone()));
        let optimization_repo = Arc::new(PalletOptimizationRepository::new(conn.clone()));

        // ==========================================
        // 配置与引擎
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let threshold_pct = config_manager
            .get_low_utilization_threshold_pct()
            .map_err(|e| format!("读取低利用率阈值失败: {}", e))?;
        let validator = PalletValidator::new(threshold_pct);

        if !readiness_notifier.is_configured() {
            tracing::info!("未接入就绪度聚合器，校验后不触发重算");
        }

        // ==========================================
        // 创建API实例
        // ==========================================
        let optimizer_api = Arc::new(PalletOptimizerApi::new(
            delivery_repo.clone(),
            pallet_type_repo,
            profile_depth_repo,
            optimization_repo.clone(),
        ));
        let validation_api = Arc::new(PalletValidationApi::new(
            delivery_repo,
            optimization_repo,
            validator,
            readiness_notifier,
        ));

        tracing::info!(
            "AppState初始化完成 (low_utilization_threshold_pct={})",
            threshold_pct
        );

        Ok(Self {
            db_path,
            optimizer_api,
            validation_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先 PALLET_LOADING_DB,否则使用用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./pallet_loading.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("pallet-loading");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!("无法创建数据目录 {}: {}，使用当前目录", dir.display(), e);
        } else {
            path = dir.join("pallet_loading.db");
        }
    }

    path.to_string_lossy().to_string()
}
