// ==========================================
// 托盘装载优化系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 交付托盘装载方案生成与发运前校验
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 装载/校验/发运规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 依赖组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ValidationIssueKind, ValidationStatus};

// 领域实体
pub use domain::{
    DeliveryWindow, OptimizationResult, OptimizationSummary, OptimizedPallet, OptimizedWindow,
    PalletTypeDefinition, ProfileRequirement, ShippingDecision, ValidationIssue,
    ValidationResult, ValidationVerdict, MAX_OVERHANG_MM,
};

// 引擎
pub use engine::{
    OptimizationError, PalletOptimizer, PalletValidator, ReadinessEvent, ReadinessNotifier,
    ShippingGate,
};

// API
pub use api::{ApiError, ApiResult, PalletOptimizerApi, PalletValidationApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "托盘装载优化系统";
