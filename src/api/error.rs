// ==========================================
// 托盘装载优化系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换 Repository / Engine 错误为统一的边界错误
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::engine::pallet_optimizer::OptimizationError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 优化错误
    // ==========================================
    /// 配置错误（型材深度缺失/无效）,原文透传
    #[error("配置错误: {0}")]
    ConfigurationError(String),

    /// 不可行: 单元无法装入任何托盘类型
    #[error("装载不可行: {0}")]
    Infeasible(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    /// 持久化数据损坏
    #[error("数据完整性错误: {0}")]
    DataIntegrity(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }

            // 数据完整性错误
            err @ RepositoryError::CorruptPalletData { .. } => {
                ApiError::DataIntegrity(err.to_string())
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DataIntegrity(format!("字段{}错误: {}", field, message))
            }

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 OptimizationError 转换
// ==========================================
impl From<OptimizationError> for ApiError {
    fn from(err: OptimizationError) -> Self {
        match err {
            OptimizationError::MissingProfileDepth { .. }
            | OptimizationError::InvalidProfileDepth { .. } => {
                ApiError::ConfigurationError(err.to_string())
            }
            OptimizationError::UnassignableUnit { .. } => ApiError::Infeasible(err.to_string()),
            OptimizationError::InvalidUnit { .. } => ApiError::InvalidInput(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
