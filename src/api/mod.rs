// ==========================================
// 托盘装载优化系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供订单/交付模块与命令行调用
// ==========================================

pub mod error;
pub mod pallet_optimizer_api;
pub mod pallet_validation_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use pallet_optimizer_api::{PalletOptimizerApi, PalletTypeRequest};
pub use pallet_validation_api::PalletValidationApi;
