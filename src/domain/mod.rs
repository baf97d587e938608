// ==========================================
// 托盘装载优化系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、约束检查接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod delivery;
pub mod pallet;
pub mod types;
pub mod validation;

// 重导出核心类型
pub use delivery::{DeliveryWindow, ProfileRequirement};
pub use pallet::{
    utilization_percent, OptimizationResult, OptimizationSummary, OptimizedPallet,
    OptimizedWindow, PalletCapacity, PalletTypeDefinition, MAX_OVERHANG_MM,
};
pub use types::{ValidationIssueKind, ValidationStatus};
pub use validation::{
    IssueDetails, ShippingDecision, ValidationIssue, ValidationResult, ValidationVerdict,
};
