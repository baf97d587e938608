// ==========================================
// 托盘装载优化系统 - 引擎层
// ==========================================
// 职责: 实现装载/校验/发运规则,不拼 SQL
// 红线: Engine 不拼 SQL, 所有阻断必须输出 reason
// ==========================================

pub mod events;
pub mod pallet_optimizer;
pub mod pallet_validator;
pub mod shipping_gate;

// 重导出核心引擎
pub use events::{
    NoOpReadinessNotifier, OptionalReadinessNotifier, ReadinessEvent, ReadinessNotifier,
    ReadinessTrigger,
};
pub use pallet_optimizer::{
    OptimizationError, PalletOptimizer, MAX_PROFILE_DEPTH_MM, MAX_UNIT_QUANTITY,
};
pub use pallet_validator::{PalletValidator, DEFAULT_LOW_UTILIZATION_THRESHOLD_PCT};
pub use shipping_gate::ShippingGate;
