// ==========================================
// 托盘装载优化系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod delivery_repo;
pub mod error;
pub mod optimization_repo;
pub mod pallet_type_repo;
pub mod profile_depth_repo;

// 重导出核心仓储
pub use delivery_repo::DeliveryRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use optimization_repo::PalletOptimizationRepository;
pub use pallet_type_repo::PalletTypeRepository;
pub use profile_depth_repo::{ProfileDepthEntity, ProfileDepthRepository};
