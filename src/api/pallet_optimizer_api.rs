// ==========================================
// 托盘装载优化系统 - 托盘优化 API
// ==========================================
// 职责:
// 1. 交付托盘优化（展平 → 引擎 → 原子保存）
// 2. 优化结果查询/删除
// 3. 托盘类型目录维护
// 4. 型材深度表维护
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::pallet::{OptimizationResult, PalletTypeDefinition};
use crate::engine::pallet_optimizer::{PalletOptimizer, MAX_PROFILE_DEPTH_MM};
use crate::repository::delivery_repo::DeliveryRepository;
use crate::repository::optimization_repo::PalletOptimizationRepository;
use crate::repository::pallet_type_repo::PalletTypeRepository;
use crate::repository::profile_depth_repo::{ProfileDepthEntity, ProfileDepthRepository};

// ==========================================
// DTO 定义
// ==========================================

/// 新建/更新托盘类型请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PalletTypeRequest {
    pub name: String,
    pub length_mm: i64,
    pub load_depth_mm: i64,
}

// ==========================================
// PalletOptimizerApi
// ==========================================

/// 托盘优化 API
pub struct PalletOptimizerApi {
    delivery_repo: Arc<DeliveryRepository>,
    pallet_type_repo: Arc<PalletTypeRepository>,
    profile_depth_repo: Arc<ProfileDepthRepository>,
    optimization_repo: Arc<PalletOptimizationRepository>,
    optimizer: PalletOptimizer,
}

impl PalletOptimizerApi {
    /// 创建新的 PalletOptimizerApi 实例
    pub fn new(
        delivery_repo: Arc<DeliveryRepository>,
        pallet_type_repo: Arc<PalletTypeRepository>,
        profile_depth_repo: Arc<ProfileDepthRepository>,
        optimization_repo: Arc<PalletOptimizationRepository>,
    ) -> Self {
        Self {
            delivery_repo,
            pallet_type_repo,
            profile_depth_repo,
            optimization_repo,
            optimizer: PalletOptimizer::new(),
        }
    }

    // ==========================================
    // 优化
    // ==========================================

    /// 为交付执行托盘优化并保存
    ///
    /// # 说明
    /// - 目录与深度表在调用时读取快照注入引擎
    /// - 引擎失败时不写库；成功后原子替换旧结果,校验状态重置为 pending
    ///
    /// # 返回
    /// - Err(NotFound): 交付不存在
    /// - Err(ConfigurationError): 型材深度缺失/无效
    /// - Err(Infeasible): 存在无法装入任何托盘类型的单元
    #[instrument(skip(self), fields(delivery_id = delivery_id))]
    pub fn optimize(&self, delivery_id: i64) -> ApiResult<OptimizationResult> {
        let windows = self.delivery_repo.list_delivery_windows(delivery_id)?;
        let pallet_types = self.pallet_type_repo.list_all()?;
        let profile_depths = self.profile_depth_repo.load_depth_map()?;

        let result = self
            .optimizer
            .optimize(delivery_id, &windows, &pallet_types, &profile_depths)
            .map_err(|e| {
                tracing::warn!("托盘优化失败: delivery_id={}, error={}", delivery_id, e);
                ApiError::from(e)
            })?;

        let optimization_id = self.optimization_repo.save(&result)?;
        tracing::info!(
            "托盘优化已保存: delivery_id={}, optimization_id={}, pallets={}",
            delivery_id,
            optimization_id,
            result.total_pallets
        );
        Ok(result)
    }

    /// 查询交付的优化结果
    pub fn get_optimization(&self, delivery_id: i64) -> ApiResult<Option<OptimizationResult>> {
        Ok(self.optimization_repo.find_by_delivery(delivery_id)?)
    }

    /// 交付是否已有优化结果
    pub fn has_optimization(&self, delivery_id: i64) -> ApiResult<bool> {
        Ok(self.optimization_repo.exists(delivery_id)?)
    }

    /// 删除交付的优化结果
    #[instrument(skip(self), fields(delivery_id = delivery_id))]
    pub fn delete_optimization(&self, delivery_id: i64) -> ApiResult<()> {
        self.optimization_repo.delete_by_delivery(delivery_id)?;
        tracing::info!("托盘优化结果已删除: delivery_id={}", delivery_id);
        Ok(())
    }

    // ==========================================
    // 托盘类型目录
    // ==========================================

    /// 查询全部托盘类型（按承载长度降序）
    pub fn list_pallet_types(&self) -> ApiResult<Vec<PalletTypeDefinition>> {
        Ok(self.pallet_type_repo.list_all()?)
    }

    /// 按ID查询托盘类型
    pub fn get_pallet_type(&self, pallet_type_id: i64) -> ApiResult<PalletTypeDefinition> {
        self.pallet_type_repo
            .find_by_id(pallet_type_id)?
            .ok_or_else(|| ApiError::NotFound(format!("PalletType(id={})不存在", pallet_type_id)))
    }

    /// 新建托盘类型
    pub fn create_pallet_type(&self, request: PalletTypeRequest) -> ApiResult<PalletTypeDefinition> {
        let name = validate_pallet_type_request(&request)?;
        let created = self
            .pallet_type_repo
            .insert(name, request.length_mm, request.load_depth_mm)?;

        tracing::info!(
            "托盘类型已创建: id={}, name={}, length_mm={}, load_depth_mm={}",
            created.pallet_type_id,
            created.name,
            created.length_mm,
            created.load_depth_mm
        );
        Ok(created)
    }

    /// 更新托盘类型
    ///
    /// 已保存的优化结果自带托盘参数,不受目录修改影响
    pub fn update_pallet_type(
        &self,
        pallet_type_id: i64,
        request: PalletTypeRequest,
    ) -> ApiResult<PalletTypeDefinition> {
        let name = validate_pallet_type_request(&request)?;
        let updated = PalletTypeDefinition {
            pallet_type_id,
            name: name.to_string(),
            length_mm: request.length_mm,
            load_depth_mm: request.load_depth_mm,
        };
        self.pallet_type_repo.update(&updated)?;
        Ok(updated)
    }

    /// 删除托盘类型
    pub fn delete_pallet_type(&self, pallet_type_id: i64) -> ApiResult<()> {
        self.pallet_type_repo.delete(pallet_type_id)?;
        tracing::info!("托盘类型已删除: id={}", pallet_type_id);
        Ok(())
    }

    // ==========================================
    // 型材深度表
    // ==========================================

    pub fn list_profile_depths(&self) -> ApiResult<Vec<ProfileDepthEntity>> {
        Ok(self.profile_depth_repo.list_all()?)
    }

    /// 新增或修改型材单件深度
    pub fn upsert_profile_depth(&self, profile_type: &str, depth_mm: i64) -> ApiResult<()> {
        let profile_type = profile_type.trim();
        if profile_type.is_empty() {
            return Err(ApiError::InvalidInput("型材类型不能为空".to_string()));
        }
        if depth_mm <= 0 || depth_mm > MAX_PROFILE_DEPTH_MM {
            return Err(ApiError::InvalidInput(format!(
                "型材深度必须在 1..={}mm 之间: profile_type={}, depth_mm={}",
                MAX_PROFILE_DEPTH_MM, profile_type, depth_mm
            )));
        }
        self.profile_depth_repo.upsert(profile_type, depth_mm)?;
        Ok(())
    }

    pub fn delete_profile_depth(&self, profile_type: &str) -> ApiResult<()> {
        self.profile_depth_repo.delete(profile_type.trim())?;
        Ok(())
    }
}

/// 托盘类型请求校验,返回去空白后的名称
fn validate_pallet_type_request(request: &PalletTypeRequest) -> ApiResult<&str> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidInput("托盘类型名称不能为空".to_string()));
    }
    if request.length_mm <= 0 {
        return Err(ApiError::InvalidInput(format!(
            "托盘承载长度必须为正数: {}",
            request.length_mm
        )));
    }
    if request.load_depth_mm <= 0 {
        return Err(ApiError::InvalidInput(format!(
            "托盘装载深度必须为正数: {}",
            request.load_depth_mm
        )));
    }
    Ok(name)
}
