// ==========================================
// 托盘装载优化系统 - 托盘优化引擎
// ==========================================
// 算法: 首次适应递减 (FFD),宽度 + 深度双约束装箱
// 红线: 纯函数,不读库,不依赖全局状态；同输入必得同输出
// ==========================================
// 输入: 装载单元列表 + 托盘类型目录 + 型材深度表
// 输出: OptimizationResult (托盘序列 + 利用率汇总)
// ==========================================

use crate::domain::delivery::DeliveryWindow;
use crate::domain::pallet::{
    OptimizationResult, OptimizedPallet, OptimizedWindow, PalletCapacity, PalletTypeDefinition,
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::instrument;

/// 单个明细的数量上限 (件)
pub const MAX_UNIT_QUANTITY: i64 = 10_000;

/// 单件型材深度上限 (mm)
pub const MAX_PROFILE_DEPTH_MM: i64 = 10_000;

// ==========================================
// 引擎错误类型
// ==========================================
// 均为整次优化的致命错误,不返回部分结果
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptimizationError {
    /// 配置错误: 型材深度表缺少该型材
    #[error("型材深度缺失: profile_type={profile_type}")]
    MissingProfileDepth { profile_type: String },

    /// 配置错误: 型材深度非正
    #[error("型材深度无效: profile_type={profile_type}, depth_mm={depth_mm}")]
    InvalidProfileDepth { profile_type: String, depth_mm: i64 },

    /// 不可行: 没有任何托盘类型能承载该单元
    #[error("无法分配托盘: window_id={window_id}, width_mm={width_mm}, 原因: {reason}")]
    UnassignableUnit {
        window_id: i64,
        width_mm: i64,
        reason: String,
    },

    /// 输入数据错误
    #[error("装载单元无效: window_id={window_id}, {message}")]
    InvalidUnit { window_id: i64, message: String },
}

// ==========================================
// 单件放置请求 (数量展开后)
// ==========================================
#[derive(Debug, Clone, Copy)]
struct PlacementRequest<'a> {
    window: &'a DeliveryWindow,
    depth_mm: i64,
}

// ==========================================
// PalletOptimizer - 托盘优化引擎
// ==========================================
pub struct PalletOptimizer {
    // 无状态引擎，目录与深度表每次调用注入
}

impl PalletOptimizer {
    pub fn new() -> Self {
        Self {}
    }

    /// 对一个交付的装载单元执行托盘分配
    ///
    /// 规则:
    /// 1) quantity=N 展开为 N 件,按宽度降序、明细ID升序排序
    /// 2) 按创建顺序扫描已开托盘,放入第一个宽度(含悬挑)与深度都满足的托盘
    /// 3) 都不满足时新开托盘: 选承载长度最小的可用类型,把长托盘留给后续更宽的件
    /// 4) 最后计算每个托盘的已用深度与利用率
    ///
    /// # 参数
    /// - `delivery_id`: 交付ID
    /// - `windows`: 装载单元 (可为空)
    /// - `pallet_types`: 托盘类型目录 (按承载长度降序)
    /// - `profile_depths`: 型材系统 → 单件深度 (mm)
    ///
    /// # 返回
    /// - Ok(OptimizationResult): 校验状态为 pending 的新结果
    /// - Err(OptimizationError): 配置缺失 / 输入无效 / 不可行
    #[instrument(skip(self, windows, pallet_types, profile_depths), fields(
        delivery_id = delivery_id,
        windows_count = windows.len(),
        pallet_types_count = pallet_types.len()
    ))]
    pub fn optimize(
        &self,
        delivery_id: i64,
        windows: &[DeliveryWindow],
        pallet_types: &[PalletTypeDefinition],
        profile_depths: &HashMap<String, i64>,
    ) -> Result<OptimizationResult, OptimizationError> {
        let requests = self.expand_requests(windows, profile_depths)?;

        let mut pallets: Vec<OptimizedPallet> = Vec::new();
        for request in &requests {
            let width_mm = request.window.width_mm;

            let index = match pallets
                .iter()
                .position(|pallet| pallet.can_load(width_mm, request.depth_mm))
            {
                Some(index) => index,
                None => {
                    let pallet_type = self.select_pallet_type(request, pallet_types)?;
                    let pallet_number = pallets.len() as u32 + 1;
                    tracing::debug!(
                        "新开托盘 #{}: type={}, 触发件 window_id={}, width_mm={}",
                        pallet_number,
                        pallet_type.name,
                        request.window.window_id,
                        width_mm
                    );
                    pallets.push(OptimizedPallet::open(pallet_number, pallet_type));
                    pallets.len() - 1
                }
            };

            Self::place(&mut pallets[index], request);
        }

        for pallet in &mut pallets {
            pallet.recalculate_usage();
        }

        let result = OptimizationResult::from_pallets(delivery_id, pallets);
        tracing::info!(
            "托盘优化完成: delivery_id={}, pallets={}, windows={}, avg_utilization={:.2}%",
            delivery_id,
            result.total_pallets,
            result.summary.total_windows,
            result.summary.average_utilization
        );
        Ok(result)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 校验输入、查型材深度、按数量展开并排序
    fn expand_requests<'a>(
        &self,
        windows: &'a [DeliveryWindow],
        profile_depths: &HashMap<String, i64>,
    ) -> Result<Vec<PlacementRequest<'a>>, OptimizationError> {
        let mut requests = Vec::new();

        for window in windows {
            if !window.has_positive_dimensions() {
                return Err(OptimizationError::InvalidUnit {
                    window_id: window.window_id,
                    message: format!(
                        "宽/高/数量必须为正 (width_mm={}, height_mm={}, quantity={})",
                        window.width_mm, window.height_mm, window.quantity
                    ),
                });
            }
            if window.quantity > MAX_UNIT_QUANTITY {
                return Err(OptimizationError::InvalidUnit {
                    window_id: window.window_id,
                    message: format!(
                        "数量超过上限 (quantity={}, max={})",
                        window.quantity, MAX_UNIT_QUANTITY
                    ),
                });
            }

            let depth_mm = *profile_depths.get(&window.profile_type).ok_or_else(|| {
                OptimizationError::MissingProfileDepth {
                    profile_type: window.profile_type.clone(),
                }
            })?;
            if depth_mm <= 0 || depth_mm > MAX_PROFILE_DEPTH_MM {
                return Err(OptimizationError::InvalidProfileDepth {
                    profile_type: window.profile_type.clone(),
                    depth_mm,
                });
            }

            for _ in 0..window.quantity {
                requests.push(PlacementRequest { window, depth_mm });
            }
        }

        // 稳定排序: 宽度降序,同宽按明细ID升序
        requests.sort_by(|a, b| {
            b.window
                .width_mm
                .cmp(&a.window.width_mm)
                .then_with(|| a.window.window_id.cmp(&b.window.window_id))
        });

        Ok(requests)
    }

    /// 为新托盘选择类型: 宽度(含悬挑)与单件深度都满足的类型中承载长度最小者
    ///
    /// 同长度时取目录中靠前者
    fn select_pallet_type<'t>(
        &self,
        request: &PlacementRequest<'_>,
        pallet_types: &'t [PalletTypeDefinition],
    ) -> Result<&'t PalletTypeDefinition, OptimizationError> {
        let width_mm = request.window.width_mm;

        let mut width_fits = false;
        let mut selected: Option<&PalletTypeDefinition> = None;
        for pallet_type in pallet_types {
            if !pallet_type.accepts_width(width_mm) {
                continue;
            }
            width_fits = true;
            if !pallet_type.can_load(width_mm, request.depth_mm) {
                continue;
            }
            match selected {
                Some(current) if current.length_mm <= pallet_type.length_mm => {}
                _ => selected = Some(pallet_type),
            }
        }

        selected.ok_or_else(|| {
            let reason = if width_fits {
                format!(
                    "单件深度 {}mm 超过所有可承载该宽度的托盘装载深度",
                    request.depth_mm
                )
            } else {
                "宽度超过所有托盘类型的承载长度+悬挑".to_string()
            };
            OptimizationError::UnassignableUnit {
                window_id: request.window.window_id,
                width_mm,
                reason,
            }
        })
    }

    /// 放入一件: 同一明细在同一托盘上合并为一条快照
    fn place(pallet: &mut OptimizedPallet, request: &PlacementRequest<'_>) {
        let window = request.window;
        pallet.used_depth_mm += request.depth_mm;

        if let Some(existing) = pallet
            .windows
            .iter_mut()
            .find(|w| w.window_id == window.window_id)
        {
            existing.quantity += 1;
            return;
        }

        pallet.windows.push(OptimizedWindow {
            window_id: window.window_id,
            order_id: window.order_id,
            order_number: window.order_number.clone(),
            width_mm: window.width_mm,
            height_mm: window.height_mm,
            profile_type: window.profile_type.clone(),
            quantity: 1,
            depth_mm: request.depth_mm,
            reference: window.reference.clone(),
        });
    }
}

impl Default for PalletOptimizer {
    fn default() -> Self {
        Self::new()
    }
}
