// ==========================================
// 托盘装载优化系统 - 托盘校验引擎
// ==========================================
// 职责: 对已持久化的优化结果复核物理约束
// 规则:
// - profile_too_long: 原材料型材最大长度 > 托盘装载深度 (阻断)
// - low_utilization: 托盘利用率 < 阈值 (仅警告)
// ==========================================
// 注意: 型材长度检查对每个托盘 × 交付内全部型材进行,
//       不区分该型材是否实际装在该托盘上（保持既有发运口径,见 DESIGN.md）
// ==========================================

use crate::domain::delivery::ProfileRequirement;
use crate::domain::pallet::OptimizationResult;
use crate::domain::validation::{ValidationIssue, ValidationResult};
use std::collections::BTreeMap;

/// 低利用率警告默认阈值 (%)
pub const DEFAULT_LOW_UTILIZATION_THRESHOLD_PCT: f64 = 50.0;

// ==========================================
// PalletValidator - 托盘校验引擎
// ==========================================
pub struct PalletValidator {
    low_utilization_threshold_pct: f64,
}

impl PalletValidator {
    pub fn new(low_utilization_threshold_pct: f64) -> Self {
        Self {
            low_utilization_threshold_pct,
        }
    }

    pub fn low_utilization_threshold_pct(&self) -> f64 {
        self.low_utilization_threshold_pct
    }

    /// 按型材汇总最大原材料长度 (mm)
    ///
    /// BTreeMap 保证输出顺序稳定
    pub fn max_profile_lengths(requirements: &[ProfileRequirement]) -> BTreeMap<String, i64> {
        let mut lengths: BTreeMap<String, i64> = BTreeMap::new();
        for requirement in requirements {
            let length_mm = requirement.length_mm();
            lengths
                .entry(requirement.profile_id.clone())
                .and_modify(|current| *current = (*current).max(length_mm))
                .or_insert(length_mm);
        }
        lengths
    }

    /// 校验一个优化结果
    ///
    /// # 参数
    /// - `optimization`: 已持久化的优化结果
    /// - `requirements`: 交付下所有订单的型材需求
    ///
    /// # 返回
    /// 全量错误与警告（不截断）
    pub fn evaluate(
        &self,
        optimization: &OptimizationResult,
        requirements: &[ProfileRequirement],
    ) -> ValidationResult {
        let profile_lengths = Self::max_profile_lengths(requirements);

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for pallet in &optimization.pallets {
            for (profile_id, length_mm) in &profile_lengths {
                if *length_mm > pallet.max_depth_mm {
                    errors.push(ValidationIssue::profile_too_long(
                        pallet.pallet_number,
                        profile_id,
                        *length_mm,
                        pallet.max_depth_mm,
                    ));
                }
            }

            if pallet.utilization_percent < self.low_utilization_threshold_pct {
                warnings.push(ValidationIssue::low_utilization(
                    pallet.pallet_number,
                    pallet.utilization_percent,
                    self.low_utilization_threshold_pct,
                ));
            }
        }

        tracing::debug!(
            "托盘校验: delivery_id={}, profiles={}, errors={}, warnings={}",
            optimization.delivery_id,
            profile_lengths.len(),
            errors.len(),
            warnings.len()
        );

        ValidationResult::from_findings(errors, warnings)
    }
}

impl Default for PalletValidator {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_UTILIZATION_THRESHOLD_PCT)
    }
}
