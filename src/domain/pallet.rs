// ==========================================
// 托盘装载优化系统 - 托盘领域模型
// ==========================================
// 职责: 托盘类型目录、优化结果(托盘实例 + 装载快照)
// 红线: 优化结果自描述,托盘参数在分配时复制,不随目录后续修改而变化
// ==========================================

use crate::domain::validation::ValidationVerdict;
use serde::{Deserialize, Serialize};

/// 最大允许悬挑 (mm)，对所有托盘类型统一生效，不可按类型配置
pub const MAX_OVERHANG_MM: i64 = 700;

// ==========================================
// PalletTypeDefinition - 托盘类型 (目录项)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PalletTypeDefinition {
    pub pallet_type_id: i64, // 主键
    pub name: String,        // 名称 (唯一)
    pub length_mm: i64,      // 承载长度
    pub load_depth_mm: i64,  // 可堆叠深度
}

// ==========================================
// OptimizedWindow - 托盘上的装载快照
// ==========================================
// 与订单明细不共享,quantity 为实际装到该托盘的件数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizedWindow {
    pub window_id: i64,
    pub order_id: i64,
    pub order_number: String,
    pub width_mm: i64,
    pub height_mm: i64,
    pub profile_type: String,
    pub quantity: i64,
    pub depth_mm: i64, // 单件型材深度
    pub reference: Option<String>,
}

impl OptimizedWindow {
    /// 该快照占用的总深度
    pub fn total_depth_mm(&self) -> i64 {
        self.depth_mm.saturating_mul(self.quantity)
    }
}

// ==========================================
// OptimizedPallet - 具体托盘实例
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedPallet {
    pub pallet_number: u32,       // 从 1 开始,按创建顺序连续编号
    pub pallet_type: String,      // 托盘类型名称
    pub pallet_length_mm: i64,    // 承载长度 (复制)
    pub max_depth_mm: i64,        // 装载深度上限 (复制)
    pub used_depth_mm: i64,       // 已用深度
    pub utilization_percent: f64, // 利用率 (%)
    pub windows: Vec<OptimizedWindow>,
}

impl OptimizedPallet {
    /// 以目录项开一个空托盘
    pub fn open(pallet_number: u32, pallet_type: &PalletTypeDefinition) -> Self {
        Self {
            pallet_number,
            pallet_type: pallet_type.name.clone(),
            pallet_length_mm: pallet_type.length_mm,
            max_depth_mm: pallet_type.load_depth_mm,
            used_depth_mm: 0,
            utilization_percent: 0.0,
            windows: Vec::new(),
        }
    }

    /// 装载件数合计
    pub fn window_count(&self) -> i64 {
        self.windows.iter().map(|w| w.quantity).sum()
    }

    /// 由装载快照重算已用深度与利用率
    pub fn recalculate_usage(&mut self) {
        self.used_depth_mm = self
            .windows
            .iter()
            .fold(0i64, |acc, w| acc.saturating_add(w.total_depth_mm()));
        self.utilization_percent = utilization_percent(self.used_depth_mm, self.max_depth_mm);
    }
}

/// 利用率 = used / max × 100；max 为 0 时返回 0
pub fn utilization_percent(used_depth_mm: i64, max_depth_mm: i64) -> f64 {
    if max_depth_mm <= 0 {
        return 0.0;
    }
    used_depth_mm as f64 / max_depth_mm as f64 * 100.0
}

// ==========================================
// Trait: PalletCapacity
// ==========================================
// 用途: 优化引擎的两项约束检查 (宽度含悬挑 / 深度)
pub trait PalletCapacity {
    /// 承载长度
    fn carrying_length_mm(&self) -> i64;

    /// 可用深度上限
    fn depth_limit_mm(&self) -> i64;

    /// 已用深度
    fn occupied_depth_mm(&self) -> i64;

    /// 宽度是否在承载长度 + 悬挑范围内
    fn accepts_width(&self, width_mm: i64) -> bool {
        width_mm <= self.carrying_length_mm().saturating_add(MAX_OVERHANG_MM)
    }

    /// 剩余深度
    fn remaining_depth_mm(&self) -> i64 {
        (self.depth_limit_mm() - self.occupied_depth_mm()).max(0)
    }

    /// 是否能再放下一件 (宽度 + 深度同时满足)
    fn can_load(&self, width_mm: i64, depth_mm: i64) -> bool {
        self.accepts_width(width_mm)
            && self
                .occupied_depth_mm()
                .checked_add(depth_mm)
                .is_some_and(|total| total <= self.depth_limit_mm())
    }
}

impl PalletCapacity for PalletTypeDefinition {
    fn carrying_length_mm(&self) -> i64 {
        self.length_mm
    }

    fn depth_limit_mm(&self) -> i64 {
        self.load_depth_mm
    }

    fn occupied_depth_mm(&self) -> i64 {
        0
    }
}

impl PalletCapacity for OptimizedPallet {
    fn carrying_length_mm(&self) -> i64 {
        self.pallet_length_mm
    }

    fn depth_limit_mm(&self) -> i64 {
        self.max_depth_mm
    }

    fn occupied_depth_mm(&self) -> i64 {
        self.used_depth_mm
    }
}

// ==========================================
// OptimizationSummary - 结果汇总
// ==========================================
// 总是由托盘内容重新计算,不信任存储冗余字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub total_windows: i64,
    pub average_utilization: f64,
}

impl OptimizationSummary {
    pub fn from_pallets(pallets: &[OptimizedPallet]) -> Self {
        let total_windows = pallets.iter().map(|p| p.window_count()).sum();
        let average_utilization = if pallets.is_empty() {
            0.0
        } else {
            pallets.iter().map(|p| p.utilization_percent).sum::<f64>() / pallets.len() as f64
        };

        Self {
            total_windows,
            average_utilization,
        }
    }
}

// ==========================================
// OptimizationResult - 单个交付的优化结果
// ==========================================
// 每个交付至多一份有效结果；重新优化整体替换并重置校验状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub delivery_id: i64,
    pub total_pallets: usize,
    pub pallets: Vec<OptimizedPallet>,
    pub summary: OptimizationSummary,
    pub verdict: ValidationVerdict,
}

impl OptimizationResult {
    /// 由托盘列表构建结果（汇总重算,校验状态为 pending）
    pub fn from_pallets(delivery_id: i64, pallets: Vec<OptimizedPallet>) -> Self {
        Self::with_verdict(delivery_id, pallets, ValidationVerdict::pending())
    }

    /// 由托盘列表与既有校验结论构建结果
    pub fn with_verdict(
        delivery_id: i64,
        pallets: Vec<OptimizedPallet>,
        verdict: ValidationVerdict,
    ) -> Self {
        let summary = OptimizationSummary::from_pallets(&pallets);
        Self {
            delivery_id,
            total_pallets: pallets.len(),
            pallets,
            summary,
            verdict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pallet_type(length_mm: i64, load_depth_mm: i64) -> PalletTypeDefinition {
        PalletTypeDefinition {
            pallet_type_id: 1,
            name: format!("L{}", length_mm),
            length_mm,
            load_depth_mm,
        }
    }

    fn window(window_id: i64, quantity: i64, depth_mm: i64) -> OptimizedWindow {
        OptimizedWindow {
            window_id,
            order_id: 1,
            order_number: "ZL-0001".to_string(),
            width_mm: 1000,
            height_mm: 1200,
            profile_type: "70mm".to_string(),
            quantity,
            depth_mm,
            reference: None,
        }
    }

    #[test]
    fn test_accepts_width_with_overhang() {
        let pt = pallet_type(3000, 1000);
        assert!(pt.accepts_width(3000));
        assert!(pt.accepts_width(3700)); // 3000 + 700
        assert!(!pt.accepts_width(3701));
    }

    #[test]
    fn test_can_load_checks_depth() {
        let mut pallet = OptimizedPallet::open(1, &pallet_type(3000, 1000));
        pallet.used_depth_mm = 930;
        assert!(pallet.can_load(2000, 70)); // 930 + 70 = 1000
        assert!(!pallet.can_load(2000, 71));
        assert!(!pallet.can_load(3800, 10));
        assert_eq!(pallet.remaining_depth_mm(), 70);
    }

    #[test]
    fn test_utilization_zero_depth_does_not_divide() {
        assert_eq!(utilization_percent(100, 0), 0.0);
        assert_eq!(utilization_percent(600, 1200), 50.0);
    }

    #[test]
    fn test_recalculate_usage_from_windows() {
        let mut pallet = OptimizedPallet::open(1, &pallet_type(6000, 1200));
        pallet.windows.push(window(1, 3, 70));
        pallet.windows.push(window(2, 2, 90));
        pallet.recalculate_usage();

        assert_eq!(pallet.used_depth_mm, 390);
        assert!((pallet.utilization_percent - 32.5).abs() < 1e-9);
        assert_eq!(pallet.window_count(), 5);
    }

    #[test]
    fn test_summary_of_empty_result() {
        let result = OptimizationResult::from_pallets(7, vec![]);
        assert_eq!(result.total_pallets, 0);
        assert_eq!(result.summary.total_windows, 0);
        assert_eq!(result.summary.average_utilization, 0.0);
    }

    #[test]
    fn test_summary_average_utilization() {
        let mut first = OptimizedPallet::open(1, &pallet_type(6000, 1000));
        first.windows.push(window(1, 10, 80));
        first.recalculate_usage();
        let mut second = OptimizedPallet::open(2, &pallet_type(6000, 1000));
        second.windows.push(window(2, 5, 80));
        second.recalculate_usage();

        let result = OptimizationResult::from_pallets(7, vec![first, second]);
        assert_eq!(result.summary.total_windows, 15);
        assert!((result.summary.average_utilization - 60.0).abs() < 1e-9);
    }
}
