// ==========================================
// 托盘装载优化系统 - 交付领域模型
// ==========================================
// 职责: 交付下待装载的门窗明细、订单型材需求
// 红线: 装载单元每次优化时从订单重新派生,不单独持久化
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// DeliveryWindow - 待装载单元 (一条门窗明细)
// ==========================================
// quantity = N 表示 N 件尺寸完全相同的成品
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryWindow {
    pub window_id: i64,            // 明细ID (排序决胜键)
    pub order_id: i64,             // 来源订单ID
    pub order_number: String,      // 订单号 (仅用于追溯)
    pub width_mm: i64,             // 宽度 (mm)
    pub height_mm: i64,            // 高度 (mm)
    pub profile_type: String,      // 型材系统 (查型材深度表)
    pub quantity: i64,             // 数量
    pub reference: Option<String>, // 备注/位置
}

impl DeliveryWindow {
    /// 尺寸与数量是否为正
    pub fn has_positive_dimensions(&self) -> bool {
        self.width_mm > 0 && self.height_mm > 0 && self.quantity > 0
    }
}

// ==========================================
// ProfileRequirement - 订单型材需求
// ==========================================
// 原材料(未切割)型材长度,单位: 米
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRequirement {
    pub profile_id: String,
    pub length_m: f64,
}

impl ProfileRequirement {
    /// 换算为毫米（四舍五入）
    pub fn length_mm(&self) -> i64 {
        (self.length_m * 1000.0).round() as i64
    }
}
