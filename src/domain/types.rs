// ==========================================
// 托盘装载优化系统 - 领域类型定义
// ==========================================
// 职责: 校验状态、校验问题类别等枚举
// 序列化格式: snake_case (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 校验状态 (Validation Status)
// ==========================================
// 生命周期: 每次重新优化都会回到 Pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pending, // 待校验
    Valid,   // 校验通过
    Invalid, // 校验未通过
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ValidationStatus {
    /// 从字符串解析状态（未知值返回 None，由调用方决定如何处理）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(ValidationStatus::Pending),
            "valid" => Some(ValidationStatus::Valid),
            "invalid" => Some(ValidationStatus::Invalid),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pending => "pending",
            ValidationStatus::Valid => "valid",
            ValidationStatus::Invalid => "invalid",
        }
    }
}

// ==========================================
// 校验问题类别 (Validation Issue Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssueKind {
    /// 交付尚无优化结果，需先执行优化
    OptimizationMissing,
    /// 原材料型材长度超过托盘装载深度（阻断）
    ProfileTooLong,
    /// 托盘利用率过低（仅警告）
    LowUtilization,
}

impl fmt::Display for ValidationIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssueKind::OptimizationMissing => write!(f, "optimization_missing"),
            ValidationIssueKind::ProfileTooLong => write!(f, "profile_too_long"),
            ValidationIssueKind::LowUtilization => write!(f, "low_utilization"),
        }
    }
}
