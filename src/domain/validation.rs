// ==========================================
// 托盘装载优化系统 - 校验领域模型
// ==========================================
// 职责: 校验问题、校验结果、持久化的校验结论、发运判定
// 红线: 校验发现是结构化结果,不是异常；由调用方决定是否阻断发运
// ==========================================

use crate::domain::types::{ValidationIssueKind, ValidationStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ValidationIssue - 单条校验问题 (错误或警告)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: ValidationIssueKind,
    pub pallet_number: Option<u32>,
    pub message: String,
    #[serde(default)]
    pub details: IssueDetails,
}

/// 数值明细（按问题类别填充对应字段）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_mm: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth_mm: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilization_percent: Option<f64>,
}

impl ValidationIssue {
    /// 交付尚无优化结果
    pub fn optimization_missing(delivery_id: i64) -> Self {
        Self {
            kind: ValidationIssueKind::OptimizationMissing,
            pallet_number: None,
            message: format!(
                "交付(id={})尚无托盘优化结果，请先执行托盘优化后再校验",
                delivery_id
            ),
            details: IssueDetails::default(),
        }
    }

    /// 型材长度超过托盘装载深度
    pub fn profile_too_long(
        pallet_number: u32,
        profile_id: &str,
        length_mm: i64,
        max_depth_mm: i64,
    ) -> Self {
        Self {
            kind: ValidationIssueKind::ProfileTooLong,
            pallet_number: Some(pallet_number),
            message: format!(
                "托盘 #{}: 型材 {} 长度 {}mm 超过托盘装载深度 {}mm",
                pallet_number, profile_id, length_mm, max_depth_mm
            ),
            details: IssueDetails {
                profile_id: Some(profile_id.to_string()),
                length_mm: Some(length_mm),
                max_depth_mm: Some(max_depth_mm),
                utilization_percent: None,
            },
        }
    }

    /// 托盘利用率过低
    pub fn low_utilization(pallet_number: u32, utilization_percent: f64, threshold_pct: f64) -> Self {
        Self {
            kind: ValidationIssueKind::LowUtilization,
            pallet_number: Some(pallet_number),
            message: format!(
                "托盘 #{}: 利用率 {:.1}% 低于 {:.0}%",
                pallet_number, utilization_percent, threshold_pct
            ),
            details: IssueDetails {
                utilization_percent: Some(utilization_percent),
                ..IssueDetails::default()
            },
        }
    }
}

// ==========================================
// ValidationResult - 一次校验的输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// 由错误/警告构建,is_valid = 无错误
    pub fn from_findings(errors: Vec<ValidationIssue>, warnings: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// 对应的持久化状态
    pub fn status(&self) -> ValidationStatus {
        if self.is_valid {
            ValidationStatus::Valid
        } else {
            ValidationStatus::Invalid
        }
    }
}

// ==========================================
// ValidationVerdict - 附着在优化结果上的校验结论
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub status: ValidationStatus,
    pub errors: Vec<ValidationIssue>,
    pub validated_at: Option<NaiveDateTime>,
}

impl ValidationVerdict {
    /// 新优化结果的初始结论
    pub fn pending() -> Self {
        Self {
            status: ValidationStatus::Pending,
            errors: Vec::new(),
            validated_at: None,
        }
    }

    /// 错误摘要（用于发运阻断原因）
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ==========================================
// ShippingDecision - 发运判定
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingDecision {
    pub can_ship: bool,
    pub reason: Option<String>,
    pub validation_status: Option<ValidationStatus>,
}
