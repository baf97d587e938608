// ==========================================
// 托盘装载优化系统 - 发运闸门
// ==========================================
// 职责: 依据持久化的校验结论判定交付能否标记为已发运
// 红线: 纯判定,无副作用；阻断时必须给出可读原因
// ==========================================

use crate::domain::types::ValidationStatus;
use crate::domain::validation::{ShippingDecision, ValidationVerdict};

pub struct ShippingGate {
    // 无状态
}

impl ShippingGate {
    pub fn new() -> Self {
        Self {}
    }

    /// 发运判定
    ///
    /// - 无优化结果: 放行（手工装托/历史交付）
    /// - pending: 阻断,尚未校验
    /// - invalid: 阻断,附带已存错误摘要
    /// - valid: 放行
    pub fn decide(&self, verdict: Option<&ValidationVerdict>) -> ShippingDecision {
        let verdict = match verdict {
            Some(v) => v,
            None => {
                return ShippingDecision {
                    can_ship: true,
                    reason: None,
                    validation_status: None,
                }
            }
        };

        match verdict.status {
            ValidationStatus::Valid => ShippingDecision {
                can_ship: true,
                reason: None,
                validation_status: Some(ValidationStatus::Valid),
            },
            ValidationStatus::Pending => ShippingDecision {
                can_ship: false,
                reason: Some("托盘装载方案尚未校验 (not yet validated)，请先执行托盘校验".to_string()),
                validation_status: Some(ValidationStatus::Pending),
            },
            ValidationStatus::Invalid => {
                let summary = verdict.error_summary();
                let reason = if summary.is_empty() {
                    "托盘装载方案校验未通过".to_string()
                } else {
                    format!("托盘装载方案校验未通过: {}", summary)
                };
                ShippingDecision {
                    can_ship: false,
                    reason: Some(reason),
                    validation_status: Some(ValidationStatus::Invalid),
                }
            }
        }
    }
}

impl Default for ShippingGate {
    fn default() -> Self {
        Self::new()
    }
}
