// ==========================================
// 托盘装载优化系统 - 托盘校验 API
// ==========================================
// 职责:
// 1. 托盘校验（读取已存优化结果 → 校验引擎）
// 2. 写入校验结论
// 3. 发运判定（只读）
// 红线: 就绪度通知失败只记日志,不影响返回值,不回滚已写入的结论
// ==========================================

use std::sync::Arc;

use chrono::Local;
use tracing::instrument;

use crate::api::error::ApiResult;
use crate::domain::types::ValidationStatus;
use crate::domain::validation::{ShippingDecision, ValidationIssue, ValidationResult};
use crate::engine::events::{OptionalReadinessNotifier, ReadinessEvent, ReadinessTrigger};
use crate::engine::pallet_validator::PalletValidator;
use crate::engine::shipping_gate::ShippingGate;
use crate::repository::delivery_repo::DeliveryRepository;
use crate::repository::optimization_repo::PalletOptimizationRepository;

// ==========================================
// PalletValidationApi
// ==========================================
pub struct PalletValidationApi {
    delivery_repo: Arc<DeliveryRepository>,
    optimization_repo: Arc<PalletOptimizationRepository>,
    validator: PalletValidator,
    shipping_gate: ShippingGate,
    readiness_notifier: OptionalReadinessNotifier,
}

impl PalletValidationApi {
    pub fn new(
        delivery_repo: Arc<DeliveryRepository>,
        optimization_repo: Arc<PalletOptimizationRepository>,
        validator: PalletValidator,
        readiness_notifier: OptionalReadinessNotifier,
    ) -> Self {
        Self {
            delivery_repo,
            optimization_repo,
            validator,
            shipping_gate: ShippingGate::new(),
            readiness_notifier,
        }
    }

    /// 校验交付的托盘优化结果
    ///
    /// # 返回
    /// - 无优化结果: is_valid=false + 单条提示错误（不是系统故障）
    /// - 否则: 全量错误与警告
    ///
    /// # 副作用
    /// 有优化结果时,校验后通知就绪度聚合器重算
    #[instrument(skip(self), fields(delivery_id = delivery_id))]
    pub fn validate_pallet_optimization(&self, delivery_id: i64) -> ApiResult<ValidationResult> {
        match self.run_validation(delivery_id)? {
            Some(result) => {
                self.readiness_notifier.notify(ReadinessEvent::new(
                    delivery_id,
                    ReadinessTrigger::PalletValidated,
                ));
                Ok(result)
            }
            None => Ok(missing_optimization_result(delivery_id)),
        }
    }

    /// 写入校验结论
    ///
    /// # 参数
    /// - `status`: 校验状态
    /// - `errors`: 错误列表（None 视为空）
    ///
    /// # 返回
    /// - Err(NotFound): 交付无优化结果
    #[instrument(skip(self, errors), fields(delivery_id = delivery_id, status = %status))]
    pub fn mark_as_validated(
        &self,
        delivery_id: i64,
        status: ValidationStatus,
        errors: Option<Vec<ValidationIssue>>,
    ) -> ApiResult<()> {
        let errors = errors.unwrap_or_default();
        let validated_at = Local::now().naive_local();

        self.optimization_repo
            .update_validation(delivery_id, status, &errors, validated_at)?;

        tracing::info!(
            "校验结论已写入: delivery_id={}, status={}, errors={}",
            delivery_id,
            status,
            errors.len()
        );

        self.readiness_notifier.notify(ReadinessEvent::new(
            delivery_id,
            ReadinessTrigger::ValidationRecorded,
        ));
        Ok(())
    }

    /// 校验并写入结论
    ///
    /// 无优化结果时只返回提示结果,不写库
    #[instrument(skip(self), fields(delivery_id = delivery_id))]
    pub fn validate_and_record(&self, delivery_id: i64) -> ApiResult<ValidationResult> {
        let result = match self.run_validation(delivery_id)? {
            Some(result) => result,
            None => return Ok(missing_optimization_result(delivery_id)),
        };

        // 就绪度只在结论写入后通知一次
        self.mark_as_validated(delivery_id, result.status(), Some(result.errors.clone()))?;
        Ok(result)
    }

    /// 发运判定（只读,无副作用）
    pub fn can_ship_delivery(&self, delivery_id: i64) -> ApiResult<ShippingDecision> {
        let verdict = self.optimization_repo.find_verdict(delivery_id)?;
        let decision = self.shipping_gate.decide(verdict.as_ref());

        if !decision.can_ship {
            tracing::debug!(
                "发运阻断: delivery_id={}, reason={}",
                delivery_id,
                decision.reason.as_deref().unwrap_or("")
            );
        }
        Ok(decision)
    }

    fn run_validation(&self, delivery_id: i64) -> ApiResult<Option<ValidationResult>> {
        let optimization = match self.optimization_repo.find_by_delivery(delivery_id)? {
            Some(o) => o,
            None => {
                tracing::info!("交付尚无托盘优化结果: delivery_id={}", delivery_id);
                return Ok(None);
            }
        };

        let requirements = self.delivery_repo.list_profile_requirements(delivery_id)?;
        let result = self.validator.evaluate(&optimization, &requirements);

        tracing::info!(
            "托盘校验完成: delivery_id={}, is_valid={}, errors={}, warnings={}",
            delivery_id,
            result.is_valid,
            result.errors.len(),
            result.warnings.len()
        );
        Ok(Some(result))
    }
}

fn missing_optimization_result(delivery_id: i64) -> ValidationResult {
    ValidationResult::from_findings(
        vec![ValidationIssue::optimization_missing(delivery_id)],
        Vec::new(),
    )
}
