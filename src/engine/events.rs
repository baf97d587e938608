// ==========================================
// 托盘装载优化系统 - 交付就绪度通知
// ==========================================
// 职责: 定义"交付就绪度重算"通知 trait，实现依赖倒置
// 说明: 就绪度聚合器属于外部协作方,本系统只负责通知
// 红线: 通知失败只记日志,不影响校验结果,不回滚校验写入
// ==========================================

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 通知触发类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessTrigger {
    /// 执行了托盘校验
    PalletValidated,
    /// 写入了校验结论
    ValidationRecorded,
}

impl ReadinessTrigger {
    pub fn as_str(&self) -> &str {
        match self {
            ReadinessTrigger::PalletValidated => "PalletValidated",
            ReadinessTrigger::ValidationRecorded => "ValidationRecorded",
        }
    }
}

/// 就绪度重算事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessEvent {
    pub delivery_id: i64,
    pub trigger: ReadinessTrigger,
}

impl ReadinessEvent {
    pub fn new(delivery_id: i64, trigger: ReadinessTrigger) -> Self {
        Self {
            delivery_id,
            trigger,
        }
    }
}

// ==========================================
// 通知 Trait
// ==========================================

/// 交付就绪度聚合器
///
/// 由外部(订单/交付模块)实现,收到通知后自行决定是否重算
pub trait ReadinessNotifier: Send + Sync {
    /// 请求重算（fire-and-forget,返回值仅用于记录失败）
    fn recalculate_if_needed(&self, event: ReadinessEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作通知器
///
/// 用于未接入就绪度聚合器的场景（如单元测试、命令行）
#[derive(Debug, Clone, Default)]
pub struct NoOpReadinessNotifier;

impl ReadinessNotifier for NoOpReadinessNotifier {
    fn recalculate_if_needed(&self, event: ReadinessEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpReadinessNotifier: 跳过就绪度重算 - delivery_id={}, trigger={}",
            event.delivery_id,
            event.trigger.as_str()
        );
        Ok(())
    }
}

/// 可选通知器包装,统一吞掉并记录失败
pub struct OptionalReadinessNotifier {
    inner: Option<Arc<dyn ReadinessNotifier>>,
}

impl OptionalReadinessNotifier {
    pub fn with_notifier(notifier: Arc<dyn ReadinessNotifier>) -> Self {
        Self {
            inner: Some(notifier),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    /// 尽力通知: 失败只记 warn
    pub fn notify(&self, event: ReadinessEvent) {
        let Some(notifier) = &self.inner else {
            tracing::debug!(
                "OptionalReadinessNotifier: 未配置通知器 - delivery_id={}",
                event.delivery_id
            );
            return;
        };

        let delivery_id = event.delivery_id;
        let trigger = event.trigger;
        if let Err(e) = notifier.recalculate_if_needed(event) {
            tracing::warn!(
                "交付就绪度重算通知失败(已忽略): delivery_id={}, trigger={}, error={}",
                delivery_id,
                trigger.as_str(),
                e
            );
        }
    }
}

impl Default for OptionalReadinessNotifier {
    fn default() -> Self {
        Self::none()
    }
}
