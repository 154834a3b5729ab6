//! 事件总线（EventBus）协议
//!
//! 在事务提交成功后由调度器调用 `flush`，将作用域内记录的事件按记录顺序
//! 投递给匹配的订阅者。订阅者失败只会被收集并上报，不会撤销已提交的事务。
//!
use crate::domain_event::DomainEvent;
use async_trait::async_trait;
use serde::Serialize;

/// 单次投递失败
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeliveryFailure {
    pub subscriber: String,
    pub event_id: String,
    pub event_type: String,
    pub reason: String,
}

/// 一次 flush 的投递结果
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    /// 参与投递的事件数
    pub events: usize,
    /// 成功投递次数（事件 × 订阅者）
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl FlushReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 事件总线：负责把已提交的事件分发给订阅者
#[async_trait]
pub trait EventBus: Send + Sync {
    /// 投递一个已提交作用域的全部事件（按记录顺序）
    async fn flush(&self, events: Vec<DomainEvent>) -> FlushReport;
}
