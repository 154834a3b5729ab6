//! 投递失败接收器（DeliveryFailureSink）
//!
//! 承接提交后订阅者处理失败的事件，便于外部以 Outbox/补偿任务重投。
//! 重试策略由接入方决定，核心只负责上报。
//!
use crate::{domain_event::DomainEvent, error::DomainResult as Result};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

#[async_trait]
pub trait DeliveryFailureSink: Send + Sync {
    /// 订阅者粒度的失败标记（区分具体订阅者出错）
    async fn mark_failed(
        &self,
        subscriber: &str,
        event: &DomainEvent,
        reason: &str,
    ) -> Result<()>;
}

/// 待重投的失败记录
#[derive(Clone, Debug, PartialEq)]
pub struct FailedDelivery {
    pub subscriber: String,
    pub event: DomainEvent,
    pub reason: String,
}

/// 内存版失败接收器，适用于测试与本地开发
#[derive(Default)]
pub struct InMemoryDeliveryFailures {
    stored: Mutex<Vec<FailedDelivery>>,
}

impl InMemoryDeliveryFailures {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出全部待重投记录
    pub fn drain(&self) -> Vec<FailedDelivery> {
        let mut stored = self.stored.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *stored)
    }

    pub fn len(&self) -> usize {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DeliveryFailureSink for InMemoryDeliveryFailures {
    async fn mark_failed(
        &self,
        subscriber: &str,
        event: &DomainEvent,
        reason: &str,
    ) -> Result<()> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FailedDelivery {
                subscriber: subscriber.to_string(),
                event: event.clone(),
                reason: reason.to_string(),
            });
        Ok(())
    }
}
