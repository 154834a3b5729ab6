//! 事件订阅者（EventSubscriber）
//!
//! 定义在事务提交后消费某类/多类/全部领域事件的处理逻辑与元信息（名称、订阅类型）。
//!
use crate::domain_event::DomainEvent;
use async_trait::async_trait;
use std::future::Future;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandledEventType {
    One(String),
    Many(Vec<String>),
    All,
}

impl HandledEventType {
    pub fn matches(&self, event_type: &str) -> bool {
        match self {
            HandledEventType::One(t) => t == event_type,
            HandledEventType::Many(ts) => ts.iter().any(|t| t == event_type),
            HandledEventType::All => true,
        }
    }
}

/// 事件订阅者：处理已提交用例产生的事件
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// 订阅者名称（用于失败上报与审计）
    fn subscriber_name(&self) -> &str;
    /// 返回该订阅者关注的事件类型
    fn handled_event_type(&self) -> HandledEventType;
    /// 处理事件；返回错误不会影响已提交的事务
    async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()>;
}

/// 以闭包实现的订阅者，便于在装配阶段直接注册回调
pub struct FnSubscriber<F> {
    name: String,
    handled: HandledEventType,
    f: F,
}

impl<F, Fut> FnSubscriber<F>
where
    F: Fn(DomainEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, handled: HandledEventType, f: F) -> Self {
        Self {
            name: name.into(),
            handled,
            f,
        }
    }
}

#[async_trait]
impl<F, Fut> EventSubscriber for FnSubscriber<F>
where
    F: Fn(DomainEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn subscriber_name(&self) -> &str {
        &self.name
    }

    fn handled_event_type(&self) -> HandledEventType {
        self.handled.clone()
    }

    async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
        (self.f)(event.clone()).await
    }
}
