//! 订阅者注册表（SubscriberRegistry）
//!
//! 在启动阶段登记订阅者，之后以只读方式供事件总线按事件类型匹配：
//! 先返回精确订阅该类型的订阅者，再返回订阅全部事件的订阅者，各自保持登记顺序。
//!
use super::subscriber::{EventSubscriber, FnSubscriber, HandledEventType};
use crate::domain_event::DomainEvent;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    by_type: HashMap<String, Vec<Arc<dyn EventSubscriber>>>,
    all: Vec<Arc<dyn EventSubscriber>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记订阅者
    pub fn subscribe(&mut self, subscriber: Arc<dyn EventSubscriber>) -> &mut Self {
        match subscriber.handled_event_type() {
            HandledEventType::All => self.all.push(subscriber),
            HandledEventType::One(t) => {
                self.by_type.entry(t).or_default().push(subscriber);
            }
            HandledEventType::Many(ts) => {
                let unique: BTreeSet<String> = ts.into_iter().collect();
                for t in unique {
                    self.by_type.entry(t).or_default().push(subscriber.clone());
                }
            }
        }
        self
    }

    /// 以闭包登记单一事件类型的订阅者
    pub fn subscribe_fn<F, Fut>(
        &mut self,
        name: impl Into<String>,
        event_type: impl Into<String>,
        f: F,
    ) -> &mut Self
    where
        F: Fn(DomainEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let subscriber = FnSubscriber::new(name, HandledEventType::One(event_type.into()), f);
        self.subscribe(Arc::new(subscriber))
    }

    pub fn matching(&self, event_type: &str) -> Vec<Arc<dyn EventSubscriber>> {
        let mut merged: Vec<Arc<dyn EventSubscriber>> = Vec::new();
        if let Some(list) = self.by_type.get(event_type) {
            merged.extend(list.iter().cloned());
        }
        merged.extend(self.all.iter().cloned());
        merged
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty() && self.all.is_empty()
    }
}
