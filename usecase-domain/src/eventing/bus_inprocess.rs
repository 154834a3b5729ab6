//! 进程内事件总线（InProcessEventBus）
//!
//! 依次把每个事件投递给匹配的订阅者（事件按记录顺序，订阅者按登记顺序），
//! 不做并发扇出。订阅者返回错误或 panic 都会被捕获：写入 `FlushReport`、
//! 记录 `warn` 日志，并转交给可选的 `DeliveryFailureSink`。
//!
use super::bus::{DeliveryFailure, EventBus, FlushReport};
use super::failure_sink::DeliveryFailureSink;
use super::registry::SubscriberRegistry;
use crate::domain_event::DomainEvent;
use async_trait::async_trait;
use bon::Builder;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, warn};

#[derive(Builder, Clone)]
pub struct InProcessEventBus {
    #[builder(into)]
    registry: Arc<SubscriberRegistry>,
    failure_sink: Option<Arc<dyn DeliveryFailureSink>>,
}

impl InProcessEventBus {
    pub fn new(registry: SubscriberRegistry) -> Self {
        Self::builder().registry(registry).build()
    }

    async fn report_failure(&self, subscriber: &str, event: &DomainEvent, reason: &str) {
        warn!(
            subscriber,
            event_id = event.event_id(),
            event_type = event.event_type(),
            correlation_id = event.correlation_id().map(|c| c.as_str()),
            reason,
            "event delivery failed"
        );

        if let Some(sink) = &self.failure_sink {
            if let Err(err) = sink.mark_failed(subscriber, event, reason).await {
                error!(
                    subscriber,
                    event_id = event.event_id(),
                    error = %err,
                    "failed to hand over undelivered event"
                );
            }
        }
    }
}

#[async_trait]
impl EventBus for InProcessEventBus {
    async fn flush(&self, events: Vec<DomainEvent>) -> FlushReport {
        let mut report = FlushReport {
            events: events.len(),
            ..FlushReport::default()
        };

        for event in &events {
            for subscriber in self.registry.matching(event.event_type()) {
                let outcome = AssertUnwindSafe(subscriber.handle(event))
                    .catch_unwind()
                    .await;
                let reason = match outcome {
                    Ok(Ok(())) => {
                        report.delivered += 1;
                        continue;
                    }
                    Ok(Err(err)) => format!("{err:#}"),
                    Err(_) => "subscriber panicked".to_string(),
                };

                let name = subscriber.subscriber_name();
                self.report_failure(name, event, &reason).await;
                report.failures.push(DeliveryFailure {
                    subscriber: name.to_string(),
                    event_id: event.event_id().to_string(),
                    event_type: event.event_type().to_string(),
                    reason,
                });
            }
        }

        report
    }
}
