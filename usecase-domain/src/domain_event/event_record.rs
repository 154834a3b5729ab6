use crate::error::{DomainError, DomainResult};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::correlation_id::CorrelationId;
use super::event_payload::EventPayload;

/// 领域事件记录：用例执行期间“已发生的事实”，不可变
///
/// 在事务提交前归属于工作单元，提交成功后才移交给事件总线。
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// 事件唯一标识（ULID，按时间有序）
    #[builder(into, default = ulid::Ulid::new().to_string())]
    event_id: String,
    /// 事件类型，用于订阅匹配
    #[builder(into)]
    event_type: String,
    /// 事件负载
    #[builder(default)]
    payload: Value,
    /// 事件发生时间
    #[builder(default = Utc::now())]
    occurred_at: DateTime<Utc>,
    /// 关联标识，记录时由工作单元补齐
    correlation_id: Option<CorrelationId>,
}

impl DomainEvent {
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self::builder().event_type(event_type).payload(payload).build()
    }

    /// 由类型化载荷构造事件
    pub fn from_payload<P: EventPayload>(payload: &P) -> DomainResult<Self> {
        Ok(Self::new(P::EVENT_TYPE, serde_json::to_value(payload)?))
    }

    /// 将负载还原为类型化载荷；事件类型不符时返回错误
    pub fn decode<P: EventPayload>(&self) -> DomainResult<P> {
        if self.event_type != P::EVENT_TYPE {
            return Err(DomainError::invalid_state(format!(
                "event type mismatch: expected={}, found={}",
                P::EVENT_TYPE,
                self.event_type
            )));
        }
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    /// 若尚未携带关联标识，则补齐
    pub fn with_correlation_id(mut self, id: &CorrelationId) -> Self {
        if self.correlation_id.is_none() {
            self.correlation_id = Some(id.clone());
        }
        self
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn occurred_at(&self) -> &DateTime<Utc> {
        &self.occurred_at
    }

    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        self.correlation_id.as_ref()
    }
}
