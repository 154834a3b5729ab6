//! 领域事件（Domain Event）与调用语境
//!
//! 定义用例执行期间记录的事件记录（`DomainEvent`）、类型化载荷需要实现的
//! 最小接口（`EventPayload`），以及贯穿一次调用的关联标识与业务语境。

mod business_context;
mod correlation_id;
mod event_payload;
mod event_record;

pub use business_context::BusinessContext;
pub use correlation_id::CorrelationId;
pub use event_payload::EventPayload;
pub use event_record::DomainEvent;
