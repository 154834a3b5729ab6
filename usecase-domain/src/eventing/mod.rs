//! 事件子系统（eventing）
//!
//! 领域事件遵循“先缓存、提交后投递”的模型：
//! - `EventBuffer` / `EventRecorder`：作用域内缓存处理器记录的事件；
//! - `EventBus`：提交成功后按记录顺序投递给订阅者，返回 `FlushReport`；
//! - `SubscriberRegistry` / `EventSubscriber`：按事件类型登记订阅者；
//! - `DeliveryFailureSink`：承接投递失败，供外部重投。
//!
//! 回滚作用域中的事件永远不会被投递。
//!
pub mod bus;
pub mod bus_inprocess;
pub mod failure_sink;
pub mod recorder;
pub mod registry;
pub mod subscriber;

pub use bus::{DeliveryFailure, EventBus, FlushReport};
pub use bus_inprocess::InProcessEventBus;
pub use failure_sink::{DeliveryFailureSink, FailedDelivery, InMemoryDeliveryFailures};
pub use recorder::{EventBuffer, EventRecorder};
pub use registry::SubscriberRegistry;
pub use subscriber::{EventSubscriber, FnSubscriber, HandledEventType};
