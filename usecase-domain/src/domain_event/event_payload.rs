use serde::Serialize;
use serde::de::DeserializeOwned;

/// 类型化事件载荷需要满足的能力边界
///
/// 通常通过 `#[event_payload(event_type = "...")]` 宏实现。
pub trait EventPayload: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// 事件类型（稳定名称，形如 `user.created`）
    const EVENT_TYPE: &'static str;
}
