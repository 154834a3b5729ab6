use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 关联标识：在边界层附加到请求上，贯穿调度、工作单元、事件与错误响应，
/// 仅用于追踪，不参与业务判断。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// 生成新的关联标识（UUIDv7，按时间有序）
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 直接沿用入站消息携带的标识（例如 `X-Correlation-Id` 请求头）
impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(CorrelationId::new(), CorrelationId::new());
    }

    #[test]
    fn inbound_id_is_kept_verbatim() {
        let id = CorrelationId::from("req-42");
        assert_eq!(id.as_str(), "req-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"req-42\"");
    }
}
