use bon::Builder;
use serde::{Deserialize, Serialize};

/// 业务上下文信息
#[derive(Builder, Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessContext {
    /// 因果ID
    #[builder(into)]
    causation_id: Option<String>,
    /// 触发请求的主体类型（如用户、系统等）
    #[builder(into)]
    actor_type: Option<String>,
    /// 触发请求的主体ID
    #[builder(into)]
    actor_id: Option<String>,
}

impl BusinessContext {
    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn actor_type(&self) -> Option<&str> {
        self.actor_type.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }
}
