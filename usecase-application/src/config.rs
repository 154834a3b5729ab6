//! 调度器配置
use serde::{Deserialize, Serialize};

/// 调度器配置，可由宿主从任意 serde 数据源加载
///
/// ```rust
/// use usecase_application::config::DispatcherConfig;
///
/// let cfg: DispatcherConfig = serde_json::from_str("{}").unwrap();
/// assert_eq!(cfg.public_unexpected_message, "internal server error");
///
/// let cfg: DispatcherConfig =
///     serde_json::from_str(r#"{"public_unexpected_message": "try again later"}"#).unwrap();
/// assert_eq!(cfg, DispatcherConfig { public_unexpected_message: "try again later".into() });
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// `Unexpected` 对外展示的固定消息
    pub public_unexpected_message: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            public_unexpected_message: "internal server error".to_string(),
        }
    }
}
