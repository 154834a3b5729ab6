//! 错误翻译（Failure -> ErrorEnvelope）
//!
//! 纯函数、全覆盖：每个失败类别都映射到固定状态码。
//! `Unexpected` 的消息替换为固定的公开消息，细节与内部信息一律不透出。
//!
use crate::config::DispatcherConfig;
use serde::{Deserialize, Serialize};
use usecase_domain::domain_event::CorrelationId;
use usecase_domain::error::{Details, Failure, FailureKind};

/// 对外错误信封
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub code: u16,
    pub message: String,
    pub correlation_id: CorrelationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
}

pub fn status_code(kind: FailureKind) -> u16 {
    match kind {
        FailureKind::Validation => 400,
        FailureKind::Unauthorized => 401,
        FailureKind::NotFound => 404,
        FailureKind::Conflict => 409,
        FailureKind::Unexpected => 500,
    }
}

#[derive(Clone, Debug)]
pub struct ErrorTranslator {
    public_unexpected_message: String,
}

impl Default for ErrorTranslator {
    fn default() -> Self {
        Self::from_config(&DispatcherConfig::default())
    }
}

impl ErrorTranslator {
    pub fn new(public_unexpected_message: impl Into<String>) -> Self {
        Self {
            public_unexpected_message: public_unexpected_message.into(),
        }
    }

    pub fn from_config(config: &DispatcherConfig) -> Self {
        Self::new(config.public_unexpected_message.clone())
    }

    pub fn translate(&self, failure: &Failure, correlation_id: &CorrelationId) -> ErrorEnvelope {
        let (message, details) = match failure {
            Failure::Validation { message, details }
            | Failure::Unauthorized { message, details }
            | Failure::NotFound { message, details }
            | Failure::Conflict { message, details } => (message.clone(), details.clone()),
            Failure::Unexpected { .. } => (self.public_unexpected_message.clone(), None),
        };

        ErrorEnvelope {
            code: status_code(failure.kind()),
            message,
            correlation_id: correlation_id.clone(),
            details,
        }
    }
}

/// 使用缺省公开消息翻译
pub fn translate(failure: &Failure, correlation_id: &CorrelationId) -> ErrorEnvelope {
    ErrorTranslator::default().translate(failure, correlation_id)
}
