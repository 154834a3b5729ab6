//! 领域层统一错误定义
//!
//! 分为两类：
//! - `Failure`：面向调用方的用例失败分类（封闭集合），由处理器或工作单元产生，
//!   以值的形式返回给边界层；
//! - `DomainError`：基础设施/状态类错误（存储、序列化、作用域状态等），
//!   在用例边界统一转换为 `Failure`。
//!
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// 失败的结构化补充信息（字段名 -> 值）
pub type Details = Map<String, Value>;

/// 用例失败（封闭分类）
///
/// 新增变体必须同步更新所有穷尽匹配（例如错误翻译），因此这里刻意不加
/// `#[non_exhaustive]`。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Failure {
    #[error("validation: {message}")]
    Validation {
        message: String,
        details: Option<Details>,
    },

    #[error("unauthorized: {message}")]
    Unauthorized {
        message: String,
        details: Option<Details>,
    },

    #[error("not found: {message}")]
    NotFound {
        message: String,
        details: Option<Details>,
    },

    #[error("conflict: {message}")]
    Conflict {
        message: String,
        details: Option<Details>,
    },

    /// 非预期故障；`internal` 仅用于服务端日志，不得透出给调用方
    #[error("unexpected: {message}")]
    Unexpected {
        message: String,
        details: Option<Details>,
        internal: Option<String>,
    },
}

/// 失败类别（不携带数据，便于日志与统计）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Unauthorized,
    NotFound,
    Conflict,
    Unexpected,
}

impl FailureKind {
    pub const ALL: [FailureKind; 5] = [
        FailureKind::Validation,
        FailureKind::Unauthorized,
        FailureKind::NotFound,
        FailureKind::Conflict,
        FailureKind::Unexpected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Unauthorized => "unauthorized",
            FailureKind::NotFound => "not_found",
            FailureKind::Conflict => "conflict",
            FailureKind::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Failure {
    pub fn validation(message: impl Into<String>) -> Self {
        Failure::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Failure::Unauthorized {
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Failure::NotFound {
            message: message.into(),
            details: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Failure::Conflict {
            message: message.into(),
            details: None,
        }
    }

    /// 包装非预期故障：对外消息固定，内部细节仅保留在 `internal`
    pub fn unexpected(internal: impl fmt::Display) -> Self {
        Failure::Unexpected {
            message: "unexpected failure".to_string(),
            details: None,
            internal: Some(internal.to_string()),
        }
    }

    /// 附加结构化细节
    pub fn with_details(mut self, extra: Details) -> Self {
        match &mut self {
            Failure::Validation { details, .. }
            | Failure::Unauthorized { details, .. }
            | Failure::NotFound { details, .. }
            | Failure::Conflict { details, .. }
            | Failure::Unexpected { details, .. } => *details = Some(extra),
        }
        self
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Failure::Validation { .. } => FailureKind::Validation,
            Failure::Unauthorized { .. } => FailureKind::Unauthorized,
            Failure::NotFound { .. } => FailureKind::NotFound,
            Failure::Conflict { .. } => FailureKind::Conflict,
            Failure::Unexpected { .. } => FailureKind::Unexpected,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Failure::Validation { message, .. }
            | Failure::Unauthorized { message, .. }
            | Failure::NotFound { message, .. }
            | Failure::Conflict { message, .. }
            | Failure::Unexpected { message, .. } => message,
        }
    }

    pub fn details(&self) -> Option<&Details> {
        match self {
            Failure::Validation { details, .. }
            | Failure::Unauthorized { details, .. }
            | Failure::NotFound { details, .. }
            | Failure::Conflict { details, .. }
            | Failure::Unexpected { details, .. } => details.as_ref(),
        }
    }

    /// 服务端内部细节（仅 `Unexpected` 携带）
    pub fn internal(&self) -> Option<&str> {
        match self {
            Failure::Unexpected { internal, .. } => internal.as_deref(),
            _ => None,
        }
    }

    pub fn is_unexpected(&self) -> bool {
        matches!(self, Failure::Unexpected { .. })
    }
}

/// 基础设施/状态类错误
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 作用域/状态 ---
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    // --- 仓储/持久化 ---
    #[error("version conflict: {reason}")]
    Conflict { reason: String },
    #[error("not found: {reason}")]
    NotFound { reason: String },
    #[error("store error: {reason}")]
    Store { reason: String },
}

impl DomainError {
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        DomainError::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        DomainError::Conflict {
            reason: reason.into(),
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        DomainError::NotFound {
            reason: reason.into(),
        }
    }

    pub fn store(reason: impl Into<String>) -> Self {
        DomainError::Store {
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

// 冲突与缺失是调用方可处理的结果，其余一律视为非预期故障
impl From<DomainError> for Failure {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Conflict { reason } => Failure::conflict(reason),
            DomainError::NotFound { reason } => Failure::not_found(reason),
            other => Failure::unexpected(other),
        }
    }
}

#[cfg(feature = "infra-sqlx")]
impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DomainError::not_found("row not found"),
            // 40001 serialization_failure / 40P01 deadlock_detected
            sqlx::Error::Database(db)
                if matches!(db.code().as_deref(), Some("40001") | Some("40P01")) =>
            {
                DomainError::conflict(db.message().to_string())
            }
            other => DomainError::store(other.to_string()),
        }
    }
}
