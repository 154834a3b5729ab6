//! 持久化提供方协议（PersistenceProvider）
//!
//! 核心只消费该协议，不实现任何存储引擎：
//! - `begin_scope` / `commit` / `rollback` / `release`：事务作用域生命周期；
//! - `read` / `write` / `remove`：绑定到作用域的仓储式读写。
//!
//! 提交时检测到并发的不兼容修改必须返回 `DomainError::Conflict`。
//!
use crate::{domain_event::CorrelationId, error::DomainResult as Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// 作用域模式：命令可写，查询只读
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeMode {
    ReadWrite,
    ReadOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(Uuid);

impl ScopeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 一个事务上下文的句柄；由提供方在 `begin_scope` 中签发
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeHandle {
    id: ScopeId,
    mode: ScopeMode,
    correlation_id: CorrelationId,
}

impl ScopeHandle {
    pub fn new(mode: ScopeMode, correlation_id: CorrelationId) -> Self {
        Self {
            id: ScopeId::new(),
            mode,
            correlation_id,
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn mode(&self) -> ScopeMode {
        self.mode
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }
}

/// 带版本的记录（乐观并发控制）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Versioned {
    pub value: Value,
    pub version: u64,
}

#[async_trait]
pub trait PersistenceProvider: Send + Sync {
    /// 打开事务上下文
    async fn begin_scope(
        &self,
        mode: ScopeMode,
        correlation_id: &CorrelationId,
    ) -> Result<ScopeHandle>;

    /// 持久化作用域内的全部修改；并发冲突返回 `DomainError::Conflict`
    async fn commit(&self, scope: &ScopeHandle) -> Result<()>;

    /// 丢弃作用域内的全部修改
    async fn rollback(&self, scope: &ScopeHandle) -> Result<()>;

    /// 释放作用域占用的资源（连接归还等）；每个作用域恰好调用一次
    fn release(&self, scope: ScopeHandle);

    async fn read(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
    ) -> Result<Option<Versioned>>;

    /// 暂存写入；`expected_version` 为 `Some` 时在提交时校验
    async fn write(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
        value: Value,
        expected_version: Option<u64>,
    ) -> Result<()>;

    async fn remove(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
        expected_version: Option<u64>,
    ) -> Result<()>;
}

#[async_trait]
impl<T> PersistenceProvider for Arc<T>
where
    T: PersistenceProvider + ?Sized,
{
    async fn begin_scope(
        &self,
        mode: ScopeMode,
        correlation_id: &CorrelationId,
    ) -> Result<ScopeHandle> {
        (**self).begin_scope(mode, correlation_id).await
    }

    async fn commit(&self, scope: &ScopeHandle) -> Result<()> {
        (**self).commit(scope).await
    }

    async fn rollback(&self, scope: &ScopeHandle) -> Result<()> {
        (**self).rollback(scope).await
    }

    fn release(&self, scope: ScopeHandle) {
        (**self).release(scope)
    }

    async fn read(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
    ) -> Result<Option<Versioned>> {
        (**self).read(scope, collection, id).await
    }

    async fn write(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
        value: Value,
        expected_version: Option<u64>,
    ) -> Result<()> {
        (**self)
            .write(scope, collection, id, value, expected_version)
            .await
    }

    async fn remove(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
        expected_version: Option<u64>,
    ) -> Result<()> {
        (**self).remove(scope, collection, id, expected_version).await
    }
}
