//! 工作单元（UnitOfWork）
//!
//! 一次调度对应一个事务作用域：
//! - 处理器拿到的 [`UnitOfWork`] 只能读写与记录事件，不能提交或回滚；
//! - 提交/回滚/释放由调度器通过 [`ScopeGuard`] 完成，每个作用域恰好一次；
//! - 调度被取消（future 被丢弃）或处理器 panic 时，`ScopeGuard` 在析构中
//!   丢弃已记录事件，并在当前运行时上补做回滚与释放。
//!
use crate::request::RequestKind;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use usecase_domain::domain_event::{CorrelationId, DomainEvent, EventPayload};
use usecase_domain::error::{DomainError, DomainResult, Failure};
use usecase_domain::eventing::{EventBuffer, EventRecorder};
use usecase_domain::persist::{PersistenceProvider, ScopeHandle, ScopeId, ScopeMode, Versioned};

/// 面向处理器的工作单元句柄
pub struct UnitOfWork {
    provider: Arc<dyn PersistenceProvider>,
    scope: ScopeHandle,
    recorder: EventRecorder,
    kind: RequestKind,
}

impl UnitOfWork {
    pub fn scope_id(&self) -> ScopeId {
        self.scope.id()
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        self.scope.correlation_id()
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn mode(&self) -> ScopeMode {
        self.scope.mode()
    }

    pub async fn read(&self, collection: &str, id: &str) -> Result<Option<Versioned>, Failure> {
        Ok(self.provider.read(&self.scope, collection, id).await?)
    }

    /// 暂存写入；查询作用域内返回 `Unexpected`
    pub async fn write(
        &self,
        collection: &str,
        id: &str,
        value: Value,
        expected_version: Option<u64>,
    ) -> Result<(), Failure> {
        self.ensure_writable(collection, id)?;
        Ok(self
            .provider
            .write(&self.scope, collection, id, value, expected_version)
            .await?)
    }

    pub async fn remove(
        &self,
        collection: &str,
        id: &str,
        expected_version: Option<u64>,
    ) -> Result<(), Failure> {
        self.ensure_writable(collection, id)?;
        Ok(self
            .provider
            .remove(&self.scope, collection, id, expected_version)
            .await?)
    }

    /// 读取并反序列化，返回值与版本
    pub async fn load<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<(T, u64)>, Failure> {
        match self.read(collection, id).await? {
            Some(Versioned { value, version }) => {
                let value = serde_json::from_value(value).map_err(|err| {
                    Failure::unexpected(format!("decode {collection}/{id}: {err}"))
                })?;
                Ok(Some((value, version)))
            }
            None => Ok(None),
        }
    }

    /// 序列化并暂存写入
    pub async fn save<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        value: &T,
        expected_version: Option<u64>,
    ) -> Result<(), Failure> {
        let value = serde_json::to_value(value)
            .map_err(|err| Failure::unexpected(format!("encode {collection}/{id}: {err}")))?;
        self.write(collection, id, value, expected_version).await
    }

    /// 记录领域事件，提交成功后才会投递
    pub fn record(&self, event: DomainEvent) -> Result<(), Failure> {
        Ok(self.recorder.record(event)?)
    }

    pub fn record_payload<P: EventPayload>(&self, payload: &P) -> Result<(), Failure> {
        Ok(self.recorder.record_payload(payload)?)
    }

    /// 可克隆的事件记录句柄；作用域结束后记录会失败
    pub fn recorder(&self) -> EventRecorder {
        self.recorder.clone()
    }

    fn ensure_writable(&self, collection: &str, id: &str) -> Result<(), Failure> {
        match self.mode() {
            ScopeMode::ReadWrite => Ok(()),
            ScopeMode::ReadOnly => Err(DomainError::invalid_state(format!(
                "write to {collection}/{id} in a query scope"
            ))
            .into()),
        }
    }
}

/// 作用域生命周期守卫，仅供调度器使用
pub(crate) struct ScopeGuard {
    uow: UnitOfWork,
    buffer: Option<EventBuffer>,
    /// 已发起 commit 或 rollback
    finished: bool,
    released: bool,
}

impl ScopeGuard {
    pub(crate) async fn begin(
        provider: Arc<dyn PersistenceProvider>,
        kind: RequestKind,
        correlation_id: &CorrelationId,
    ) -> DomainResult<Self> {
        let mode = match kind {
            RequestKind::Command => ScopeMode::ReadWrite,
            RequestKind::Query => ScopeMode::ReadOnly,
        };
        let scope = provider.begin_scope(mode, correlation_id).await?;
        let buffer = match kind {
            RequestKind::Command => EventBuffer::new(correlation_id.clone()),
            RequestKind::Query => EventBuffer::read_only(correlation_id.clone()),
        };
        debug!(scope_id = %scope.id(), %kind, "scope begun");

        Ok(Self {
            uow: UnitOfWork {
                provider,
                scope,
                recorder: buffer.recorder().clone(),
                kind,
            },
            buffer: Some(buffer),
            finished: false,
            released: false,
        })
    }

    pub(crate) fn uow(&self) -> &UnitOfWork {
        &self.uow
    }

    /// 提交并释放；成功时返回按记录顺序排列的事件，失败时事件被丢弃
    pub(crate) async fn commit(mut self) -> DomainResult<Vec<DomainEvent>> {
        let events = self
            .buffer
            .take()
            .map(EventBuffer::seal_and_take)
            .unwrap_or_default();
        self.finished = true;
        let result = self.uow.provider.commit(&self.uow.scope).await;
        self.release();
        result.map(|()| events)
    }

    /// 回滚并释放，返回被丢弃的事件数量
    pub(crate) async fn rollback(mut self) -> DomainResult<usize> {
        let dropped = self
            .buffer
            .take()
            .map(EventBuffer::seal_and_discard)
            .unwrap_or(0);
        self.finished = true;
        let result = self.uow.provider.rollback(&self.uow.scope).await;
        self.release();
        result.map(|()| dropped)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.uow.provider.release(self.uow.scope.clone());
        }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            let dropped = buffer.seal_and_discard();
            if dropped > 0 {
                debug!(
                    scope_id = %self.uow.scope.id(),
                    dropped,
                    "discarded events of abandoned scope"
                );
            }
        }
        if self.released {
            return;
        }
        if self.finished {
            self.release();
            return;
        }

        self.released = true;
        let provider = self.uow.provider.clone();
        let scope = self.uow.scope.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = provider.rollback(&scope).await {
                        warn!(
                            scope_id = %scope.id(),
                            error = %err,
                            "rollback of abandoned scope failed"
                        );
                    }
                    provider.release(scope);
                });
            }
            Err(_) => {
                warn!(
                    scope_id = %scope.id(),
                    "no runtime to roll back abandoned scope, releasing"
                );
                provider.release(scope);
            }
        }
    }
}
