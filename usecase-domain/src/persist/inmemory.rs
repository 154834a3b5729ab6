//! 内存版持久化提供方（InMemoryStore）
//!
//! 满足 `PersistenceProvider` 协议的参考实现，适用于测试、示例与本地开发：
//! - 写入暂存在作用域内，提交时原子生效，回滚时丢弃；
//! - 乐观并发：作用域首次读到的版本、以及写入时声明的期望版本，
//!   都会在提交时与当前已提交版本比对，不一致即返回冲突；
//! - 记录生命周期计数（`StoreStats`），便于断言每个作用域的提交/回滚/释放次数。
//!
//! 期望版本以 0 表示“记录不存在”。

use super::provider::{PersistenceProvider, ScopeHandle, ScopeId, ScopeMode, Versioned};
use crate::domain_event::CorrelationId;
use crate::error::{DomainError, DomainResult as Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

type Key = (String, String);

struct Staged {
    value: Option<Value>,
    expected: Option<u64>,
}

struct ScopeState {
    mode: ScopeMode,
    finished: bool,
    observed: HashMap<Key, u64>,
    staged: Vec<(Key, Staged)>,
}

/// 生命周期计数
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub begun: usize,
    pub committed: usize,
    pub conflicts: usize,
    pub rolled_back: usize,
    pub released: usize,
}

#[derive(Default)]
struct State {
    records: HashMap<Key, Versioned>,
    scopes: HashMap<ScopeId, ScopeState>,
    stats: StoreStats,
}

impl State {
    fn version_of(&self, key: &Key) -> u64 {
        self.records.get(key).map(|r| r.version).unwrap_or(0)
    }

    fn open_scope(&mut self, scope: &ScopeHandle) -> Result<&mut ScopeState> {
        match self.scopes.get_mut(&scope.id()) {
            Some(s) if !s.finished => Ok(s),
            Some(_) => Err(DomainError::invalid_state(format!(
                "scope {} already committed or rolled back",
                scope.id()
            ))),
            None => Err(DomainError::invalid_state(format!(
                "unknown or released scope {}",
                scope.id()
            ))),
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 绕过作用域直接写入已提交数据（初始化数据或模拟并发写入），返回新版本
    pub fn seed(&self, collection: &str, id: &str, value: Value) -> u64 {
        let mut state = self.lock();
        let key = (collection.to_string(), id.to_string());
        let version = state.version_of(&key) + 1;
        state.records.insert(key, Versioned { value, version });
        version
    }

    /// 读取已提交数据
    pub fn get(&self, collection: &str, id: &str) -> Option<Versioned> {
        self.lock()
            .records
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    pub fn stats(&self) -> StoreStats {
        self.lock().stats
    }

    /// 尚未释放的作用域数量
    pub fn open_scopes(&self) -> usize {
        self.lock().scopes.len()
    }

    fn stage(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
        value: Option<Value>,
        expected: Option<u64>,
    ) -> Result<()> {
        let mut state = self.lock();
        let s = state.open_scope(scope)?;
        if s.mode == ScopeMode::ReadOnly {
            return Err(DomainError::invalid_state(format!(
                "write to {collection}/{id} in a read-only scope"
            )));
        }
        let key = (collection.to_string(), id.to_string());
        s.staged.retain(|(k, _)| k != &key);
        s.staged.push((key, Staged { value, expected }));
        Ok(())
    }
}

#[async_trait]
impl PersistenceProvider for InMemoryStore {
    async fn begin_scope(
        &self,
        mode: ScopeMode,
        correlation_id: &CorrelationId,
    ) -> Result<ScopeHandle> {
        let handle = ScopeHandle::new(mode, correlation_id.clone());
        let mut state = self.lock();
        state.scopes.insert(
            handle.id(),
            ScopeState {
                mode,
                finished: false,
                observed: HashMap::new(),
                staged: Vec::new(),
            },
        );
        state.stats.begun += 1;
        Ok(handle)
    }

    async fn commit(&self, scope: &ScopeHandle) -> Result<()> {
        let mut state = self.lock();
        let s = state.open_scope(scope)?;
        s.finished = true;
        let observed = std::mem::take(&mut s.observed);
        let staged = std::mem::take(&mut s.staged);

        let stale_read = observed
            .iter()
            .find(|(key, seen)| state.version_of(key) != **seen);
        if let Some(((collection, id), seen)) = stale_read {
            let reason = format!(
                "{collection}/{id} changed since read: read version {seen}, now {}",
                state.version_of(&(collection.clone(), id.clone()))
            );
            state.stats.conflicts += 1;
            return Err(DomainError::conflict(reason));
        }

        let stale_write = staged.iter().find_map(|(key, st)| {
            st.expected
                .filter(|expected| *expected != state.version_of(key))
                .map(|expected| (key, expected))
        });
        if let Some(((collection, id), expected)) = stale_write {
            let reason = format!(
                "{collection}/{id}: expected version {expected}, found {}",
                state.version_of(&(collection.clone(), id.clone()))
            );
            state.stats.conflicts += 1;
            return Err(DomainError::conflict(reason));
        }

        for (key, st) in staged {
            match st.value {
                Some(value) => {
                    let version = state.version_of(&key) + 1;
                    state.records.insert(key, Versioned { value, version });
                }
                None => {
                    state.records.remove(&key);
                }
            }
        }
        state.stats.committed += 1;
        Ok(())
    }

    async fn rollback(&self, scope: &ScopeHandle) -> Result<()> {
        let mut state = self.lock();
        let s = state.open_scope(scope)?;
        s.finished = true;
        s.observed.clear();
        s.staged.clear();
        state.stats.rolled_back += 1;
        Ok(())
    }

    fn release(&self, scope: ScopeHandle) {
        let mut state = self.lock();
        if state.scopes.remove(&scope.id()).is_some() {
            state.stats.released += 1;
        } else {
            warn!(scope_id = %scope.id(), "release of unknown scope ignored");
        }
    }

    async fn read(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
    ) -> Result<Option<Versioned>> {
        let mut state = self.lock();
        let key = (collection.to_string(), id.to_string());
        let committed = state.records.get(&key).cloned();
        let s = state.open_scope(scope)?;

        // 先看作用域内暂存的写入（读己之写）
        if let Some((_, st)) = s.staged.iter().find(|(k, _)| k == &key) {
            let version = committed.map(|r| r.version).unwrap_or(0);
            return Ok(st.value.clone().map(|value| Versioned { value, version }));
        }

        // 只读作用域没有写入，无需在提交时校验读到的版本
        if s.mode == ScopeMode::ReadWrite {
            let version = committed.as_ref().map(|r| r.version).unwrap_or(0);
            s.observed.entry(key).or_insert(version);
        }
        Ok(committed)
    }

    async fn write(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
        value: Value,
        expected_version: Option<u64>,
    ) -> Result<()> {
        self.stage(scope, collection, id, Some(value), expected_version)
    }

    async fn remove(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
        expected_version: Option<u64>,
    ) -> Result<()> {
        self.stage(scope, collection, id, None, expected_version)
    }
}
