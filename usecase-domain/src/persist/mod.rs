//! 持久化协议（persist）
//!
//! 定义核心消费的事务作用域与作用域内读写协议（`PersistenceProvider`），
//! 以及一个用于测试与示例的内存实现（`InMemoryStore`）。
//!
//! 具体存储后端（如 Postgres）由上层实现该协议并注入。
//!
mod inmemory;
mod provider;

pub use inmemory::{InMemoryStore, StoreStats};
pub use provider::{PersistenceProvider, ScopeHandle, ScopeId, ScopeMode, Versioned};
