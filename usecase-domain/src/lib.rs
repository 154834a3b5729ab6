//! 用例编排领域层基础库（usecase-domain）
//!
//! 提供用例编排核心依赖的领域层构件：
//! - 失败分类（`error::Failure`）与基础设施错误（`error::DomainError`）
//! - 领域事件记录、关联标识与业务语境（`domain_event`）
//! - 事件子系统（`eventing`）：作用域事件缓冲、提交后投递、订阅者登记与失败上报
//! - 持久化协议（`persist`）：事务作用域与作用域内读写
//!
//! 本 crate 不绑定任何存储或传输实现，仅定义协议与最小必要的参考实现，
//! 以便在不同基础设施上进行适配。
//!
pub mod domain_event;
pub mod error;
pub mod eventing;
pub mod persist;

// 允许在本 crate 内部通过 ::usecase_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::usecase_domain 路径。
extern crate self as usecase_domain;
