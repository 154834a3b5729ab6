//! 应用层：用例调度核心
//!
//! - [`registry::HandlerRegistry`]：请求名 -> 处理器；
//! - [`unit_of_work::UnitOfWork`]：一次调度一个事务作用域，提交后才投递事件；
//! - [`dispatcher::Dispatcher`]：解析、执行、提交/回滚、投递；
//! - [`translator`]：失败分类 -> 对外错误信封。
//!
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod dto;
pub mod error;
pub mod handler;
pub mod query;
pub mod query_bus;
pub mod query_handler;
pub mod registry;
pub mod request;
pub mod telemetry;
pub mod translator;
pub mod unit_of_work;

pub use command_bus::CommandBus;
pub use dispatcher::{Dispatched, Dispatcher};
pub use query_bus::QueryBus;
pub use registry::HandlerRegistry;
pub use translator::{ErrorEnvelope, translate};

// 便于宏在本 crate 内部以绝对路径引用自身
extern crate self as usecase_application;
