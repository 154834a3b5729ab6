//! 处理器注册表（HandlerRegistry）
//!
//! 以请求名称为键登记处理器：
//! - 注册阶段只发生在进程启动装配期，同一请求名重复注册视为配置错误；
//! - `seal` 之后不再接受注册（构造调度器时自动封存），
//!   此后 `resolve` 为只读操作，可被并发调用。
//!
use crate::{
    command::Command,
    command_handler::CommandHandler,
    error::AppError,
    handler::{CommandAdapter, QueryAdapter, RequestHandler},
    query::Query,
    query_handler::QueryHandler,
    request::{Request, RequestKind},
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use usecase_domain::error::Failure;

#[derive(Clone)]
struct Registration {
    kind: RequestKind,
    handler: Arc<dyn RequestHandler>,
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: DashMap<String, Registration>,
    sealed: AtomicBool,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册处理器
    pub fn register(
        &self,
        kind: RequestKind,
        request: impl Into<String>,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), AppError> {
        let request = request.into();
        if self.is_sealed() {
            return Err(AppError::RegistrySealed { request });
        }

        match self.handlers.entry(request) {
            Entry::Occupied(e) => Err(AppError::AlreadyRegistered {
                request: e.key().clone(),
            }),
            Entry::Vacant(e) => {
                e.insert(Registration { kind, handler });
                Ok(())
            }
        }
    }

    /// 注册类型化命令处理器
    pub fn register_command<C, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let adapter = CommandAdapter::<C, H>::new(handler);
        self.register(RequestKind::Command, C::NAME, Arc::new(adapter))
    }

    /// 注册类型化查询处理器
    pub fn register_query<Q, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let adapter = QueryAdapter::<Q, H>::new(handler);
        self.register(RequestKind::Query, Q::NAME, Arc::new(adapter))
    }

    /// 按请求名称解析处理器；未注册返回 `NotFound`
    pub fn resolve(&self, request: &str) -> Result<Arc<dyn RequestHandler>, Failure> {
        self.handlers
            .get(request)
            .map(|r| r.handler.clone())
            .ok_or_else(|| Failure::not_found(format!("no handler registered for {request}")))
    }

    /// 解析并校验请求类别（命令名不能以查询身份调度，反之亦然）
    pub(crate) fn resolve_request(
        &self,
        request: &Request,
    ) -> Result<Arc<dyn RequestHandler>, Failure> {
        match self.handlers.get(request.name()).map(|r| r.clone()) {
            Some(Registration { kind, handler }) if kind == request.kind() => Ok(handler),
            _ => Err(Failure::not_found(format!(
                "no {} handler registered for {}",
                request.kind(),
                request.name()
            ))),
        }
    }

    /// 结束注册阶段
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// 获取已注册的请求名列表（排序后的只读视图）
    pub fn registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
