//! 请求处理器（RequestHandler）
//!
//! 调度器只认识一个契约：`handle(ctx, uow, request) -> Result<Reply, Failure>`。
//! 类型化的 [`CommandHandler`] / [`QueryHandler`] 在注册时被适配为该契约：
//! 负载解码失败返回 `Validation`，查询结果序列化为 JSON 回传。
//!
//! 处理器由注册表长期持有，调用之间不应保留请求相关的可变状态；
//! 事务边界由调度器管理，处理器只能通过 `UnitOfWork` 读写与记录事件。
//!
use crate::{
    command::Command, command_handler::CommandHandler, context::AppContext, query::Query,
    query_handler::QueryHandler, request::Request, unit_of_work::UnitOfWork,
};
use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use usecase_domain::error::Failure;

/// 处理结果：命令为 `None`，查询为序列化后的 DTO
pub type Reply = Option<Value>;

#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &AppContext,
        uow: &UnitOfWork,
        request: Request,
    ) -> Result<Reply, Failure>;
}

pub(crate) struct CommandAdapter<C, H> {
    handler: Arc<H>,
    _marker: PhantomData<fn() -> C>,
}

impl<C, H> CommandAdapter<C, H> {
    pub(crate) fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<C, H> RequestHandler for CommandAdapter<C, H>
where
    C: Command,
    H: CommandHandler<C> + 'static,
{
    async fn handle(
        &self,
        ctx: &AppContext,
        uow: &UnitOfWork,
        request: Request,
    ) -> Result<Reply, Failure> {
        let cmd: C = request.decode()?;
        self.handler.handle(ctx, uow, cmd).await?;
        Ok(None)
    }
}

pub(crate) struct QueryAdapter<Q, H> {
    handler: Arc<H>,
    _marker: PhantomData<fn() -> Q>,
}

impl<Q, H> QueryAdapter<Q, H> {
    pub(crate) fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<Q, H> RequestHandler for QueryAdapter<Q, H>
where
    Q: Query,
    H: QueryHandler<Q> + 'static,
{
    async fn handle(
        &self,
        ctx: &AppContext,
        uow: &UnitOfWork,
        request: Request,
    ) -> Result<Reply, Failure> {
        let q: Q = request.decode()?;
        let dto = self.handler.handle(ctx, uow, q).await?;
        let value = serde_json::to_value(dto).map_err(Failure::unexpected)?;
        Ok(Some(value))
    }
}
