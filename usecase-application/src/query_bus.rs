use crate::{context::AppContext, dispatcher::Dispatcher, query::Query, request::Request};
use async_trait::async_trait;
use usecase_domain::error::Failure;

/// 查询总线（Query Bus）
///
/// - 将类型化查询转换为请求并交给调度器执行；
/// - 对外返回与查询关联的 DTO 类型。
#[async_trait]
pub trait QueryBus: Send + Sync {
    async fn ask<Q: Query>(&self, ctx: &AppContext, q: Q) -> Result<Q::Dto, Failure>;
}

#[async_trait]
impl QueryBus for Dispatcher {
    async fn ask<Q: Query>(&self, ctx: &AppContext, q: Q) -> Result<Q::Dto, Failure> {
        let request = Request::from_query(&q)?;
        let reply = self.dispatch(ctx, request).await?;
        let value =
            reply.ok_or_else(|| Failure::unexpected(format!("{} produced no reply", Q::NAME)))?;
        serde_json::from_value(value)
            .map_err(|err| Failure::unexpected(format!("decode {} reply: {err}", Q::NAME)))
    }
}
