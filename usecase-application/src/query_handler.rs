use crate::{context::AppContext, query::Query, unit_of_work::UnitOfWork};
use async_trait::async_trait;
use usecase_domain::error::Failure;

#[async_trait]
pub trait QueryHandler<Q>: Send + Sync
where
    Q: Query,
{
    async fn handle(&self, ctx: &AppContext, uow: &UnitOfWork, q: Q) -> Result<Q::Dto, Failure>;
}
