use crate::{command::Command, context::AppContext, unit_of_work::UnitOfWork};
use async_trait::async_trait;
use usecase_domain::error::Failure;

#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, ctx: &AppContext, uow: &UnitOfWork, cmd: C) -> Result<(), Failure>;
}
