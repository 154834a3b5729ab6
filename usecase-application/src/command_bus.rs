use crate::{command::Command, context::AppContext, dispatcher::Dispatcher, request::Request};
use async_trait::async_trait;
use usecase_domain::error::Failure;

/// 命令总线（Command Bus）
///
/// - 将类型化命令转换为请求并交给调度器执行；
/// - 该 trait 带有泛型方法，通常以具体实现类型注入使用。
#[async_trait]
pub trait CommandBus: Send + Sync {
    /// 发送命令，成功时不返回数据
    ///
    /// - `ctx`：应用上下文（关联标识、业务语境等）
    /// - `cmd`：具体命令实例
    async fn send<C: Command>(&self, ctx: &AppContext, cmd: C) -> Result<(), Failure>;
}

#[async_trait]
impl CommandBus for Dispatcher {
    async fn send<C: Command>(&self, ctx: &AppContext, cmd: C) -> Result<(), Failure> {
        let request = Request::from_command(&cmd)?;
        self.dispatch(ctx, request).await.map(|_| ())
    }
}
