//! 调度器（Dispatcher）
//!
//! 一次调度的完整流程：
//! 1. 按请求名解析处理器（未注册返回 `NotFound`）；
//! 2. 打开事务作用域（命令可写，查询只读）；
//! 3. 以请求与工作单元调用处理器，panic 被捕获为 `Unexpected`；
//! 4. 成功则提交并在提交成功后投递事件；失败则回滚并返回原失败。
//!
//! 提交与回滚在独立任务中执行：一旦发起，即使调用方丢弃了调度 future，
//! 提交 -> 投递 -> 释放 也会完整跑完。
//!
use crate::{
    config::DispatcherConfig,
    context::AppContext,
    handler::Reply,
    registry::HandlerRegistry,
    request::Request,
    translator::{ErrorEnvelope, ErrorTranslator},
    unit_of_work::ScopeGuard,
};
use bon::bon;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info_span, warn};
use usecase_domain::error::{DomainError, Failure};
use usecase_domain::domain_event::DomainEvent;
use usecase_domain::eventing::{DeliveryFailure, EventBus, FlushReport};
use usecase_domain::persist::{PersistenceProvider, ScopeId};

/// 总线整体失败时记入投递报告的订阅者名
pub const FLUSH_SUBSCRIBER: &str = "event-bus";

tokio::task_local! {
    /// 当前任务正在执行的处理器所属作用域
    static ACTIVE_SCOPE: ScopeId;
}

/// 调度结果（含事件投递报告）
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatched {
    pub reply: Reply,
    /// 提交成功后的投递报告；查询同样会得到一份空报告
    pub flush: Option<FlushReport>,
}

pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    provider: Arc<dyn PersistenceProvider>,
    event_bus: Arc<dyn EventBus>,
    translator: ErrorTranslator,
    config: DispatcherConfig,
}

#[bon]
impl Dispatcher {
    /// 构造调度器；注册表在此处被封存
    #[builder]
    pub fn new(
        #[builder(into)] registry: Arc<HandlerRegistry>,
        provider: Arc<dyn PersistenceProvider>,
        event_bus: Arc<dyn EventBus>,
        #[builder(default)] config: DispatcherConfig,
    ) -> Self {
        registry.seal();
        let translator = ErrorTranslator::from_config(&config);
        Self {
            registry,
            provider,
            event_bus,
            translator,
            config,
        }
    }
}

impl Dispatcher {
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn translator(&self) -> &ErrorTranslator {
        &self.translator
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// 执行一次用例
    pub async fn dispatch(&self, ctx: &AppContext, request: Request) -> Result<Reply, Failure> {
        self.dispatch_detailed(ctx, request).await.map(|d| d.reply)
    }

    /// 执行一次用例，并返回事件投递报告
    pub async fn dispatch_detailed(
        &self,
        ctx: &AppContext,
        request: Request,
    ) -> Result<Dispatched, Failure> {
        let span = info_span!(
            "dispatch",
            request = %request.name(),
            kind = %request.kind(),
            correlation_id = %ctx.correlation_id,
        );
        async {
            let result = self.run(ctx, request).await;
            match &result {
                Ok(_) => debug!("use case completed"),
                Err(failure) if failure.is_unexpected() => error!(
                    kind = %failure.kind(),
                    internal = failure.internal().unwrap_or_default(),
                    "use case failed: {}",
                    failure.message()
                ),
                Err(failure) => debug!(
                    kind = %failure.kind(),
                    "use case failed: {}",
                    failure.message()
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// 边界层入口：调度并把失败翻译为错误信封
    pub async fn handle(&self, ctx: &AppContext, request: Request) -> Result<Reply, ErrorEnvelope> {
        self.dispatch(ctx, request)
            .await
            .map_err(|failure| self.translator.translate(&failure, &ctx.correlation_id))
    }

    async fn run(&self, ctx: &AppContext, request: Request) -> Result<Dispatched, Failure> {
        if let Ok(outer) = ACTIVE_SCOPE.try_with(|id| *id) {
            return Err(Failure::unexpected(format!(
                "nested unit of work: {} dispatched inside scope {outer}",
                request.name()
            )));
        }

        let handler = self.registry.resolve_request(&request)?;
        let guard = ScopeGuard::begin(self.provider.clone(), request.kind(), &ctx.correlation_id)
            .await
            .map_err(|err| Failure::unexpected(format!("begin scope: {err}")))?;

        let call = ACTIVE_SCOPE.scope(
            guard.uow().scope_id(),
            handler.handle(ctx, guard.uow(), request),
        );
        let outcome = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(Failure::unexpected(format!(
                "handler panicked: {}",
                panic_message(panic.as_ref())
            ))),
        };

        match outcome {
            Ok(reply) => {
                let flush = self.commit(guard).await?;
                Ok(Dispatched {
                    reply,
                    flush: Some(flush),
                })
            }
            Err(failure) => {
                self.rollback(guard).await;
                Err(failure)
            }
        }
    }

    async fn commit(&self, guard: ScopeGuard) -> Result<FlushReport, Failure> {
        let bus = self.event_bus.clone();
        let task = tokio::spawn(
            async move {
                let events = guard.commit().await?;
                debug!(events = events.len(), "scope committed");
                Ok::<_, DomainError>(flush_committed(bus.as_ref(), events).await)
            }
            .in_current_span(),
        );

        match task.await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(DomainError::Conflict { reason })) => Err(Failure::conflict(reason)),
            Ok(Err(err)) => Err(Failure::unexpected(format!("commit: {err}"))),
            Err(err) => Err(Failure::unexpected(format!("commit task: {err}"))),
        }
    }

    async fn rollback(&self, guard: ScopeGuard) {
        let task = tokio::spawn(async move { guard.rollback().await }.in_current_span());
        match task.await {
            Ok(Ok(dropped)) => debug!(dropped, "scope rolled back"),
            Ok(Err(err)) => warn!(error = %err, "rollback failed"),
            Err(err) => warn!(error = %err, "rollback task failed"),
        }
    }
}

/// 投递已提交的事件；提交已生效，总线 panic 只记入投递报告
async fn flush_committed(bus: &dyn EventBus, events: Vec<DomainEvent>) -> FlushReport {
    let pending: Vec<(String, String)> = events
        .iter()
        .map(|e| (e.event_id().to_string(), e.event_type().to_string()))
        .collect();

    match AssertUnwindSafe(bus.flush(events)).catch_unwind().await {
        Ok(report) => report,
        Err(panic) => {
            let reason = format!("event bus panicked: {}", panic_message(panic.as_ref()));
            error!(events = pending.len(), reason = %reason, "flush aborted after commit");
            FlushReport {
                events: pending.len(),
                delivered: 0,
                failures: pending
                    .into_iter()
                    .map(|(event_id, event_type)| DeliveryFailure {
                        subscriber: FLUSH_SUBSCRIBER.to_string(),
                        event_id,
                        event_type,
                        reason: reason.clone(),
                    })
                    .collect(),
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
