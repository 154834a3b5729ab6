mod common;

use async_trait::async_trait;
use common::*;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use usecase_application::context::AppContext;
use usecase_application::handler::{Reply, RequestHandler};
use usecase_application::request::{Request, RequestKind};
use usecase_application::unit_of_work::UnitOfWork;
use usecase_application::dispatcher::FLUSH_SUBSCRIBER;
use usecase_application::{Dispatcher, translate};
use usecase_domain::domain_event::{CorrelationId, DomainEvent};
use usecase_domain::error::{DomainResult, Failure, FailureKind};
use usecase_domain::eventing::{EventBus, FlushReport};
use usecase_domain::persist::{
    InMemoryStore, PersistenceProvider, ScopeHandle, ScopeMode, Versioned,
};

struct Panicking;

#[async_trait]
impl RequestHandler for Panicking {
    async fn handle(
        &self,
        _ctx: &AppContext,
        uow: &UnitOfWork,
        _request: Request,
    ) -> Result<Reply, Failure> {
        uow.write("users", "u-1", json!({}), None).await?;
        uow.record(DomainEvent::new("user.created", json!({})))?;
        panic!("handler exploded");
    }
}

/// 写入后永远挂起，用于模拟调用方放弃等待
struct Stalling;

#[async_trait]
impl RequestHandler for Stalling {
    async fn handle(
        &self,
        _ctx: &AppContext,
        uow: &UnitOfWork,
        _request: Request,
    ) -> Result<Reply, Failure> {
        uow.write("users", "u-1", json!({}), None).await?;
        uow.record(DomainEvent::new("user.created", json!({})))?;
        std::future::pending::<()>().await;
        Ok(None)
    }
}

/// 记录事件后以业务失败返回
struct RecordThenReject;

#[async_trait]
impl RequestHandler for RecordThenReject {
    async fn handle(
        &self,
        _ctx: &AppContext,
        uow: &UnitOfWork,
        _request: Request,
    ) -> Result<Reply, Failure> {
        uow.write("users", "u-1", json!({}), None).await?;
        uow.record(DomainEvent::new("user.created", json!({})))?;
        Err(Failure::validation("quota exceeded"))
    }
}

/// 读取后记录被并发修改的查询
struct RacingRead {
    store: Arc<InMemoryStore>,
}

#[async_trait]
impl RequestHandler for RacingRead {
    async fn handle(
        &self,
        _ctx: &AppContext,
        uow: &UnitOfWork,
        _request: Request,
    ) -> Result<Reply, Failure> {
        let (seen, _) = uow.load::<UserDto>(USERS, "u-1").await?.unwrap();
        self.store
            .seed(USERS, "u-1", json!({"id": "u-1", "name": "mallory"}));
        Ok(Some(json!(seen.name)))
    }
}

/// 在处理器内部再次调度
struct Nesting {
    dispatcher: Arc<OnceLock<Arc<Dispatcher>>>,
    inner: Arc<Mutex<Option<Result<Reply, Failure>>>>,
}

#[async_trait]
impl RequestHandler for Nesting {
    async fn handle(
        &self,
        ctx: &AppContext,
        _uow: &UnitOfWork,
        _request: Request,
    ) -> Result<Reply, Failure> {
        let dispatcher = self
            .dispatcher
            .get()
            .ok_or_else(|| Failure::unexpected("dispatcher not wired"))?;
        let result = dispatcher.dispatch(ctx, create_user("u-9", "nested")).await;
        *self.inner.lock().unwrap() = Some(result);
        Ok(Some(json!("outer done")))
    }
}

struct WritingQuery;

#[async_trait]
impl RequestHandler for WritingQuery {
    async fn handle(
        &self,
        _ctx: &AppContext,
        uow: &UnitOfWork,
        _request: Request,
    ) -> Result<Reply, Failure> {
        uow.write("users", "u-1", json!({}), None).await?;
        Ok(None)
    }
}

#[tokio::test]
async fn panicking_handler_rolls_back_and_releases_once() {
    let h = Harness::new();
    h.registry
        .register(RequestKind::Command, "Explode", Arc::new(Panicking))
        .unwrap();
    let dispatcher = h.dispatcher();

    let failure = dispatcher
        .dispatch(&ctx("cor-p"), empty_command("Explode"))
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), FailureKind::Unexpected);
    assert!(failure.internal().unwrap().contains("handler exploded"));

    let envelope = translate(&failure, &CorrelationId::from("cor-p"));
    assert_eq!(envelope.code, 500);
    assert!(!envelope.message.contains("exploded"));

    let stats = h.store.stats();
    assert_eq!((stats.committed, stats.rolled_back, stats.released), (0, 1, 1));
    assert_eq!(h.bus.flush_count(), 0);
    assert!(h.store.get("users", "u-1").is_none());
}

#[tokio::test]
async fn dropped_dispatch_rolls_back_and_releases() {
    let h = Harness::new();
    h.registry
        .register(RequestKind::Command, "Stall", Arc::new(Stalling))
        .unwrap();
    let dispatcher = h.dispatcher();

    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        dispatcher.dispatch(&ctx("cor-d"), empty_command("Stall")),
    )
    .await;
    assert!(outcome.is_err());

    let store = h.store.clone();
    wait_until(move || store.stats().released == 1).await;

    let stats = h.store.stats();
    assert_eq!((stats.committed, stats.rolled_back, stats.released), (0, 1, 1));
    assert_eq!(h.store.open_scopes(), 0);
    assert_eq!(h.bus.flush_count(), 0);
}

#[tokio::test]
async fn nested_dispatch_is_rejected_without_touching_the_provider() {
    let h = Harness::new();
    let slot = Arc::new(OnceLock::new());
    let inner = Arc::new(Mutex::new(None));
    h.registry
        .register(
            RequestKind::Command,
            "Outer",
            Arc::new(Nesting {
                dispatcher: slot.clone(),
                inner: inner.clone(),
            }),
        )
        .unwrap();
    let dispatcher = Arc::new(h.dispatcher());
    let _ = slot.set(dispatcher.clone());

    let reply = dispatcher
        .dispatch(&ctx("cor-n"), empty_command("Outer"))
        .await
        .unwrap();
    assert_eq!(reply, Some(json!("outer done")));

    let nested = inner.lock().unwrap().take().unwrap();
    let failure = nested.unwrap_err();
    assert_eq!(failure.kind(), FailureKind::Unexpected);
    assert!(failure.internal().unwrap().contains("nested unit of work"));

    // 只有外层作用域被打开并提交
    let stats = h.store.stats();
    assert_eq!((stats.begun, stats.committed, stats.released), (1, 1, 1));
    assert!(h.store.get(USERS, "u-9").is_none());
}

#[tokio::test]
async fn query_scope_rejects_writes() {
    let h = Harness::new();
    h.registry
        .register(RequestKind::Query, "SneakyQuery", Arc::new(WritingQuery))
        .unwrap();
    let dispatcher = h.dispatcher();

    let request = Request::query("SneakyQuery", serde_json::Map::new());
    let failure = dispatcher.dispatch(&ctx("cor-q"), request).await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::Unexpected);
    assert!(h.store.get("users", "u-1").is_none());
    assert_eq!(h.store.stats().rolled_back, 1);
}

/// 提交阶段较慢的提供方，用于验证提交不受调用方取消影响
struct SlowCommit {
    inner: InMemoryStore,
}

#[async_trait]
impl PersistenceProvider for SlowCommit {
    async fn begin_scope(
        &self,
        mode: ScopeMode,
        correlation_id: &CorrelationId,
    ) -> DomainResult<ScopeHandle> {
        self.inner.begin_scope(mode, correlation_id).await
    }

    async fn commit(&self, scope: &ScopeHandle) -> DomainResult<()> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.inner.commit(scope).await
    }

    async fn rollback(&self, scope: &ScopeHandle) -> DomainResult<()> {
        self.inner.rollback(scope).await
    }

    fn release(&self, scope: ScopeHandle) {
        self.inner.release(scope)
    }

    async fn read(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
    ) -> DomainResult<Option<Versioned>> {
        self.inner.read(scope, collection, id).await
    }

    async fn write(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
        value: Value,
        expected_version: Option<u64>,
    ) -> DomainResult<()> {
        self.inner
            .write(scope, collection, id, value, expected_version)
            .await
    }

    async fn remove(
        &self,
        scope: &ScopeHandle,
        collection: &str,
        id: &str,
        expected_version: Option<u64>,
    ) -> DomainResult<()> {
        self.inner.remove(scope, collection, id, expected_version).await
    }
}

#[tokio::test]
async fn commit_completes_after_caller_gives_up() {
    let h = Harness::new();
    let provider = Arc::new(SlowCommit {
        inner: InMemoryStore::new(),
    });
    let dispatcher = Dispatcher::builder()
        .registry(h.registry.clone())
        .provider(provider.clone())
        .event_bus(h.bus.clone())
        .build();

    let outcome = tokio::time::timeout(
        Duration::from_millis(10),
        dispatcher.dispatch(&ctx("cor-s"), create_user("u-1", "alice")),
    )
    .await;
    assert!(outcome.is_err());

    let watched = provider.clone();
    wait_until(move || watched.inner.stats().released == 1).await;
    let bus = h.bus.clone();
    wait_until(move || bus.flush_count() == 1).await;

    let stats = provider.inner.stats();
    assert_eq!((stats.committed, stats.rolled_back, stats.released), (1, 0, 1));
    assert!(provider.inner.get(USERS, "u-1").is_some());
    assert_eq!(h.delivered_types(), vec!["user.created"]);
}

#[tokio::test]
async fn failed_handler_discards_recorded_events() {
    let h = Harness::new();
    h.registry
        .register(RequestKind::Command, "Reject", Arc::new(RecordThenReject))
        .unwrap();
    let dispatcher = h.dispatcher();

    let failure = dispatcher
        .dispatch(&ctx("cor-r"), empty_command("Reject"))
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), FailureKind::Validation);
    assert_eq!(failure.message(), "quota exceeded");
    let stats = h.store.stats();
    assert_eq!((stats.committed, stats.rolled_back, stats.released), (0, 1, 1));
    assert_eq!(h.bus.flush_count(), 0);
    assert!(h.delivered_types().is_empty());
    assert!(h.store.get("users", "u-1").is_none());
}

#[tokio::test]
async fn query_is_not_a_conflict_when_record_changes_after_read() {
    let h = Harness::new();
    h.store
        .seed(USERS, "u-1", json!({"id": "u-1", "name": "alice"}));
    h.registry
        .register(
            RequestKind::Query,
            "RacingRead",
            Arc::new(RacingRead {
                store: h.store.clone(),
            }),
        )
        .unwrap();
    let dispatcher = h.dispatcher();

    let reply = dispatcher
        .dispatch(
            &ctx("cor-rr"),
            Request::query("RacingRead", serde_json::Map::new()),
        )
        .await
        .unwrap();

    assert_eq!(reply, Some(json!("alice")));
    assert_eq!(h.store.stats().conflicts, 0);
    assert_eq!(h.store.open_scopes(), 0);
}

struct ExplodingBus;

#[async_trait]
impl EventBus for ExplodingBus {
    async fn flush(&self, _events: Vec<DomainEvent>) -> FlushReport {
        panic!("broker unreachable");
    }
}

#[tokio::test]
async fn committed_write_succeeds_even_if_flush_panics() {
    let h = Harness::new();
    let dispatcher = Dispatcher::builder()
        .registry(h.registry.clone())
        .provider(h.store.clone())
        .event_bus(Arc::new(ExplodingBus))
        .build();

    let dispatched = dispatcher
        .dispatch_detailed(&ctx("cor-x"), create_user("u-1", "alice"))
        .await
        .unwrap();

    let report = dispatched.flush.unwrap();
    assert_eq!((report.events, report.delivered), (1, 0));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].subscriber, FLUSH_SUBSCRIBER);
    assert_eq!(report.failures[0].event_type, "user.created");
    assert!(report.failures[0].reason.contains("broker unreachable"));

    let stats = h.store.stats();
    assert_eq!((stats.committed, stats.rolled_back, stats.released), (1, 0, 1));
    assert!(h.store.get(USERS, "u-1").is_some());
}
