#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Map;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use usecase_application::command_handler::CommandHandler;
use usecase_application::context::AppContext;
use usecase_application::query_handler::QueryHandler;
use usecase_application::request::Request;
use usecase_application::unit_of_work::UnitOfWork;
use usecase_application::{Dispatcher, HandlerRegistry};
use usecase_domain::domain_event::{CorrelationId, DomainEvent};
use usecase_domain::error::Failure;
use usecase_domain::eventing::{EventBus, FlushReport, InProcessEventBus, SubscriberRegistry};
use usecase_domain::persist::InMemoryStore;
use usecase_macros::{command, dto, event_payload, query};

pub const USERS: &str = "users";

#[command(name = "CreateUser")]
pub struct CreateUser {
    pub id: String,
    pub name: String,
}

#[query(name = "GetUser", dto = UserDto)]
pub struct GetUser {
    pub id: String,
}

#[dto]
pub struct UserDto {
    pub id: String,
    pub name: String,
}

#[event_payload(event_type = "user.created")]
pub struct UserCreated {
    pub user_id: String,
    pub name: String,
}

pub struct CreateUserHandler;

#[async_trait]
impl CommandHandler<CreateUser> for CreateUserHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        uow: &UnitOfWork,
        cmd: CreateUser,
    ) -> Result<(), Failure> {
        if cmd.name.trim().is_empty() {
            return Err(Failure::validation("name required"));
        }
        if uow.load::<UserDto>(USERS, &cmd.id).await?.is_some() {
            return Err(Failure::conflict(format!("user {} already exists", cmd.id)));
        }

        let user = UserDto {
            id: cmd.id.clone(),
            name: cmd.name.clone(),
        };
        uow.save(USERS, &cmd.id, &user, Some(0)).await?;
        uow.record_payload(&UserCreated {
            user_id: cmd.id,
            name: cmd.name,
        })?;
        Ok(())
    }
}

pub struct GetUserHandler;

#[async_trait]
impl QueryHandler<GetUser> for GetUserHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        uow: &UnitOfWork,
        q: GetUser,
    ) -> Result<UserDto, Failure> {
        match uow.load::<UserDto>(USERS, &q.id).await? {
            Some((user, _version)) => Ok(user),
            None => Err(Failure::not_found(format!("user {}", q.id))),
        }
    }
}

/// 记录每次 flush 的事件总线替身，并转发给进程内总线
pub struct SpyBus {
    inner: InProcessEventBus,
    pub flushes: AtomicUsize,
}

impl SpyBus {
    pub fn new(inner: InProcessEventBus) -> Self {
        Self {
            inner,
            flushes: AtomicUsize::new(0),
        }
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventBus for SpyBus {
    async fn flush(&self, events: Vec<DomainEvent>) -> FlushReport {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        self.inner.flush(events).await
    }
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub bus: Arc<SpyBus>,
    pub delivered: Arc<Mutex<Vec<DomainEvent>>>,
    pub registry: Arc<HandlerRegistry>,
}

impl Harness {
    /// 注册表中已登记 CreateUser / GetUser，订阅者收集 user.created
    pub fn new() -> Self {
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let mut subscribers = SubscriberRegistry::new();
        let sink = delivered.clone();
        subscribers.subscribe_fn("welcome-mailer", "user.created", move |event| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(event);
                Ok::<_, anyhow::Error>(())
            }
        });

        let registry = Arc::new(HandlerRegistry::new());
        registry
            .register_command::<CreateUser, _>(Arc::new(CreateUserHandler))
            .unwrap();
        registry
            .register_query::<GetUser, _>(Arc::new(GetUserHandler))
            .unwrap();

        Self {
            store: Arc::new(InMemoryStore::new()),
            bus: Arc::new(SpyBus::new(InProcessEventBus::new(subscribers))),
            delivered,
            registry,
        }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::builder()
            .registry(self.registry.clone())
            .provider(self.store.clone())
            .event_bus(self.bus.clone())
            .build()
    }

    pub fn delivered_types(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type().to_string())
            .collect()
    }
}

pub fn ctx(cid: &str) -> AppContext {
    AppContext::new(CorrelationId::from(cid))
}

pub fn create_user(id: &str, name: &str) -> Request {
    Request::from_command(&CreateUser {
        id: id.into(),
        name: name.into(),
    })
    .unwrap()
}

pub fn empty_command(name: &str) -> Request {
    Request::command(name, Map::new())
}

/// 等待后台回滚/释放任务完成
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..100 {
        if cond() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}
