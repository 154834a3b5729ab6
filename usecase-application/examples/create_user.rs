use async_trait::async_trait;
use serde_json::{Map, json};
use std::sync::Arc;
use usecase_application::command_handler::CommandHandler;
use usecase_application::context::AppContext;
use usecase_application::query_handler::QueryHandler;
use usecase_application::request::Request;
use usecase_application::telemetry::{self, LogFormat};
use usecase_application::unit_of_work::UnitOfWork;
use usecase_application::{Dispatcher, HandlerRegistry, QueryBus};
use usecase_domain::domain_event::{BusinessContext, CorrelationId, DomainEvent};
use usecase_domain::error::Failure;
use usecase_domain::eventing::{
    EventSubscriber, HandledEventType, InMemoryDeliveryFailures, InProcessEventBus,
    SubscriberRegistry,
};
use usecase_domain::persist::InMemoryStore;
use usecase_macros::{command, dto, event_payload, query};

#[command(name = "CreateUser")]
struct CreateUser {
    id: String,
    name: String,
}

#[query(name = "GetUser", dto = UserView)]
struct GetUser {
    id: String,
}

#[dto]
struct UserView {
    id: String,
    name: String,
}

#[event_payload(event_type = "user.created")]
struct UserCreated {
    user_id: String,
    name: String,
}

struct CreateUserHandler;

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
        let view = UserView {
            id: cmd.id.clone(),
            name: cmd.name.clone(),
        };
        uow.save("users", &cmd.id, &view, Some(0)).await?;
        uow.record_payload(&UserCreated {
            user_id: cmd.id,
            name: cmd.name,
        })?;
        Ok(())
    }
}

struct GetUserHandler;

#[async_trait]
impl QueryHandler<GetUser> for GetUserHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        uow: &UnitOfWork,
        q: GetUser,
    ) -> Result<UserView, Failure> {
        uow.load::<UserView>("users", &q.id)
            .await?
            .map(|(view, _)| view)
            .ok_or_else(|| Failure::not_found(format!("user {}", q.id)))
    }
}

struct WelcomeMailer;

#[async_trait]
impl EventSubscriber for WelcomeMailer {
    fn subscriber_name(&self) -> &str {
        "welcome-mailer"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::One("user.created".into())
    }

    async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
        let created: UserCreated = event.decode()?;
        println!("welcome mail -> {} ({})", created.name, created.user_id);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init(LogFormat::Pretty);

    let registry = HandlerRegistry::new();
    registry.register_command::<CreateUser, _>(Arc::new(CreateUserHandler))?;
    registry.register_query::<GetUser, _>(Arc::new(GetUserHandler))?;

    let mut subscribers = SubscriberRegistry::new();
    subscribers.subscribe(Arc::new(WelcomeMailer));
    let undelivered = Arc::new(InMemoryDeliveryFailures::new());
    let bus = InProcessEventBus::builder()
        .registry(subscribers)
        .failure_sink(undelivered.clone())
        .build();

    let dispatcher = Dispatcher::builder()
        .registry(registry)
        .provider(Arc::new(InMemoryStore::new()))
        .event_bus(Arc::new(bus))
        .build();

    let ctx = AppContext::new(CorrelationId::new()).with_biz(
        BusinessContext::builder()
            .actor_type("user")
            .actor_id("admin-1")
            .build(),
    );

    let mut payload = Map::new();
    payload.insert("id".into(), json!("u-1"));
    payload.insert("name".into(), json!("alice"));
    let created = dispatcher
        .dispatch_detailed(&ctx, Request::command("CreateUser", payload))
        .await?;
    println!("CreateUser -> flush {:?}", created.flush);

    let view = dispatcher.ask(&ctx, GetUser { id: "u-1".into() }).await?;
    println!("GetUser -> {view:?}");

    let mut invalid = Map::new();
    invalid.insert("id".into(), json!("u-2"));
    invalid.insert("name".into(), json!(""));
    match dispatcher
        .handle(&ctx, Request::command("CreateUser", invalid))
        .await
    {
        Ok(_) => println!("unexpected success"),
        Err(envelope) => println!("CreateUser -> {}", serde_json::to_string(&envelope)?),
    }

    println!("undelivered events: {}", undelivered.len());
    Ok(())
}
