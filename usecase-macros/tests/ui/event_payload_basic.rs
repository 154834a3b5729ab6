use usecase_domain::domain_event::{DomainEvent, EventPayload};
use usecase_macros::event_payload;

#[event_payload(event_type = "user.created")]
struct UserCreated {
    user_id: String,
    name: String,
}

#[event_payload]
struct UserArchived {
    user_id: String,
}

fn main() {
    assert_eq!(UserCreated::EVENT_TYPE, "user.created");
    assert_eq!(UserArchived::EVENT_TYPE, "UserArchived");

    let payload = UserCreated {
        user_id: "u-1".into(),
        name: "alice".into(),
    };
    let event = DomainEvent::from_payload(&payload).unwrap();
    assert_eq!(event.event_type(), "user.created");
    assert_eq!(event.decode::<UserCreated>().unwrap(), payload);

    let archived = UserArchived {
        user_id: "u-1".into(),
    };
    assert_eq!(archived.clone(), archived);
}
