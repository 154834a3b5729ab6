use usecase_application::query::Query;
use usecase_macros::{dto, query};

#[dto]
struct UserDto {
    id: String,
    name: String,
}

#[dto]
struct UserList(Vec<UserDto>);

#[query(dto = UserDto)]
struct GetUser {
    id: String,
}

#[query(name = "ListUsers", dto = UserList)]
struct ListAll;

fn main() {
    assert_eq!(GetUser::NAME, "GetUser");
    assert_eq!(ListAll::NAME, "ListUsers");

    let dto: <GetUser as Query>::Dto = UserDto {
        id: "u-1".into(),
        name: "alice".into(),
    };
    let json = serde_json::to_value(&dto).unwrap();
    assert_eq!(json["name"], "alice");

    let list = UserList(vec![dto]);
    let _ = format!("{:?}", list.clone());
    let _ = GetUser { id: "u-1".into() }.id;
}
