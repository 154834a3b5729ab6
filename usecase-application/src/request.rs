//! 请求（Request）
//!
//! 边界层构造的不可变请求值：类型标签（命令/查询）+ 稳定名称 + 负载（字段名 -> 值）。
//! 类型化的 [`Command`] / [`Query`] 通过 serde 与请求互相转换。
//!
use crate::{command::Command, query::Query};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use usecase_domain::error::{Details, Failure};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// 修改状态
    Command,
    /// 只读
    Query,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Command => "command",
            RequestKind::Query => "query",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    kind: RequestKind,
    name: String,
    #[serde(default)]
    payload: Map<String, Value>,
}

impl Request {
    pub fn new(kind: RequestKind, name: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            kind,
            name: name.into(),
            payload,
        }
    }

    pub fn command(name: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self::new(RequestKind::Command, name, payload)
    }

    pub fn query(name: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self::new(RequestKind::Query, name, payload)
    }

    /// 由类型化命令构造请求
    pub fn from_command<C: Command>(cmd: &C) -> Result<Self, Failure> {
        Ok(Self::command(C::NAME, to_payload(C::NAME, cmd)?))
    }

    /// 由类型化查询构造请求
    pub fn from_query<Q: Query>(q: &Q) -> Result<Self, Failure> {
        Ok(Self::query(Q::NAME, to_payload(Q::NAME, q)?))
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// 将负载解码为类型化请求；负载不合法时返回 `Validation`，并在细节中附上原因
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, Failure> {
        match serde_json::from_value(Value::Object(self.payload.clone())) {
            Ok(v) => Ok(v),
            // 单元结构体只能从 null 解码
            Err(_) if self.payload.is_empty() => serde_json::from_value(Value::Null)
                .map_err(|err| invalid_payload(&self.name, &err)),
            Err(err) => Err(invalid_payload(&self.name, &err)),
        }
    }
}

fn to_payload<T: Serialize>(name: &str, value: &T) -> Result<Map<String, Value>, Failure> {
    match serde_json::to_value(value).map_err(Failure::unexpected)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(Failure::unexpected(format!(
            "request {name} must serialize to an object, got {other}"
        ))),
    }
}

fn invalid_payload(name: &str, err: &serde_json::Error) -> Failure {
    let mut details = Details::new();
    details.insert("reason".into(), json!(err.to_string()));
    Failure::validation(format!("invalid {name} payload")).with_details(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::Dto;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct CreateUser {
        name: String,
        age: u8,
    }

    impl Command for CreateUser {
        const NAME: &'static str = "CreateUser";
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct ListUsers;

    #[derive(Debug, Serialize, Deserialize)]
    struct UsersDto(Vec<String>);

    impl Dto for UsersDto {}

    impl Query for ListUsers {
        const NAME: &'static str = "ListUsers";
        type Dto = UsersDto;
    }

    #[test]
    fn typed_command_converts_to_request_and_back() {
        let req = Request::from_command(&CreateUser {
            name: "alice".into(),
            age: 30,
        })
        .unwrap();
        assert_eq!(req.kind(), RequestKind::Command);
        assert_eq!(req.name(), "CreateUser");
        assert_eq!(req.field("name"), Some(&json!("alice")));

        let cmd: CreateUser = req.decode().unwrap();
        assert_eq!(cmd.age, 30);
    }

    #[test]
    fn unit_query_has_empty_payload() {
        let req = Request::from_query(&ListUsers).unwrap();
        assert_eq!(req.kind(), RequestKind::Query);
        assert!(req.payload().is_empty());
        assert_eq!(req.decode::<ListUsers>().unwrap(), ListUsers);
    }

    #[test]
    fn malformed_payload_is_a_validation_failure() {
        let mut payload = Map::new();
        payload.insert("name".into(), json!(42));
        let req = Request::command("CreateUser", payload);

        let failure = req.decode::<CreateUser>().unwrap_err();
        assert_eq!(failure.message(), "invalid CreateUser payload");
        assert!(failure.details().unwrap().contains_key("reason"));
    }

    #[test]
    fn request_wire_shape() {
        let req: Request = serde_json::from_value(json!({
            "kind": "query",
            "name": "ListUsers"
        }))
        .unwrap();
        assert_eq!(req.kind(), RequestKind::Query);
        assert!(req.payload().is_empty());
    }
}
