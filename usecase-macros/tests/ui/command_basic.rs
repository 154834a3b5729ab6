use usecase_application::command::Command;
use usecase_application::request::Request;
use usecase_macros::command;

#[command(name = "CreateUser")]
struct CreateUser {
    name: String,
}

#[command]
#[derive(PartialEq)]
struct ArchiveAll;

#[command(name = "user.rename")]
#[derive(Debug)]
enum Rename {
    Full { first: String, last: String },
    Nick(String),
}

fn main() {
    assert_eq!(CreateUser::NAME, "CreateUser");
    assert_eq!(ArchiveAll::NAME, "ArchiveAll");
    assert_eq!(Rename::NAME, "user.rename");

    // Debug/Clone/Serialize/Deserialize 均已派生
    let cmd = CreateUser {
        name: "alice".into(),
    };
    let _ = format!("{:?}", cmd.clone());
    let req = Request::from_command(&cmd).unwrap();
    let back: CreateUser = req.decode().unwrap();
    assert_eq!(back.name, "alice");

    // 已有 derive 保留，不重复派生
    assert_eq!(ArchiveAll, ArchiveAll.clone());
    let _ = Rename::Nick("al".into()).clone();
    let _ = Rename::Full {
        first: "a".into(),
        last: "b".into(),
    };
}
