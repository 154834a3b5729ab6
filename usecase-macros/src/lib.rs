//! 用例层属性宏
//!
//! - `#[command]` / `#[query]` / `#[dto]`：应用层请求与返回值；
//! - `#[event_payload]`：领域事件载荷。
//!
//! 生成代码以 `::usecase_application` / `::usecase_domain` 绝对路径引用 trait，
//! 并依赖使用方的 `serde` 派生。
use proc_macro::TokenStream;
use syn::{Item, parse_macro_input};

mod args;
mod derive_utils;
mod event_payload;
mod request;

use args::AttrArgs;

fn finish(result: syn::Result<proc_macro2::TokenStream>) -> TokenStream {
    result.unwrap_or_else(|err| err.to_compile_error()).into()
}

/// 命令宏：`#[command]` 或 `#[command(name = "CreateUser")]`
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttrArgs);
    let input = parse_macro_input!(item as Item);
    finish(request::expand_command(args, input))
}

/// 查询宏：`#[query(dto = UserDto)]`，可选 `name = "..."`
#[proc_macro_attribute]
pub fn query(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttrArgs);
    let input = parse_macro_input!(item as Item);
    finish(request::expand_query(args, input))
}

#[proc_macro_attribute]
pub fn dto(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttrArgs);
    let input = parse_macro_input!(item as Item);
    finish(request::expand_dto(args, input))
}

/// 事件载荷宏：`#[event_payload]` 或 `#[event_payload(event_type = "user.created")]`
#[proc_macro_attribute]
pub fn event_payload(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttrArgs);
    let input = parse_macro_input!(item as Item);
    finish(event_payload::expand(args, input))
}
