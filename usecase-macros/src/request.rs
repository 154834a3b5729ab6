use crate::args::AttrArgs;
use crate::derive_utils::{apply_derives, message_derives, message_target};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Item, LitStr, Result};

/// #[command] 宏实现
/// - 合并/追加派生：Debug, Clone, Serialize, Deserialize
/// - 实现 `::usecase_application::command::Command`，`NAME` 默认取类型名
/// - 参数：`#[command(name = "...")]`
pub(crate) fn expand_command(mut args: AttrArgs, mut input: Item) -> Result<TokenStream> {
    let name = args.take_str("name")?;
    args.finish("'name'")?;

    let (attrs, ident, generics) = message_target(&mut input, "command")?;
    apply_derives(attrs, message_derives());
    let name = name.unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::usecase_application::command::Command for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
        }
    })
}

/// #[query] 宏实现
/// - 派生同 #[command]
/// - 实现 `::usecase_application::query::Query`
/// - 参数：`#[query(dto = DtoType, name = "...")]`，`dto` 必填
pub(crate) fn expand_query(mut args: AttrArgs, mut input: Item) -> Result<TokenStream> {
    let name = args.take_str("name")?;
    let dto = args
        .take_type("dto")?
        .ok_or_else(|| syn::Error::new(Span::call_site(), "#[query] requires `dto = Type`"))?;
    args.finish("'name' | 'dto'")?;

    let (attrs, ident, generics) = message_target(&mut input, "query")?;
    apply_derives(attrs, message_derives());
    let name = name.unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::usecase_application::query::Query for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
            type Dto = #dto;
        }
    })
}

/// #[dto] 宏实现：派生同 #[command]，并实现 `::usecase_application::dto::Dto`
pub(crate) fn expand_dto(args: AttrArgs, mut input: Item) -> Result<TokenStream> {
    args.finish("no arguments")?;

    let (attrs, ident, generics) = message_target(&mut input, "dto")?;
    apply_derives(attrs, message_derives());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::usecase_application::dto::Dto for #ident #ty_generics #where_clause {}
    })
}
