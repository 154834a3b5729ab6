use crate::args::AttrArgs;
use crate::derive_utils::{apply_derives, message_derives, message_target};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Item, LitStr, Result};

/// #[event_payload] 宏实现
/// - 合并/追加派生：Debug, Clone, PartialEq, Serialize, Deserialize
/// - 实现 `::usecase_domain::domain_event::EventPayload`，`EVENT_TYPE` 默认取类型名
/// - 参数：`#[event_payload(event_type = "...")]`
pub(crate) fn expand(mut args: AttrArgs, mut input: Item) -> Result<TokenStream> {
    let event_type = args.take_str("event_type")?;
    args.finish("'event_type'")?;

    let (attrs, ident, generics) = message_target(&mut input, "event_payload")?;
    let mut required = message_derives();
    required.push(syn::parse_quote!(PartialEq));
    apply_derives(attrs, required);

    let event_type =
        event_type.unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::usecase_domain::domain_event::EventPayload for #ident #ty_generics #where_clause {
            const EVENT_TYPE: &'static str = #event_type;
        }
    })
}
