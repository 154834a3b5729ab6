use quote::ToTokens;
use syn::spanned::Spanned;
use syn::{Attribute, Generics, Ident, Item, Path, Token, punctuated::Punctuated};

// 归一化 derive 的 key，避免 Serialize/serde::Serialize 重复
fn derive_key(p: &Path) -> String {
    match p.segments.last() {
        Some(last) => last.ident.to_string(),
        None => p.to_token_stream().to_string(),
    }
}

// 收集已声明的 derive
fn declared_derives(attrs: &[Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
                .ok()
        })
        .flat_map(|list| list.into_iter().map(|p| derive_key(&p)).collect::<Vec<_>>())
        .collect()
}

/// 补齐缺失的派生：已有 derive 原样保留，缺失项合并为一个新的 `#[derive(..)]` 放在最前
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<Path>) {
    let declared = declared_derives(attrs);
    let missing: Vec<Path> = required
        .into_iter()
        .filter(|p| !declared.contains(&derive_key(p)))
        .collect();
    if missing.is_empty() {
        return;
    }
    attrs.insert(0, syn::parse_quote!(#[derive(#(#missing),*)]));
}

/// 请求、DTO 与事件载荷共用的派生集合
pub(crate) fn message_derives() -> Vec<Path> {
    vec![
        syn::parse_quote!(Debug),
        syn::parse_quote!(Clone),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
    ]
}

/// 取出结构体/枚举的属性列表、标识与泛型
pub(crate) fn message_target<'a>(
    item: &'a mut Item,
    macro_name: &str,
) -> syn::Result<(&'a mut Vec<Attribute>, Ident, Generics)> {
    match item {
        Item::Struct(st) => Ok((&mut st.attrs, st.ident.clone(), st.generics.clone())),
        Item::Enum(en) => Ok((&mut en.attrs, en.ident.clone(), en.generics.clone())),
        other => Err(syn::Error::new(
            other.span(),
            format!("#[{macro_name}] only supports struct or enum"),
        )),
    }
}
