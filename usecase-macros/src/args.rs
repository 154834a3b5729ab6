use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Ident, LitStr, Result, Token, Type};

enum ArgValue {
    Str(LitStr),
    Type(Box<Type>),
}

struct Arg {
    key: Ident,
    value: ArgValue,
}

impl Parse for Arg {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        let value = if input.peek(LitStr) {
            ArgValue::Str(input.parse()?)
        } else {
            ArgValue::Type(Box::new(input.parse()?))
        };
        Ok(Self { key, value })
    }
}

/// 属性参数：`key = "literal"` 或 `key = Type`，逗号分隔
pub(crate) struct AttrArgs {
    args: Vec<Arg>,
}

impl Parse for AttrArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let parsed = Punctuated::<Arg, Token![,]>::parse_terminated(input)?;
        let mut args: Vec<Arg> = Vec::new();
        for arg in parsed {
            if args.iter().any(|a| a.key == arg.key) {
                return Err(syn::Error::new(
                    arg.key.span(),
                    format!("duplicate key '{}' in attribute", arg.key),
                ));
            }
            args.push(arg);
        }
        Ok(Self { args })
    }
}

impl AttrArgs {
    fn take(&mut self, key: &str) -> Option<Arg> {
        let pos = self.args.iter().position(|a| a.key == key)?;
        Some(self.args.remove(pos))
    }

    pub(crate) fn take_str(&mut self, key: &str) -> Result<Option<LitStr>> {
        match self.take(key) {
            None => Ok(None),
            Some(Arg {
                value: ArgValue::Str(lit),
                ..
            }) => Ok(Some(lit)),
            Some(Arg { key, .. }) => Err(syn::Error::new(
                key.span(),
                format!("expected string literal for '{key}'"),
            )),
        }
    }

    pub(crate) fn take_type(&mut self, key: &str) -> Result<Option<Type>> {
        match self.take(key) {
            None => Ok(None),
            Some(Arg {
                value: ArgValue::Type(ty),
                ..
            }) => Ok(Some(*ty)),
            Some(Arg { key, .. }) => Err(syn::Error::new(
                key.span(),
                format!("expected a type for '{key}'"),
            )),
        }
    }

    /// 剩余未识别的键视为错误
    pub(crate) fn finish(self, expected: &str) -> Result<()> {
        match self.args.into_iter().next() {
            None => Ok(()),
            Some(arg) => Err(syn::Error::new(
                arg.key.span(),
                format!("unknown key '{}'; expected {expected}", arg.key),
            )),
        }
    }
}
