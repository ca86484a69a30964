use proc_macro_error::abort;
use quote::quote;
use syn::{Attribute, LitStr, Type};

/// 从 #[component("name")] 或 #[component(name = "name")] 中提取 bean 名称
pub(crate) fn get_bean_name(attrs: &[Attribute]) -> Option<String> {
    for attr in attrs {
        if !attr.path().is_ident("component") {
            continue;
        }

        if let Ok(name_lit) = attr.parse_args::<LitStr>() {
            return Some(name_lit.value());
        }

        let mut name = None;
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse::<LitStr>()?.value());
                Ok(())
            } else {
                Err(meta.error("expected `name = \"...\"`"))
            }
        });
        if let Err(e) = parsed {
            abort!(attr, "invalid #[component] attribute: {}", e);
        }
        return name;
    }
    None
}

/// 从 #[scope("...")] 中提取作用域
///
/// 空字符串等同于未声明；未知的作用域在编译期报错
pub(crate) fn get_scope(attrs: &[Attribute]) -> Option<proc_macro2::TokenStream> {
    for attr in attrs {
        if !attr.path().is_ident("scope") {
            continue;
        }

        let scope_lit = match attr.parse_args::<LitStr>() {
            Ok(lit) => lit,
            Err(_) => abort!(
                attr,
                "expected #[scope(\"singleton\")] or #[scope(\"prototype\")]"
            ),
        };

        return match normalize_scope(&scope_lit.value()).as_str() {
            "" => None,
            "singleton" => Some(quote! { ::beanstalk_core::Scope::Singleton }),
            "prototype" => Some(quote! { ::beanstalk_core::Scope::Prototype }),
            _ => abort!(
                scope_lit.span(),
                "unknown scope '{}'", scope_lit.value();
                help = "supported scopes are \"singleton\" and \"prototype\""
            ),
        };
    }
    None
}

/// 与运行期 `Scope::from_str` 一致：忽略首尾空白和大小写
fn normalize_scope(value: &str) -> String {
    value.trim().to_lowercase()
}

/// 是否带有某个无参标记属性，例如 #[lazy]
pub(crate) fn has_flag(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// 从属性中提取 post_construct 方法名
/// 支持格式: #[post_construct("custom_method")] 或 #[post_construct]（默认使用 post_construct）
/// 可以重复出现，按书写顺序返回
pub(crate) fn get_post_construct_methods(attrs: &[Attribute]) -> Vec<syn::Ident> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("post_construct"))
        .map(|attr| match &attr.meta {
            syn::Meta::Path(path) => {
                syn::Ident::new("post_construct", path.segments[0].ident.span())
            }
            _ => match attr.parse_args::<LitStr>() {
                Ok(method_lit) => match method_lit.parse::<syn::Ident>() {
                    Ok(ident) => ident,
                    Err(_) => abort!(
                        method_lit.span(),
                        "'{}' is not a method name",
                        method_lit.value()
                    ),
                },
                Err(_) => abort!(
                    attr,
                    "expected #[post_construct] or #[post_construct(\"method\")]"
                ),
            },
        })
        .collect()
}

/// 从 #[contract(dyn Trait)] / #[transactional(dyn Trait)] 中提取发布契约类型
pub(crate) fn get_contract_type(attrs: &[Attribute], name: &str) -> Option<Type> {
    for attr in attrs {
        if !attr.path().is_ident(name) {
            continue;
        }

        return match attr.parse_args::<Type>() {
            Ok(ty) => Some(ty),
            Err(_) => abort!(
                attr,
                "#[{}] requires the published contract type", name;
                help = "write #[{}(dyn YourTrait)]", name
            ),
        };
    }
    None
}

/// 从 #[autowired("beanName")] 中提取 bean 名称，#[autowired] 返回 None
pub(crate) fn get_autowired_bean_name(attr: &Attribute) -> Option<String> {
    match &attr.meta {
        syn::Meta::Path(_) => None,
        _ => match attr.parse_args::<LitStr>() {
            Ok(name_lit) if !name_lit.value().is_empty() => Some(name_lit.value()),
            Ok(_) => None,
            Err(_) => abort!(attr, "expected #[autowired] or #[autowired(\"beanName\")]"),
        },
    }
}

/// 将 snake_case 字段名转换为 lowerCamelCase 依赖槽名称
///
/// order_service -> orderService
pub(crate) fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = false;

    for ch in s.trim_start_matches('_').chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            result.push(ch);
        }
    }

    result
}
