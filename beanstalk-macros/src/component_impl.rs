use proc_macro::TokenStream;
use proc_macro_error::abort;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Field, Fields, GenericArgument, PathArguments, Type,
};

use crate::attribute_helpers::{
    get_autowired_bean_name, get_bean_name, get_contract_type, get_post_construct_methods,
    get_scope, has_flag, to_camel_case,
};

pub(crate) fn derive_component_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    if !input.generics.params.is_empty() {
        abort!(
            input.generics,
            "#[derive(Component)] does not support generic types";
            help = "register a concrete wrapper type instead"
        );
    }

    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(fields) => {
                if fields.unnamed.iter().any(|f| has_flag(&f.attrs, "autowired")) {
                    abort!(fields, "#[autowired] requires a named field");
                }
                Vec::new()
            }
        },
        _ => abort!(input, "#[derive(Component)] can only be used on structs"),
    };

    // 显式名称；未指定时由注册表按类型名推导
    let bean_name = get_bean_name(&input.attrs).map(|bean_name| {
        quote! { .name(#bean_name) }
    });

    let scope = get_scope(&input.attrs).map(|scope| {
        quote! { .scope(#scope) }
    });

    let lazy = has_flag(&input.attrs, "lazy").then(|| quote! { .lazy(true) });

    // 依赖槽：槽名即目标 Bean 名称
    let dependencies = fields
        .iter()
        .filter_map(|field| {
            field
                .attrs
                .iter()
                .find(|attr| attr.path().is_ident("autowired"))
                .map(|attr| (*field, attr))
        })
        .map(|(field, attr)| {
            let field_name = field.ident.as_ref();
            let dependency_type = extract_autowired_type(&field.ty);
            let slot = get_autowired_bean_name(attr).unwrap_or_else(|| {
                let field_str = field_name.map(|ident| ident.to_string()).unwrap_or_default();
                to_camel_case(&field_str)
            });

            quote! {
                .dependency::<#dependency_type, _>(
                    #slot,
                    |bean: &mut #name, dependency: ::std::sync::Arc<#dependency_type>| {
                        bean.#field_name.inject(dependency)
                    },
                )
            }
        });

    let bean_name_aware =
        has_flag(&input.attrs, "bean_name_aware").then(|| quote! { .bean_name_aware() });
    let context_aware = has_flag(&input.attrs, "application_context_aware")
        .then(|| quote! { .application_context_aware() });

    let post_constructs = get_post_construct_methods(&input.attrs).into_iter().map(|method| {
        let method_name = method.to_string();
        quote! {
            .post_construct(#method_name, |bean: &mut #name| bean.#method())
        }
    });

    let initializing_bean =
        has_flag(&input.attrs, "initializing_bean").then(|| quote! { .initializing_bean() });

    let contract = get_contract_type(&input.attrs, "contract");
    let transactional = get_contract_type(&input.attrs, "transactional");

    let publication = match (contract, transactional) {
        (Some(_), Some(ty)) => abort!(
            ty,
            "#[contract] and #[transactional] cannot be combined";
            help = "#[transactional(dyn Trait)] already publishes the bean as `dyn Trait`"
        ),
        (Some(contract), None) => quote! {
            .expose::<#contract, _>(
                |bean: ::std::sync::Arc<#name>| -> ::std::sync::Arc<#contract> { bean },
            )
        },
        (None, Some(contract)) => quote! {
            .transactional::<#contract, _, _>(
                |bean: ::std::sync::Arc<#name>| -> ::std::sync::Arc<#contract> { bean },
                |target: ::std::sync::Arc<#contract>,
                 manager: ::std::sync::Arc<dyn ::beanstalk_core::aop::TransactionManager>,
                 bean_name: &str|
                 -> ::std::sync::Arc<#contract> {
                    ::std::sync::Arc::new(::beanstalk_core::aop::TransactionalProxy::new(
                        target, manager, bean_name,
                    ))
                },
            )
        },
        (None, None) => quote! {},
    };

    let type_name = name.to_string();

    let expanded = quote! {
        impl ::beanstalk_core::Component for #name {
            fn descriptor() -> ::beanstalk_core::TypeDescriptor {
                ::beanstalk_core::TypeDescriptor::builder::<#name>()
                    .module_path(::core::module_path!())
                    #bean_name
                    #scope
                    #lazy
                    .default_constructible()
                    #(#dependencies)*
                    #bean_name_aware
                    #context_aware
                    #(#post_constructs)*
                    #initializing_bean
                    #publication
                    .build()
            }
        }

        ::beanstalk_core::inventory::submit! {
            ::beanstalk_core::ComponentRegistration {
                type_name: #type_name,
                module_path: ::core::module_path!(),
                descriptor: <#name as ::beanstalk_core::Component>::descriptor,
            }
        }
    };

    TokenStream::from(expanded)
}

/// 从 `Autowired<T>` 中提取 T
fn extract_autowired_type(ty: &Type) -> &Type {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Autowired" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return inner;
                    }
                }
            }
        }
    }

    abort!(
        ty,
        "#[autowired] fields must have type `Autowired<T>`";
        help = "declare the field as `Autowired<YourType>` or `Autowired<dyn YourTrait>`"
    )
}
