use proc_macro::TokenStream;
use proc_macro2::Span;
use proc_macro_error::abort;
use quote::quote;
use syn::{parse_macro_input, FnArg, Ident, ItemTrait, Pat, PatIdent, TraitItem, TypeParamBound};

pub(crate) fn intercepted_impl(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item_trait = parse_macro_input!(item as ItemTrait);
    let trait_name = &item_trait.ident;

    if !item_trait.generics.params.is_empty() {
        abort!(
            item_trait.generics,
            "#[intercepted] does not support generic traits"
        );
    }

    check_supertraits(&item_trait);

    let forwarders = item_trait.items.iter().map(|item| match item {
        TraitItem::Fn(method) => {
            let mut sig = method.sig.clone();
            let method_name = &sig.ident;
            let method_str = method_name.to_string();

            if sig.asyncness.is_some() {
                abort!(sig.asyncness, "#[intercepted] does not support async methods");
            }
            if sig.unsafety.is_some() {
                abort!(sig.unsafety, "#[intercepted] does not support unsafe methods");
            }

            match sig.inputs.first() {
                Some(FnArg::Receiver(receiver))
                    if receiver.reference.is_some() && receiver.mutability.is_none() => {}
                Some(FnArg::Receiver(receiver))
                    if receiver.reference.is_some() && receiver.mutability.is_some() => abort!(
                    receiver,
                    "`{}` takes `&mut self`, which cannot be forwarded through a shared bean",
                    method_str;
                    help = "use interior mutability and take `&self`"
                ),
                _ => abort!(
                    sig,
                    "`{}` must take `&self` to be intercepted", method_str
                ),
            }

            // 参数统一改写为普通标识符，便于在闭包中转发
            let mut arg_names = Vec::new();
            for (index, input) in sig.inputs.iter_mut().enumerate() {
                if let FnArg::Typed(pat_type) = input {
                    let ident = match &*pat_type.pat {
                        Pat::Ident(pat_ident) if pat_ident.subpat.is_none() => {
                            pat_ident.ident.clone()
                        }
                        _ => Ident::new(&format!("__arg{}", index), Span::call_site()),
                    };
                    *pat_type.pat = Pat::Ident(PatIdent {
                        attrs: Vec::new(),
                        by_ref: None,
                        mutability: None,
                        ident: ident.clone(),
                        subpat: None,
                    });
                    arg_names.push(ident);
                }
            }

            quote! {
                #sig {
                    self.invoke(#method_str, move |__target| __target.#method_name(#(#arg_names),*))
                }
            }
        }
        TraitItem::Type(assoc) => abort!(
            assoc,
            "#[intercepted] does not support associated types"
        ),
        TraitItem::Const(assoc) => abort!(
            assoc,
            "#[intercepted] does not support associated constants"
        ),
        other => abort!(other, "unsupported item in #[intercepted] trait"),
    });

    let forwarders: Vec<_> = forwarders.collect();

    let expanded = quote! {
        #item_trait

        impl<__T> #trait_name for ::beanstalk_core::aop::TransactionalProxy<__T>
        where
            __T: ?Sized + #trait_name,
        {
            #(#forwarders)*
        }
    };

    TokenStream::from(expanded)
}

/// 契约必须是 `Send + Sync`，且不能带有代理无法实现的其他父 trait
fn check_supertraits(item_trait: &ItemTrait) {
    let mut has_send = false;
    let mut has_sync = false;

    for bound in &item_trait.supertraits {
        match bound {
            TypeParamBound::Trait(trait_bound) => {
                let last = trait_bound.path.segments.last().map(|s| s.ident.to_string());
                match last.as_deref() {
                    Some("Send") => has_send = true,
                    Some("Sync") => has_sync = true,
                    _ => abort!(
                        trait_bound,
                        "#[intercepted] traits may only extend `Send` and `Sync`";
                        help = "the generated proxy cannot implement other supertraits"
                    ),
                }
            }
            TypeParamBound::Lifetime(_) => {}
            other => abort!(other, "unsupported supertrait bound"),
        }
    }

    if !(has_send && has_sync) {
        abort!(
            item_trait.ident,
            "#[intercepted] trait `{}` must extend `Send + Sync`", item_trait.ident;
            help = "write `pub trait {}: Send + Sync`", item_trait.ident
        );
    }
}
