//! Procedural macros for tinyroute.
//!
//! `#[endpoint]` reads a plain function signature at compile time and emits a
//! companion `<name>_handler()` function returning a `tinyroute::HandlerDescriptor`.
//! Every parameter becomes a parameter descriptor in declaration order:
//!
//! - `name: T` is required,
//! - `#[default(expr)] name: T` falls back to `expr` when the request omits it,
//! - `name: Option<T>` without a default falls back to `None`.
//!
//! ```rust,ignore
//! use tinyroute::endpoint;
//!
//! #[endpoint]
//! fn hemlo(title: String, uid: i64, name: String, #[default(0)] age: i64) -> String {
//!     format!("{uid}: hemlo, {title} {name}")
//! }
//!
//! app.register("/:title/:uid/params", [Method::GET], hemlo_handler())?;
//! ```

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{parse_macro_input, Attribute, Expr, FnArg, Ident, ItemFn, Pat, ReturnType, Type};

struct ParamDef {
    ident: Ident,
    ty: Type,
    default: Option<Expr>,
}

fn last_segment_is(ty: &Type, name: &str) -> bool {
    if let Type::Path(p) = ty {
        if let Some(seg) = p.path.segments.last() {
            return seg.ident == name;
        }
    }
    false
}

/// Remove `#[default(..)]` from a parameter and return its expression.
fn take_default(attrs: &mut Vec<Attribute>) -> syn::Result<Option<Expr>> {
    let mut default = None;
    let mut error = None;
    attrs.retain(|attr| {
        if !attr.path().is_ident("default") {
            return true;
        }
        match attr.parse_args::<Expr>() {
            Ok(expr) => default = Some(expr),
            Err(e) => error = Some(e),
        }
        false
    });
    match error {
        Some(e) => Err(e),
        None => Ok(default),
    }
}

fn collect_params(input: &mut ItemFn) -> syn::Result<Vec<ParamDef>> {
    let mut params = Vec::with_capacity(input.sig.inputs.len());
    for arg in input.sig.inputs.iter_mut() {
        let FnArg::Typed(pat_type) = arg else {
            return Err(syn::Error::new(
                arg.span(),
                "#[endpoint] cannot be applied to methods taking self",
            ));
        };
        let default = take_default(&mut pat_type.attrs)?;
        let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
            return Err(syn::Error::new(
                pat_type.pat.span(),
                "endpoint parameters must be plain identifiers",
            ));
        };
        params.push(ParamDef {
            ident: pat_ident.ident.clone(),
            ty: (*pat_type.ty).clone(),
            default,
        });
    }
    Ok(params)
}

fn expand(mut input: ItemFn) -> syn::Result<TokenStream2> {
    if let Some(asyncness) = input.sig.asyncness {
        return Err(syn::Error::new(
            asyncness.span(),
            "async endpoints are not supported; handlers run synchronously",
        ));
    }
    if !input.sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.sig.generics.span(),
            "generic endpoints are not supported",
        ));
    }

    let params = collect_params(&mut input)?;
    let fn_ident = input.sig.ident.clone();
    let vis = input.vis.clone();
    let handler_ident = format_ident!("{}_handler", fn_ident.unraw());
    let handler_name = fn_ident.unraw().to_string();

    let returns_result = match &input.sig.output {
        ReturnType::Type(_, ty) => last_segment_is(ty, "Result"),
        ReturnType::Default => false,
    };

    let descriptors = params.iter().map(|p| {
        let name = p.ident.unraw().to_string();
        let ty = &p.ty;
        match (&p.default, last_segment_is(ty, "Option")) {
            (Some(expr), _) => quote! {
                ::tinyroute::ParameterDescriptor::with_default::<#ty>(#name, #expr)
            },
            (None, true) => quote! {
                ::tinyroute::ParameterDescriptor::with_default::<#ty>(#name, ::core::option::Option::None)
            },
            (None, false) => quote! {
                ::tinyroute::ParameterDescriptor::required::<#ty>(#name)
            },
        }
    });

    // Locals get a prefix so a parameter named like the function cannot shadow it.
    let locals: Vec<Ident> = params
        .iter()
        .map(|p| format_ident!("__arg_{}", p.ident.unraw()))
        .collect();

    let bindings = params.iter().zip(&locals).map(|(p, local)| {
        let name = p.ident.unraw().to_string();
        let ty = &p.ty;
        quote! { let #local: #ty = __args.get(#name)?; }
    });

    let call_args = locals.iter();
    let call = if returns_result {
        quote! { ::core::result::Result::Ok(#fn_ident(#(#call_args),*)?) }
    } else {
        quote! { ::core::result::Result::Ok(#fn_ident(#(#call_args),*)) }
    };

    let doc = format!("Handler descriptor for [`{handler_name}`], derived from its signature.");

    Ok(quote! {
        #input

        #[doc = #doc]
        #[must_use]
        #vis fn #handler_ident() -> ::tinyroute::HandlerDescriptor {
            ::tinyroute::HandlerDescriptor::new(
                #handler_name,
                move |__args: &::tinyroute::Args| -> ::tinyroute::__private::anyhow::Result<_> {
                    #(#bindings)*
                    #call
                },
            )
            #(.param(#descriptors))*
        }
    })
}

#[proc_macro_attribute]
pub fn endpoint(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(Span::call_site(), "#[endpoint] takes no arguments")
            .to_compile_error()
            .into();
    }
    let input = parse_macro_input!(item as ItemFn);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
