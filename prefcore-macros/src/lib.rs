use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, ImplItem, ImplItemFn, ItemImpl, Stmt,
    Variant, Visibility,
};

/// Turns an error enum into a foreign-safe prefcore error.
///
/// The macro:
/// 1. Adds `#[derive(Debug, thiserror::Error, uniffi::Error)]` and `#[uniffi(flat_error)]`
/// 2. Appends a `Generic { message: String }` variant unless one is declared
/// 3. Implements `From<anyhow::Error>`, flattening the cause chain into `message`
///    through `crate::error::AnyhowErrorExt`, so it is meant for use inside `prefcore`
///
/// # Usage
///
/// ```rust,ignore
/// #[prefcore_error]
/// pub enum BootError {
///     #[error("store unavailable: {0}")]
///     Store(#[from] StoreError),
/// }
/// ```
#[proc_macro_attribute]
pub fn prefcore_error(_args: TokenStream, input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(
            &input,
            "prefcore_error can only be applied to enums",
        )
        .to_compile_error()
        .into();
    };

    let enum_name = &input.ident;
    let visibility = &input.vis;

    // Existing derives and uniffi attributes are regenerated below
    let attrs: Vec<_> = input
        .attrs
        .iter()
        .filter(|attr| !attr.path().is_ident("derive") && !attr.path().is_ident("uniffi"))
        .collect();

    let generics = &input.generics;

    let mut variants = data_enum.variants.clone();
    if !has_generic_variant(&variants) {
        let generic_variant: Variant = syn::parse_quote! {
            /// A generic error that can wrap any anyhow error.
            #[error("Generic error: {message}")]
            Generic {
                /// The flattened error chain.
                message: String
            }
        };
        variants.push(generic_variant);
    }

    quote! {
        #[derive(Debug, thiserror::Error, uniffi::Error)]
        #[uniffi(flat_error)]
        #(#attrs)*
        #visibility enum #enum_name #generics {
            #variants
        }

        impl #generics From<anyhow::Error> for #enum_name #generics {
            fn from(err: anyhow::Error) -> Self {
                Self::Generic {
                    message: crate::error::AnyhowErrorExt::to_generic_message(&err),
                }
            }
        }
    }
    .into()
}

/// Wraps `uniffi::export` and scopes every public method in a logging context.
///
/// The macro:
/// 1. Forwards the attribute arguments to `#[uniffi::export]`
/// 2. Injects `let _prefcore_logger_ctx = crate::primitives::logger::LogContext::new("TypeName");`
///    at the start of every synchronous `pub fn`. Async methods are left alone: the
///    context is thread-local and must not be held across an `.await`, so they open it
///    themselves around their synchronous sections.
/// 3. Adds `async_runtime = "tokio"` when a public method is async
///
/// # Usage
///
/// ```rust,ignore
/// #[prefcore_export]
/// impl SettingsBoot {
///     pub async fn boot(&self) -> Result<BootSummary, BootError> {
///         // no context injected here
///     }
///
///     pub fn storage_key(&self) -> String {
///         // log lines here are prefixed with [SettingsBoot]
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn prefcore_export(args: TokenStream, input: TokenStream) -> TokenStream {
    let input_impl = parse_macro_input!(input as ItemImpl);

    let type_name = self_type_name(&input_impl);
    let has_async_functions = has_async_functions_in_impl(&input_impl.items);

    let items = input_impl
        .items
        .iter()
        .map(|item| match item {
            ImplItem::Fn(method) if matches!(method.vis, Visibility::Public(_)) => {
                let mut method = method.clone();
                inject_logging_context(&mut method, &type_name);
                ImplItem::Fn(method)
            }
            other => other.clone(),
        })
        .collect();

    let new_impl = ItemImpl {
        items,
        ..input_impl
    };

    let args = with_async_runtime(args.into(), has_async_functions);

    quote! {
        #[uniffi::export(#args)]
        #new_impl
    }
    .into()
}

fn has_generic_variant<P>(variants: &syn::punctuated::Punctuated<Variant, P>) -> bool {
    variants.iter().any(|variant| variant.ident == "Generic")
}

fn self_type_name(input_impl: &ItemImpl) -> String {
    match &*input_impl.self_ty {
        syn::Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map_or_else(|| "Unknown".to_string(), |segment| segment.ident.to_string()),
        _ => "Unknown".to_string(),
    }
}

/// Check if any public functions in the impl items are async
fn has_async_functions_in_impl(impl_items: &[ImplItem]) -> bool {
    impl_items.iter().any(|item| {
        if let ImplItem::Fn(method) = item {
            matches!(method.vis, Visibility::Public(_))
                && method.sig.asyncness.is_some()
        } else {
            false
        }
    })
}

fn with_async_runtime(
    args: proc_macro2::TokenStream,
    has_async_functions: bool,
) -> proc_macro2::TokenStream {
    if !has_async_functions {
        args
    } else if args.is_empty() {
        quote! { async_runtime = "tokio" }
    } else {
        quote! { #args, async_runtime = "tokio" }
    }
}

fn inject_logging_context(method: &mut ImplItemFn, type_name: &str) {
    if method.sig.asyncness.is_some() {
        return;
    }
    let context_stmt: Stmt = syn::parse_quote! {
        let _prefcore_logger_ctx = crate::primitives::logger::LogContext::new(#type_name);
    };
    method.block.stmts.insert(0, context_stmt);
}
