//! Attribute macro that turns a function into a stet expectation test.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parser as _;
use syn::spanned::Spanned as _;
use syn::{ExprPath, ItemFn, LitBool, ReturnType, Visibility};

/// Marks `fn name(t: &mut stet::ExpectTest)` as an expectation test.
///
/// The function becomes a `#[test]` that runs against the process-wide suite
/// and panics with the failure report when any check fails.
///
/// Options:
///
/// - `promote = true|false` overrides `STET_PROMOTE` for this test
/// - `allow_unconsumed` discards output left after the last check
/// - `expect_unconsumed` requires output to be left after the last check
/// - `suite = path::to::fn` runs against the suite returned by a
///   `fn() -> &'static stet::ExpectTests` instead of the global one
///
/// ```ignore
/// #[stet::expect_test(promote = false)]
/// fn lists(t: &mut stet::ExpectTest) {
///     t.print("a, b");
///     t.expect("a, b");
/// }
/// ```
#[proc_macro_attribute]
pub fn expect_test(args: TokenStream, item: TokenStream) -> TokenStream {
    expand(args.into(), item.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Debug, Default)]
struct TestArgs {
    promote: Option<bool>,
    allow_unconsumed: bool,
    expect_unconsumed: bool,
    suite: Option<ExprPath>,
}

impl TestArgs {
    fn parse(args: TokenStream2) -> syn::Result<Self> {
        let mut parsed = Self::default();
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("promote") {
                let value: LitBool = meta.value()?.parse()?;
                parsed.promote = Some(value.value);
            } else if meta.path.is_ident("allow_unconsumed") {
                parsed.allow_unconsumed = true;
            } else if meta.path.is_ident("expect_unconsumed") {
                parsed.expect_unconsumed = true;
            } else if meta.path.is_ident("suite") {
                parsed.suite = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error(
                    "unsupported option; expected promote, allow_unconsumed, expect_unconsumed or suite",
                ));
            }
            Ok(())
        });
        parser.parse2(args)?;
        if parsed.allow_unconsumed && parsed.expect_unconsumed {
            return Err(syn::Error::new(
                proc_macro2::Span::call_site(),
                "allow_unconsumed and expect_unconsumed are mutually exclusive",
            ));
        }
        Ok(parsed)
    }
}

fn expand(args: TokenStream2, item: TokenStream2) -> syn::Result<TokenStream2> {
    let options = TestArgs::parse(args)?;
    let function: ItemFn = syn::parse2(item)?;
    check_signature(&function)?;

    let name = &function.sig.ident;
    let vis = &function.vis;
    let attrs = &function.attrs;
    let mut body = function.clone();
    body.attrs.clear();
    body.vis = Visibility::Inherited;

    let suite = options.suite.as_ref().map_or_else(
        || {
            quote! {
                match ::stet::ExpectTests::global() {
                    ::core::result::Result::Ok(suite) => suite,
                    ::core::result::Result::Err(error) => {
                        ::core::panic!("stet could not set up the expectation suite: {error}")
                    }
                }
            }
        },
        |path| quote! { #path() },
    );
    let promote = options
        .promote
        .map(|value| quote! { .promote(#value) });
    let unconsumed = if options.allow_unconsumed {
        Some(quote! { .allow_unconsumed_output() })
    } else if options.expect_unconsumed {
        Some(quote! { .expect_unconsumed_output() })
    } else {
        None
    };

    Ok(quote! {
        #[test]
        #(#attrs)*
        #vis fn #name() {
            #body
            let suite: &::stet::ExpectTests = #suite;
            suite.test() #promote #unconsumed .run(#name);
        }
    })
}

fn check_signature(function: &ItemFn) -> syn::Result<()> {
    let sig = &function.sig;
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new(
            asyncness.span(),
            "expectation tests cannot be async",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "expectation tests cannot be generic",
        ));
    }
    if sig.inputs.len() != 1 {
        return Err(syn::Error::new(
            sig.inputs.span(),
            "expectation tests take exactly one `&mut stet::ExpectTest` parameter",
        ));
    }
    if let ReturnType::Type(_, ty) = &sig.output {
        return Err(syn::Error::new(
            ty.span(),
            "expectation tests report failures through the test handle and return `()`",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(args: TokenStream2, item: TokenStream2) -> String {
        expand(args, item).expect("expand").to_string()
    }

    fn error(args: TokenStream2, item: TokenStream2) -> String {
        expand(args, item).expect_err("should be rejected").to_string()
    }

    #[test]
    fn wraps_function_in_test_using_global_suite() {
        let output = expand_str(
            quote! {},
            quote! { fn greets(t: &mut ExpectTest) { t.print("Ok"); t.expect("Ok"); } },
        );
        assert!(output.starts_with("# [test] fn greets ()"));
        assert!(output.contains(":: stet :: ExpectTests :: global ()"));
        assert!(output.contains("suite . test () . run (greets)"));
    }

    #[test]
    fn applies_options_in_order() {
        let output = expand_str(
            quote! { promote = false, allow_unconsumed },
            quote! { fn partial(t: &mut ExpectTest) {} },
        );
        assert!(
            output.contains("suite . test () . promote (false) . allow_unconsumed_output () . run (partial)"),
            "{output}"
        );
    }

    #[test]
    fn custom_suite_is_called() {
        let output = expand_str(
            quote! { suite = crate::support::suite },
            quote! { fn custom(t: &mut ExpectTest) {} },
        );
        assert!(output.contains("crate :: support :: suite ()"), "{output}");
        assert!(!output.contains("global"), "{output}");
    }

    #[test]
    fn keeps_attributes_and_visibility() {
        let output = expand_str(
            quote! {},
            quote! {
                #[ignore]
                pub fn slow(t: &mut ExpectTest) {}
            },
        );
        assert!(output.starts_with("# [test] # [ignore] pub fn slow ()"), "{output}");
    }

    #[test]
    fn rejects_unknown_option() {
        let message = error(quote! { verbose }, quote! { fn f(t: &mut ExpectTest) {} });
        assert!(message.starts_with("unsupported option"), "{message}");
    }

    #[test]
    fn rejects_conflicting_unconsumed_options() {
        let message = error(
            quote! { allow_unconsumed, expect_unconsumed },
            quote! { fn f(t: &mut ExpectTest) {} },
        );
        assert!(message.contains("mutually exclusive"), "{message}");
    }

    #[test]
    fn rejects_wrong_arity() {
        let message = error(quote! {}, quote! { fn f() {} });
        assert!(message.contains("exactly one"), "{message}");
    }

    #[test]
    fn rejects_async_functions() {
        let message = error(quote! {}, quote! { async fn f(t: &mut ExpectTest) {} });
        assert!(message.contains("async"), "{message}");
    }

    #[test]
    fn rejects_return_values() {
        let message = error(
            quote! {},
            quote! { fn f(t: &mut ExpectTest) -> Result<(), String> { Ok(()) } },
        );
        assert!(message.contains("return"), "{message}");
    }
}
