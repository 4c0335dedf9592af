use proc_macro::TokenStream;
use quote::quote;

/// Find the value of a `#[name = value]` attribute
fn name_value_attribute<'a>(attrs: &'a [syn::Attribute], name: &str) -> Option<&'a syn::Expr> {
    attrs
        .iter()
        .flat_map(|attr| match &attr.meta {
            syn::Meta::NameValue(name_value) => Some(name_value),
            _ => None,
        })
        .find(|name_value| name_value.path.is_ident(name))
        .map(|name_value| &name_value.value)
}

fn parse_enum(input: TokenStream) -> Result<syn::ItemEnum, syn::Error> {
    syn::parse(input)
}

/// Derives [Display](std::fmt::Display), [Error](std::error::Error) and `From` conversions
/// for an error enum.
///
/// Every variant needs a `#[msg = "..."]` attribute. Variants may either be unit variants
/// or wrap exactly one value, which then becomes the error source.
#[proc_macro_derive(Error, attributes(msg))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    let item = match parse_enum(input) {
        Ok(item) => item,
        Err(error) => return error.to_compile_error().into(),
    };

    let name = &item.ident;
    let mut variant_displays = vec![];
    let mut from_impls = vec![];
    let mut variant_sources = vec![];

    for variant in &item.variants {
        let ident = &variant.ident;

        let Some(display_value) = name_value_attribute(&variant.attrs, "msg") else {
            return syn::Error::new_spanned(variant, "need #[msg = ...] attribute")
                .to_compile_error()
                .into();
        };

        match &variant.fields {
            syn::Fields::Unit => {
                variant_displays.push(quote!(
                    Self::#ident => ::std::fmt::Display::fmt(&(#display_value), f)
                ));
            },
            syn::Fields::Unnamed(unnamed_fields) if unnamed_fields.unnamed.len() == 1 => {
                let ty = &unnamed_fields.unnamed[0].ty;

                from_impls.push(quote!(
                    #[automatically_derived]
                    impl From<#ty> for #name {
                        fn from(value: #ty) -> Self {
                            Self::#ident(value)
                        }
                    }
                ));
                variant_displays.push(quote!(
                    Self::#ident(_) => ::std::fmt::Display::fmt(&(#display_value), f)
                ));
                variant_sources.push(quote!(Self::#ident(ref value) => Some(value)));
            },
            _ => {
                return syn::Error::new_spanned(
                    variant,
                    "variants must be unit variants or wrap exactly one value",
                )
                .to_compile_error()
                .into()
            },
        }
    }

    quote!(
        #[automatically_derived]
        impl ::std::fmt::Display for #name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> Result<(), ::std::fmt::Error> {
                match self {
                    #(
                        #variant_displays,
                    )*
                }
            }
        }

        #(
            #from_impls
        )*

        #[automatically_derived]
        impl ::std::error::Error for #name {
            fn source(&self) -> Option<&(dyn ::std::error::Error + 'static)> {
                match self {
                    #(
                        #variant_sources,
                    )*
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }
    )
    .into()
}

/// Derives a stable string code and a message template for every variant of a
/// fieldless diagnostics enum.
///
/// ```ignore
/// #[derive(ErrorCode)]
/// enum Code {
///     #[code = "unexpected-doctype"]
///     #[msg = "Unexpected DOCTYPE. Ignored."]
///     UnexpectedDoctype,
/// }
/// ```
///
/// This generates `code()`, `message_template()`, `from_code()` and a `Display`
/// implementation that prints the code.
#[proc_macro_derive(ErrorCode, attributes(code, msg))]
pub fn derive_error_code(input: TokenStream) -> TokenStream {
    let item = match parse_enum(input) {
        Ok(item) => item,
        Err(error) => return error.to_compile_error().into(),
    };

    let name = &item.ident;
    let mut idents = vec![];
    let mut codes = vec![];
    let mut messages = vec![];

    for variant in &item.variants {
        if !matches!(variant.fields, syn::Fields::Unit) {
            return syn::Error::new_spanned(variant, "error codes must be unit variants")
                .to_compile_error()
                .into();
        }

        let (Some(code), Some(message)) = (
            name_value_attribute(&variant.attrs, "code"),
            name_value_attribute(&variant.attrs, "msg"),
        ) else {
            return syn::Error::new_spanned(
                variant,
                "need both #[code = ...] and #[msg = ...] attributes",
            )
            .to_compile_error()
            .into();
        };

        idents.push(&variant.ident);
        codes.push(code);
        messages.push(message);
    }

    quote!(
        #[automatically_derived]
        impl #name {
            /// The stable, machine readable name of this code
            #[must_use]
            pub const fn code(&self) -> &'static str {
                match self {
                    #(
                        Self::#idents => #codes,
                    )*
                }
            }

            /// The human readable message, with `{variable}` placeholders
            #[must_use]
            pub const fn message_template(&self) -> &'static str {
                match self {
                    #(
                        Self::#idents => #messages,
                    )*
                }
            }

            #[must_use]
            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    #(
                        #codes => Some(Self::#idents),
                    )*
                    _ => None,
                }
            }
        }

        #[automatically_derived]
        impl ::std::fmt::Display for #name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> Result<(), ::std::fmt::Error> {
                f.write_str(self.code())
            }
        }
    )
    .into()
}
