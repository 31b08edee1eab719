//! Proc macros for the configurable crate.
//!
//! This crate provides the `#[derive(Configurable)]` macro

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Expr, Ident, ext::IdentExt, parse_macro_input, spanned::Spanned};

/// Options parsed from the `#[configurable(...)]` attribute.
struct ConfigurableOptions {
    attributes: Vec<Ident>,
    defaults: Vec<(Ident, Expr)>,
    extension: Option<Expr>,
}

impl ConfigurableOptions {
    fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut attributes = Vec::new();
        let mut defaults = Vec::new();
        let mut extension = None;

        for attr in attrs {
            if attr.path().is_ident("configurable") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("attributes") {
                        meta.parse_nested_meta(|inner| {
                            let ident = inner.path.get_ident().ok_or_else(|| {
                                syn::Error::new(
                                    inner.path.span(),
                                    "attribute names must be identifiers",
                                )
                            })?;
                            attributes.push(ident.clone());
                            Ok(())
                        })
                    } else if meta.path.is_ident("defaults") {
                        meta.parse_nested_meta(|inner| {
                            let ident = inner.path.get_ident().cloned().ok_or_else(|| {
                                syn::Error::new(
                                    inner.path.span(),
                                    "default names must be identifiers",
                                )
                            })?;
                            let value: Expr = inner.value()?.parse()?;
                            defaults.push((ident, value));
                            Ok(())
                        })
                    } else if meta.path.is_ident("extension") {
                        let value: Expr = meta.value()?.parse()?;
                        if extension.replace(value).is_some() {
                            return Err(syn::Error::new(
                                meta.path.span(),
                                "extension may only be given once",
                            ));
                        }
                        Ok(())
                    } else {
                        Err(syn::Error::new(
                            meta.path.span(),
                            format!("unknown configurable attribute: {:?}", meta.path.get_ident()),
                        ))
                    }
                })?;
            }
        }

        Ok(Self {
            attributes,
            defaults,
            extension,
        })
    }
}

/// Derive macro for the `Configurable` trait.
///
/// This macro automatically:
/// - Implements the `Configurable` trait from the declared attributes,
///   defaults and extension
/// - Registers the host type with `inventory`
///
/// # Example
///
/// ```rust,ignore
/// use configurable::Configurable;
///
/// #[derive(Configurable)]
/// #[configurable(attributes(title, country), defaults(name = "John Doe"))]
/// struct Greeter;
/// ```
///
/// This expands to roughly:
///
/// ```rust,ignore
/// impl configurable::Configurable for Greeter {
///     fn declaration() -> Result<configurable::Declaration, configurable::Error> {
///         configurable::Declaration::builder()
///             .attribute("title")
///             .attribute("country")
///             .default_value("name", "John Doe")?
///             .build()
///     }
/// }
///
/// configurable::submit_configurable!(Greeter);
/// ```
#[proc_macro_derive(Configurable, attributes(configurable))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_configurable_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_configurable_impl(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "configurable hosts cannot be generic",
        ));
    }

    let options = ConfigurableOptions::from_attrs(&input.attrs)?;
    let name = &input.ident;

    let attributes = options.attributes.iter().map(|ident| ident.unraw().to_string());
    let default_names = options
        .defaults
        .iter()
        .map(|(ident, _)| ident.unraw().to_string());
    let default_values = options.defaults.iter().map(|(_, value)| value);
    let extension = options
        .extension
        .iter()
        .map(|extension| quote! { .extension(#extension) });

    Ok(quote! {
        impl ::configurable::Configurable for #name {
            fn declaration() -> ::core::result::Result<
                ::configurable::Declaration,
                ::configurable::Error,
            > {
                ::configurable::Declaration::builder()
                    #( .attribute(#attributes) )*
                    #( .default_value(#default_names, #default_values)? )*
                    #( #extension )*
                    .build()
            }
        }

        ::configurable::submit_configurable!(#name);
    })
}
