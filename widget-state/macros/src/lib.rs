//! Procedural macros for `widget-state`.
extern crate proc_macro;

mod fields;

use proc_macro2::{Ident, Span, TokenStream};
use quote::{quote, ToTokens};

/// Path of the runtime crate in generated code.
pub(crate) struct CrateName;
pub(crate) const CRATE: CrateName = CrateName;

impl ToTokens for CrateName {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(quote!(::widget_state))
    }
}

pub(crate) fn ident_from_str(s: &str) -> Ident {
    Ident::new(s, Span::call_site())
}

#[proc_macro_derive(ScopedFields, attributes(field))]
pub fn derive_scoped_fields(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    match fields::derive_scoped_fields_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
