//! `#[derive(ScopedFields)]` macro
use crate::{ident_from_str, CRATE};
use quote::quote;
use syn::{spanned::Spanned, Data, Lit, Meta, NestedMeta};

struct FieldAttrs {
    skip: bool,
    rename: Option<String>,
}

impl FieldAttrs {
    pub fn parse(field: &syn::Field) -> Result<FieldAttrs, syn::Error> {
        let mut skip = false;
        let mut rename = None;
        for attr in &field.attrs {
            if !attr.path.is_ident("field") {
                continue;
            }
            match attr.parse_meta()? {
                Meta::List(meta_list) => {
                    for meta_item in meta_list.nested.iter() {
                        match meta_item {
                            NestedMeta::Meta(Meta::Path(path)) if path.is_ident("skip") => {
                                if skip {
                                    return Err(syn::Error::new(
                                        meta_item.span(),
                                        "duplicate attribute",
                                    ));
                                }
                                skip = true;
                            }
                            NestedMeta::Meta(Meta::NameValue(nv)) if nv.path.is_ident("rename") => {
                                if rename.is_some() {
                                    return Err(syn::Error::new(
                                        meta_item.span(),
                                        "duplicate attribute",
                                    ));
                                }
                                match &nv.lit {
                                    Lit::Str(s) if !s.value().is_empty() => {
                                        rename = Some(s.value());
                                    }
                                    _ => {
                                        return Err(syn::Error::new(
                                            nv.lit.span(),
                                            "expected a non-empty string literal",
                                        ))
                                    }
                                }
                            }
                            _ => {
                                return Err(syn::Error::new(
                                    meta_item.span(),
                                    "unrecognized `field` attribute",
                                ))
                            }
                        }
                    }
                }
                _ => {
                    return Err(syn::Error::new(
                        attr.span(),
                        "unrecognized `field` attribute",
                    ))
                }
            }
        }

        if skip && rename.is_some() {
            return Err(syn::Error::new(
                field.span(),
                "`skip` and `rename` cannot be used together",
            ));
        }

        Ok(FieldAttrs { skip, rename })
    }
}

pub(crate) fn derive_scoped_fields_impl(
    input: syn::DeriveInput,
) -> Result<proc_macro2::TokenStream, syn::Error> {
    match &input.data {
        Data::Struct(s) => derive_scoped_fields_struct(&input, s),
        _ => Err(syn::Error::new(
            input.span(),
            "ScopedFields can only be derived on structs",
        )),
    }
}

fn derive_scoped_fields_struct(
    input: &syn::DeriveInput,
    data_struct: &syn::DataStruct,
) -> Result<proc_macro2::TokenStream, syn::Error> {
    let (impl_generics, ty_generics, where_clause) = &input.generics.split_for_impl();

    let defaults_ident = ident_from_str("__defaults");
    let mut loads = vec![];
    let mut saves = vec![];
    let mut defaults = vec![];

    for (i, field) in data_struct.fields.iter().enumerate() {
        let attrs = FieldAttrs::parse(field)?;
        // tuple struct members are accessed by index, and stored as `element_{i}`
        let (member, default_name) = match &field.ident {
            Some(ident) => (quote!(#ident), ident.to_string()),
            None => {
                let index = syn::Index::from(i);
                (quote!(#index), format!("element_{}", i))
            }
        };

        if attrs.skip {
            loads.push(quote! { #member: #defaults_ident.#member });
            continue;
        }

        let name = attrs.rename.unwrap_or(default_name);
        loads.push(quote! { #member: scope.get(#name, #defaults_ident.#member)? });
        saves.push(quote! { scope.set(#name, ::std::clone::Clone::clone(&self.#member))?; });
        defaults.push(quote! {
            scope.apply_default(#name, ::std::clone::Clone::clone(&self.#member))?;
        });
    }

    let tyname = &input.ident;

    Ok(quote! {
        impl #impl_generics #CRATE::ScopedFields for #tyname #ty_generics #where_clause {
            fn load(scope: &#CRATE::Scope) -> #CRATE::Result<Self> {
                let #defaults_ident: Self = ::std::default::Default::default();
                ::std::result::Result::Ok(#tyname {
                    #(#loads,)*
                })
            }

            fn save(&self, scope: &#CRATE::Scope) -> #CRATE::Result<()> {
                #(#saves)*
                ::std::result::Result::Ok(())
            }

            fn apply_defaults(&self, scope: &#CRATE::Scope) -> #CRATE::Result<()> {
                #(#defaults)*
                ::std::result::Result::Ok(())
            }
        }
    })
}
