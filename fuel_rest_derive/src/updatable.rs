//! Implementation of `#[derive(Updatable)]`.

use proc_macro2::{Ident, Span, TokenStream};
use syn::{Data, DeriveInput, Field, Meta, MetaList, NestedMeta};

/// Generate `impl Updatable` plus the matching `*Update` struct.
pub(crate) fn derive(ast: &DeriveInput) -> TokenStream {
    let name = &ast.ident;
    let vis = &ast.vis;
    let update_name = Ident::new(&format!("{}Update", name), Span::call_site());
    let update_comment = format!(
        "A partial update to `{}`. Only fields set to `Some` are sent.",
        name
    );
    let update_fields = fields_for_update_type(ast);
    quote! {
        impl Updatable for #name {
            type Update = #update_name;
        }

        #[doc = #update_comment]
        #[derive(Clone, Debug, Default, PartialEq, Serialize)]
        #vis struct #update_name {
            #( #update_fields )*
        }
    }
}

/// Find all `#[updatable]` fields in the original struct, and return a list of
/// fields for our `*Update` struct.
fn fields_for_update_type(ast: &DeriveInput) -> Vec<TokenStream> {
    let mut new_fields = vec![];

    if let Data::Struct(ref data_struct) = ast.data {
        for field in &data_struct.fields {
            if let Some(attrs) = updatable_field_attrs(field) {
                let vis = &field.vis;
                let name = field
                    .ident
                    .as_ref()
                    .expect("Cannot `#[derive(Updatable)]` for tuple struct");
                let ty = &field.ty;
                let comment = format!("New value for `{}` (optional).", name);
                new_fields.push(quote! {
                    #[doc = #comment]
                    #[serde(skip_serializing_if = "Option::is_none")]
                    #( #attrs )*
                    #vis #name: Option<<#ty as Updatable>::Update>,
                });
            }
        }
    } else {
        panic!("`#[derive(Updatable)]` may only be used on structs");
    }

    new_fields
}

/// If the specified structure field is marked with `#[updatable]` or
/// `#[updatable(attr(..))]`, return the attributes to copy onto the
/// generated field.
fn updatable_field_attrs(field: &Field) -> Option<Vec<TokenStream>> {
    let mut updatable = false;
    let mut attrs = vec![];
    for attr in &field.attrs {
        if !attr.path.is_ident("updatable") {
            continue;
        }
        updatable = true;
        match attr.parse_meta().expect("unparseable `#[updatable]` attribute") {
            // We have `#[updatable]`, do nothing.
            Meta::Path(_) => {}
            // We have `#[updatable(..)]`, look for nested options.
            Meta::List(MetaList {
                nested: options, ..
            }) => {
                for option in options {
                    match option {
                        // `attr(serde(rename = "cluster_id"))` is copied onto
                        // the update field as `#[serde(rename = "cluster_id")]`.
                        NestedMeta::Meta(Meta::List(MetaList {
                            ref path,
                            nested: ref attr_values,
                            ..
                        })) if path.is_ident("attr") => {
                            for attr_value in attr_values {
                                attrs.push(quote! {
                                    #[ #attr_value ]
                                });
                            }
                        }
                        _ => {
                            panic!("unexpected option in `#[updatable(..)]`");
                        }
                    }
                }
            }
            _ => panic!("expected `#[updatable]` or `#[updatable(..)]`"),
        }
    }
    if updatable {
        Some(attrs)
    } else {
        None
    }
}
