//! Implementation of `#[derive(Resource)]`.

use proc_macro2::TokenStream;
use syn::{Attribute, DeriveInput, Lit, Meta, MetaNameValue};

/// Generate `Resource` and `Display` impls for a resource struct.
pub(crate) fn derive(ast: &DeriveInput) -> TokenStream {
    let name = &ast.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let api_name = get_api_name(&ast.attrs);
    quote! {
        impl #impl_generics Resource for #name #ty_generics #where_clause {
            fn type_name() -> &'static str {
                #type_name
            }

            fn collection_path() -> &'static str {
                concat!("api/", #api_name)
            }

            fn item_template() -> &'static str {
                concat!("api/", #api_name, "/{id}")
            }

            fn id(&self) -> &Id<Self> {
                &self.id
            }
        }

        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                describe(self, f)
            }
        }
    }
}

/// Search for an `#[api_name = "clusters"]` attribute and return
/// `"clusters"` as a `Lit` value.
fn get_api_name(attrs: &[Attribute]) -> Lit {
    for attr in attrs {
        if !attr.path.is_ident("api_name") {
            continue;
        }
        let meta = attr
            .parse_meta()
            .expect("Invalid `api_name`, try #[api_name = \"clusters\"]");
        match meta {
            Meta::NameValue(MetaNameValue { lit, .. }) => return lit,
            _ => panic!("Invalid `api_name`, try #[api_name = \"clusters\"]"),
        }
    }
    panic!("Missing attribute `api_name`, try `#[api_name = \"...\"]`");
}
