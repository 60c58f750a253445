// `proc_macro` is built into the compiler.
extern crate proc_macro;
// `proc_macro2` wraps `proc_macro` so that we can manipulate tokens outside
// of a real macro invocation.
extern crate proc_macro2;
#[macro_use]
extern crate quote;
extern crate syn;

mod resource;
mod updatable;

/// Derive boilerplate code for `Resource`.
///
/// Requires an `#[api_name = "nodes"]` attribute naming the collection, and
/// an `id: Id<Self>` field.
#[proc_macro_derive(Resource, attributes(api_name))]
pub fn resource_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    // We can only report errors via a panic here, which the compiler turns
    // into an error at the derive site.
    let input = syn::parse(input).unwrap();
    let gen = resource::derive(&input);
    gen.into()
}

/// Derive a `*Update` type holding an optional value for every field marked
/// `#[updatable]`.
#[proc_macro_derive(Updatable, attributes(updatable))]
pub fn updatable_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse(input).unwrap();
    let gen = updatable::derive(&input);
    gen.into()
}
