use darling::FromAttributes;
use syn::DeriveInput;

/// Parsed attributes from #[node_meta(...)]
#[derive(Debug, FromAttributes)]
#[darling(attributes(node_meta))]
pub struct NodeMetaArgs {
    /// Registry name; defaults to the struct name
    #[darling(default)]
    pub name: Option<String>,

    #[darling(default)]
    pub doc: Option<String>,
}

pub fn parse_node_info(input: &DeriveInput) -> darling::Result<NodeMetaArgs> {
    NodeMetaArgs::from_attributes(&input.attrs)
}

/// Reject anything that is not a struct; unit-like node types are fine.
pub fn ensure_struct(input: &DeriveInput) -> syn::Result<()> {
    match &input.data {
        syn::Data::Struct(_) => Ok(()),
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            "RegisterNode can only be derived for structs",
        )),
    }
}
