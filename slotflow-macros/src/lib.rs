use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

mod node_meta;
use node_meta::{ensure_struct, parse_node_info};

/// Registers a node type with the runtime registry.
///
/// The type must implement `Default` and `ProcessingNode`. The generated
/// code submits a metadata factory to the `inventory` collection in
/// `crate::registry`, so it is only usable inside the `slotflow` crate.
#[proc_macro_derive(RegisterNode, attributes(node_meta))]
pub fn derive_register_node(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if let Err(e) = ensure_struct(&input) {
        return e.to_compile_error().into();
    }

    let node_info = match parse_node_info(&input) {
        Ok(info) => info,
        Err(e) => return e.write_errors().into(),
    };

    let struct_name = &input.ident;
    let node_id = struct_name.to_string().to_lowercase();
    let node_name = node_info.name.unwrap_or_else(|| struct_name.to_string());
    let doc = node_info.doc.unwrap_or_default();

    let mod_name = syn::Ident::new(
        &format!("__node_registration_{}", node_id),
        struct_name.span(),
    );

    let factory_fn_name = syn::Ident::new(
        &format!("create_metadata_{}", node_id),
        struct_name.span(),
    );

    let expanded = quote! {
        #[doc(hidden)]
        mod #mod_name {
            use super::*;

            fn #factory_fn_name() -> crate::registry::NodeMetadata {
                crate::registry::NodeMetadata {
                    id: #node_id.to_string(),
                    name: #node_name.to_string(),
                    doc: #doc.to_string(),
                    factory: || Box::new(#struct_name::default()),
                }
            }

            ::inventory::submit! {
                crate::registry::NodeMetadataFactoryWrapper(#factory_fn_name)
            }
        }
    };

    TokenStream::from(expanded)
}
