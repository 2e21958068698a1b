use proc_macro::TokenStream;
use quote::quote;
use syn::{
    ext::IdentExt, parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, LitStr,
    Path,
};

#[proc_macro_derive(Props, attributes(recompute))]
pub fn derive_props(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let ident = &input.ident;

    let recompute = match container_path(&input.attrs) {
        Ok(path) => path.unwrap_or_else(|| parse_quote!(::recompute)),
        Err(error) => return error.to_compile_error().into(),
    };

    let fields = match &input.data {
        Data::Struct(input_struct) => match &input_struct.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    ident,
                    "`Props` can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(ident, "`Props` can only be derived for structs")
                .to_compile_error()
                .into()
        }
    };

    let mut generics = input.generics.clone();
    let mut inserts = Vec::new();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };

        let name = match field_options(&field.attrs) {
            Ok(FieldOptions { skip: true, .. }) => continue,
            Ok(FieldOptions { rename, .. }) => {
                rename.unwrap_or_else(|| field_ident.unraw().to_string())
            }
            Err(error) => return error.to_compile_error().into(),
        };

        let ty = &field.ty;
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote!(#ty: ::core::convert::Into<#recompute::Value>));

        inserts.push(quote! {
            map.insert(
                ::std::rc::Rc::<str>::from(#name),
                ::core::convert::Into::<#recompute::Value>::into(props.#field_ident),
            );
        });
    }

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics ::core::convert::From<#ident #ty_generics> for #recompute::Value #where_clause {
            #[allow(unused_mut, unused_variables)]
            fn from(props: #ident #ty_generics) -> Self {
                let mut map = #recompute::Map::new();
                #( #inserts )*
                #recompute::Value::from(map)
            }
        }
    };
    gen.into()
}

fn container_path(attrs: &[Attribute]) -> syn::Result<Option<Path>> {
    let mut path = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("recompute")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("path") {
                let value: LitStr = meta.value()?.parse()?;
                path = Some(value.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `path = \"...\"`"))
            }
        })?;
    }
    Ok(path)
}

#[derive(Default)]
struct FieldOptions {
    skip: bool,
    rename: Option<String>,
}

fn field_options(attrs: &[Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("recompute")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                options.rename = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `rename = \"...\"`"))
            }
        })?;
    }
    Ok(options)
}
