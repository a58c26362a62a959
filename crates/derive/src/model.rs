use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Error, Field, Fields, LitStr, Visibility};

// derive_model
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Model cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            other => {
                return Err(Error::new_spanned(
                    other,
                    "Model can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(
                ident,
                "Model can only be derived for structs with named fields",
            ));
        }
    };

    let type_name = ident.unraw().to_string();
    let table = match model_table(&input.attrs)? {
        Some(table) => quote!(.with_table_name(#table)),
        None => quote!(),
    };

    let field_defs = fields
        .iter()
        .filter(|field| !matches!(field.vis, Visibility::Inherited))
        .map(field_def)
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl ::ormeta::Model for #ident {
            fn schema() -> ::ormeta::ModelSchema {
                ::ormeta::ModelSchema::new(#type_name)
                    #table
                    #(.field(#field_defs))*
            }
        }

        impl ::ormeta::FieldKind for #ident {
            fn field_type() -> ::ormeta::FieldType {
                ::ormeta::FieldType::model::<Self>()
            }
        }
    })
}

///
/// Struct attributes
///

// #[model(table = "...")]
fn model_table(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut table = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident("model")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                table = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("expected `table = \"...\"`"))
            }
        })?;
    }

    Ok(table)
}

///
/// Field attributes
///

fn field_def(field: &Field) -> syn::Result<TokenStream> {
    let Some(field_ident) = field.ident.as_ref() else {
        return Err(Error::new_spanned(field, "expected a named field"));
    };
    let name = field_ident.unraw().to_string();
    let ty = &field.ty;

    let mut modifiers = Vec::new();
    for attr in &field.attrs {
        let path = attr.path();
        if path.is_ident("sql") || path.is_ident("orm") {
            let channel = if path.is_ident("sql") { "sql" } else { "orm" };
            let value: LitStr = attr.parse_args()?;
            modifiers.push(quote!(.tag(#channel, #value)));
        } else if path.is_ident("model") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("flatten") {
                    modifiers.push(quote!(.anonymous()));
                    Ok(())
                } else {
                    Err(meta.error("expected `flatten`"))
                }
            })?;
        }
    }

    Ok(quote! {
        ::ormeta::FieldDef::new(#name, <#ty as ::ormeta::FieldKind>::field_type())
            #(#modifiers)*
    })
}

///
/// TESTS
///
