use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr};

/// Metadata collected from the attributes of one field.
struct FieldAttrs {
    tags: Vec<(String, String)>,
    flatten: bool,
}

/// Collect `#[tag(key = "value", ...)]` pairs and the `#[contextual(flatten)]` marker.
fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs {
        tags: Vec::new(),
        flatten: false,
    };
    for attr in attrs {
        if attr.path().is_ident("tag") {
            attr.parse_nested_meta(|meta| {
                let key = meta
                    .path
                    .get_ident()
                    .ok_or_else(|| meta.error("tag keys must be plain identifiers"))?
                    .to_string();
                let value: LitStr = meta.value()?.parse()?;
                parsed.tags.push((key, value.value()));
                Ok(())
            })?;
        } else if attr.path().is_ident("contextual") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("flatten") {
                    parsed.flatten = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported field option, expected `flatten`"))
                }
            })?;
        }
    }
    Ok(parsed)
}

/// Collect the method names of `#[contextual(handlers(a, b))]`.
fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<Vec<Ident>> {
    let mut handlers = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("contextual") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("handlers") {
                meta.parse_nested_meta(|inner| {
                    let ident = inner
                        .path
                        .get_ident()
                        .ok_or_else(|| inner.error("handler names must be method identifiers"))?;
                    handlers.push(ident.clone());
                    Ok(())
                })
            } else {
                Err(meta.error("unsupported container option, expected `handlers(...)`"))
            }
        })?;
    }
    Ok(handlers)
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let type_name = LitStr::new(&name.to_string(), name.span());

    let fields = match &input.data {
        Data::Struct(ds) => match &ds.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Contextual derive only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Contextual derive only supports structs",
            ))
        }
    };

    let mut descriptors = Vec::with_capacity(fields.len());
    let mut field_values = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let attrs = parse_field_attrs(&field.attrs)?;
        let ident_lit = LitStr::new(&ident.to_string(), ident.span());
        let tag_pairs = attrs.tags.iter().map(|(k, v)| quote! { (#k, #v) });
        let tags = quote! { ctxjson_serializer::Tags::new(&[#(#tag_pairs),*]) };
        descriptors.push(if attrs.flatten {
            quote! { ctxjson_serializer::FieldDescriptor::flattened(#ident_lit, #tags) }
        } else {
            quote! { ctxjson_serializer::FieldDescriptor::new(#ident_lit, #tags) }
        });
        field_values.push(quote! {
            ctxjson_serializer::Field::new(&FIELDS[#index], &self.#ident)
        });
    }
    let field_count = descriptors.len();
    let fields_body = if field_count == 0 {
        quote! { ::std::vec::Vec::new() }
    } else {
        quote! {
            static FIELDS: [ctxjson_serializer::FieldDescriptor; #field_count] = [
                #(#descriptors),*
            ];
            ::std::vec![#(#field_values),*]
        }
    };

    let handlers = parse_container_attrs(&input.attrs)?;
    let handler_arms = handlers.iter().map(|handler| {
        let handler_lit = LitStr::new(&handler.to_string(), handler.span());
        quote! {
            #handler_lit => ::core::option::Option::Some(ctxjson_serializer::Method::contextual(
                move |context: &str| {
                    ::core::convert::Into::<ctxjson_serializer::HandlerOutput>::into(
                        Self::#handler(self, context),
                    )
                },
            )),
        }
    });

    // Every type parameter has to be traversable for its fields to be
    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(syn::parse_quote!(ctxjson_serializer::ContextualValue));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ctxjson_serializer::ContextualRecord for #name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn fields(&self) -> ::std::vec::Vec<ctxjson_serializer::Field<'_>> {
                #fields_body
            }

            fn method(&self, name: &str) -> ::core::option::Option<ctxjson_serializer::Method<'_>> {
                match name {
                    #(#handler_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #impl_generics ctxjson_serializer::ContextualValue for #name #ty_generics #where_clause {
            fn view(&self) -> ctxjson_serializer::ValueView<'_> {
                ctxjson_serializer::ValueView::Struct(self)
            }
        }
    })
}

/// Derive the record schema and method table used by the context-aware marshaler.
///
/// Field attributes:
/// - `#[tag(key = "value", ...)]` free-form metadata (`json`, `marshalcontext`,
///   `marshalhandler`, or any caller-chosen keys)
/// - `#[contextual(flatten)]` promotes an embedded record's fields into this one
///
/// Container attribute:
/// - `#[contextual(handlers(method, ...))]` exposes inherent methods of the form
///   `fn(&self, context: &str) -> impl Into<HandlerOutput>` to handler metadata
#[proc_macro_derive(Contextual, attributes(tag, contextual))]
pub fn derive_contextual(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}
