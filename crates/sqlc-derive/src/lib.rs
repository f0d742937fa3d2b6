//! Derive macro for typed table handles.
//!
//! This crate provides the `#[derive(Table)]` macro, which turns a row
//! struct into a table handle whose column accessors are typed by the
//! struct's field types.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta, Type};

/// Derives a typed table handle for a row struct.
///
/// # Attributes
///
/// - `#[table(name = "table_name")]` - Specifies the SQL table name (optional,
///   defaults to snake_case of struct name)
///
/// # Field Attributes
///
/// - `#[column(primary_key)]` - Marks the field as primary key
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to field name)
/// - `#[column(skip)]` - Leaves the field out of the table
///
/// Every other field's type must implement `sqlc_core::field::ColumnType`,
/// which decides the kind of its column. `Option<T>` fields are nullable.
///
/// # Generated Items
///
/// For a struct `Book`, this macro generates:
///
/// - `BookTable` - A handle wrapping a `sqlc_core::Table`, implementing
///   `sqlc_core::Schema`, usable anywhere a table is expected
/// - A typed accessor per column on `BookTable` (`books.title()` returns a
///   `Column<Text>` for a `String` field)
/// - `Book::table()` returning a fresh `BookTable`
#[proc_macro_derive(Table, attributes(table, column))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_table_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_table_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Table derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Table derive only supports structs",
            ));
        }
    };

    // Collect field information
    let mut column_infos: Vec<ColumnInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let column_attrs = parse_column_attrs(&field.attrs)?;
        if column_attrs.skip {
            continue;
        }

        column_infos.push(ColumnInfo {
            field_name: field_name.clone(),
            field_type: field.ty.clone(),
            column_name: column_attrs
                .name
                .unwrap_or_else(|| field_name.to_string()),
            is_primary_key: column_attrs.primary_key,
        });
    }

    if column_infos.iter().filter(|c| c.is_primary_key).count() > 1 {
        return Err(syn::Error::new_spanned(
            input,
            "at most one field can be marked #[column(primary_key)]",
        ));
    }

    let handle_name = format_ident!("{}Table", struct_name);

    // Typed column accessors
    let column_accessors: Vec<TokenStream2> = column_infos
        .iter()
        .map(|info| {
            let method_name = &info.field_name;
            let column_name = &info.column_name;
            let field_type = &info.field_type;
            let doc = format!("Returns the `{column_name}` column.");
            quote! {
                #[doc = #doc]
                #[must_use]
                pub fn #method_name(
                    &self,
                ) -> ::sqlc_core::field::Column<
                    <#field_type as ::sqlc_core::field::ColumnType>::Kind,
                > {
                    self.table.column_unchecked(#column_name)
                }
            }
        })
        .collect();

    // Declared columns for `Schema::table`
    let declarations: Vec<TokenStream2> = column_infos
        .iter()
        .map(|info| {
            let column_name = &info.column_name;
            let field_type = &info.field_type;
            quote! {
                .with_column(
                    #column_name,
                    <<#field_type as ::sqlc_core::field::ColumnType>::Kind
                        as ::sqlc_core::field::Kind>::KIND,
                )
            }
        })
        .collect();

    let all_column_names: Vec<&str> = column_infos
        .iter()
        .map(|c| c.column_name.as_str())
        .collect();

    let primary_key_impl = match column_infos.iter().find(|c| c.is_primary_key) {
        Some(pk) => {
            let pk = &pk.column_name;
            quote! {
                const PRIMARY_KEY: Option<&'static str> = Some(#pk);
            }
        }
        None => quote! {
            const PRIMARY_KEY: Option<&'static str> = None;
        },
    };

    let handle_doc = format!("Table handle for [`{struct_name}`] rows.");

    let expanded = quote! {
        #[doc = #handle_doc]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct #handle_name {
            table: ::sqlc_core::Table,
        }

        impl ::sqlc_core::Schema for #handle_name {
            type Row = #struct_name;

            const NAME: &'static str = #table_name;
            const COLUMNS: &'static [&'static str] = &[#(#all_column_names),*];
            #primary_key_impl

            fn table() -> ::sqlc_core::Table {
                ::sqlc_core::Table::new(#table_name)
                    #(#declarations)*
            }
        }

        impl #handle_name {
            /// Returns a handle for the table under its own name.
            #[must_use]
            pub fn new() -> Self {
                Self {
                    table: <Self as ::sqlc_core::Schema>::table(),
                }
            }

            /// Returns a copy whose columns are qualified by `alias`.
            #[must_use]
            pub fn aliased(&self, alias: impl Into<String>) -> Self {
                Self {
                    table: self.table.aliased(alias),
                }
            }

            /// Returns the table name.
            #[inline]
            #[must_use]
            pub const fn table_name() -> &'static str {
                #table_name
            }

            /// Returns the untyped table.
            #[must_use]
            pub const fn as_table(&self) -> &::sqlc_core::Table {
                &self.table
            }

            #(#column_accessors)*
        }

        impl ::core::default::Default for #handle_name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::core::convert::AsRef<::sqlc_core::Table> for #handle_name {
            fn as_ref(&self) -> &::sqlc_core::Table {
                &self.table
            }
        }

        impl ::core::convert::From<&#handle_name> for ::sqlc_core::Selectable {
            fn from(handle: &#handle_name) -> Self {
                Self::from(&handle.table)
            }
        }

        impl #struct_name {
            /// Returns a handle for this row's table.
            #[must_use]
            pub fn table() -> #handle_name {
                #handle_name::new()
            }
        }
    };

    Ok(expanded)
}

struct ColumnInfo {
    field_name: Ident,
    field_type: Type,
    column_name: String,
    is_primary_key: bool,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    primary_key: bool,
    skip: bool,
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<Option<String>> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = value {
        if let Lit::Str(s) = lit.lit {
            return Ok(Some(s.value()));
        }
    }
    Err(meta.error("expected a string literal"))
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("table") {
            let mut table_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    table_name = string_value(&meta)?;
                    Ok(())
                } else {
                    Err(meta.error("unsupported table attribute"))
                }
            })?;
            if let Some(name) = table_name {
                return Ok(name);
            }
        }
    }
    // Default to snake_case of struct name
    Ok(to_snake_case(&struct_name.to_string()))
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("column") {
            // Handle empty attribute like #[column]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("primary_key") {
                    result.primary_key = true;
                } else if meta.path.is_ident("skip") {
                    result.skip = true;
                } else if meta.path.is_ident("name") {
                    result.name = string_value(&meta)?;
                } else {
                    return Err(meta.error("unsupported column attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
