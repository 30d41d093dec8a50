//! Procedural macros for slingshot

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level input for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<ActionVariant, ()>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Keep this variant out of the dispatch log
    #[darling(default)]
    skip_log: bool,
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

/// Derive macro for the Action trait
///
/// Generates `name()` returning the variant name. Variants marked
/// `#[action(skip_log)]` also get `loggable() == false`, which keeps them out
/// of the dispatch log.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum AppAction {
///     Navigate { path: String },
///     #[action(skip_log)]
///     UpdateLayout(bool),
/// }
///
/// assert_eq!(AppAction::UpdateLayout(true).name(), "UpdateLayout");
/// assert!(!AppAction::UpdateLayout(true).loggable());
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let pattern = |v: &ActionVariant| {
        let variant_name = &v.ident;
        match &v.fields.style {
            darling::ast::Style::Unit => quote! { #name::#variant_name },
            darling::ast::Style::Tuple => quote! { #name::#variant_name(..) },
            darling::ast::Style::Struct => quote! { #name::#variant_name { .. } },
        }
    };

    let name_arms = variants.iter().map(|v| {
        let pat = pattern(v);
        let variant_str = v.ident.to_string();
        quote! { #pat => #variant_str }
    });

    let silent: Vec<_> = variants.iter().filter(|v| v.skip_log).map(pattern).collect();
    let loggable = if silent.is_empty() {
        quote! {}
    } else {
        quote! {
            fn loggable(&self) -> bool {
                !matches!(self, #(#silent)|*)
            }
        }
    };

    let expanded = quote! {
        impl #impl_generics slingshot::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }

            #loggable
        }
    };

    TokenStream::from(expanded)
}

/// Derive macro for the BindingCommand trait
///
/// Generates `name()`, `from_name()` and `all()`. The command name is the
/// variant name in snake_case, which is also the key used in configuration
/// files.
///
/// # Example
/// ```ignore
/// #[derive(BindingCommand, Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum Command {
///     OpenMenu,
///     HistoryBack,
///     Quit,
/// }
///
/// // Generated names: "open_menu", "history_back", "quit"
/// assert_eq!(Command::OpenMenu.name(), "open_menu");
/// assert_eq!(Command::from_name("quit"), Some(Command::Quit));
/// ```
#[proc_macro_derive(BindingCommand)]
pub fn derive_binding_command(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let expanded = match &input.data {
        syn::Data::Enum(data) => {
            for variant in &data.variants {
                if !matches!(variant.fields, syn::Fields::Unit) {
                    return syn::Error::new_spanned(
                        variant,
                        "BindingCommand can only be derived for enums with unit variants",
                    )
                    .to_compile_error()
                    .into();
                }
            }

            let variant_names: Vec<_> = data.variants.iter().map(|v| &v.ident).collect();
            let variant_strings: Vec<_> = variant_names
                .iter()
                .map(|v| to_snake_case(&v.to_string()))
                .collect();

            let name_arms = variant_names
                .iter()
                .zip(variant_strings.iter())
                .map(|(v, s)| quote! { #name::#v => #s });

            let from_name_arms = variant_names
                .iter()
                .zip(variant_strings.iter())
                .map(|(v, s)| quote! { #s => ::core::option::Option::Some(#name::#v) });

            let all_variants = variant_names.iter().map(|v| quote! { #name::#v });

            quote! {
                impl slingshot::BindingCommand for #name {
                    fn name(&self) -> &'static str {
                        match self {
                            #(#name_arms),*
                        }
                    }

                    fn from_name(name: &str) -> ::core::option::Option<Self> {
                        match name {
                            #(#from_name_arms,)*
                            _ => ::core::option::Option::None,
                        }
                    }

                    fn all() -> &'static [Self] {
                        static ALL: &[#name] = &[#(#all_variants),*];
                        ALL
                    }
                }
            }
        }
        _ => {
            return syn::Error::new_spanned(input, "BindingCommand can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    TokenStream::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::to_snake_case;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("OpenMenu"), "open_menu");
        assert_eq!(to_snake_case("Quit"), "quit");
        assert_eq!(to_snake_case("HistoryBack"), "history_back");
    }
}
