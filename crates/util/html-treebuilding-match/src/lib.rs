#![allow(dead_code)] // Clippy seems to have issues with the quote! macro

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, Block, Expr, Ident, LitStr, Pat, Result, Token,
};

struct MatchArm {
    pattern: MatchPattern,
    guard: Option<Expr>,
    body: Block,
}

enum MatchPattern {
    Traditional(Pat),
    Custom(Vec<HtmlTag>),
}

struct HtmlTag {
    is_opening: bool,
    name: String,
}

struct StateMachine {
    match_on: Expr,
    arms: Vec<MatchArm>,
}

impl Parse for StateMachine {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        let match_on: Expr = input.parse()?;
        let _: Token![,] = input.parse()?;

        let mut arms = vec![];
        while !input.is_empty() {
            let arm: MatchArm = input.parse()?;
            let _: Option<Token![,]> = input.parse()?;
            arms.push(arm);
        }

        Ok(Self { match_on, arms })
    }
}

impl Parse for MatchArm {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        let pattern = input.parse()?;

        let guard = if input.parse::<Option<Token![if]>>()?.is_some() {
            Some(input.parse()?)
        } else {
            None
        };

        let _: Token![=>] = input.parse()?;
        let body = input.parse()?;

        Ok(Self {
            pattern,
            guard,
            body,
        })
    }
}

impl Parse for MatchPattern {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        if input.peek(Token![<]) {
            // This is a custom html arm
            let mut tags = vec![input.parse()?];
            while input.parse::<Option<Token![|]>>()?.is_some() {
                tags.push(input.parse()?);
            }

            Ok(Self::Custom(tags))
        } else {
            // This is a "regular rust" match arm
            Ok(Self::Traditional(Pat::parse_multi(input)?))
        }
    }
}

impl Parse for HtmlTag {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        let _: Token![<] = input.parse()?;
        let slash: Option<Token![/]> = input.parse()?;

        // Tag names are either plain identifiers (<table>) or string literals
        // for names that are not valid rust identifiers (<"annotation-xml">)
        let name = if input.peek(LitStr) {
            input.parse::<LitStr>()?.value()
        } else {
            input.parse::<Ident>()?.to_string()
        };

        let _: Token![>] = input.parse()?;

        Ok(Self {
            is_opening: slash.is_none(),
            name,
        })
    }
}

impl ToTokens for StateMachine {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let Self { match_on, arms } = self;

        quote!(
            match #match_on {
                #(#arms)*
            }
        )
        .to_tokens(tokens)
    }
}

impl MatchArm {
    /// Emit a single arm matching either start or end tags with the given names
    fn custom_arm(&self, variant: TokenStream, names: &[&str]) -> TokenStream {
        let body = &self.body;
        let names_condition = quote!(matches!(tag.name.as_str(), #(#names)|*));

        match &self.guard {
            Some(guard) => quote!(
                #variant(tag) if #names_condition && (#guard) => #body,
            ),
            None => quote!(
                #variant(tag) if #names_condition => #body,
            ),
        }
    }
}

impl ToTokens for MatchArm {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        match &self.pattern {
            MatchPattern::Custom(tags) => {
                let opening_names: Vec<&str> = tags
                    .iter()
                    .filter(|tag| tag.is_opening)
                    .map(|tag| tag.name.as_str())
                    .collect();
                let closing_names: Vec<&str> = tags
                    .iter()
                    .filter(|tag| !tag.is_opening)
                    .map(|tag| tag.name.as_str())
                    .collect();

                // Start and end tags live in different token variants, so an arm that mixes
                // them is expanded into one arm per variant that share the same body
                if !opening_names.is_empty() {
                    self.custom_arm(quote!(Token::StartTag), &opening_names)
                        .to_tokens(tokens);
                }
                if !closing_names.is_empty() {
                    self.custom_arm(quote!(Token::EndTag), &closing_names)
                        .to_tokens(tokens);
                }
            },
            MatchPattern::Traditional(pattern) => {
                let body = &self.body;
                match &self.guard {
                    Some(guard) => quote!(#pattern if #guard => #body,),
                    None => quote!(#pattern => #body,),
                }
                .to_tokens(tokens)
            },
        }
    }
}

/// Allows for slightly nicer definition of the html treebuilding state machine
///
/// HTML Treebuilding is a state machine that transitions based on input tokens encountered.
/// This leads to huge match blocks. (see `treebuilding/insertion_modes` in `html`)
///
/// Without this macro, they look something like this:
/// ```ignore
/// match token {
///     Token::StartTag(tag) if tag.name == "html" => { ... }
///     Token::StartTag(tag) if tag.name == "base" || tag.name == "basefont" => { ... }
///     Token::EndTag(tag) if tag.name == "br" => { ... }
/// }
/// ```
/// With the help of this macro they can instead be written as
/// ```ignore
/// html_treebuilding_match!(token,
///     <html> => { ... }
///     <base> | <basefont> => { ... }
///     </br> => { ... }
///     <"annotation-xml"> => { ... }
/// )
/// ```
///
/// Note that the non-tag tokens (`Token::Characters` for example) can still be matched on as usual.
/// In general, everything that is legal in a regular `match` is also legal in `html_treebuilding_match`.
///
/// Within every tag arm, a `tag` variable is available containing the (owned) tag data.
/// Arms that mix start and end tags are duplicated, once per token variant.
#[proc_macro]
pub fn html_treebuilding_match(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let state_machine = parse_macro_input!(input as StateMachine);
    state_machine.to_token_stream().into()
}
