//! Stylesheet parsing on top of the `cssparser` framework.
//!
//! [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing)
//!
//! The framework drives tokenization and block nesting; the callbacks below
//! only capture raw slices and assemble the [`crate::ast`] tree. Parsing is
//! strict: any rule- or declaration-level error fails the whole parse, and
//! callers fall back to passing the original text through untouched.

use cssparser::{
    AtRuleParser, BasicParseErrorKind, CowRcStr, ParseError as CssError, Parser, ParserInput,
    ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser,
};
use thiserror::Error;

use crate::ast::{Declaration, Item, MediaRule, OtherAtRule, StyleRule, Stylesheet};

/// A stylesheet failed to parse.
///
/// Never surfaced to the user; rewriters catch it and return their input
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("css parse error at line {line}, column {column}")]
pub struct ParseError {
    /// 0-based source line of the failure.
    pub line: u32,
    /// 1-based source column of the failure.
    pub column: u32,
}

impl ParseError {
    fn from_css<E>(error: &CssError<'_, E>) -> Self {
        ParseError {
            line: error.location.line,
            column: error.location.column,
        }
    }
}

/// Parse a stylesheet string into the owned rule tree.
///
/// # Errors
///
/// Returns [`ParseError`] when any rule or declaration is malformed.
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, ParseError> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut rule_parser = RuleParser;
    let mut items = Vec::new();
    for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
        match result {
            Ok(item) => items.push(item),
            Err((error, _slice)) => return Err(ParseError::from_css(&error)),
        }
    }
    Ok(Stylesheet { items })
}

/// Prelude of an at-rule, decided before its block is parsed.
enum AtPrelude {
    Media(String),
    FontFace,
    Other { name: String, prelude: String },
}

/// Parser for rule lists: the stylesheet top level and media block bodies.
struct RuleParser;

impl<'i> QualifiedRuleParser<'i> for RuleParser {
    type Prelude = Vec<String>;
    type QualifiedRule = Item;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, CssError<'i, Self::Error>> {
        parse_selector_list(input)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, CssError<'i, Self::Error>> {
        let declarations = parse_declaration_list(input)?;
        Ok(Item::Style(StyleRule {
            selectors: prelude,
            declarations,
        }))
    }
}

impl<'i> AtRuleParser<'i> for RuleParser {
    type Prelude = AtPrelude;
    type AtRule = Item;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, CssError<'i, Self::Error>> {
        let raw = consume_raw(input).trim().to_string();
        if name.eq_ignore_ascii_case("media") {
            Ok(AtPrelude::Media(raw))
        } else if name.eq_ignore_ascii_case("font-face") {
            Ok(AtPrelude::FontFace)
        } else {
            Ok(AtPrelude::Other {
                name: name.to_string(),
                prelude: raw,
            })
        }
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, CssError<'i, Self::Error>> {
        match prelude {
            AtPrelude::Media(condition) => {
                let items = parse_rule_list(input)?;
                Ok(Item::Media(MediaRule { condition, items }))
            }
            AtPrelude::FontFace => {
                let declarations = parse_declaration_list(input)?;
                Ok(Item::FontFace(declarations))
            }
            AtPrelude::Other { name, prelude } => {
                let interior = consume_raw(input).to_string();
                Ok(Item::Other(OtherAtRule {
                    name,
                    prelude,
                    block: Some(interior),
                }))
            }
        }
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        match prelude {
            // `@media` and `@font-face` require a block.
            AtPrelude::Media(_) | AtPrelude::FontFace => Err(()),
            AtPrelude::Other { name, prelude } => Ok(Item::Other(OtherAtRule {
                name,
                prelude,
                block: None,
            })),
        }
    }
}

impl<'i> RuleBodyItemParser<'i, Item, ()> for RuleParser {
    fn parse_declarations(&self) -> bool {
        false
    }
    fn parse_qualified(&self) -> bool {
        true
    }
}

impl<'i> cssparser::DeclarationParser<'i> for RuleParser {
    type Declaration = Item;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, CssError<'i, Self::Error>> {
        // Rule lists contain no bare declarations.
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

/// Parser for declaration blocks (style rule and `@font-face` bodies).
struct DeclarationListParser;

impl<'i> cssparser::DeclarationParser<'i> for DeclarationListParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, CssError<'i, Self::Error>> {
        let raw = consume_raw(input);
        let (value, important) = split_important_tail(raw);
        Ok(Declaration {
            name: name.to_string(),
            value,
            important,
        })
    }
}

impl<'i> AtRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, CssError<'i, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleInvalid(name)))
    }
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, CssError<'i, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, CssError<'i, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for DeclarationListParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Consume the rest of the current scope and return its raw source text.
/// Nested blocks are skipped as units, so their interiors are included.
fn consume_raw<'i>(input: &mut Parser<'i, '_>) -> &'i str {
    let start = input.position();
    while input.next_including_whitespace_and_comments().is_ok() {}
    input.slice_from(start)
}

/// Split a comma-separated selector list, shielding commas inside functional
/// notation like `:is(a, b)`.
fn parse_selector_list<'i>(
    input: &mut Parser<'i, '_>,
) -> Result<Vec<String>, CssError<'i, ()>> {
    input.parse_comma_separated(|selector| {
        let raw = consume_raw(selector).trim().to_string();
        Ok(raw)
    })
}

fn parse_rule_list<'i>(input: &mut Parser<'i, '_>) -> Result<Vec<Item>, CssError<'i, ()>> {
    let mut rule_parser = RuleParser;
    let mut items = Vec::new();
    for result in RuleBodyParser::new(input, &mut rule_parser) {
        match result {
            Ok(item) => items.push(item),
            Err((error, _slice)) => return Err(error),
        }
    }
    Ok(items)
}

fn parse_declaration_list<'i>(
    input: &mut Parser<'i, '_>,
) -> Result<Vec<Declaration>, CssError<'i, ()>> {
    let mut declaration_parser = DeclarationListParser;
    let mut declarations = Vec::new();
    for result in RuleBodyParser::new(input, &mut declaration_parser) {
        match result {
            Ok(declaration) => declarations.push(declaration),
            Err((error, _slice)) => return Err(error),
        }
    }
    Ok(declarations)
}

/// Parse a trailing `!important`, returning the value without it.
fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(position) = trimmed.rfind('!') {
        let tail = trimmed[position + 1..].trim();
        if tail.eq_ignore_ascii_case("important") {
            return (trimmed[..position].trim_end().to_string(), true);
        }
    }
    (trimmed.to_string(), false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_style_rules_and_declarations() {
        let sheet = parse_stylesheet("a, b { color: red; margin: 0 auto }").unwrap();
        assert_eq!(sheet.items.len(), 1);
        let Item::Style(rule) = &sheet.items[0] else {
            panic!("expected a style rule");
        };
        assert_eq!(rule.selectors, vec!["a", "b"]);
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(rule.declarations[0].name, "color");
        assert_eq!(rule.declarations[0].value, "red");
        assert_eq!(rule.declarations[1].value, "0 auto");
    }

    #[test]
    fn keeps_commas_inside_functional_selectors_together() {
        let sheet = parse_stylesheet(":is(a, b) { color: red }").unwrap();
        let Item::Style(rule) = &sheet.items[0] else {
            panic!("expected a style rule");
        };
        assert_eq!(rule.selectors, vec![":is(a, b)"]);
    }

    #[test]
    fn parses_important_flag() {
        let sheet = parse_stylesheet("a { color: red !important }").unwrap();
        let Item::Style(rule) = &sheet.items[0] else {
            panic!("expected a style rule");
        };
        assert!(rule.declarations[0].important);
        assert_eq!(rule.declarations[0].value, "red");
    }

    #[test]
    fn parses_nested_media_blocks() {
        let css = "@media screen and (max-width: 600px) { .x { color: red } }";
        let sheet = parse_stylesheet(css).unwrap();
        let Item::Media(media) = &sheet.items[0] else {
            panic!("expected a media rule");
        };
        assert_eq!(media.condition, "screen and (max-width: 600px)");
        assert_eq!(media.items.len(), 1);
    }

    #[test]
    fn keeps_unknown_at_rules_verbatim() {
        let sheet = parse_stylesheet("@keyframes spin { 0% { opacity: 0 } }").unwrap();
        let Item::Other(rule) = &sheet.items[0] else {
            panic!("expected an at-rule");
        };
        assert_eq!(rule.name, "keyframes");
        assert_eq!(rule.prelude, "spin");
        assert!(rule.block.as_deref().unwrap().contains("0%"));
    }

    #[test]
    fn parses_statement_at_rules() {
        let sheet = parse_stylesheet("@import \"a.css\";").unwrap();
        let Item::Other(rule) = &sheet.items[0] else {
            panic!("expected an at-rule");
        };
        assert_eq!(rule.name, "import");
        assert!(rule.block.is_none());
    }

    #[test]
    fn parses_font_face_declarations() {
        let sheet = parse_stylesheet("@font-face { src: url(a.woff2); }").unwrap();
        let Item::FontFace(declarations) = &sheet.items[0] else {
            panic!("expected a font-face rule");
        };
        assert_eq!(declarations[0].name, "src");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_stylesheet("a { 4px }").is_err());
        assert!(parse_stylesheet("@media screen;").is_err());
    }
}
