//! Winnow parser for module headers.
//!
//! Accepts the leading part of a source file:
//!
//! ```text
//! [port | effect] module Dotted.Name [where { ... }] [exposing (...)]
//! import Dotted.Name [as Alias] [exposing (...)]
//! ```
//!
//! Whitespace, `-- line` comments, and `{- block -}` comments may appear
//! anywhere between tokens. Parsing stops at the first line that does not
//! start with `import`; the rest of the file is never looked at. A line that
//! does start with `import` must be a complete import, otherwise the whole
//! header is rejected.

use winnow::{
    ModalResult, Parser,
    ascii::{multispace0, multispace1},
    combinator::{alt, cut_err, delimited, not, opt, preceded, repeat, terminated},
    error::{ContextError, ErrMode, StrContext, StrContextValue},
    token::{one_of, take_till, take_until, take_while},
};

use super::{Header, HeaderParseError, HeaderParser, ModuleTag};
use crate::env::PackageId;
use crate::module_name::ModuleName;

/// Default `HeaderParser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceHeaderParser;

impl HeaderParser for SourceHeaderParser {
    fn parse(&self, _package: &PackageId, source: &str) -> Result<Header, HeaderParseError> {
        parse_header(source)
    }
}

/// Parse a header from full source text.
pub fn parse_header(source: &str) -> Result<Header, HeaderParseError> {
    let mut input = source;

    let raw = raw_header
        .parse_next(&mut input)
        .map_err(|err| HeaderParseError {
            line: line_at(source, input),
            message: describe(&err),
        })?;

    let name = validate_name(source, raw.name)?;
    let imports = raw
        .imports
        .into_iter()
        .map(|import| validate_name(source, import))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Header {
        tag: raw.tag,
        name,
        imports,
    })
}

// `name` is always a subslice of `source`.
fn validate_name(source: &str, name: &str) -> Result<ModuleName, HeaderParseError> {
    ModuleName::new(name).map_err(|err| {
        let offset = (name.as_ptr() as usize).saturating_sub(source.as_ptr() as usize);
        HeaderParseError {
            line: line_at(source, source.get(offset..).unwrap_or_default()),
            message: err.to_string(),
        }
    })
}

fn line_at(source: &str, rest: &str) -> usize {
    let consumed = source.len() - rest.len();
    source[..consumed].matches('\n').count() + 1
}

fn describe(err: &ErrMode<ContextError>) -> String {
    let message = match err {
        ErrMode::Backtrack(inner) | ErrMode::Cut(inner) => inner.to_string(),
        ErrMode::Incomplete(_) => String::new(),
    };
    if message.is_empty() {
        "expected a module declaration".to_string()
    } else {
        message.replace('\n', ", ")
    }
}

struct RawHeader<'s> {
    tag: ModuleTag,
    name: &'s str,
    imports: Vec<&'s str>,
}

fn raw_header<'s>(input: &mut &'s str) -> ModalResult<RawHeader<'s>> {
    let _ = trivia.parse_next(input)?;
    let tag = opt(terminated(tag_keyword, gap)).parse_next(input)?;
    let _ = ("module", gap).parse_next(input)?;
    let name = module_name.parse_next(input)?;
    let _ = trivia.parse_next(input)?;
    let _ = opt(terminated(where_clause, trivia)).parse_next(input)?;
    let _ = opt(terminated(exposing, trivia)).parse_next(input)?;
    let imports = repeat(0.., terminated(import, trivia)).parse_next(input)?;

    Ok(RawHeader {
        tag: tag.unwrap_or(ModuleTag::Normal),
        name,
        imports,
    })
}

fn tag_keyword(input: &mut &str) -> ModalResult<ModuleTag> {
    alt((
        "port".value(ModuleTag::Port),
        "effect".value(ModuleTag::Effect),
    ))
    .parse_next(input)
}

// import Name [as Alias] [exposing (...)]
fn import<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    let _ = keyword("import").parse_next(input)?;
    cut_err(preceded(gap, import_body))
        .context(StrContext::Label("import"))
        .parse_next(input)
}

fn import_body<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    let name = module_name.parse_next(input)?;
    let _ = opt(preceded((trivia, "as", gap), cut_err(ident))).parse_next(input)?;
    let _ = opt(preceded(trivia, exposing)).parse_next(input)?;
    Ok(name)
}

// where { command = MyCmd, subscription = MySub }
fn where_clause(input: &mut &str) -> ModalResult<()> {
    preceded(
        keyword("where"),
        cut_err((trivia, delimited('{', take_until(0.., '}'), '}')))
            .context(StrContext::Expected(StrContextValue::Description("{ ... }"))),
    )
    .void()
    .parse_next(input)
}

// exposing (..) / exposing (Html, Attribute(..), text)
fn exposing(input: &mut &str) -> ModalResult<()> {
    preceded(
        keyword("exposing"),
        cut_err((trivia, parens))
            .context(StrContext::Expected(StrContextValue::Description("( ... )"))),
    )
    .void()
    .parse_next(input)
}

fn parens(input: &mut &str) -> ModalResult<()> {
    delimited(
        '(',
        repeat(0.., alt((take_till(1.., ['(', ')']).void(), parens))),
        ')',
    )
    .parse_next(input)
}

// Dotted name ending at a token boundary. Segment case is checked by
// `ModuleName::new` so the error can name the offending segment.
fn module_name<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    terminated(
        (ident, repeat(0.., ('.', ident)).map(|()| ())).take(),
        not('.'),
    )
    .context(StrContext::Label("module name"))
    .parse_next(input)
}

fn ident<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic()),
        take_while(0.., is_ident_char),
    )
        .take()
        .parse_next(input)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn keyword<'s>(word: &'static str) -> impl Parser<&'s str, (), ErrMode<ContextError>> {
    terminated(word, not(one_of(is_ident_char))).void()
}

// Mandatory separation after a keyword: at least one whitespace character,
// then any further trivia.
fn gap(input: &mut &str) -> ModalResult<()> {
    (multispace1, trivia).void().parse_next(input)
}

fn trivia(input: &mut &str) -> ModalResult<()> {
    repeat(0.., alt((multispace1.void(), line_comment, block_comment))).parse_next(input)
}

fn line_comment(input: &mut &str) -> ModalResult<()> {
    ("--", take_till(0.., '\n')).void().parse_next(input)
}

fn block_comment(input: &mut &str) -> ModalResult<()> {
    ("{-", take_until(0.., "-}"), "-}", multispace0)
        .void()
        .parse_next(input)
}
