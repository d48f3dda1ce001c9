//! Pattern templates for asset filenames and in-archive paths.
//!
//! A template mixes literal text, `{version}` / `{platform}` / `{arch}`
//! placeholders and the shell wildcards `*` and `?`. Turning a template into
//! something matchable is two steps:
//!
//! 1. [`expand`] maps the matrix platform/arch through the tool's
//!    `platform_map`/`arch_map` and substitutes the placeholders in a single
//!    left-to-right pass. Substituted values are never re-scanned.
//! 2. [`Glob`] compiles the expanded pattern into an anchored regex and
//!    compares candidates with case-sensitive glob semantics.

use crate::error::PatternError;
use regex::Regex;
use std::collections::BTreeMap;

/// Values substituted for the three known placeholders.
#[derive(Debug, Clone, Copy)]
pub struct Substitutions<'a> {
    pub version: &'a str,
    pub platform: &'a str,
    pub arch: &'a str,
}

/// One piece of a template: literal text or the name inside a `{name}` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'t> {
    Literal(&'t str),
    Token(&'t str),
}

/// Splits a template into literal text and `{name}` tokens.
/// Only `{identifier}` counts as a token; any other brace is text.
fn scan(template: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let (before, from_brace) = rest.split_at(open);
        pieces.push(Piece::Literal(before));
        let after_brace = &from_brace[1..];
        let ident_len = after_brace
            .char_indices()
            .take_while(|(i, c)| c.is_ascii_alphabetic() || *c == '_' || (*i > 0 && c.is_ascii_digit()))
            .count();
        if ident_len > 0 && after_brace[ident_len..].starts_with('}') {
            pieces.push(Piece::Token(&after_brace[..ident_len]));
            rest = &after_brace[ident_len + 1..];
        } else {
            pieces.push(Piece::Literal("{"));
            rest = after_brace;
        }
    }
    pieces.push(Piece::Literal(rest));
    pieces
}

fn unknown(token: &str, template: &str) -> PatternError {
    PatternError::UnknownToken(token.to_string(), template.to_string())
}

/// Validates that every `{token}` in `template` is a known placeholder.
/// Run at configuration load so that bad templates fail early, per tool.
pub fn check_tokens(template: &str) -> Result<(), PatternError> {
    for piece in scan(template) {
        match piece {
            Piece::Token("version" | "platform" | "arch") | Piece::Literal(_) => {}
            Piece::Token(other) => return Err(unknown(other, template)),
        }
    }
    Ok(())
}

/// Substitutes placeholders with already-mapped values.
pub fn substitute(template: &str, values: Substitutions<'_>) -> Result<String, PatternError> {
    scan(template)
        .into_iter()
        .try_fold(String::with_capacity(template.len() + 16), |mut out, piece| {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Token("version") => out.push_str(values.version),
                Piece::Token("platform") => out.push_str(values.platform),
                Piece::Token("arch") => out.push_str(values.arch),
                Piece::Token(other) => return Err(unknown(other, template)),
            }
            Ok(out)
        })
}

/// Expands a template for one matrix cell.
///
/// `platform` and `arch` are looked up in `platform_map`/`arch_map` first and
/// pass through unchanged when there is no entry. Then `{version}`,
/// `{platform}` and `{arch}` are replaced literally.
///
/// # Errors
/// [`PatternError::UnknownToken`] for any other `{name}` placeholder.
pub fn expand(
    template: &str,
    version: &str,
    platform: &str,
    arch: &str,
    platform_map: &BTreeMap<String, String>,
    arch_map: &BTreeMap<String, String>,
) -> Result<String, PatternError> {
    let platform = platform_map.get(platform).map(String::as_str).unwrap_or(platform);
    let arch = arch_map.get(arch).map(String::as_str).unwrap_or(arch);
    substitute(
        template,
        Substitutions {
            version,
            platform,
            arch,
        },
    )
}

/// True if the pattern contains a wildcard.
pub fn has_wildcards(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// An expanded pattern compiled for repeated matching.
///
/// Matching is anchored and case-sensitive. `*` matches any run of characters
/// (including none and including `/`), `?` matches exactly one character and
/// everything else, brackets and braces included, matches itself.
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let mut source = String::with_capacity(pattern.len() + 8);
        source.push_str("(?s)^");
        let mut literal = [0u8; 4];
        for c in pattern.chars() {
            match c {
                '*' => source.push_str(".*"),
                '?' => source.push('.'),
                c => source.push_str(&regex::escape(c.encode_utf8(&mut literal))),
            }
        }
        source.push('$');
        let regex = Regex::new(&source).map_err(|e| PatternError::Glob(pattern.to_string(), e.to_string()))?;
        Ok(Glob {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

/// One-off [`Glob`] match. A pattern that cannot be compiled matches nothing.
pub fn matches(pattern: &str, candidate: &str) -> bool {
    Glob::new(pattern).is_ok_and(|glob| glob.is_match(candidate))
}
