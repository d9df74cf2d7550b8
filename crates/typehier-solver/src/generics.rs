//! Generic argument parsing for qualified type names.
//!
//! Type names arrive as plain strings such as `java.util.Map<K,java.util.List<V>>`.
//! This module splits them into a base name and an argument list, and splits
//! argument lists at top-level commas only. No name resolution happens here.

use crate::error::GenericParseError;
use smallvec::SmallVec;
use std::fmt;

/// Top-level arguments of one generic type reference.
pub type ArgumentList<'a> = SmallVec<[&'a str; 4]>;

/// A type name split at its outermost angle brackets.
///
/// `args` is the raw text between the first `<` and the last `>`, still
/// unsplit. Both fields borrow from the original string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRef<'a> {
    pub base: &'a str,
    pub args: &'a str,
}

impl<'a> TypeRef<'a> {
    /// True if the reference carried an argument list (raw usage otherwise).
    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.args.is_empty()
    }

    /// Split `args` into trimmed top-level arguments.
    pub fn arguments(&self) -> Result<ArgumentList<'a>, GenericParseError> {
        split_top_level_arguments(self.args)
    }
}

/// Split `raw` into base name and raw argument text.
///
/// The argument text ends at the *last* `>` in the string, so nested
/// closing brackets stay inside it.
pub fn parse_type_and_arguments(raw: &str) -> Result<TypeRef<'_>, GenericParseError> {
    let Some(open) = raw.find('<') else {
        return Ok(TypeRef {
            base: raw,
            args: "",
        });
    };
    match raw.rfind('>') {
        Some(close) if close > open => Ok(TypeRef {
            base: &raw[..open],
            args: &raw[open + 1..close],
        }),
        _ => Err(GenericParseError::UnclosedBracket {
            input: raw.to_string(),
            position: open,
        }),
    }
}

/// Split an argument list at commas that are not nested in angle brackets.
///
/// Each argument is trimmed. An empty or blank list yields no arguments.
pub fn split_top_level_arguments(args: &str) -> Result<ArgumentList<'_>, GenericParseError> {
    let mut out = ArgumentList::new();
    if args.trim().is_empty() {
        return Ok(out);
    }

    let mut depth = 0usize;
    let mut outer_open = 0usize;
    let mut start = 0usize;
    // Only ASCII delimiters are inspected, so byte offsets are char boundaries.
    for (i, byte) in args.bytes().enumerate() {
        match byte {
            b'<' => {
                if depth == 0 {
                    outer_open = i;
                }
                depth += 1;
            }
            b'>' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| GenericParseError::UnmatchedClose {
                        input: args.to_string(),
                        position: i,
                    })?;
            }
            b',' if depth == 0 => {
                out.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(GenericParseError::UnclosedBracket {
            input: args.to_string(),
            position: outer_open,
        });
    }
    out.push(args[start..].trim());
    Ok(out)
}

/// A fully validated type reference: base name plus split arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedType<'a> {
    pub base: &'a str,
    pub arguments: ArgumentList<'a>,
}

/// Parse `raw` and validate its whole argument list eagerly.
///
/// Nested arguments are only checked for bracket balance, not parsed
/// recursively.
pub fn parse_type_ref(raw: &str) -> Result<ParsedType<'_>, GenericParseError> {
    let type_ref = parse_type_and_arguments(raw)?;
    Ok(ParsedType {
        base: type_ref.base,
        arguments: type_ref.arguments()?,
    })
}

impl fmt::Display for ParsedType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base)?;
        if self.arguments.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(arg)?;
        }
        f.write_str(">")
    }
}

#[cfg(test)]
#[path = "../tests/generics_tests.rs"]
mod tests;
