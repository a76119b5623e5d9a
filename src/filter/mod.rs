//! Filter expression language for selecting messages
//!
//! A filter is a boolean combination of match clauses, each comparing one
//! message field against a string or a regular expression.
//!
//! # Syntax
//!
//! ```text
//! field=~/regex/        field contains a match for regex
//! field=~/regex/i       same, case-insensitive
//! field!~/regex/        field contains no match for regex
//! field^~text           field starts with text
//! field$=text           field ends with text
//! field=text            field is exactly text
//! field!=text           field is anything but text
//! a and b               both hold (binds tighter than `or`)
//! a or b                either holds
//! ( ... )               grouping
//! ```
//!
//! String values are either bare words or `"double quoted"`. Comparisons
//! against strings are case-sensitive; only patterns accept the `i` modifier.
//!
//! # Examples
//!
//! ```text
//! subject=~/thank you/i
//! subject!~/re:/i and body=~/tax/
//! from$=@example.org or (to="team@example.org" and date=~/2020/)
//! ```

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod matcher;
pub mod parser;

pub use ast::{Expression, MatchClause, Operator};
pub use error::{FilterError, LexError, ParseError, PatternError};
pub use eval::{Fields, evaluate};
pub use lexer::{Token, TokenKind, tokenize};
pub use matcher::{Pattern, Predicate};
pub use parser::parse;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A filter expression compiled once and evaluated against many messages
///
/// Immutable after construction, so a single instance can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    source: String,
    expression: Expression,
}

impl CompiledFilter {
    /// Compile filter text into a reusable filter
    pub fn compile(text: &str) -> Result<Self, FilterError> {
        let tokens = tokenize(text)?;
        let expression = parse(&tokens)?;
        Ok(CompiledFilter {
            source: text.to_string(),
            expression,
        })
    }

    /// Compile filter text, rewriting aliased field names
    ///
    /// Alias keys and targets are matched case-insensitively.
    pub fn with_aliases(
        text: &str,
        aliases: &BTreeMap<String, String>,
    ) -> Result<Self, FilterError> {
        let mut filter = Self::compile(text)?;
        if !aliases.is_empty() {
            filter.expression.resolve_aliases(&fold_aliases(aliases));
        }
        Ok(filter)
    }

    pub fn matches<F: Fields + ?Sized>(&self, message: &F) -> bool {
        evaluate(&self.expression, message)
    }

    /// The filter text as supplied by the user
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

/// Lower-case both sides of an alias table, the form field names take after parsing
pub fn fold_aliases(aliases: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    aliases
        .iter()
        .map(|(alias, target)| (alias.to_lowercase(), target.to_lowercase()))
        .collect()
}

impl fmt::Display for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

impl FromStr for CompiledFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiled_filter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledFilter>();
    }

    #[test]
    fn test_aliases_rewrite_fields() {
        let aliases = BTreeMap::from([("Sender".to_string(), "FROM".to_string())]);
        let filter = CompiledFilter::with_aliases("sender$=@example.org", &aliases).unwrap();
        assert_eq!(filter.expression().fields(), vec!["from"]);
        assert_eq!(filter.source(), "sender$=@example.org");
    }

    #[test]
    fn test_aliases_are_not_chained() {
        let aliases = BTreeMap::from([
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "c".to_string()),
        ]);
        let filter = CompiledFilter::with_aliases("a=1 or b=2", &aliases).unwrap();
        assert_eq!(filter.expression().fields(), vec!["b", "c"]);
    }

    #[test]
    fn test_fold_aliases_handles_non_ascii() {
        let aliases = BTreeMap::from([("Empfänger".to_string(), "TO".to_string())]);
        let folded = fold_aliases(&aliases);
        assert_eq!(folded.get("empfänger").map(String::as_str), Some("to"));

        let filter = CompiledFilter::with_aliases("EMPFÄNGER=x", &aliases).unwrap();
        assert_eq!(filter.expression().fields(), vec!["to"]);
    }

    #[test]
    fn test_from_str() {
        let filter: CompiledFilter = "subject=~/x/i".parse().unwrap();
        assert_eq!(filter.to_string(), "subject=~/x/i");
        assert!("subject=~".parse::<CompiledFilter>().is_err());
    }
}
