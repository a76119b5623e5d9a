use regex::{Regex, RegexBuilder};
use std::fmt;

/// A regular expression compiled from a `/body/` literal
///
/// The case-insensitivity modifier is baked into the compiled regex, so
/// matching never has to look at it again.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    case_insensitive: bool,
}

impl Pattern {
    pub fn new(body: &str, case_insensitive: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(body)
            .case_insensitive(case_insensitive)
            .build()?;
        Ok(Pattern {
            regex,
            case_insensitive,
        })
    }

    /// Substring search, not a full match
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// The pattern body as written between the slashes
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str() && self.case_insensitive == other.case_insensitive
    }
}

impl Eq for Pattern {}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())?;
        if self.case_insensitive {
            write!(f, "i")?;
        }
        Ok(())
    }
}

/// The operator of a match clause together with the value it compares against
///
/// Regex operators always carry a [`Pattern`] and string operators always
/// carry a literal, so a clause can never pair an operator with the wrong
/// kind of value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `=~`
    Matches(Pattern),
    /// `!~`
    NotMatches(Pattern),
    /// `^~`
    StartsWith(String),
    /// `$=`
    EndsWith(String),
    /// `!=`
    NotEqual(String),
    /// `=`
    Equal(String),
}

impl Predicate {
    /// Test a field value against this predicate
    ///
    /// String comparisons are exact and case-sensitive. Only patterns can
    /// opt into case-insensitivity, through the `i` modifier.
    pub fn apply(&self, value: &str) -> bool {
        match self {
            Predicate::Matches(pattern) => pattern.is_match(value),
            Predicate::NotMatches(pattern) => !pattern.is_match(value),
            Predicate::StartsWith(prefix) => value.starts_with(prefix.as_str()),
            Predicate::EndsWith(suffix) => value.ends_with(suffix.as_str()),
            Predicate::NotEqual(literal) => value != literal,
            Predicate::Equal(literal) => value == literal,
        }
    }
}
