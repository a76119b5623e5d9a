use super::matcher::Predicate;
use std::collections::BTreeMap;
use std::fmt;

/// The six comparison operators of the filter language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=~`
    Matches,
    /// `!~`
    NotMatches,
    /// `^~`
    StartsWith,
    /// `$=`
    EndsWith,
    /// `!=`
    NotEqual,
    /// `=`
    Equal,
}

impl Operator {
    /// All operators, two-character lexemes first so that `=` is tried last
    pub const ALL: [Operator; 6] = [
        Operator::Matches,
        Operator::NotMatches,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::NotEqual,
        Operator::Equal,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Matches => "=~",
            Operator::NotMatches => "!~",
            Operator::StartsWith => "^~",
            Operator::EndsWith => "$=",
            Operator::NotEqual => "!=",
            Operator::Equal => "=",
        }
    }

    /// Whether the operator compares against a pattern literal rather than a string
    pub fn takes_pattern(&self) -> bool {
        matches!(self, Operator::Matches | Operator::NotMatches)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single `field operator value` unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchClause {
    /// Lower-cased field name
    pub field: String,
    pub predicate: Predicate,
}

impl MatchClause {
    pub fn operator(&self) -> Operator {
        match self.predicate {
            Predicate::Matches(_) => Operator::Matches,
            Predicate::NotMatches(_) => Operator::NotMatches,
            Predicate::StartsWith(_) => Operator::StartsWith,
            Predicate::EndsWith(_) => Operator::EndsWith,
            Predicate::NotEqual(_) => Operator::NotEqual,
            Predicate::Equal(_) => Operator::Equal,
        }
    }
}

impl fmt::Display for MatchClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.field, self.operator())?;
        match &self.predicate {
            Predicate::Matches(pattern) | Predicate::NotMatches(pattern) => {
                write!(f, "{pattern}")
            }
            Predicate::StartsWith(literal)
            | Predicate::EndsWith(literal)
            | Predicate::NotEqual(literal)
            | Predicate::Equal(literal) if literal.contains('"') => {
                // Only bare words can hold a double quote
                write!(f, "{literal}")
            }
            Predicate::StartsWith(literal)
            | Predicate::EndsWith(literal)
            | Predicate::NotEqual(literal)
            | Predicate::Equal(literal) => write!(f, "\"{literal}\""),
        }
    }
}

/// A compiled filter expression tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Match(MatchClause),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::Or(Box::new(left), Box::new(right))
    }

    /// Field names referenced by the expression, in order of appearance
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expression::Match(clause) => out.push(clause.field.as_str()),
            Expression::And(left, right) | Expression::Or(left, right) => {
                left.collect_fields(out);
                right.collect_fields(out);
            }
        }
    }

    /// Rewrite field names through an alias table with lower-cased keys
    ///
    /// Aliases are resolved one level deep.
    pub(crate) fn resolve_aliases(&mut self, aliases: &BTreeMap<String, String>) {
        match self {
            Expression::Match(clause) => {
                if let Some(target) = aliases.get(&clause.field) {
                    clause.field = target.clone();
                }
            }
            Expression::And(left, right) | Expression::Or(left, right) => {
                left.resolve_aliases(aliases);
                right.resolve_aliases(aliases);
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Match(clause) => write!(f, "{clause}"),
            Expression::And(left, right) => write!(f, "({left} and {right})"),
            Expression::Or(left, right) => write!(f, "({left} or {right})"),
        }
    }
}
