use super::ast::{Expression, MatchClause, Operator};
use super::error::{FilterError, ParseError, PatternError};
use super::lexer::{Token, TokenKind};
use super::matcher::{Pattern, Predicate};

static END: Token = Token {
    kind: TokenKind::Eof,
    text: String::new(),
    position: 0,
};

/// Deepest parenthesis nesting accepted before the parser gives up
pub const MAX_NESTING: usize = 256;

/// Build an expression tree from a token stream
///
/// Grammar, lowest precedence first, all connectives left-associative:
///
/// ```text
/// expr        := orExpr
/// orExpr      := andExpr ( "or" andExpr )*
/// andExpr     := atom ( "and" atom )*
/// atom        := "(" expr ")" | matchClause
/// matchClause := FIELD OP (PATTERN | STRING)
/// ```
///
/// Patterns are compiled here, so an invalid regex fails the whole filter.
pub fn parse(tokens: &[Token]) -> Result<Expression, FilterError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.or_expr()?;

    let token = parser.peek();
    if token.kind != TokenKind::Eof {
        return Err(unexpected(token, "'and', 'or' or end of input").into());
    }

    Ok(expr)
}

fn unexpected(token: &Token, expected: &'static str) -> ParseError {
    ParseError {
        position: token.position,
        expected,
        found: token.kind.describe(),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Currently open groups
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &'a Token {
        self.tokens.get(self.pos).unwrap_or(&END)
    }

    fn bump(&mut self) -> &'a Token {
        let token = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn or_expr(&mut self) -> Result<Expression, FilterError> {
        let mut left = self.and_expr()?;
        while self.peek().kind == TokenKind::Or {
            self.bump();
            let right = self.and_expr()?;
            left = Expression::or(left, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expression, FilterError> {
        let mut left = self.atom()?;
        while self.peek().kind == TokenKind::And {
            self.bump();
            let right = self.atom()?;
            left = Expression::and(left, right);
        }
        Ok(left)
    }

    fn atom(&mut self) -> Result<Expression, FilterError> {
        let token = self.peek();
        match &token.kind {
            TokenKind::LParen => {
                if self.depth == MAX_NESTING {
                    return Err(unexpected(token, "at most 256 nested groups").into());
                }
                self.bump();
                self.depth += 1;
                let expr = self.or_expr()?;
                self.depth -= 1;
                let close = self.bump();
                if close.kind != TokenKind::RParen {
                    return Err(unexpected(close, "')'").into());
                }
                Ok(expr)
            }
            TokenKind::Field(name) => {
                self.bump();
                self.match_clause(name)
            }
            _ => Err(unexpected(token, "a field name or '('").into()),
        }
    }

    fn match_clause(&mut self, field: &str) -> Result<Expression, FilterError> {
        let op_token = self.bump();
        let TokenKind::Op(op) = op_token.kind else {
            return Err(unexpected(op_token, "an operator (=~, !~, ^~, $=, !=, =)").into());
        };

        let value = self.bump();
        let predicate = if op.takes_pattern() {
            let TokenKind::Pattern {
                body,
                case_insensitive,
            } = &value.kind
            else {
                return Err(unexpected(value, "a pattern literal /.../").into());
            };
            let pattern =
                Pattern::new(body, *case_insensitive).map_err(|source| PatternError {
                    position: value.position,
                    pattern: body.clone(),
                    source,
                })?;
            match op {
                Operator::Matches => Predicate::Matches(pattern),
                _ => Predicate::NotMatches(pattern),
            }
        } else {
            let TokenKind::Str { value: literal, .. } = &value.kind else {
                return Err(unexpected(value, "a string literal").into());
            };
            let literal = literal.clone();
            match op {
                Operator::StartsWith => Predicate::StartsWith(literal),
                Operator::EndsWith => Predicate::EndsWith(literal),
                Operator::NotEqual => Predicate::NotEqual(literal),
                _ => Predicate::Equal(literal),
            }
        };

        Ok(Expression::Match(MatchClause {
            field: field.to_lowercase(),
            predicate,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::lexer::tokenize;

    fn parse_str(text: &str) -> Result<Expression, FilterError> {
        parse(&tokenize(text).unwrap())
    }

    fn parse_error(text: &str) -> ParseError {
        match parse_str(text) {
            Err(FilterError::Parse(err)) => err,
            other => panic!("expected a parse error for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_single_clause() {
        let expr = parse_str("Subject=hello").unwrap();
        assert_eq!(
            expr,
            Expression::Match(MatchClause {
                field: "subject".to_string(),
                predicate: Predicate::Equal("hello".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_every_operator() {
        let cases = [
            ("a=~/x/", Operator::Matches),
            ("a!~/x/", Operator::NotMatches),
            ("a^~x", Operator::StartsWith),
            ("a$=x", Operator::EndsWith),
            ("a!=x", Operator::NotEqual),
            ("a=x", Operator::Equal),
        ];
        for (text, op) in cases {
            let Expression::Match(clause) = parse_str(text).unwrap() else {
                panic!("expected a match clause for {text}");
            };
            assert_eq!(clause.operator(), op, "parsing {text}");
        }
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse_str("a=1 or b=2 and c=3").unwrap();
        assert_eq!(expr.to_string(), r#"(a="1" or (b="2" and c="3"))"#);

        let expr = parse_str("a=1 and b=2 or c=3").unwrap();
        assert_eq!(expr.to_string(), r#"((a="1" and b="2") or c="3")"#);
    }

    #[test]
    fn test_connectives_are_left_associative() {
        let expr = parse_str("a=1 or b=2 or c=3").unwrap();
        assert_eq!(expr.to_string(), r#"((a="1" or b="2") or c="3")"#);
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse_str("(a=1 or b=2) and c=3").unwrap();
        assert_eq!(expr.to_string(), r#"((a="1" or b="2") and c="3")"#);
    }

    #[test]
    fn test_missing_value() {
        let err = parse_error("subject=~");
        assert_eq!(err.position, 9);
        assert_eq!(err.found, "end of input");
        assert_eq!(err.expected, "a pattern literal /.../");
    }

    #[test]
    fn test_missing_operator() {
        let err = parse_error("subject hello");
        assert_eq!(err.position, 8);
        assert_eq!(err.found, "field 'hello'");
    }

    #[test]
    fn test_operator_value_kind_mismatch() {
        assert_eq!(parse_error("subject=~hello").found, "string \"hello\"");
        assert_eq!(parse_error("subject=/hello/").found, "pattern /hello/");
    }

    #[test]
    fn test_dangling_connective() {
        let err = parse_error("a=1 and");
        assert_eq!(err.found, "end of input");
        assert_eq!(err.expected, "a field name or '('");

        let err = parse_error("or a=1");
        assert_eq!(err.position, 0);
        assert_eq!(err.found, "'or'");
    }

    #[test]
    fn test_unmatched_parentheses() {
        assert_eq!(parse_error("(a=1").expected, "')'");

        let err = parse_error("a=1)");
        assert_eq!(err.position, 3);
        assert_eq!(err.found, "')'");
    }

    #[test]
    fn test_adjacent_clauses_need_a_connective() {
        let err = parse_error("a=1 b=2");
        assert_eq!(err.expected, "'and', 'or' or end of input");
        assert_eq!(err.found, "field 'b'");
    }

    #[test]
    fn test_empty_filter() {
        let err = parse_error("   ");
        assert_eq!(err.found, "end of input");
    }

    #[test]
    fn test_invalid_regex_is_a_pattern_error() {
        match parse_str("subject=~/(unclosed/") {
            Err(FilterError::Pattern(err)) => {
                assert_eq!(err.position, 9);
                assert_eq!(err.pattern, "(unclosed");
            }
            other => panic!("expected a pattern error, got {other:?}"),
        }
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}a=1{}", "(".repeat(depth), ")".repeat(depth));

        assert!(parse_str(&nested(MAX_NESTING)).is_ok());

        let err = parse_error(&nested(5000));
        assert_eq!(err.position, MAX_NESTING);
        assert_eq!(err.expected, "at most 256 nested groups");
        assert_eq!(err.found, "'('");
    }

    #[test]
    fn test_nesting_limit_counts_open_groups_only() {
        let siblings = ["(a=1)"; MAX_NESTING * 2].join(" or ");
        assert!(parse_str(&format!("({siblings})")).is_ok());
    }

    #[test]
    fn test_parse_without_eof_token() {
        let mut tokens = tokenize("a=1").unwrap();
        tokens.pop();
        assert!(parse(&tokens).is_ok());
        assert!(parse(&[]).is_err());
    }
}
