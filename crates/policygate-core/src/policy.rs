//! Boolean access policies over attribute identifiers.
//!
//! A policy is embedded in a ciphertext at encryption time and never changes
//! afterwards. The text form uses decimal attribute ids joined by `AND` / `OR`
//! (case-insensitive) with parentheses for grouping; `AND` binds tighter than
//! `OR`. Attribute ids may be double-quoted.
//!
//! ```text
//! 681025137
//! 681025137 AND (3841505675 OR 1038421912)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeId, AttributeSet};
use crate::error::PolicyError;

/// A boolean formula over attribute identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Policy {
    /// Satisfied when the attribute is present.
    Attribute(AttributeId),
    /// Satisfied when every clause is satisfied.
    And(Vec<Policy>),
    /// Satisfied when at least one clause is satisfied.
    Or(Vec<Policy>),
}

impl Policy {
    /// A single-attribute policy.
    pub fn attribute(id: AttributeId) -> Self {
        Policy::Attribute(id)
    }

    /// Conjunction of clauses. Nested conjunctions are flattened and a single
    /// clause is returned unwrapped.
    pub fn and(clauses: impl IntoIterator<Item = Policy>) -> Self {
        Self::combine(clauses, true)
    }

    /// Disjunction of clauses, flattened like [`Policy::and`].
    pub fn or(clauses: impl IntoIterator<Item = Policy>) -> Self {
        Self::combine(clauses, false)
    }

    fn combine(clauses: impl IntoIterator<Item = Policy>, conjunction: bool) -> Self {
        let mut flat = Vec::new();
        for clause in clauses {
            match (clause, conjunction) {
                (Policy::And(inner), true) | (Policy::Or(inner), false) => flat.extend(inner),
                (other, _) => flat.push(other),
            }
        }
        if flat.len() == 1 {
            if let Some(only) = flat.pop() {
                return only;
            }
        }
        if conjunction {
            Policy::And(flat)
        } else {
            Policy::Or(flat)
        }
    }

    /// Parse the text form.
    pub fn parse(input: &str) -> Result<Self, PolicyError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(PolicyError::Empty);
        }
        let mut parser = Parser { tokens, pos: 0 };
        let policy = parser.parse_or()?;
        match parser.peek() {
            None => Ok(policy),
            Some(tok) => Err(PolicyError::UnexpectedToken {
                token: tok.text.clone(),
                offset: tok.offset,
            }),
        }
    }

    /// Evaluate the formula against a set of attributes.
    pub fn is_satisfied_by(&self, attributes: &AttributeSet) -> bool {
        match self {
            Policy::Attribute(id) => attributes.contains(id),
            Policy::And(clauses) => {
                !clauses.is_empty() && clauses.iter().all(|c| c.is_satisfied_by(attributes))
            }
            Policy::Or(clauses) => clauses.iter().any(|c| c.is_satisfied_by(attributes)),
        }
    }

    /// Every attribute mentioned anywhere in the formula.
    pub fn attributes(&self) -> AttributeSet {
        let mut out = AttributeSet::new();
        self.collect_attributes(&mut out);
        out
    }

    fn collect_attributes(&self, out: &mut AttributeSet) {
        match self {
            Policy::Attribute(id) => {
                out.insert(*id);
            }
            Policy::And(clauses) | Policy::Or(clauses) => {
                for clause in clauses {
                    clause.collect_attributes(out);
                }
            }
        }
    }

    /// Reject formulas with an empty `And` or `Or` anywhere in the tree.
    /// Such formulas have no text form and are never satisfied.
    pub fn validate(&self) -> Result<(), PolicyError> {
        match self {
            Policy::Attribute(_) => Ok(()),
            Policy::And(clauses) | Policy::Or(clauses) => {
                if clauses.is_empty() {
                    return Err(PolicyError::Empty);
                }
                clauses.iter().try_for_each(Policy::validate)
            }
        }
    }

    /// Render in the quoted, lower-case operator dialect used by pest-based
    /// ABE policy parsers: `"1" and ("2" or "3")`.
    ///
    /// Those parsers only accept binary operators, so n-ary clauses are
    /// emitted as right-nested pairs and every compound operand is
    /// parenthesized: `"1" and ("2" and "3")`.
    pub fn to_human_policy(&self) -> String {
        let mut out = String::new();
        self.render_human(&mut out);
        out
    }

    fn render_human(&self, out: &mut String) {
        match self {
            Policy::Attribute(id) => out.push_str(&format!("\"{}\"", id)),
            Policy::And(clauses) => render_pairs(clauses, " and ", out),
            Policy::Or(clauses) => render_pairs(clauses, " or ", out),
        }
    }

    fn render_operand(&self, out: &mut String) {
        if let Policy::Attribute(_) = self {
            self.render_human(out);
        } else {
            out.push('(');
            self.render_human(out);
            out.push(')');
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            Policy::Attribute(id) => out.push_str(&id.to_string()),
            Policy::And(clauses) => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" AND ");
                    }
                    if matches!(clause, Policy::Or(_)) {
                        out.push('(');
                        clause.render(out);
                        out.push(')');
                    } else {
                        clause.render(out);
                    }
                }
            }
            Policy::Or(clauses) => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" OR ");
                    }
                    clause.render(out);
                }
            }
        }
    }
}

fn render_pairs(clauses: &[Policy], op: &str, out: &mut String) {
    match clauses {
        [] => {}
        [only] => only.render_human(out),
        [first, rest @ ..] => {
            first.render_operand(out);
            out.push_str(op);
            if let [last] = rest {
                last.render_operand(out);
            } else {
                out.push('(');
                render_pairs(rest, op, out);
                out.push(')');
            }
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out);
        f.write_str(&out)
    }
}

impl FromStr for Policy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Policy::parse(s)
    }
}

impl From<AttributeId> for Policy {
    fn from(id: AttributeId) -> Self {
        Policy::Attribute(id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Open,
    Close,
    And,
    Or,
    Attribute(AttributeId),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    text: String,
    offset: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, PolicyError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' => {
                chars.next();
                let kind = if c == '(' { TokenKind::Open } else { TokenKind::Close };
                tokens.push(Token { kind, text: c.to_string(), offset });
            }
            '"' => {
                chars.next();
                let mut word = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '"' {
                        closed = true;
                        break;
                    }
                    word.push(c);
                }
                if !closed {
                    return Err(PolicyError::UnexpectedEnd);
                }
                let id = parse_attribute(&word)?;
                tokens.push(Token {
                    kind: TokenKind::Attribute(id),
                    text: format!("\"{}\"", word),
                    offset,
                });
            }
            _ => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' || c == '"' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                let kind = if word.eq_ignore_ascii_case("and") {
                    TokenKind::And
                } else if word.eq_ignore_ascii_case("or") {
                    TokenKind::Or
                } else {
                    TokenKind::Attribute(parse_attribute(&word)?)
                };
                tokens.push(Token { kind, text: word, offset });
            }
        }
    }

    Ok(tokens)
}

fn parse_attribute(word: &str) -> Result<AttributeId, PolicyError> {
    if word.is_empty() || !word.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PolicyError::InvalidAttribute(word.to_string()));
    }
    word.parse::<u32>()
        .map(AttributeId)
        .map_err(|_| PolicyError::InvalidAttribute(word.to_string()))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().map(|t| &t.kind) == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Policy, PolicyError> {
        let mut clauses = vec![self.parse_and()?];
        while self.eat(&TokenKind::Or) {
            clauses.push(self.parse_and()?);
        }
        Ok(Policy::or(clauses))
    }

    fn parse_and(&mut self) -> Result<Policy, PolicyError> {
        let mut clauses = vec![self.parse_atom()?];
        while self.eat(&TokenKind::And) {
            clauses.push(self.parse_atom()?);
        }
        Ok(Policy::and(clauses))
    }

    fn parse_atom(&mut self) -> Result<Policy, PolicyError> {
        let tok = self.next().ok_or(PolicyError::UnexpectedEnd)?;
        match tok.kind {
            TokenKind::Attribute(id) => Ok(Policy::Attribute(id)),
            TokenKind::Open => {
                let inner = self.parse_or()?;
                if self.eat(&TokenKind::Close) {
                    Ok(inner)
                } else {
                    match self.peek() {
                        Some(t) => Err(PolicyError::UnexpectedToken {
                            token: t.text.clone(),
                            offset: t.offset,
                        }),
                        None => Err(PolicyError::UnexpectedEnd),
                    }
                }
            }
            _ => Err(PolicyError::UnexpectedToken {
                token: tok.text,
                offset: tok.offset,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::encode;

    fn set(ids: &[u32]) -> AttributeSet {
        ids.iter().copied().map(AttributeId).collect()
    }

    fn attr(id: u32) -> Policy {
        Policy::attribute(AttributeId(id))
    }

    #[test]
    fn test_parse_single_attribute() {
        let policy = Policy::parse("681025137").unwrap();
        assert_eq!(policy, Policy::attribute(encode("dept1")));
    }

    #[test]
    fn test_parse_precedence() {
        let policy = Policy::parse("1 OR 2 and 3").unwrap();
        assert_eq!(
            policy,
            Policy::Or(vec![
                attr(1),
                Policy::And(vec![attr(2), attr(3)]),
            ])
        );
    }

    #[test]
    fn test_parse_parentheses_and_quotes() {
        let policy = Policy::parse(r#"("1" or 2) AND 3"#).unwrap();
        assert_eq!(
            policy,
            Policy::And(vec![
                Policy::Or(vec![attr(1), attr(2)]),
                attr(3),
            ])
        );
    }

    #[test]
    fn test_parse_flattens_nested_operators() {
        let policy = Policy::parse("1 AND (2 AND 3)").unwrap();
        assert_eq!(
            policy,
            Policy::And(vec![attr(1), attr(2), attr(3)])
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Policy::parse("   "), Err(PolicyError::Empty));
        assert_eq!(Policy::parse("1 AND"), Err(PolicyError::UnexpectedEnd));
        assert_eq!(Policy::parse("(1 OR 2"), Err(PolicyError::UnexpectedEnd));
        assert!(matches!(
            Policy::parse("dept1"),
            Err(PolicyError::InvalidAttribute(_))
        ));
        assert!(matches!(
            Policy::parse("1 2"),
            Err(PolicyError::UnexpectedToken { offset: 2, .. })
        ));
        assert!(matches!(
            Policy::parse("99999999999"),
            Err(PolicyError::InvalidAttribute(_))
        ));
    }

    #[test]
    fn test_display_roundtrip() {
        let text = "1 AND (2 OR 3) AND 4";
        let policy = Policy::parse(text).unwrap();
        assert_eq!(policy.to_string(), text);
        assert_eq!(Policy::parse(&policy.to_string()).unwrap(), policy);
    }

    #[test]
    fn test_human_policy_rendering() {
        let policy = Policy::parse("1 AND (2 OR 3)").unwrap();
        assert_eq!(policy.to_human_policy(), r#""1" and ("2" or "3")"#);
    }

    #[test]
    fn test_human_policy_nests_binary_pairs() {
        assert_eq!(
            Policy::parse("1 AND 2 AND 3").unwrap().to_human_policy(),
            r#""1" and ("2" and "3")"#
        );
        assert_eq!(
            Policy::parse("1 OR 2 AND 3").unwrap().to_human_policy(),
            r#""1" or ("2" and "3")"#
        );
        assert_eq!(
            Policy::parse("(1 OR 2) AND (3 OR 4) AND 5").unwrap().to_human_policy(),
            r#"("1" or "2") and (("3" or "4") and "5")"#
        );
        assert_eq!(attr(7).to_human_policy(), r#""7""#);
    }

    #[test]
    fn test_validate_rejects_empty_clauses() {
        assert!(Policy::parse("1 AND (2 OR 3)").unwrap().validate().is_ok());
        assert_eq!(Policy::and(Vec::new()).validate(), Err(PolicyError::Empty));
        assert_eq!(Policy::or(Vec::new()).validate(), Err(PolicyError::Empty));
        assert_eq!(
            Policy::Or(vec![attr(1), Policy::And(vec![])]).validate(),
            Err(PolicyError::Empty)
        );
    }

    #[test]
    fn test_empty_clauses_are_unsatisfiable() {
        assert!(!Policy::and(Vec::new()).is_satisfied_by(&set(&[])));
        assert!(!Policy::and(Vec::new()).is_satisfied_by(&set(&[1, 2])));
        assert!(!Policy::or(Vec::new()).is_satisfied_by(&set(&[1])));
    }

    #[test]
    fn test_satisfaction() {
        let policy = Policy::parse("1 AND (2 OR 3)").unwrap();
        assert!(policy.is_satisfied_by(&set(&[1, 2])));
        assert!(policy.is_satisfied_by(&set(&[1, 3, 9])));
        assert!(!policy.is_satisfied_by(&set(&[1])));
        assert!(!policy.is_satisfied_by(&set(&[2, 3])));
        assert!(!policy.is_satisfied_by(&set(&[])));
    }

    #[test]
    fn test_attributes_collects_all() {
        let policy = Policy::parse("1 AND (2 OR 3) AND 1").unwrap();
        assert_eq!(policy.attributes(), set(&[1, 2, 3]));
    }
}
