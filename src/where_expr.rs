//! Purpose: Parse and evaluate `csvtab --where` terms against a table.
//! Exports: `WhereTerm`, `parse_where_terms`, `select_where`.
//! Role: Thin CLI adapter from `field OP literal` text onto `select_subset` and set algebra.
//! Invariants: Parse failures are usage errors; evaluation errors keep their core kind.
//! Invariants: Multiple terms combine by intersection, starting from the base set.

use std::fmt;

use csvtab::api::{Error, ErrorKind, Operator, RowSet, Table, select_subset};

// Longest first so `<=` is not read as `<` at the same position.
const SYMBOLS: [&str; 8] = ["<=", ">=", "!=", "==", "<", ">", "=", "%"];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WhereTerm {
    pub field: String,
    pub operator: Operator,
    pub literal: String,
}

impl fmt::Display for WhereTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator.as_str(), self.literal)
    }
}

pub fn parse_where_terms(exprs: &[String]) -> Result<Vec<WhereTerm>, Error> {
    exprs.iter().map(|expr| parse_where_term(expr)).collect()
}

fn parse_where_term(expr: &str) -> Result<WhereTerm, Error> {
    let trimmed = expr.trim();
    let mut words = trimmed.splitn(3, char::is_whitespace);
    if let (Some(field), Some(op), Some(rest)) = (words.next(), words.next(), words.next()) {
        if let Ok(operator) = op.parse::<Operator>() {
            return Ok(term(field, operator, rest));
        }
    }

    if let Some((field, symbol, literal)) = split_compact(trimmed) {
        let operator = symbol.parse::<Operator>()?;
        return Ok(term(field, operator, literal));
    }

    Err(Error::new(ErrorKind::Usage)
        .with_message(format!("invalid --where term {expr:?}"))
        .with_hint("Use `field OP literal`, for example `age LT 0` or `name SEQ Bob`."))
}

// Splits at the leftmost operator symbol, taking the longest symbol at that position.
fn split_compact(text: &str) -> Option<(&str, &'static str, &str)> {
    text.char_indices().find_map(|(index, _)| {
        let rest = &text[index..];
        SYMBOLS
            .iter()
            .find(|symbol| rest.starts_with(**symbol))
            .map(|symbol| (&text[..index], *symbol, &rest[symbol.len()..]))
    })
}

fn term(field: &str, operator: Operator, literal: &str) -> WhereTerm {
    let literal = literal.trim();
    let literal = literal
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(literal);
    WhereTerm {
        field: field.trim().to_string(),
        operator,
        literal: literal.to_string(),
    }
}

/// Intersects the matches of every term, starting from `base` or the full table.
pub fn select_where(
    table: &Table,
    terms: &[WhereTerm],
    base: Option<RowSet>,
) -> Result<RowSet, Error> {
    let mut set = base.unwrap_or_else(|| RowSet::universe(table.len()));
    for term in terms {
        let matched = select_subset(table, term.operator, &term.field, &term.literal)
            .map_err(|err| {
                let hint = format!("While evaluating `--where {term}`.");
                err.with_hint(hint)
            })?;
        set.intersect_with(&matched)?;
    }
    Ok(set)
}
