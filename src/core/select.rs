//! Purpose: Predicate selection and set-driven projection over tables.
//! Exports: `Operator`, `select_subset`, `select_records`, `Partition`, `partition`.
//! Role: Turns one column predicate into a `RowSet`, then copies rows out by membership.
//! Invariants: Every entry point reads through `Table::rows`; the caller's cursor never moves.
//! Invariants: A set must cover every row of the table; trailing capacity is ignored.
use std::cmp::Ordering;
use std::str::FromStr;

use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::number::Number;
use crate::core::row::Cell;
use crate::core::schema::{FieldKind, FieldRef};
use crate::core::set::RowSet;
use crate::core::table::Table;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    SEq,
    SNe,
    Mod,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Ne => "NE",
            Operator::Lt => "LT",
            Operator::Gt => "GT",
            Operator::Le => "LE",
            Operator::Ge => "GE",
            Operator::SEq => "SEQ",
            Operator::SNe => "SNE",
            Operator::Mod => "MOD",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
            Operator::SEq | Operator::SNe | Operator::Mod => false,
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let op = match text.to_ascii_uppercase().as_str() {
            "EQ" | "=" | "==" => Operator::Eq,
            "NE" | "!=" => Operator::Ne,
            "LT" | "<" => Operator::Lt,
            "GT" | ">" => Operator::Gt,
            "LE" | "<=" => Operator::Le,
            "GE" | ">=" => Operator::Ge,
            "SEQ" => Operator::SEq,
            "SNE" => Operator::SNe,
            "MOD" | "%" => Operator::Mod,
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(format!("unknown operator {text:?}"))
                    .with_hint("Use EQ, NE, LT, GT, LE, GE, SEQ, SNE or MOD."));
            }
        };
        Ok(op)
    }
}

/// Builds the set of row ordinals satisfying `field operator literal`.
///
/// For `Mod`, `field` and `literal` are the modulus and remainder, and membership depends
/// only on the ordinal.
pub fn select_subset(
    table: &Table,
    operator: Operator,
    field: &str,
    literal: &str,
) -> Result<RowSet, Error> {
    let mut set = RowSet::empty(table.len());
    match operator {
        Operator::Mod => {
            let modulus = parse_index(field, "modulus")?;
            let remainder = parse_index(literal, "remainder")?;
            if modulus == 0 {
                return Err(Error::new(ErrorKind::Usage).with_message("MOD modulus must be non-zero"));
            }
            for ordinal in (0..table.len()).filter(|ordinal| ordinal % modulus == remainder) {
                set.add(ordinal)?;
            }
        }
        Operator::SEq | Operator::SNe => {
            let column = table
                .schema()
                .resolve_kind(FieldRef::Name(field), FieldKind::String)?;
            let want_equal = operator == Operator::SEq;
            for (ordinal, row) in table.rows().enumerate() {
                let value = row.get(column).and_then(Cell::as_str).ok_or_else(corrupt_row)?;
                if (value == literal) == want_equal {
                    set.add(ordinal)?;
                }
            }
        }
        _ => {
            let column = table
                .schema()
                .resolve_kind(FieldRef::Name(field), FieldKind::Number)?;
            let target = Number::parse(literal)?;
            for (ordinal, row) in table.rows().enumerate() {
                let value = row
                    .get(column)
                    .and_then(Cell::as_number)
                    .ok_or_else(corrupt_row)?;
                if operator.accepts(value.compare(&target)) {
                    set.add(ordinal)?;
                }
            }
        }
    }
    debug!(
        operator = operator.as_str(),
        field,
        literal,
        matched = set.count(),
        "subset selected"
    );
    Ok(set)
}

/// Copies the member rows of `set` into a new table with the same schema.
pub fn select_records(table: &Table, set: &RowSet) -> Result<Table, Error> {
    check_covers(table, set)?;
    let mut out = Table::new(table.schema().clone());
    for (ordinal, row) in table.rows().enumerate() {
        if set.contains(ordinal) {
            out.push_unchecked(row.clone());
        }
    }
    Ok(out)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    pub matching: Table,
    pub complement: Table,
}

pub fn partition(table: &Table, set: &RowSet) -> Result<Partition, Error> {
    check_covers(table, set)?;
    let mut matching = Table::new(table.schema().clone());
    let mut complement = Table::new(table.schema().clone());
    for (ordinal, row) in table.rows().enumerate() {
        if set.contains(ordinal) {
            matching.push_unchecked(row.clone());
        } else {
            complement.push_unchecked(row.clone());
        }
    }
    Ok(Partition {
        matching,
        complement,
    })
}

fn check_covers(table: &Table, set: &RowSet) -> Result<(), Error> {
    if set.len() < table.len() {
        return Err(Error::new(ErrorKind::SizeMismatch).with_message(format!(
            "set covers {} rows, table has {}",
            set.len(),
            table.len()
        )));
    }
    Ok(())
}

fn parse_index(text: &str, role: &str) -> Result<usize, Error> {
    text.trim().parse::<usize>().map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("MOD {role} {text:?} is not a non-negative integer"))
            .with_source(err)
    })
}

fn corrupt_row() -> Error {
    Error::new(ErrorKind::Internal).with_message("row does not match its schema")
}

#[cfg(test)]
mod tests {
    use super::{Operator, partition, select_records, select_subset};
    use crate::core::error::ErrorKind;
    use crate::core::number::Number;
    use crate::core::reader::build;
    use crate::core::row::{Cell, Row};
    use crate::core::schema::{Field, Schema};
    use crate::core::set::RowSet;
    use crate::core::table::Table;

    fn people() -> Table {
        build(b"\"name\",\"age\"\n\"Alice\",30\n\"Bob\",-5\n", true).expect("build")
    }

    fn numbered(rows: i64) -> Table {
        let mut table = Table::new(Schema::new(vec![Field::number("n")]));
        for value in 0..rows {
            table
                .insert(&Row::new(vec![Cell::from(Number::from(value))]))
                .expect("insert");
        }
        table
    }

    fn members(set: &RowSet) -> Vec<usize> {
        set.iter().collect()
    }

    #[test]
    fn operator_parses_names_and_symbols() {
        assert_eq!("lt".parse::<Operator>().expect("lt"), Operator::Lt);
        assert_eq!("<=".parse::<Operator>().expect("le"), Operator::Le);
        assert_eq!("==".parse::<Operator>().expect("eq"), Operator::Eq);
        assert_eq!("seq".parse::<Operator>().expect("seq"), Operator::SEq);
        assert_eq!("%".parse::<Operator>().expect("mod"), Operator::Mod);
        assert_eq!(
            "LIKE".parse::<Operator>().unwrap_err().kind(),
            ErrorKind::Usage
        );
    }

    #[test]
    fn mod_selects_by_ordinal() {
        let table = numbered(7);
        let set = select_subset(&table, Operator::Mod, "3", "1").expect("mod");
        assert_eq!(members(&set), vec![1, 4]);
        assert_eq!(set.len(), 7);
    }

    #[test]
    fn mod_rejects_zero_and_non_integers() {
        let table = numbered(3);
        for (m, r) in [("0", "0"), ("x", "1"), ("2", "-1"), ("1.5", "0")] {
            let err = select_subset(&table, Operator::Mod, m, r).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Usage, "{m} {r}");
        }
    }

    #[test]
    fn numeric_comparisons() {
        let table = numbered(5);
        let cases = [
            (Operator::Eq, vec![2]),
            (Operator::Ne, vec![0, 1, 3, 4]),
            (Operator::Lt, vec![0, 1]),
            (Operator::Gt, vec![3, 4]),
            (Operator::Le, vec![0, 1, 2]),
            (Operator::Ge, vec![2, 3, 4]),
        ];
        for (operator, expected) in cases {
            let set = select_subset(&table, operator, "n", "2.0").expect("select");
            assert_eq!(members(&set), expected, "{operator:?}");
        }
    }

    #[test]
    fn scenario_selects_negative_ages() {
        let mut table = people();
        table.next();
        let set = select_subset(&table, Operator::Lt, "age", "0").expect("lt");
        assert_eq!(members(&set), vec![1]);
        assert_eq!(table.current().and_then(|row| row.get(0)), Some(&Cell::from("Alice")));

        let bob = select_records(&table, &set).expect("records");
        assert_eq!(bob.len(), 1);
        assert_eq!(bob.schema(), table.schema());
        assert_eq!(
            bob.rows().next().and_then(|row| row.get(0)),
            Some(&Cell::from("Bob"))
        );
    }

    #[test]
    fn string_equality_operators() {
        let table = people();
        let seq = select_subset(&table, Operator::SEq, "name", "Bob").expect("seq");
        assert_eq!(members(&seq), vec![1]);
        let sne = select_subset(&table, Operator::SNe, "name", "Bob").expect("sne");
        assert_eq!(members(&sne), vec![0]);
    }

    #[test]
    fn selection_errors_are_distinct() {
        let table = people();
        let err = select_subset(&table, Operator::Eq, "height", "1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = select_subset(&table, Operator::Eq, "name", "1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KindMismatch);
        let err = select_subset(&table, Operator::SEq, "age", "1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KindMismatch);
        let err = select_subset(&table, Operator::Gt, "age", "1e3").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn partition_is_complete_and_ordered() {
        let table = numbered(6);
        let set = select_subset(&table, Operator::Mod, "2", "0").expect("mod");
        let split = partition(&table, &set).expect("partition");
        assert_eq!(split.matching.len() + split.complement.len(), table.len());
        let values = |t: &Table| -> Vec<Number> {
            t.rows()
                .filter_map(|row| row.get(0).and_then(Cell::as_number).copied())
                .collect()
        };
        assert_eq!(
            values(&split.matching),
            vec![Number::from(0i64), Number::from(2i64), Number::from(4i64)]
        );
        assert_eq!(
            values(&split.complement),
            vec![Number::from(1i64), Number::from(3i64), Number::from(5i64)]
        );
    }

    #[test]
    fn undersized_sets_are_rejected_and_extra_capacity_ignored() {
        let table = numbered(4);
        let small = RowSet::universe(3);
        assert_eq!(
            select_records(&table, &small).unwrap_err().kind(),
            ErrorKind::SizeMismatch
        );
        assert_eq!(
            partition(&table, &small).unwrap_err().kind(),
            ErrorKind::SizeMismatch
        );
        let wide = RowSet::universe(16);
        assert_eq!(select_records(&table, &wide).expect("wide").len(), 4);
    }
}
