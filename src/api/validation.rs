//! Purpose: Provide a stable, serializable validation report model.
//! Exports: `ValidationReport`, `ValidationStatus`, `validate_report`.
//! Role: Shared contract for CLI diagnostics and API users.
//! Invariants: A rejected report never carries a reason or partial shape.
//! Invariants: Accepted reports describe the shape the builder will produce.

use serde::Serialize;

use crate::core::schema::FieldKind;
use crate::core::validate::scan;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Ok,
    Rejected,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub has_header: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<FieldKind>,
}

impl ValidationReport {
    pub fn ok(has_header: bool, records: usize, kinds: Vec<FieldKind>) -> Self {
        Self {
            status: ValidationStatus::Ok,
            has_header,
            records: Some(records),
            columns: Some(kinds.len()),
            kinds,
        }
    }

    pub fn rejected(has_header: bool) -> Self {
        Self {
            status: ValidationStatus::Rejected,
            has_header,
            records: None,
            columns: None,
            kinds: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ValidationStatus::Ok
    }
}

pub fn validate_report(bytes: &[u8], has_header: bool) -> ValidationReport {
    let outcome = scan(bytes, has_header);
    if outcome.accepted {
        ValidationReport::ok(has_header, outcome.records, outcome.kinds)
    } else {
        ValidationReport::rejected(has_header)
    }
}
